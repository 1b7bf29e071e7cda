//! Conservation and entropy behavior of the volume integrals on periodic
//! domains.

use dgsem::boundary::BoundaryConditions;
use dgsem::equations::{CompressibleEuler, Equations, Pressure};
use dgsem::flux::{FluxLaxFriedrichs, FluxRanocha, NumericalFlux};
use dgsem::mesh::TreeMesh;
use dgsem::simulation::Simulation;
use dgsem::solver::{
    DgConfig, DgSemidiscretization, IndicatorHennemannGassner, Solution, SubcellLimiterIdp, VolumeIntegral,
};
use dgsem::time::SSPRK3;

type Euler2D = CompressibleEuler<2>;

fn blast_wave_mesh(refine: bool) -> TreeMesh<2> {
    let mesh = TreeMesh::new([8, 8], [-2.0, -2.0], [2.0, 2.0], [true, true]).unwrap();
    if refine { mesh.refine(&[[3, 3], [4, 4], [3, 4], [4, 3]]).unwrap() } else { mesh }
}

fn run_and_compare<SF>(mesh: TreeMesh<2>, surface_flux: SF, volume_integral: VolumeIntegral<Euler2D, 4>, cfl: f64)
where
    SF: NumericalFlux<Euler2D, 4>,
{
    let _ = env_logger::builder().is_test(true).try_init();
    let eq = Euler2D::new(1.4);
    let config = DgConfig::new(3, surface_flux, FluxRanocha).with_volume_integral(volume_integral);
    let semi = DgSemidiscretization::new(mesh, eq, config, BoundaryConditions::periodic()).unwrap();
    let mut u = semi.compute_coefficients(|x, t| semi.equations().initial_condition_weak_blast_wave(x, t), 0.0);
    let before = semi.integrate(&u);

    let mut sim = Simulation::new(semi, SSPRK3).unwrap().with_cfl(cfl).with_max_steps(10);
    let result = sim.run(&mut u, 0.0, 1.0).unwrap();
    assert_eq!(result.n_steps, 10);

    let after = sim.semi().integrate(&u);
    for v in 0..4 {
        let change = (after[v] - before[v]).abs();
        assert!(
            change < 1e-12 * before[v].abs().max(1.0),
            "{}: variable {} changed by {:.3e}",
            sim.semi().volume_integral().name(),
            v,
            change
        );
    }
}

#[test]
fn test_flux_differencing_is_conservative() {
    run_and_compare(blast_wave_mesh(false), FluxLaxFriedrichs, VolumeIntegral::FluxDifferencing, 0.5);
}

#[test]
fn test_mortars_are_conservative() {
    run_and_compare(blast_wave_mesh(true), FluxLaxFriedrichs, VolumeIntegral::FluxDifferencing, 0.5);
}

#[test]
fn test_shock_capturing_is_conservative() {
    let indicator = IndicatorHennemannGassner::new(|u: &[f64; 4], eq: &Euler2D| eq.density_pressure(u));
    run_and_compare(
        blast_wave_mesh(true),
        FluxLaxFriedrichs,
        VolumeIntegral::ShockCapturingHG(indicator.into()),
        0.5,
    );
}

#[test]
fn test_subcell_limiting_is_conservative() {
    let limiter = SubcellLimiterIdp::new()
        .with_local_twosided_cons(&[0])
        .with_positivity_nonlinear(Pressure);
    run_and_compare(
        blast_wave_mesh(false),
        FluxLaxFriedrichs,
        VolumeIntegral::SubcellLimiting(limiter),
        0.1,
    );
}

/// Quadrature of the entropy production Σ w(u)·du over the domain.
fn entropy_rate<SF: NumericalFlux<Euler2D, 4>>(surface_flux: SF) -> f64 {
    let eq = Euler2D::new(1.4);
    let config = DgConfig::new(3, surface_flux, FluxRanocha);
    let mut semi = DgSemidiscretization::new(blast_wave_mesh(false), eq, config, BoundaryConditions::periodic())
        .unwrap();
    let mut u = semi.compute_coefficients(|x, t| semi.equations().initial_condition_weak_blast_wave(x, t), 0.0);
    // An element-wise scaling makes the traces jump across every interface.
    for k in 0..semi.n_elements() {
        let scale = 1.0 + 0.05 * (k % 3) as f64;
        for i in 0..semi.n_nodes() {
            u.set(k, i, u.get(k, i).map(|c| scale * c));
        }
    }
    let mut du = semi.allocate_solution();
    semi.rhs(&mut du, &u, 0.0, 1e-3).unwrap();

    let mut production = Solution::<4>::new(semi.n_elements(), semi.n_nodes());
    for k in 0..semi.n_elements() {
        for i in 0..semi.n_nodes() {
            let w = semi.equations().cons2entropy(&u.get(k, i));
            let rate: f64 = w.iter().zip(du.get(k, i)).map(|(a, b)| a * b).sum();
            production.set(k, i, [rate, 0.0, 0.0, 0.0]);
        }
    }
    semi.integrate(&production)[0]
}

#[test]
fn test_entropy_conservative_surface_flux_conserves_entropy() {
    let rate = entropy_rate(FluxRanocha);
    assert!(rate.abs() < 1e-11, "entropy production {:.3e}", rate);
}

#[test]
fn test_dissipative_surface_flux_decreases_entropy() {
    let rate = entropy_rate(FluxLaxFriedrichs);
    assert!(rate < -1e-6, "entropy production {:.3e}", rate);
}

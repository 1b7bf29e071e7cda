//! The element-parallel residual does not depend on the thread count.
#![cfg(feature = "parallel")]

use dgsem::boundary::BoundaryConditions;
use dgsem::equations::{CompressibleEuler, Pressure};
use dgsem::flux::{FluxLaxFriedrichs, FluxRanocha};
use dgsem::mesh::TreeMesh;
use dgsem::solver::{DgConfig, DgSemidiscretization, IndicatorHennemannGassner, SubcellLimiterIdp, VolumeIntegral};

type Euler2D = CompressibleEuler<2>;

fn residual_with_threads(threads: usize, refine: bool, volume_integral: VolumeIntegral<Euler2D, 4>) -> Vec<[f64; 4]> {
    let mut mesh = TreeMesh::new([8, 8], [-2.0, -2.0], [2.0, 2.0], [true, true]).unwrap();
    if refine {
        mesh = mesh.refine(&[[3, 3], [4, 4]]).unwrap();
    }
    let config = DgConfig::new(3, FluxLaxFriedrichs, FluxRanocha).with_volume_integral(volume_integral);
    let mut semi = DgSemidiscretization::new(mesh, Euler2D::new(1.4), config, BoundaryConditions::periodic()).unwrap();
    let u = semi.compute_coefficients(|x, t| semi.equations().initial_condition_weak_blast_wave(x, t), 0.0);
    let mut du = semi.allocate_solution();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
    pool.install(|| semi.rhs(&mut du, &u, 0.0, 1e-3)).unwrap();
    du.data
}

#[test]
fn test_shock_capturing_is_thread_count_independent() {
    let indicator = || IndicatorHennemannGassner::new(|u: &[f64; 4], eq: &Euler2D| eq.density_pressure(u));
    let serial = residual_with_threads(1, true, VolumeIntegral::ShockCapturingHG(indicator().into()));
    let parallel = residual_with_threads(4, true, VolumeIntegral::ShockCapturingHG(indicator().into()));
    assert_eq!(serial, parallel);
}

#[test]
fn test_subcell_limiting_is_thread_count_independent() {
    let limiter = || {
        SubcellLimiterIdp::new()
            .with_local_twosided_cons(&[0])
            .with_positivity_nonlinear(Pressure)
    };
    let serial = residual_with_threads(1, false, VolumeIntegral::SubcellLimiting(limiter()));
    let parallel = residual_with_threads(4, false, VolumeIntegral::SubcellLimiting(limiter()));
    assert_eq!(serial, parallel);
}

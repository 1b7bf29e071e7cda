//! The subcell limiter keeps every stage inside its local bounds.
//!
//! Weak blast wave with local density bounds, pressure positivity and a
//! local minimum principle on the specific entropy.

use std::cell::RefCell;
use std::rc::Rc;

use dgsem::boundary::BoundaryConditions;
use dgsem::equations::{CompressibleEuler, Pressure, SpecificEntropy};
use dgsem::flux::{FluxLaxFriedrichs, FluxRanocha};
use dgsem::mesh::TreeMesh;
use dgsem::simulation::Simulation;
use dgsem::solver::{DgConfig, DgSemidiscretization, OneSidedBound, SubcellLimiterIdp};
use dgsem::time::{AnalysisCallback, BoundsCheckCallback, BoundsCheckConfig, SSPRK3};

type Euler2D = CompressibleEuler<2>;

type Semi = DgSemidiscretization<Euler2D, FluxLaxFriedrichs, FluxRanocha, 4, 2>;

fn limited_blast_wave() -> Semi {
    let mesh = TreeMesh::new([8, 8], [-2.0, -2.0], [2.0, 2.0], [true, true]).unwrap();
    let limiter = SubcellLimiterIdp::new()
        .with_local_twosided_cons(&[0])
        .with_positivity_nonlinear(Pressure)
        .with_local_onesided_nonlinear(SpecificEntropy, OneSidedBound::Min);
    let config = DgConfig::new(3, FluxLaxFriedrichs, FluxRanocha).with_subcell_limiting(limiter);
    DgSemidiscretization::new(mesh, Euler2D::new(1.4), config, BoundaryConditions::periodic()).unwrap()
}

#[test]
fn test_weak_blast_wave_stays_within_bounds() {
    let _ = env_logger::builder().is_test(true).try_init();
    let semi = limited_blast_wave();
    let mut u = semi.compute_coefficients(|x, t| semi.equations().initial_condition_weak_blast_wave(x, t), 0.0);

    let bounds = Rc::new(RefCell::new(BoundsCheckCallback::new(BoundsCheckConfig {
        tolerance: 1e-11,
        fatal: false,
    })));
    let analysis = Rc::new(RefCell::new(AnalysisCallback::<Semi>::new(5)));
    let mut sim = Simulation::new(semi, SSPRK3)
        .unwrap()
        .with_cfl(0.1)
        .with_stage_callback(bounds.clone())
        .with_step_callback(analysis.clone());
    let result = sim.run(&mut u, 0.0, 0.05).unwrap();
    assert!(result.reached_end);

    let bounds = bounds.borrow();
    assert_eq!(bounds.n_violations(), 0);
    for label in ["rho (min)", "rho (max)", "pressure (positivity)", "specific_entropy (min)"] {
        let deviation = bounds.max_deviation().get(label).copied();
        assert!(deviation.is_some(), "no deviation recorded for {}", label);
        let deviation = deviation.unwrap_or(f64::INFINITY);
        println!("{:>24}: {:.3e}", label, deviation);
        assert!(deviation < 1e-11, "{} deviates by {:.3e}", label, deviation);
    }

    // The limiter acts near the blast front.
    let semi = sim.semi();
    let alpha_max = (0..semi.n_elements())
        .flat_map(|k| semi.subcell_alpha(k).iter().copied())
        .fold(0.0, f64::max);
    assert!(alpha_max > 0.0);
    assert!(alpha_max <= 1.0);

    // Mass is conserved and the state stays admissible.
    let drift = analysis.borrow().drift();
    assert!(drift[0].1.abs() < 1e-12, "mass drift {:.3e}", drift[0].1);
    let eq = semi.equations();
    assert!(u.data.iter().all(|state| state[0] > 0.0 && eq.pressure(state) > 0.0));
}

#[test]
fn test_bounds_check_reports_tampered_state() {
    let mut semi = limited_blast_wave();
    let u = semi.compute_coefficients(|x, t| semi.equations().initial_condition_weak_blast_wave(x, t), 0.0);
    let mut du = semi.allocate_solution();
    let dt = 1e-3;
    semi.rhs(&mut du, &u, 0.0, dt).unwrap();

    let mut stage = u.clone();
    for (s, d) in stage.data.iter_mut().zip(&du.data) {
        for v in 0..4 {
            s[v] += dt * d[v];
        }
    }
    assert!(semi.check_bounds(&stage, 1e-11).is_satisfied());

    // Density far above every local maximum must be flagged.
    let mut tampered = stage.get(0, 0);
    tampered[0] *= 10.0;
    tampered[3] *= 10.0;
    stage.set(0, 0, tampered);
    let report = semi.check_bounds(&stage, 1e-11);
    assert!(!report.is_satisfied());
    let first = &report.violations[0];
    assert_eq!((first.element, first.node), (0, 0));
    assert_eq!(first.variable, "rho (max)");
}

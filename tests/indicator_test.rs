//! Blending factors of the shock indicators.

use dgsem::boundary::BoundaryConditions;
use dgsem::equations::{CompressibleEuler, Equations, LinearScalarAdvection};
use dgsem::flux::{FluxLaxFriedrichs, FluxRanocha};
use dgsem::mesh::TreeMesh;
use dgsem::operators::LobattoBasis;
use dgsem::solver::{DgConfig, DgSemidiscretization, IndicatorHennemannGassner, IndicatorLohner, IndicatorScratch};

type Euler2D = CompressibleEuler<2>;
type Scalar2D = LinearScalarAdvection<2>;

struct Lcg(u64);

impl Lcg {
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        lo + (hi - lo) * ((self.0 >> 11) as f64 / (1u64 << 53) as f64)
    }
}

#[test]
fn test_alpha_stays_in_unit_interval() {
    let eq = Euler2D::new(1.4);
    let basis = LobattoBasis::new(3).unwrap();
    let layout = basis.layout(2);
    let mut scratch = IndicatorScratch::new(layout.n_nodes());
    let modal = IndicatorHennemannGassner::new(|u: &[f64; 4], eq: &Euler2D| eq.density_pressure(u)).with_alpha_max(1.0);
    let lohner = IndicatorLohner::new(|u: &[f64; 4], eq: &Euler2D| eq.density_pressure(u)).with_alpha_max(1.0);

    let mut rng = Lcg(7);
    for _ in 0..200 {
        let states: Vec<[f64; 4]> = (0..layout.n_nodes())
            .map(|_| {
                eq.prim2cons(&[
                    rng.range(0.1, 5.0),
                    rng.range(-2.0, 2.0),
                    rng.range(-2.0, 2.0),
                    rng.range(0.1, 5.0),
                ])
            })
            .collect();
        let a = modal.element_alpha(&states, &eq, &basis, &layout, &mut scratch).unwrap();
        assert!((0.0..=1.0).contains(&a), "modal alpha {}", a);
        let a = lohner.element_alpha(&states, &eq, &layout, &mut scratch).unwrap();
        assert!((0.0..=1.0).contains(&a), "lohner alpha {}", a);
    }
}

#[test]
fn test_low_degree_polynomials_are_not_flagged() {
    let eq = Scalar2D::new([1.0, 1.0]);
    let indicator = IndicatorHennemannGassner::new(|u: &[f64; 1], _: &Scalar2D| u[0]);

    for polydeg in 2..=6 {
        let basis = LobattoBasis::new(polydeg).unwrap();
        let layout = basis.layout(2);
        let mut scratch = IndicatorScratch::new(layout.n_nodes());
        let degree = polydeg as i32 - 2;

        let polynomial: Vec<[f64; 1]> = (0..layout.n_nodes())
            .map(|node| {
                let idx = layout.multi_index(node);
                let (x, y) = (basis.nodes[idx[0]], basis.nodes[idx[1]]);
                [2.0 + 0.3 * x.powi(degree) - 0.2 * y.powi(degree) + 0.1 * x.powi(degree / 2) * y.powi(degree - degree / 2)]
            })
            .collect();
        let alpha = indicator.element_alpha(&polynomial, &eq, &basis, &layout, &mut scratch).unwrap();
        assert_eq!(alpha, 0.0, "p={}: degree {} polynomial flagged", polydeg, degree);

        let constant = vec![[1.5]; layout.n_nodes()];
        let alpha = indicator.element_alpha(&constant, &eq, &basis, &layout, &mut scratch).unwrap();
        assert_eq!(alpha, 0.0);
    }
}

#[test]
fn test_discontinuity_is_flagged() {
    let eq = Scalar2D::new([1.0, 1.0]);
    let basis = LobattoBasis::new(3).unwrap();
    let layout = basis.layout(2);
    let mut scratch = IndicatorScratch::new(layout.n_nodes());
    let indicator = IndicatorHennemannGassner::new(|u: &[f64; 1], _: &Scalar2D| u[0]);

    let step: Vec<[f64; 1]> = (0..layout.n_nodes())
        .map(|node| if basis.nodes[layout.multi_index(node)[0]] < 0.0 { [1.0] } else { [0.1] })
        .collect();
    let alpha = indicator.element_alpha(&step, &eq, &basis, &layout, &mut scratch).unwrap();
    assert_eq!(alpha, indicator.alpha_max);
}

#[test]
fn test_blast_wave_alpha_is_local() {
    let _ = env_logger::builder().is_test(true).try_init();
    let eq = Euler2D::new(1.4);
    let mesh = TreeMesh::new([8, 8], [-2.0, -2.0], [2.0, 2.0], [true, true]).unwrap();
    let indicator = IndicatorHennemannGassner::new(|u: &[f64; 4], eq: &Euler2D| eq.density_pressure(u));
    let config = DgConfig::new(3, FluxLaxFriedrichs, FluxRanocha).with_shock_capturing(indicator);
    let mut semi = DgSemidiscretization::new(mesh, eq, config, BoundaryConditions::periodic()).unwrap();

    let u = semi.compute_coefficients(|x, t| semi.equations().initial_condition_weak_blast_wave(x, t), 0.0);
    let mut du = semi.allocate_solution();
    semi.rhs(&mut du, &u, 0.0, 1e-3).unwrap();

    let alpha = semi.element_alpha();
    assert_eq!(alpha.len(), 64);
    // Corner element: constant state, and so are its neighbors.
    assert_eq!(alpha[0], 0.0);
    let max = alpha.iter().copied().fold(0.0, f64::max);
    assert!(max > 0.0 && max <= 0.5, "max alpha {}", max);
}

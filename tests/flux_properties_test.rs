//! Consistency, symmetry and entropy conservation of the two-point fluxes.

use dgsem::equations::{CompressibleEuler, Direction, Equations, ShallowWater2D};
use dgsem::flux::{
    FluxCentral, FluxChandrashekar, FluxFjordholmEtAl, FluxHll, FluxKennedyGruber, FluxLaxFriedrichs,
    FluxNonconservativeWintermeyerEtAl, FluxPair, FluxRanocha, FluxShima, FluxWintermeyerEtAl, NumericalFlux,
};

/// Deterministic pseudo-random numbers in [0, 1).
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next()
    }
}

fn euler_states(rng: &mut Lcg, eq: &CompressibleEuler<2>, count: usize) -> Vec<[f64; 4]> {
    (0..count)
        .map(|_| {
            let prim = [
                rng.range(0.5, 2.0),
                rng.range(-1.0, 1.0),
                rng.range(-1.0, 1.0),
                rng.range(0.5, 3.0),
            ];
            eq.prim2cons(&prim)
        })
        .collect()
}

fn directions(rng: &mut Lcg, count: usize) -> Vec<Direction> {
    (0..count)
        .map(|_| [rng.range(-2.0, 2.0), rng.range(-2.0, 2.0), 0.0])
        .collect()
}

fn max_diff<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}

fn check_consistency<F: NumericalFlux<CompressibleEuler<2>, 4>>(flux: &F) {
    let eq = CompressibleEuler::<2>::new(1.4);
    let mut rng = Lcg(17);
    let states = euler_states(&mut rng, &eq, 50);
    let normals = directions(&mut rng, 50);
    for (u, n) in states.iter().zip(&normals) {
        let diff = max_diff(&flux.flux(u, u, n, &eq), &eq.flux(u, n));
        assert!(diff < 1e-12, "{} inconsistent by {:.3e}", flux.name(), diff);
    }
}

fn check_symmetry<F: NumericalFlux<CompressibleEuler<2>, 4>>(flux: &F) {
    let eq = CompressibleEuler::<2>::new(1.4);
    let mut rng = Lcg(29);
    let states = euler_states(&mut rng, &eq, 60);
    let normals = directions(&mut rng, 30);
    assert!(flux.is_symmetric(), "{} claims to be non-symmetric", flux.name());
    for (pair, n) in states.chunks(2).zip(&normals) {
        let diff = max_diff(&flux.flux(&pair[0], &pair[1], n, &eq), &flux.flux(&pair[1], &pair[0], n, &eq));
        assert!(diff < 1e-12, "{} not symmetric: {:.3e}", flux.name(), diff);
    }
}

#[test]
fn test_euler_fluxes_are_consistent() {
    check_consistency(&FluxCentral);
    check_consistency(&FluxLaxFriedrichs);
    check_consistency(&FluxHll);
    check_consistency(&FluxRanocha);
    check_consistency(&FluxChandrashekar);
    check_consistency(&FluxShima);
    check_consistency(&FluxKennedyGruber);
}

#[test]
fn test_volume_fluxes_are_symmetric() {
    check_symmetry(&FluxCentral);
    check_symmetry(&FluxRanocha);
    check_symmetry(&FluxChandrashekar);
    check_symmetry(&FluxShima);
    check_symmetry(&FluxKennedyGruber);
    assert!(!NumericalFlux::<CompressibleEuler<2>, 4>::is_symmetric(&FluxLaxFriedrichs));
}

#[test]
fn test_fluxes_are_conservative() {
    let eq = CompressibleEuler::<2>::new(1.4);
    let mut rng = Lcg(5);
    let states = euler_states(&mut rng, &eq, 40);
    let normals = directions(&mut rng, 20);
    for (pair, n) in states.chunks(2).zip(&normals) {
        let minus_n = [-n[0], -n[1], -n[2]];
        for (name, f_lr, f_rl) in [
            (
                "lax_friedrichs",
                FluxLaxFriedrichs.flux(&pair[0], &pair[1], n, &eq),
                FluxLaxFriedrichs.flux(&pair[1], &pair[0], &minus_n, &eq),
            ),
            (
                "hll",
                FluxHll.flux(&pair[0], &pair[1], n, &eq),
                FluxHll.flux(&pair[1], &pair[0], &minus_n, &eq),
            ),
            (
                "ranocha",
                FluxRanocha.flux(&pair[0], &pair[1], n, &eq),
                FluxRanocha.flux(&pair[1], &pair[0], &minus_n, &eq),
            ),
        ] {
            let diff = max_diff(&f_lr, &f_rl.map(|x| -x));
            assert!(diff < 1e-12, "{} not conservative: {:.3e}", name, diff);
        }
    }
}

#[test]
fn test_entropy_conservative_fluxes() {
    // (w_rr - w_ll) · f* = ψ_rr - ψ_ll with the entropy potential ψ = ρ v·n
    let eq = CompressibleEuler::<2>::new(1.4);
    let mut rng = Lcg(99);
    let states = euler_states(&mut rng, &eq, 40);
    let normals = directions(&mut rng, 20);
    let potential = |u: &[f64; 4], n: &Direction| u[1] * n[0] + u[2] * n[1];

    for (pair, n) in states.chunks(2).zip(&normals) {
        let w_ll = eq.cons2entropy(&pair[0]);
        let w_rr = eq.cons2entropy(&pair[1]);
        let jump = potential(&pair[1], n) - potential(&pair[0], n);
        for (name, f) in [
            ("ranocha", FluxRanocha.flux(&pair[0], &pair[1], n, &eq)),
            ("chandrashekar", FluxChandrashekar.flux(&pair[0], &pair[1], n, &eq)),
        ] {
            let production: f64 = (0..4).map(|v| (w_rr[v] - w_ll[v]) * f[v]).sum();
            assert!(
                (production - jump).abs() < 1e-11 * jump.abs().max(1.0),
                "{}: entropy defect {:.3e}",
                name,
                production - jump
            );
        }
    }
}

#[test]
fn test_shallow_water_fluxes() {
    let eq = ShallowWater2D::new(9.81);
    let mut rng = Lcg(3);
    let flux = FluxPair::new(FluxWintermeyerEtAl, FluxNonconservativeWintermeyerEtAl);
    assert!(NumericalFlux::<ShallowWater2D, 4>::has_nonconservative_terms(&flux));
    assert!(NumericalFlux::<ShallowWater2D, 4>::is_symmetric(&flux));

    for _ in 0..30 {
        let u_ll = eq.prim2cons(&[rng.range(0.5, 2.0), rng.range(-1.0, 1.0), rng.range(-1.0, 1.0), rng.range(0.0, 0.3)]);
        let u_rr = eq.prim2cons(&[rng.range(0.5, 2.0), rng.range(-1.0, 1.0), rng.range(-1.0, 1.0), rng.range(0.0, 0.3)]);
        let n = [rng.range(-1.0, 1.0), rng.range(-1.0, 1.0), 0.0];

        for f in [
            FluxWintermeyerEtAl.flux(&u_ll, &u_ll, &n, &eq),
            FluxFjordholmEtAl.flux(&u_ll, &u_ll, &n, &eq),
        ] {
            assert!(max_diff(&f, &eq.flux(&u_ll, &n)) < 1e-12);
        }
        let diff = max_diff(
            &FluxFjordholmEtAl.flux(&u_ll, &u_rr, &n, &eq),
            &FluxFjordholmEtAl.flux(&u_rr, &u_ll, &n, &eq),
        );
        assert!(diff < 1e-12);

        // The nonconservative term vanishes for equal states.
        let phi = flux.nonconservative(&u_ll, &u_ll, &n, &eq);
        assert!(phi.iter().all(|x| x.abs() < 1e-14));
    }
}

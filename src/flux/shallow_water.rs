//! Two-point fluxes for the shallow water equations with bottom topography.
//!
//! Pairing [`FluxWintermeyerEtAl`] with
//! [`FluxNonconservativeWintermeyerEtAl`] in the volume gives an
//! entropy-conservative and well-balanced split form: a lake at rest stays
//! at rest to round-off, also on curved elements.

use super::traits::{NonconservativeFlux, NumericalFlux};
use crate::equations::{Direction, ShallowWater2D};

/// Entropy-conserving flux of Wintermeyer et al. (2017),
/// pressure average ½ g h_ll h_rr.
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxWintermeyerEtAl;

/// Entropy-conserving flux of Fjordholm et al. (2011),
/// pressure average ¼ g (h_ll² + h_rr²).
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxFjordholmEtAl;

/// Nonconservative bottom term g h_ll (b_rr - b_ll) n.
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxNonconservativeWintermeyerEtAl;

impl NumericalFlux<ShallowWater2D, 4> for FluxWintermeyerEtAl {
    #[inline]
    fn flux(
        &self,
        u_ll: &[f64; 4],
        u_rr: &[f64; 4],
        normal: &Direction,
        equations: &ShallowWater2D,
    ) -> [f64; 4] {
        let v_ll = equations.velocity(u_ll);
        let v_rr = equations.velocity(u_rr);
        let v1_avg = 0.5 * (v_ll[0] + v_rr[0]);
        let v2_avg = 0.5 * (v_ll[1] + v_rr[1]);
        let h_v_dot_n_avg =
            0.5 * ((u_ll[1] + u_rr[1]) * normal[0] + (u_ll[2] + u_rr[2]) * normal[1]);
        let p_avg = 0.5 * equations.gravity() * u_ll[0] * u_rr[0];

        let f1 = h_v_dot_n_avg;
        [
            f1,
            f1 * v1_avg + p_avg * normal[0],
            f1 * v2_avg + p_avg * normal[1],
            0.0,
        ]
    }

    fn name(&self) -> &'static str {
        "wintermeyer_etal"
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}

impl NumericalFlux<ShallowWater2D, 4> for FluxFjordholmEtAl {
    #[inline]
    fn flux(
        &self,
        u_ll: &[f64; 4],
        u_rr: &[f64; 4],
        normal: &Direction,
        equations: &ShallowWater2D,
    ) -> [f64; 4] {
        let v_ll = equations.velocity(u_ll);
        let v_rr = equations.velocity(u_rr);
        let h_avg = 0.5 * (u_ll[0] + u_rr[0]);
        let v1_avg = 0.5 * (v_ll[0] + v_rr[0]);
        let v2_avg = 0.5 * (v_ll[1] + v_rr[1]);
        let p_avg = 0.25 * equations.gravity() * (u_ll[0] * u_ll[0] + u_rr[0] * u_rr[0]);

        let f1 = h_avg * (v1_avg * normal[0] + v2_avg * normal[1]);
        [
            f1,
            f1 * v1_avg + p_avg * normal[0],
            f1 * v2_avg + p_avg * normal[1],
            0.0,
        ]
    }

    fn name(&self) -> &'static str {
        "fjordholm_etal"
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}

impl NonconservativeFlux<ShallowWater2D, 4> for FluxNonconservativeWintermeyerEtAl {
    #[inline]
    fn flux(
        &self,
        u_ll: &[f64; 4],
        u_rr: &[f64; 4],
        normal: &Direction,
        equations: &ShallowWater2D,
    ) -> [f64; 4] {
        let source = equations.gravity() * u_ll[0] * (u_rr[3] - u_ll[3]);
        [0.0, source * normal[0], source * normal[1], 0.0]
    }

    fn name(&self) -> &'static str {
        "nonconservative_wintermeyer_etal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::Equations;
    use crate::flux::{FluxLaxFriedrichs, FluxPair};

    #[test]
    fn test_consistency_and_symmetry() {
        let eq = ShallowWater2D::new(9.81);
        let a = [1.5, 0.3, -0.2, 0.1];
        let b = [0.7, -0.4, 0.6, 0.3];
        let n = [0.8, 0.6, 0.0];

        let exact = eq.flux(&a, &n);
        let w = FluxWintermeyerEtAl.flux(&a, &a, &n, &eq);
        let f = FluxFjordholmEtAl.flux(&a, &a, &n, &eq);
        for v in 0..4 {
            assert!((w[v] - exact[v]).abs() < 1e-13);
            assert!((f[v] - exact[v]).abs() < 1e-13);
        }

        let ab = FluxWintermeyerEtAl.flux(&a, &b, &n, &eq);
        let ba = FluxWintermeyerEtAl.flux(&b, &a, &n, &eq);
        for v in 0..4 {
            assert!((ab[v] - ba[v]).abs() < 1e-14);
        }
    }

    #[test]
    fn test_nonconservative_term_vanishes_for_flat_bottom() {
        let eq = ShallowWater2D::new(9.81);
        let pair = FluxPair::new(FluxLaxFriedrichs, FluxNonconservativeWintermeyerEtAl);
        assert!(NumericalFlux::<ShallowWater2D, 4>::has_nonconservative_terms(&pair));

        let a = [1.0, 0.2, 0.0, 0.5];
        let b = [2.0, 0.0, 0.1, 0.5];
        let phi = pair.nonconservative(&a, &b, &[1.0, 0.0, 0.0], &eq);
        assert!(phi.iter().all(|&x| x == 0.0));

        let c = [2.0, 0.0, 0.1, 0.7];
        let phi = pair.nonconservative(&a, &c, &[1.0, 0.0, 0.0], &eq);
        assert!((phi[1] - 9.81 * 0.2).abs() < 1e-13);
    }
}

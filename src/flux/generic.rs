//! Fluxes that only use the generic equation interface.

use super::traits::NumericalFlux;
use crate::equations::{Direction, Equations};

/// Arithmetic mean of the physical fluxes, ½ (f(u_ll) + f(u_rr))·n.
///
/// Used as a volume flux it recovers the classical DG volume term on affine
/// elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxCentral;

impl<E: Equations<N>, const N: usize> NumericalFlux<E, N> for FluxCentral {
    #[inline]
    fn flux(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction, equations: &E) -> [f64; N] {
        let f_ll = equations.flux(u_ll, normal);
        let f_rr = equations.flux(u_rr, normal);
        std::array::from_fn(|v| 0.5 * (f_ll[v] + f_rr[v]))
    }

    fn name(&self) -> &'static str {
        "central"
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}

/// Local Lax-Friedrichs (Rusanov) flux
/// ½ (f(u_ll) + f(u_rr))·n - ½ λ_max (u_rr - u_ll).
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxLaxFriedrichs;

impl<E: Equations<N>, const N: usize> NumericalFlux<E, N> for FluxLaxFriedrichs {
    #[inline]
    fn flux(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction, equations: &E) -> [f64; N] {
        let f_ll = equations.flux(u_ll, normal);
        let f_rr = equations.flux(u_rr, normal);
        let lambda = equations.max_abs_speed(u_ll, u_rr, normal);
        std::array::from_fn(|v| 0.5 * (f_ll[v] + f_rr[v]) - 0.5 * lambda * (u_rr[v] - u_ll[v]))
    }

    fn name(&self) -> &'static str {
        "lax_friedrichs"
    }
}

/// HLL flux with the signal speed estimates of
/// [`Equations::min_max_speed`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxHll;

impl<E: Equations<N>, const N: usize> NumericalFlux<E, N> for FluxHll {
    #[inline]
    fn flux(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction, equations: &E) -> [f64; N] {
        let (lambda_min, lambda_max) = equations.min_max_speed(u_ll, u_rr, normal);
        if lambda_min >= 0.0 {
            equations.flux(u_ll, normal)
        } else if lambda_max <= 0.0 {
            equations.flux(u_rr, normal)
        } else {
            let f_ll = equations.flux(u_ll, normal);
            let f_rr = equations.flux(u_rr, normal);
            let inv = 1.0 / (lambda_max - lambda_min);
            std::array::from_fn(|v| {
                (lambda_max * f_ll[v] - lambda_min * f_rr[v]
                    + lambda_min * lambda_max * (u_rr[v] - u_ll[v]))
                    * inv
            })
        }
    }

    fn name(&self) -> &'static str {
        "hll"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{CompressibleEuler, LinearScalarAdvection};

    #[test]
    fn test_lax_friedrichs_is_upwind_for_advection() {
        let eq = LinearScalarAdvection::new([2.0]);
        let n = [1.0, 0.0, 0.0];
        let f = FluxLaxFriedrichs.flux(&[3.0], &[-1.0], &n, &eq);
        assert!((f[0] - 6.0).abs() < 1e-14);
        let f = FluxLaxFriedrichs.flux(&[3.0], &[-1.0], &[-1.0, 0.0, 0.0], &eq);
        assert!((f[0] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_fluxes_are_antisymmetric_in_normal() {
        let eq = CompressibleEuler::<2>::new(1.4);
        let u_ll = eq.prim2cons(&[1.0, 0.3, -0.1, 1.0]);
        let u_rr = eq.prim2cons(&[0.5, -0.2, 0.4, 0.3]);
        let n = [0.3, -1.2, 0.0];
        let m = [-0.3, 1.2, 0.0];

        let a = FluxLaxFriedrichs.flux(&u_ll, &u_rr, &n, &eq);
        let b = FluxLaxFriedrichs.flux(&u_rr, &u_ll, &m, &eq);
        let c = FluxHll.flux(&u_ll, &u_rr, &n, &eq);
        let d = FluxHll.flux(&u_rr, &u_ll, &m, &eq);
        for v in 0..4 {
            assert!((a[v] + b[v]).abs() < 1e-14);
            assert!((c[v] + d[v]).abs() < 1e-13);
        }
    }
}

//! Linear scalar advection ∂u/∂t + a·∇u = 0.

use super::{Direction, Equations, dot, norm};
use std::f64::consts::PI;

/// Linear advection with constant velocity in `D` dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScalarAdvection<const D: usize> {
    velocity: Direction,
}

impl<const D: usize> LinearScalarAdvection<D> {
    /// Create with advection velocity `a` (first `D` components are used).
    pub fn new(velocity: [f64; D]) -> Self {
        let mut padded = [0.0; 3];
        padded[..D].copy_from_slice(&velocity);
        Self { velocity: padded }
    }

    /// Advection velocity padded to three components.
    pub fn velocity(&self) -> &Direction {
        &self.velocity
    }

    /// Smooth periodic solution 1 + 0.5 sin(π Σ_d (x_d - a_d t)),
    /// periodic on [-1, 1]^D.
    pub fn initial_condition_convergence_test(&self, x: &Direction, t: f64) -> [f64; 1] {
        let phase: f64 = (0..D).map(|d| x[d] - self.velocity[d] * t).sum();
        [1.0 + 0.5 * (PI * phase).sin()]
    }
}

impl<const D: usize> Equations<1> for LinearScalarAdvection<D> {
    const NDIMS: usize = D;

    fn variable_names(&self) -> [&'static str; 1] {
        ["scalar"]
    }

    #[inline]
    fn flux(&self, u: &[f64; 1], normal: &Direction) -> [f64; 1] {
        [dot(&self.velocity, normal) * u[0]]
    }

    #[inline]
    fn max_abs_speed(&self, _u_ll: &[f64; 1], _u_rr: &[f64; 1], normal: &Direction) -> f64 {
        dot(&self.velocity, normal).abs()
    }

    fn min_max_speed(&self, _u_ll: &[f64; 1], _u_rr: &[f64; 1], normal: &Direction) -> (f64, f64) {
        let a = dot(&self.velocity, normal);
        (a.min(0.0), a.max(0.0))
    }

    fn cons2prim(&self, u: &[f64; 1]) -> [f64; 1] {
        *u
    }

    fn prim2cons(&self, prim: &[f64; 1]) -> [f64; 1] {
        *prim
    }

    fn cons2entropy(&self, u: &[f64; 1]) -> [f64; 1] {
        *u
    }

    fn entropy(&self, u: &[f64; 1]) -> f64 {
        0.5 * u[0] * u[0]
    }
}

impl<const D: usize> LinearScalarAdvection<D> {
    /// |a| for diagnostics.
    pub fn speed(&self) -> f64 {
        norm(&self.velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flux_is_velocity_times_state() {
        let eq = LinearScalarAdvection::new([1.0, -2.0]);
        let f = eq.flux(&[3.0], &[0.5, 0.25, 0.0]);
        assert!((f[0] - 3.0 * (0.5 - 0.5)).abs() < 1e-15);
        assert_eq!(eq.max_abs_speed(&[1.0], &[2.0], &[0.0, 1.0, 0.0]), 2.0);
        assert!((eq.speed() - 5f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_convergence_solution_is_periodic() {
        let eq = LinearScalarAdvection::new([1.0]);
        let a = eq.initial_condition_convergence_test(&[-1.0, 0.0, 0.0], 0.3);
        let b = eq.initial_condition_convergence_test(&[1.0, 0.0, 0.0], 0.3);
        assert!((a[0] - b[0]).abs() < 1e-14);
    }
}

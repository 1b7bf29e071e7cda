//! Equation systems.
//!
//! Provides a trait-based interface for hyperbolic conservation laws
//!
//! ∂u/∂t + ∇·f(u) + (nonconservative terms) = s(u, x, t)
//!
//! in 1 to 3 space dimensions. All kernels in [`crate::solver`] are generic
//! over [`Equations`], so the per-node loops are monomorphized for each
//! system. Fluxes are always contracted with a direction vector `normal`:
//! either a (scaled) face normal or an averaged contravariant vector, padded
//! with zeros to three components.

mod advection;
mod compressible_euler;
mod shallow_water;

pub use advection::LinearScalarAdvection;
pub use compressible_euler::{CompressibleEuler, Pressure, SpecificEntropy};
pub use shallow_water::ShallowWater2D;

/// Direction vector padded to three components.
pub type Direction = [f64; 3];

/// A hyperbolic system with `N` conservative variables.
///
/// Implementations are immutable descriptors (physical parameters only) and
/// are shared by reference across all elements and worker threads.
pub trait Equations<const N: usize>: Clone + Send + Sync {
    /// Spatial dimension.
    const NDIMS: usize;

    /// Number of conservative variables.
    fn n_variables(&self) -> usize {
        N
    }

    /// Names of the conservative variables.
    fn variable_names(&self) -> [&'static str; N];

    /// Physical flux contracted with `normal`: Σ_d n_d f_d(u).
    fn flux(&self, u: &[f64; N], normal: &Direction) -> [f64; N];

    /// Upper bound of the wave speeds of the Riemann problem (u_ll, u_rr)
    /// in direction `normal`, scaled by |normal|.
    fn max_abs_speed(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction) -> f64;

    /// Smallest and largest signal speed estimates, scaled by |normal|.
    fn min_max_speed(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction) -> (f64, f64) {
        let lambda = self.max_abs_speed(u_ll, u_rr, normal);
        (-lambda, lambda)
    }

    /// Conservative to primitive variables.
    fn cons2prim(&self, u: &[f64; N]) -> [f64; N];

    /// Primitive to conservative variables.
    fn prim2cons(&self, prim: &[f64; N]) -> [f64; N];

    /// Entropy variables ∂S/∂u.
    fn cons2entropy(&self, u: &[f64; N]) -> [f64; N];

    /// Mathematical entropy S(u).
    fn entropy(&self, u: &[f64; N]) -> f64;

    /// Whether `u` lies in the physical state space.
    fn is_admissible(&self, u: &[f64; N]) -> bool {
        u.iter().all(|x| x.is_finite())
    }
}

/// A derived scalar quantity that the subcell limiter can bound.
///
/// The gradient with respect to the conservative variables drives the
/// Newton iteration of the nonlinear limiting step.
pub trait NonlinearVariable<E, const N: usize>: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Value of the quantity.
    fn value(&self, u: &[f64; N], equations: &E) -> f64;

    /// ∂value/∂u.
    fn gradient(&self, u: &[f64; N], equations: &E) -> [f64; N];
}

/// Mirror state for slip walls.
pub trait WallReflection<const N: usize> {
    /// State with the normal momentum component reversed.
    fn reflect(&self, u: &[f64; N], normal: &Direction) -> [f64; N];
}

/// Euclidean dot product of two direction vectors.
#[inline]
pub fn dot(a: &Direction, b: &Direction) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean norm of a direction vector.
#[inline]
pub fn norm(a: &Direction) -> f64 {
    dot(a, a).sqrt()
}

/// Logarithmic mean (y - x) / ln(y / x) of two positive numbers.
///
/// Evaluated with a series expansion when x ≈ y to avoid cancellation
/// (Ranocha, "Comparison of some entropy conservative numerical fluxes for
/// the Euler equations", 2018).
#[inline]
pub fn ln_mean(x: f64, y: f64) -> f64 {
    let f2 = (x * (x - 2.0 * y) + y * y) / (x * (x + 2.0 * y) + y * y);
    if f2 < 1e-4 {
        (x + y) / (2.0 + f2 * (2.0 / 3.0 + f2 * (2.0 / 5.0 + f2 * 2.0 / 7.0)))
    } else {
        (y - x) / (y / x).ln()
    }
}

/// 1 / ln_mean(x, y), evaluated without the division.
#[inline]
pub fn inv_ln_mean(x: f64, y: f64) -> f64 {
    let f2 = (x * (x - 2.0 * y) + y * y) / (x * (x + 2.0 * y) + y * y);
    if f2 < 1e-4 {
        (2.0 + f2 * (2.0 / 3.0 + f2 * (2.0 / 5.0 + f2 * 2.0 / 7.0))) / (x + y)
    } else {
        (y / x).ln() / (y - x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_mean_branches_agree() {
        for &(x, y) in &[(1.0_f64, 2.0_f64), (0.3, 7.5), (1.0, 1.0 + 1e-3), (2.0, 2.0)] {
            let exact = if x == y { x } else { (y - x) / (y / x).ln() };
            assert!((ln_mean(x, y) - exact).abs() < 1e-12 * exact);
            assert!((ln_mean(x, y) * inv_ln_mean(x, y) - 1.0).abs() < 1e-14);
            assert!((ln_mean(x, y) - ln_mean(y, x)).abs() < 1e-15 * exact);
        }
    }
}

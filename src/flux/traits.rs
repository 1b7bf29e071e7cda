//! Trait-based numerical flux abstraction.
//!
//! # Example
//! ```
//! use dgsem::equations::CompressibleEuler;
//! use dgsem::flux::{FluxRanocha, NumericalFlux};
//!
//! let eq = CompressibleEuler::<2>::new(1.4);
//! let u_ll = [1.0, 0.1, 0.0, 2.5];
//! let u_rr = [0.9, 0.0, 0.1, 2.2];
//! let f = FluxRanocha.flux(&u_ll, &u_rr, &[1.0, 0.0, 0.0], &eq);
//! assert!(f.iter().all(|x| x.is_finite()));
//! ```

use crate::equations::{Direction, Equations};

// =============================================================================
// Conservative Flux Trait
// =============================================================================

/// Two-point numerical flux f*(u_ll, u_rr, n).
///
/// `normal` is not normalized: the flux must scale linearly with it, so that
/// contravariant vectors and scaled face normals can be passed directly.
///
/// # Implementation Notes
///
/// - Fluxes must be consistent: f*(u, u, n) = f(u)·n
/// - Fluxes must be conservative: f*(u_ll, u_rr, n) = -f*(u_rr, u_ll, -n)
/// - Volume fluxes must be symmetric: f*(u_ll, u_rr, n) = f*(u_rr, u_ll, n)
/// - `flux` must not allocate
pub trait NumericalFlux<E: Equations<N>, const N: usize>: Send + Sync {
    /// Conservative part of the flux.
    fn flux(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction, equations: &E) -> [f64; N];

    /// Name of the flux (for logging).
    fn name(&self) -> &'static str;

    /// Whether f*(a, b) = f*(b, a), required for flux differencing.
    fn is_symmetric(&self) -> bool {
        false
    }

    /// Whether [`Self::nonconservative`] contributes anything.
    fn has_nonconservative_terms(&self) -> bool {
        false
    }

    /// Nonconservative part φ(u_ll, u_rr, n), seen from the `u_ll` side.
    fn nonconservative(
        &self,
        _u_ll: &[f64; N],
        _u_rr: &[f64; N],
        _normal: &Direction,
        _equations: &E,
    ) -> [f64; N] {
        [0.0; N]
    }
}

// =============================================================================
// Nonconservative Flux Trait
// =============================================================================

/// Nonconservative two-point term φ(u_ll, u_rr, n) of the form
/// local(u_ll) · jump(u_ll, u_rr) · n.
///
/// It is not antisymmetric: each side of an interface evaluates it with its
/// own state in the first slot. In the volume it enters as D_ij φ(u_i, u_j),
/// on faces as ½ φ(u_own, u_other).
pub trait NonconservativeFlux<E: Equations<N>, const N: usize>: Send + Sync {
    /// Evaluate the term.
    fn flux(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction, equations: &E) -> [f64; N];

    /// Name of the term (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Flux Pair
// =============================================================================

/// A conservative flux combined with a nonconservative term.
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxPair<C, NC> {
    /// Conservative two-point flux.
    pub conservative: C,
    /// Nonconservative two-point term.
    pub nonconservative: NC,
}

impl<C, NC> FluxPair<C, NC> {
    /// Combine a conservative flux with a nonconservative term.
    pub fn new(conservative: C, nonconservative: NC) -> Self {
        Self {
            conservative,
            nonconservative,
        }
    }
}

impl<E, C, NC, const N: usize> NumericalFlux<E, N> for FluxPair<C, NC>
where
    E: Equations<N>,
    C: NumericalFlux<E, N>,
    NC: NonconservativeFlux<E, N>,
{
    #[inline]
    fn flux(&self, u_ll: &[f64; N], u_rr: &[f64; N], normal: &Direction, equations: &E) -> [f64; N] {
        self.conservative.flux(u_ll, u_rr, normal, equations)
    }

    fn name(&self) -> &'static str {
        self.conservative.name()
    }

    fn is_symmetric(&self) -> bool {
        self.conservative.is_symmetric()
    }

    fn has_nonconservative_terms(&self) -> bool {
        true
    }

    #[inline]
    fn nonconservative(
        &self,
        u_ll: &[f64; N],
        u_rr: &[f64; N],
        normal: &Direction,
        equations: &E,
    ) -> [f64; N] {
        self.nonconservative.flux(u_ll, u_rr, normal, equations)
    }
}

//! Local bounds of the subcell limiter.

use super::{OneSidedBound, SubcellLimiterIdp};
use crate::equations::{Direction, Equations};

/// One bound stored per node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BoundSlot {
    /// Local minimum of a conservative variable
    TwoSidedMin(usize),
    /// Local maximum of a conservative variable
    TwoSidedMax(usize),
    /// β times the low-order value of a conservative variable
    PositivityCons(usize),
    /// β times the low-order value of a nonlinear quantity (index into the
    /// configured list)
    PositivityNonlinear(usize),
    /// Local minimum or maximum of a nonlinear quantity
    OneSided(usize, OneSidedBound),
}

impl BoundSlot {
    /// Whether the slot is filled from the local stencil (as opposed to the
    /// low-order update).
    pub(crate) fn is_local(self) -> bool {
        matches!(
            self,
            BoundSlot::TwoSidedMin(_) | BoundSlot::TwoSidedMax(_) | BoundSlot::OneSided(..)
        )
    }

    /// Whether the bound is a lower bound.
    pub(crate) fn is_lower(self) -> bool {
        match self {
            BoundSlot::TwoSidedMax(_) => false,
            BoundSlot::OneSided(_, bound) => bound == OneSidedBound::Min,
            _ => true,
        }
    }

    /// Value of the bounded quantity at `u`.
    pub(crate) fn value<E: Equations<N>, const N: usize>(
        self,
        u: &[f64; N],
        limiter: &SubcellLimiterIdp<E, N>,
        equations: &E,
    ) -> f64 {
        match self {
            BoundSlot::TwoSidedMin(v) | BoundSlot::TwoSidedMax(v) | BoundSlot::PositivityCons(v) => u[v],
            BoundSlot::PositivityNonlinear(i) => limiter.positivity_variables_nonlinear[i].value(u, equations),
            BoundSlot::OneSided(i, _) => limiter.local_onesided_variables_nonlinear[i]
                .variable
                .value(u, equations),
        }
    }

    /// Fold the value at `u` into the local bound.
    pub(crate) fn widen<E: Equations<N>, const N: usize>(
        self,
        bound: &mut f64,
        u: &[f64; N],
        limiter: &SubcellLimiterIdp<E, N>,
        equations: &E,
    ) {
        let value = self.value(u, limiter, equations);
        *bound = if self.is_lower() {
            bound.min(value)
        } else {
            bound.max(value)
        };
    }

    /// Amount by which `value` crosses `bound` (<= 0 when satisfied).
    #[inline]
    pub(crate) fn deviation(self, value: f64, bound: f64) -> f64 {
        if self.is_lower() {
            bound - value
        } else {
            value - bound
        }
    }
}

/// Bar state of the local Lax-Friedrichs scheme on a (sub)cell face:
///
/// ū = ½ (u_ll + u_rr) - (f(u_rr) - f(u_ll))·n / (2λ)
///
/// with λ the maximum wave speed in direction `normal`. It is a convex
/// combination of admissible states under the usual wave-speed assumption
/// and therefore a valid source of local bounds.
pub(crate) fn bar_state<E: Equations<N>, const N: usize>(
    u_ll: &[f64; N],
    u_rr: &[f64; N],
    normal: &Direction,
    equations: &E,
) -> [f64; N] {
    let lambda = equations.max_abs_speed(u_ll, u_rr, normal);
    let mut bar = [0.0; N];
    if lambda > 0.0 {
        let f_ll = equations.flux(u_ll, normal);
        let f_rr = equations.flux(u_rr, normal);
        let scale = 0.5 / lambda;
        for v in 0..N {
            bar[v] = 0.5 * (u_ll[v] + u_rr[v]) - scale * (f_rr[v] - f_ll[v]);
        }
    } else {
        for v in 0..N {
            bar[v] = 0.5 * (u_ll[v] + u_rr[v]);
        }
    }
    bar
}

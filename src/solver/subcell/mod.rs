//! Invariant domain preserving (IDP) subcell limiter.
//!
//! The limiter blends the high-order flux-differencing residual with the
//! first-order subcell finite volume residual *per subcell interface*:
//!
//! ```text
//! du_i = du_i^FV + 1/(J_i w_i) [ (1-α_{i-1/2}) A_{i-1/2} - (1-α_{i+1/2}) A_{i+1/2} ]
//! ```
//!
//! where A are the antidiffusive fluxes (high-order minus low-order
//! interface flux). Bounds are built from the stage input and the bar
//! states of the low-order scheme; α is chosen so that the forward Euler
//! update `u + dt du` satisfies them:
//!
//! - conservative variables, two-sided local bounds: Zalesak's algorithm
//! - conservative variables, positivity: one-sided Zalesak
//! - nonlinear quantities (pressure, entropy): Newton-bisection per interface
//!
//! Element faces are never limited: the surface flux is already low order.

mod bounds;
mod limiter;
mod newton;

pub(crate) use bounds::{BoundSlot, bar_state};
pub(crate) use limiter::{ElementLimiterInput, ElementLimiterOutput, limit_element, subcell_fluxes_axis};

use std::sync::Arc;

use crate::equations::{Equations, NonlinearVariable};
use crate::error::{DgError, Result};

/// Side of a one-sided local bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OneSidedBound {
    /// q(u) >= min over the local stencil
    Min,
    /// q(u) <= max over the local stencil
    Max,
}

/// A nonlinear quantity with its one-sided local bound.
#[derive(Clone)]
pub struct OneSidedVariable<E, const N: usize> {
    pub variable: Arc<dyn NonlinearVariable<E, N>>,
    pub bound: OneSidedBound,
}

/// Configuration of the IDP subcell limiter.
#[derive(Clone)]
pub struct SubcellLimiterIdp<E, const N: usize> {
    /// Conservative variables kept within local min/max bounds
    pub local_twosided_variables_cons: Vec<usize>,
    /// Conservative variables kept above β times their low-order value
    pub positivity_variables_cons: Vec<usize>,
    /// Nonlinear quantities kept above β times their low-order value
    pub positivity_variables_nonlinear: Vec<Arc<dyn NonlinearVariable<E, N>>>,
    /// Nonlinear quantities with one-sided local bounds
    pub local_onesided_variables_nonlinear: Vec<OneSidedVariable<E, N>>,
    /// β of the positivity bounds
    pub positivity_correction_factor: f64,
    /// Iteration cap of the Newton-bisection
    pub max_iterations_newton: usize,
    /// (relative step tolerance, absolute goal tolerance) of the Newton-bisection
    pub newton_tolerances: (f64, f64),
    /// Scaling of the antidiffusive flux in the Newton update (default 2 * ndims)
    pub gamma_constant_newton: Option<f64>,
    /// Relative slack accepted when the low-order state sits on its bound
    pub feasibility_tolerance: f64,
}

impl<E: Equations<N>, const N: usize> Default for SubcellLimiterIdp<E, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Equations<N>, const N: usize> SubcellLimiterIdp<E, N> {
    /// Limiter without any bounded quantity.
    pub fn new() -> Self {
        Self {
            local_twosided_variables_cons: Vec::new(),
            positivity_variables_cons: Vec::new(),
            positivity_variables_nonlinear: Vec::new(),
            local_onesided_variables_nonlinear: Vec::new(),
            positivity_correction_factor: 0.1,
            max_iterations_newton: 10,
            newton_tolerances: (1.0e-12, 1.0e-14),
            gamma_constant_newton: None,
            feasibility_tolerance: 1.0e-12,
        }
    }

    pub fn with_local_twosided_cons(mut self, variables: &[usize]) -> Self {
        self.local_twosided_variables_cons.extend_from_slice(variables);
        self
    }

    pub fn with_positivity_cons(mut self, variables: &[usize]) -> Self {
        self.positivity_variables_cons.extend_from_slice(variables);
        self
    }

    pub fn with_positivity_nonlinear<V>(mut self, variable: V) -> Self
    where
        V: NonlinearVariable<E, N> + 'static,
    {
        self.positivity_variables_nonlinear.push(Arc::new(variable));
        self
    }

    pub fn with_local_onesided_nonlinear<V>(mut self, variable: V, bound: OneSidedBound) -> Self
    where
        V: NonlinearVariable<E, N> + 'static,
    {
        self.local_onesided_variables_nonlinear.push(OneSidedVariable {
            variable: Arc::new(variable),
            bound,
        });
        self
    }

    pub fn with_positivity_correction_factor(mut self, beta: f64) -> Self {
        self.positivity_correction_factor = beta;
        self
    }

    pub fn with_newton(mut self, max_iterations: usize, tolerances: (f64, f64)) -> Self {
        self.max_iterations_newton = max_iterations;
        self.newton_tolerances = tolerances;
        self
    }

    pub fn with_gamma_constant_newton(mut self, gamma: f64) -> Self {
        self.gamma_constant_newton = Some(gamma);
        self
    }

    /// Whether any quantity is limited.
    pub fn is_active(&self) -> bool {
        self.n_slots() > 0
    }

    /// Whether a Newton-bisection is needed.
    pub fn has_nonlinear(&self) -> bool {
        !self.positivity_variables_nonlinear.is_empty()
            || !self.local_onesided_variables_nonlinear.is_empty()
    }

    /// The bound slots stored per node, in evaluation order.
    pub(crate) fn slots(&self) -> Vec<BoundSlot> {
        let mut slots = Vec::with_capacity(self.n_slots());
        for &v in &self.local_twosided_variables_cons {
            slots.push(BoundSlot::TwoSidedMin(v));
            slots.push(BoundSlot::TwoSidedMax(v));
        }
        slots.extend(self.positivity_variables_cons.iter().map(|&v| BoundSlot::PositivityCons(v)));
        slots.extend((0..self.positivity_variables_nonlinear.len()).map(BoundSlot::PositivityNonlinear));
        slots.extend(
            self.local_onesided_variables_nonlinear
                .iter()
                .enumerate()
                .map(|(i, v)| BoundSlot::OneSided(i, v.bound)),
        );
        slots
    }

    pub(crate) fn n_slots(&self) -> usize {
        2 * self.local_twosided_variables_cons.len()
            + self.positivity_variables_cons.len()
            + self.positivity_variables_nonlinear.len()
            + self.local_onesided_variables_nonlinear.len()
    }

    /// γ of the Newton update for `ndims` space dimensions.
    pub(crate) fn gamma(&self, ndims: usize) -> f64 {
        self.gamma_constant_newton.unwrap_or(2.0 * ndims as f64)
    }

    /// Name of the quantity behind a bound slot.
    pub(crate) fn slot_name(&self, slot: BoundSlot, variable_names: &[&'static str; N]) -> String {
        match slot {
            BoundSlot::TwoSidedMin(v) | BoundSlot::TwoSidedMax(v) | BoundSlot::PositivityCons(v) => {
                variable_names[v].to_string()
            }
            BoundSlot::PositivityNonlinear(i) => self.positivity_variables_nonlinear[i].name().to_string(),
            BoundSlot::OneSided(i, _) => self.local_onesided_variables_nonlinear[i].variable.name().to_string(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let out_of_range = self
            .local_twosided_variables_cons
            .iter()
            .chain(&self.positivity_variables_cons)
            .find(|&&v| v >= N);
        if let Some(v) = out_of_range {
            return Err(DgError::InvalidConfiguration(format!(
                "limited variable index {} out of range for {} variables",
                v, N
            )));
        }
        if !self.is_active() {
            return Err(DgError::InvalidConfiguration(
                "subcell limiter needs at least one bounded quantity".to_string(),
            ));
        }
        if !(self.positivity_correction_factor > 0.0 && self.positivity_correction_factor < 1.0) {
            return Err(DgError::InvalidConfiguration(format!(
                "positivity correction factor must lie in (0, 1), got {}",
                self.positivity_correction_factor
            )));
        }
        let (reltol, abstol) = self.newton_tolerances;
        if self.max_iterations_newton == 0 || !(reltol > 0.0) || !(abstol > 0.0) {
            return Err(DgError::InvalidConfiguration(
                "Newton-bisection needs max_iterations >= 1 and positive tolerances".to_string(),
            ));
        }
        if let Some(gamma) = self.gamma_constant_newton
            && !(gamma >= 1.0)
        {
            return Err(DgError::InvalidConfiguration(format!(
                "gamma_constant_newton must be >= 1, got {}",
                gamma
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{CompressibleEuler, Pressure};

    type Euler = CompressibleEuler<2>;

    #[test]
    fn test_slots_follow_configuration_order() {
        let limiter = SubcellLimiterIdp::<Euler, 4>::new()
            .with_local_twosided_cons(&[0])
            .with_positivity_cons(&[3])
            .with_positivity_nonlinear(Pressure);
        let slots = limiter.slots();
        assert_eq!(
            slots,
            vec![
                BoundSlot::TwoSidedMin(0),
                BoundSlot::TwoSidedMax(0),
                BoundSlot::PositivityCons(3),
                BoundSlot::PositivityNonlinear(0),
            ]
        );
        assert!(limiter.has_nonlinear());
        assert_eq!(limiter.gamma(2), 4.0);

        let names = ["rho", "rho_v1", "rho_v2", "rho_e"];
        assert_eq!(limiter.slot_name(slots[1], &names), "rho");
        assert_eq!(limiter.slot_name(slots[3], &names), "pressure");
    }

    #[test]
    fn test_validation() {
        assert!(SubcellLimiterIdp::<Euler, 4>::new().validate().is_err());
        assert!(SubcellLimiterIdp::<Euler, 4>::new()
            .with_local_twosided_cons(&[4])
            .validate()
            .is_err());
        assert!(SubcellLimiterIdp::<Euler, 4>::new()
            .with_positivity_cons(&[0])
            .with_positivity_correction_factor(1.5)
            .validate()
            .is_err());
        assert!(SubcellLimiterIdp::<Euler, 4>::new()
            .with_positivity_cons(&[0])
            .validate()
            .is_ok());
        assert!(SubcellLimiterIdp::<Euler, 4>::new()
            .with_positivity_cons(&[0])
            .with_newton(0, (1e-12, 1e-14))
            .validate()
            .is_err());
        assert!(SubcellLimiterIdp::<Euler, 4>::new()
            .with_positivity_cons(&[0])
            .with_gamma_constant_newton(0.5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_gamma_override() {
        let limiter = SubcellLimiterIdp::<Euler, 4>::new()
            .with_positivity_nonlinear(Pressure)
            .with_gamma_constant_newton(6.0)
            .with_newton(20, (1e-10, 1e-13));
        assert!(limiter.validate().is_ok());
        assert_eq!(limiter.gamma(2), 6.0);
        assert_eq!(limiter.max_iterations_newton, 20);
    }
}

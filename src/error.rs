//! Error types for the DG kernels.
//!
//! Every variant is fatal for the current time step: the discretization is
//! globally coupled, so a failure in one element invalidates the whole stage
//! and is surfaced to the caller instead of being repaired locally.

use std::fmt;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DgError>;

/// A bound that the corrected solution failed to satisfy.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundsViolation {
    /// Element id.
    pub element: usize,
    /// Flat node index inside the element.
    pub node: usize,
    /// Name of the limited quantity (e.g. "rho", "pressure").
    pub variable: String,
    /// The bound that was crossed.
    pub bound: f64,
    /// The offending value.
    pub value: f64,
    /// Amount by which the bound is exceeded.
    pub magnitude: f64,
}

impl fmt::Display for BoundsViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {:.16e} violates bound {:.16e} by {:.3e} (element {}, node {})",
            self.variable, self.value, self.bound, self.magnitude, self.element, self.node
        )
    }
}

/// Outcome of a bounds check over the whole solution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundsReport {
    /// Largest deviation beyond the bound per limited quantity (<= 0 when
    /// all nodes satisfy it).
    pub max_deviation: Vec<(String, f64)>,
    /// Nodes whose deviation exceeds the tolerance.
    pub violations: Vec<BoundsViolation>,
}

impl BoundsReport {
    /// Whether no node exceeded the tolerance.
    pub fn is_satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Errors raised by setup, residual evaluation, limiting and time stepping.
#[derive(Debug, Error)]
pub enum DgError {
    /// NaN or Inf in the state, the residual, or a derived quantity.
    #[error("non-finite value {value} in element {element}, node {node}, variable {variable}")]
    NonFiniteState {
        element: usize,
        node: usize,
        variable: usize,
        value: f64,
    },

    /// A quantity that must stay positive is not, before any correction.
    #[error("inadmissible state in element {element}, node {node}: {reason}")]
    InadmissibleState {
        element: usize,
        node: usize,
        reason: String,
    },

    /// The corrected solution left its admissible bounds.
    #[error("bounds violation after limiting: {0}")]
    BoundsViolation(BoundsViolation),

    /// No blending coefficient satisfies the bound, even the fully low-order one.
    #[error(
        "infeasible limiter constraint for {variable} in element {element}, node {node}: \
         low-order value {value} outside bound {bound}"
    )]
    InfeasibleLimiter {
        element: usize,
        node: usize,
        variable: String,
        value: f64,
        bound: f64,
    },

    /// Mesh or connectivity cannot be discretized.
    #[error("mesh inconsistency: {0}")]
    MeshInconsistency(String),

    /// Unsupported or contradictory solver settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Time step is not a positive finite number.
    #[error("invalid time step {dt}")]
    InvalidTimeStep { dt: f64 },

    /// The run was interrupted from outside at a stage boundary.
    #[error("time integration interrupted at t = {time}")]
    Interrupted { time: f64 },
}

impl DgError {
    /// Attach an element id to errors raised by element-local kernels that
    /// do not know which element they run on.
    pub(crate) fn at_element(self, k: usize) -> Self {
        match self {
            DgError::NonFiniteState {
                node,
                variable,
                value,
                ..
            } => DgError::NonFiniteState {
                element: k,
                node,
                variable,
                value,
            },
            DgError::InadmissibleState { node, reason, .. } => DgError::InadmissibleState {
                element: k,
                node,
                reason,
            },
            DgError::InfeasibleLimiter {
                node,
                variable,
                value,
                bound,
                ..
            } => DgError::InfeasibleLimiter {
                element: k,
                node,
                variable,
                value,
                bound,
            },
            other => other,
        }
    }

    /// Whether the error reports an unstable or inadmissible solution rather
    /// than a setup problem.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            DgError::NonFiniteState { .. }
                | DgError::InadmissibleState { .. }
                | DgError::BoundsViolation(_)
                | DgError::InfeasibleLimiter { .. }
        )
    }
}

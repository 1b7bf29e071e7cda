//! Trait-based time integrator abstraction.
//!
//! This module provides traits for time integration that enable:
//! - Generic integrators over any semidiscretization `du/dt = L(u, t)`
//! - Stage hooks (bounds checks, diagnostics) and cooperative interruption
//! - Both compile-time and runtime dispatch of integrator metadata
//!
//! # Example
//! ```
//! use dgsem::error::Result;
//! use dgsem::time::{
//!     Integrable, IntegratorWorkspace, SSPRK3, Semidiscretization, StageHooks, TimeIntegrator,
//! };
//!
//! #[derive(Clone)]
//! struct Scalar(f64);
//!
//! impl Integrable for Scalar {
//!     fn scale(&mut self, c: f64) { self.0 *= c; }
//!     fn axpy(&mut self, c: f64, other: &Self) { self.0 += c * other.0; }
//! }
//!
//! // du/dt = -u
//! struct Decay;
//!
//! impl Semidiscretization for Decay {
//!     type State = Scalar;
//!     fn rhs(&mut self, du: &mut Scalar, u: &Scalar, _t: f64, _dt: f64) -> Result<()> {
//!         du.0 = -u.0;
//!         Ok(())
//!     }
//!     fn max_dt(&self, _u: &Scalar, cfl: f64) -> Result<f64> {
//!         Ok(cfl)
//!     }
//! }
//!
//! let mut u = Scalar(1.0);
//! let mut workspace = IntegratorWorkspace::new(&u);
//! SSPRK3
//!     .step(&mut Decay, &mut u, &mut workspace, 0.0, 0.01, &mut StageHooks::none())
//!     .unwrap();
//! assert!((u.0 - (-0.01f64).exp()).abs() < 1e-8);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use super::callbacks::StageCallback;
use crate::error::{BoundsReport, DgError, Result};

// =============================================================================
// Integrable Trait
// =============================================================================

/// Trait for solution types that can be time-integrated.
///
/// This provides the vector space operations needed by explicit time integrators:
/// - `scale`: Multiply by scalar (x <- c * x)
/// - `axpy`: Add scaled vector (x <- x + c * y)
/// - `assign`: Copy without reallocating (x <- y)
pub trait Integrable: Clone + Send + Sized {
    /// Scale the solution by a constant: self <- c * self
    fn scale(&mut self, c: f64);

    /// Add a scaled vector: self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);

    /// Create a zero-initialized solution with the same shape.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }

    /// Overwrite with `other` (same shape).
    fn assign(&mut self, other: &Self) {
        self.clone_from(other);
    }
}

// =============================================================================
// Semidiscretization Trait
// =============================================================================

/// A spatial discretization du/dt = L(u, t).
pub trait Semidiscretization {
    /// State vector type.
    type State: Integrable;

    /// Evaluate `du = L(u, t)`.
    ///
    /// `dt` is the step size of the current step; limiters that bound the
    /// forward Euler update `u + dt du` need it.
    fn rhs(&mut self, du: &mut Self::State, u: &Self::State, t: f64, dt: f64) -> Result<()>;

    /// Largest stable time step for the given CFL number.
    fn max_dt(&self, u: &Self::State, cfl: f64) -> Result<f64>;

    /// Whether only SSP integrators keep the discretization's guarantees.
    fn requires_ssp(&self) -> bool {
        false
    }

    /// Compare `u` with the bounds recorded by the last `rhs` evaluation.
    fn check_bounds(&self, _u: &Self::State, _tolerance: f64) -> BoundsReport {
        BoundsReport::default()
    }

    /// Named domain integrals for diagnostics (e.g. conserved quantities).
    fn integrals(&self, _u: &Self::State) -> Vec<(String, f64)> {
        Vec::new()
    }
}

// =============================================================================
// IntegratorInfo Trait (non-generic, dyn-compatible)
// =============================================================================

/// Non-generic information about a time integrator.
///
/// This trait is separate from [`TimeIntegrator`] to allow calling info methods
/// without specifying a semidiscretization. It is also dyn-compatible.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the integrator.
    fn order(&self) -> usize;

    /// Number of stages in the integrator.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving (SSP).
    ///
    /// SSP integrators are convex combinations of forward Euler steps and
    /// inherit every convex bound a forward Euler step satisfies.
    fn is_ssp(&self) -> bool;

    /// Times at which the RHS is evaluated relative to the current time.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// Stage hooks and workspace
// =============================================================================

/// Buffers reused across steps.
pub struct IntegratorWorkspace<T> {
    du: T,
    stage: T,
    euler: T,
}

impl<T: Integrable> IntegratorWorkspace<T> {
    /// Buffers shaped like `like`.
    pub fn new(like: &T) -> Self {
        Self {
            du: like.zeros_like(),
            stage: like.zeros_like(),
            euler: like.zeros_like(),
        }
    }
}

/// Callbacks run after every stage and an optional interrupt flag, checked
/// at every stage start.
pub struct StageHooks<'a, S: Semidiscretization> {
    pub callbacks: &'a mut [Box<dyn StageCallback<S>>],
    pub interrupt: Option<&'a AtomicBool>,
}

impl<'a, S: Semidiscretization> StageHooks<'a, S> {
    /// No callbacks, no interrupt flag.
    pub fn none() -> Self {
        Self {
            callbacks: &mut [],
            interrupt: None,
        }
    }

    pub fn new(callbacks: &'a mut [Box<dyn StageCallback<S>>], interrupt: Option<&'a AtomicBool>) -> Self {
        Self { callbacks, interrupt }
    }

    fn check_interrupt(&self, time: f64) -> Result<()> {
        match self.interrupt {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(DgError::Interrupted { time }),
            _ => Ok(()),
        }
    }

    fn run(&mut self, semi: &S, u: &S::State, t: f64, stage: usize) -> Result<()> {
        for callback in self.callbacks.iter_mut() {
            callback.on_stage(semi, u, t, stage)?;
        }
        Ok(())
    }
}

// =============================================================================
// TimeIntegrator Trait
// =============================================================================

/// Trait for explicit time integrators.
///
/// Time integrators advance the solution from time `t` to `t + dt` using
/// one or more RHS evaluations of the semidiscretization.
///
/// # Implementation Notes
///
/// - Integrators use the `Integrable` operations and the workspace buffers
/// - An error in any stage aborts the step and is returned unchanged
pub trait TimeIntegrator<S: Semidiscretization>: IntegratorInfo {
    /// Advance `state` by one time step.
    fn step(
        &self,
        semi: &mut S,
        state: &mut S::State,
        workspace: &mut IntegratorWorkspace<S::State>,
        t: f64,
        dt: f64,
        hooks: &mut StageHooks<'_, S>,
    ) -> Result<()>;
}

// =============================================================================
// SSP-RK3 Implementation
// =============================================================================

/// Strong Stability Preserving Runge-Kutta 3rd order integrator.
///
/// Shu-Osher form, every stage a convex combination of forward Euler steps:
///
/// ```text
/// u1 = u + dt L(u)
/// u2 = 3/4 u + 1/4 (u1 + dt L(u1))
/// u  = 1/3 u + 2/3 (u2 + dt L(u2))
/// ```
///
/// Stage callbacks see each forward Euler result. `state` is written only
/// after the last stage, so an error or interrupt leaves it untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct SSPRK3;

impl IntegratorInfo for SSPRK3 {
    fn name(&self) -> &'static str {
        "ssp-rk3"
    }

    fn order(&self) -> usize {
        3
    }

    fn n_stages(&self) -> usize {
        3
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, dt, 0.5 * dt]
    }
}

impl<S: Semidiscretization> TimeIntegrator<S> for SSPRK3 {
    fn step(
        &self,
        semi: &mut S,
        state: &mut S::State,
        workspace: &mut IntegratorWorkspace<S::State>,
        t: f64,
        dt: f64,
        hooks: &mut StageHooks<'_, S>,
    ) -> Result<()> {
        let IntegratorWorkspace { du, stage, euler } = workspace;

        // (weight of u^n, weight of the Euler step, stage time offset)
        const STAGES: [(f64, f64, f64); 3] = [(0.0, 1.0, 0.0), (0.75, 0.25, 1.0), (1.0 / 3.0, 2.0 / 3.0, 0.5)];

        stage.assign(state);
        for (i, &(keep, advance, offset)) in STAGES.iter().enumerate() {
            let time = t + offset * dt;
            hooks.check_interrupt(time)?;

            semi.rhs(du, stage, time, dt)?;
            euler.assign(stage);
            euler.axpy(dt, du);
            hooks.run(semi, euler, time, i)?;

            // stage <- keep u^n + advance (stage + dt L(stage))
            stage.assign(euler);
            stage.scale(advance);
            stage.axpy(keep, state);
        }
        state.assign(stage);
        Ok(())
    }
}

// =============================================================================
// Carpenter-Kennedy 2N-storage RK4
// =============================================================================

/// Five-stage, fourth-order low-storage Runge-Kutta method of Carpenter and
/// Kennedy (1994), in 2N form:
///
/// ```text
/// k <- a_i k + dt L(u, t + c_i dt)
/// u <- u + b_i k
/// ```
///
/// Not SSP. `state` is updated in place stage by stage, so an error or
/// interrupt leaves it at an intermediate stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct CarpenterKennedy2N54;

impl CarpenterKennedy2N54 {
    const A: [f64; 5] = [
        0.0,
        -567301805773.0 / 1357537059087.0,
        -2404267990393.0 / 2016746695238.0,
        -3550918686646.0 / 2091501179385.0,
        -1275806237668.0 / 842570457699.0,
    ];
    const B: [f64; 5] = [
        1432997174477.0 / 9575080441755.0,
        5161836677717.0 / 13612068292357.0,
        1720146321549.0 / 2090206949498.0,
        3134564353537.0 / 4481467310338.0,
        2277821191437.0 / 14882151754819.0,
    ];
    const C: [f64; 5] = [
        0.0,
        1432997174477.0 / 9575080441755.0,
        2526269341429.0 / 6820363962896.0,
        2006345519317.0 / 3224310063776.0,
        2802321613138.0 / 2924317926251.0,
    ];
}

impl IntegratorInfo for CarpenterKennedy2N54 {
    fn name(&self) -> &'static str {
        "carpenter-kennedy-2n54"
    }

    fn order(&self) -> usize {
        4
    }

    fn n_stages(&self) -> usize {
        5
    }

    fn is_ssp(&self) -> bool {
        false
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        Self::C.iter().map(|c| c * dt).collect()
    }
}

impl<S: Semidiscretization> TimeIntegrator<S> for CarpenterKennedy2N54 {
    fn step(
        &self,
        semi: &mut S,
        state: &mut S::State,
        workspace: &mut IntegratorWorkspace<S::State>,
        t: f64,
        dt: f64,
        hooks: &mut StageHooks<'_, S>,
    ) -> Result<()> {
        let IntegratorWorkspace { du, stage: register, .. } = workspace;

        for i in 0..5 {
            let time = t + Self::C[i] * dt;
            hooks.check_interrupt(time)?;

            semi.rhs(du, state, time, dt)?;
            register.scale(Self::A[i]);
            register.axpy(dt, du);
            state.axpy(Self::B[i], register);
            hooks.run(semi, state, time, i)?;
        }
        Ok(())
    }
}

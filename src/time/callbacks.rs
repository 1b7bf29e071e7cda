//! Stage and step callbacks.
//!
//! Stage callbacks observe every forward Euler stage result inside a step
//! (and may abort the step by returning an error); step callbacks observe
//! the accepted solution after each step. Neither may modify the state.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::integrator::Semidiscretization;
use crate::error::{DgError, Result};

/// Hook run after every Runge-Kutta stage.
pub trait StageCallback<S: Semidiscretization> {
    /// Inspect the stage result `u` at stage time `t`.
    fn on_stage(&mut self, semi: &S, u: &S::State, t: f64, stage: usize) -> Result<()>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Hook run after every accepted time step.
pub trait StepCallback<S: Semidiscretization> {
    /// Inspect the solution `u` at time `t` after `step` steps.
    fn on_step(&mut self, semi: &S, u: &S::State, t: f64, step: usize) -> Result<()>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

// A shared handle lets the caller read a callback's state after the run.
impl<S: Semidiscretization, C: StageCallback<S>> StageCallback<S> for Rc<RefCell<C>> {
    fn on_stage(&mut self, semi: &S, u: &S::State, t: f64, stage: usize) -> Result<()> {
        self.borrow_mut().on_stage(semi, u, t, stage)
    }

    fn name(&self) -> &'static str {
        self.borrow().name()
    }
}

impl<S: Semidiscretization, C: StepCallback<S>> StepCallback<S> for Rc<RefCell<C>> {
    fn on_step(&mut self, semi: &S, u: &S::State, t: f64, step: usize) -> Result<()> {
        self.borrow_mut().on_step(semi, u, t, step)
    }

    fn name(&self) -> &'static str {
        self.borrow().name()
    }
}

// =============================================================================
// Bounds check
// =============================================================================

/// Settings of [`BoundsCheckCallback`].
#[derive(Clone, Copy, Debug)]
pub struct BoundsCheckConfig {
    /// Relative tolerance: a deviation counts if it exceeds
    /// `tolerance * max(|bound|, 1)`.
    pub tolerance: f64,
    /// Abort the step on the first violation instead of logging it.
    pub fatal: bool,
}

impl Default for BoundsCheckConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-13,
            fatal: false,
        }
    }
}

/// Checks every stage result against the bounds the limiter enforced and
/// keeps the largest deviation seen per quantity.
#[derive(Clone, Debug, Default)]
pub struct BoundsCheckCallback {
    config: BoundsCheckConfig,
    max_deviation: BTreeMap<String, f64>,
    n_violations: usize,
}

impl BoundsCheckCallback {
    pub fn new(config: BoundsCheckConfig) -> Self {
        Self {
            config,
            max_deviation: BTreeMap::new(),
            n_violations: 0,
        }
    }

    /// Largest deviation beyond the bound per quantity over all checked stages.
    pub fn max_deviation(&self) -> &BTreeMap<String, f64> {
        &self.max_deviation
    }

    /// Number of node violations found so far.
    pub fn n_violations(&self) -> usize {
        self.n_violations
    }
}

impl<S: Semidiscretization> StageCallback<S> for BoundsCheckCallback {
    fn on_stage(&mut self, semi: &S, u: &S::State, t: f64, stage: usize) -> Result<()> {
        let report = semi.check_bounds(u, self.config.tolerance);
        for (name, deviation) in report.max_deviation {
            let entry = self.max_deviation.entry(name).or_insert(f64::NEG_INFINITY);
            *entry = entry.max(deviation);
        }

        if let Some(first) = report.violations.first() {
            self.n_violations += report.violations.len();
            if self.config.fatal {
                return Err(DgError::BoundsViolation(first.clone()));
            }
            log::warn!(
                "{} bounds violations at t = {:.6e} (stage {}), first: {}",
                report.violations.len(),
                t,
                stage,
                first
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bounds_check"
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// One analysis sample.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisRecord {
    pub step: usize,
    pub time: f64,
    pub integrals: Vec<(String, f64)>,
    /// `(variable, L2, L∞)` against the exact solution, if one was given.
    pub errors: Vec<(String, f64, f64)>,
}

/// Error norms of a state at time `t`, as `(variable, L2, L∞)`.
pub type ErrorNorms<S> = Box<dyn Fn(&S, &<S as Semidiscretization>::State, f64) -> Vec<(String, f64, f64)>>;

/// Logs the domain integrals (and error norms, when an exact solution is
/// known) every `interval` steps and keeps their history.
pub struct AnalysisCallback<S: Semidiscretization> {
    interval: usize,
    history: Vec<AnalysisRecord>,
    error_norms: Option<ErrorNorms<S>>,
}

impl<S: Semidiscretization> AnalysisCallback<S> {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            history: Vec::new(),
            error_norms: None,
        }
    }

    /// Also record the error norms computed by `error_norms`.
    pub fn with_error_norms<F>(mut self, error_norms: F) -> Self
    where
        F: Fn(&S, &S::State, f64) -> Vec<(String, f64, f64)> + 'static,
    {
        self.error_norms = Some(Box::new(error_norms));
        self
    }

    pub fn history(&self) -> &[AnalysisRecord] {
        &self.history
    }

    /// Change of each integral between the first and the last sample.
    pub fn drift(&self) -> Vec<(String, f64)> {
        match (self.history.first(), self.history.last()) {
            (Some(first), Some(last)) => first
                .integrals
                .iter()
                .zip(&last.integrals)
                .map(|((name, a), (_, b))| (name.clone(), b - a))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl<S: Semidiscretization> StepCallback<S> for AnalysisCallback<S> {
    fn on_step(&mut self, semi: &S, u: &S::State, t: f64, step: usize) -> Result<()> {
        if step % self.interval != 0 {
            return Ok(());
        }
        let integrals = semi.integrals(u);
        let summary: Vec<String> = integrals
            .iter()
            .map(|(name, value)| format!("{} = {:.12e}", name, value))
            .collect();
        log::info!("step {:>6}, t = {:.6e}: {}", step, t, summary.join(", "));

        let errors = match &self.error_norms {
            Some(error_norms) => error_norms(semi, u, t),
            None => Vec::new(),
        };
        if !errors.is_empty() {
            let summary: Vec<String> = errors
                .iter()
                .map(|(name, l2, linf)| format!("{}: L2 = {:.6e}, Linf = {:.6e}", name, l2, linf))
                .collect();
            log::info!("step {:>6}, t = {:.6e}: {}", step, t, summary.join(", "));
        }

        self.history.push(AnalysisRecord {
            step,
            time: t,
            integrals,
            errors,
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "analysis"
    }
}

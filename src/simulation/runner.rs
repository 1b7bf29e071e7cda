//! Simulation runner implementation.
//!
//! Provides a high-level interface for running time-dependent simulations.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::error::{DgError, Result};
use crate::time::{
    IntegratorWorkspace, Semidiscretization, StageCallback, StageHooks, StepCallback, TimeIntegrator,
};

// =============================================================================
// Simulation Configuration
// =============================================================================

/// How the step size is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeStepControl {
    /// Constant step size.
    Fixed(f64),
    /// Step size from the CFL condition of the current state.
    Cfl(f64),
}

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Step size control.
    pub time_step: TimeStepControl,
    /// Maximum time step (overrides CFL if smaller).
    pub dt_max: Option<f64>,
    /// Maximum number of time steps.
    pub max_steps: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: TimeStepControl::Cfl(0.5),
            dt_max: None,
            max_steps: None,
        }
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Result of a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Final simulation time reached.
    pub final_time: f64,
    /// Total number of time steps taken.
    pub n_steps: usize,
    /// Minimum time step used.
    pub dt_min: f64,
    /// Maximum time step used.
    pub dt_max: f64,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
    /// Whether the end time was reached (false if the step limit stopped the run).
    pub reached_end: bool,
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// High-level simulation runner.
///
/// Ties together a semidiscretization and a time integrator into a
/// complete simulation workflow with stage and step callbacks.
///
/// # Type Parameters
///
/// * `S` - Semidiscretization (must implement [`Semidiscretization`])
/// * `I` - Time integrator (must implement [`TimeIntegrator<S>`])
pub struct Simulation<S, I>
where
    S: Semidiscretization,
    I: TimeIntegrator<S>,
{
    semi: S,
    integrator: I,
    config: SimulationConfig,
    stage_callbacks: Vec<Box<dyn StageCallback<S>>>,
    step_callbacks: Vec<Box<dyn StepCallback<S>>>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<S, I> Simulation<S, I>
where
    S: Semidiscretization,
    I: TimeIntegrator<S>,
{
    /// Create a new simulation with the given semidiscretization and integrator.
    ///
    /// Fails if the semidiscretization relies on SSP time stepping (subcell
    /// limiting) and the integrator is not SSP.
    pub fn new(semi: S, integrator: I) -> Result<Self> {
        if semi.requires_ssp() && !integrator.is_ssp() {
            return Err(DgError::InvalidConfiguration(format!(
                "the discretization needs an SSP integrator, {} is not",
                integrator.name()
            )));
        }
        Ok(Self {
            semi,
            integrator,
            config: SimulationConfig::default(),
            stage_callbacks: Vec::new(),
            step_callbacks: Vec::new(),
            interrupt: None,
        })
    }

    /// Set the CFL number.
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.config.time_step = TimeStepControl::Cfl(cfl);
        self
    }

    /// Use a constant time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.config.time_step = TimeStepControl::Fixed(dt);
        self
    }

    /// Set the maximum time step.
    pub fn with_dt_max(mut self, dt_max: f64) -> Self {
        self.config.dt_max = Some(dt_max);
        self
    }

    /// Set the maximum number of steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = Some(max_steps);
        self
    }

    /// Run `callback` after every stage.
    pub fn with_stage_callback(mut self, callback: impl StageCallback<S> + 'static) -> Self {
        self.stage_callbacks.push(Box::new(callback));
        self
    }

    /// Run `callback` after every step (and once for the initial state).
    pub fn with_step_callback(mut self, callback: impl StepCallback<S> + 'static) -> Self {
        self.step_callbacks.push(Box::new(callback));
        self
    }

    /// Stop with [`DgError::Interrupted`] at the next stage once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Get a reference to the semidiscretization.
    pub fn semi(&self) -> &S {
        &self.semi
    }

    /// Get a mutable reference to the semidiscretization.
    pub fn semi_mut(&mut self) -> &mut S {
        &mut self.semi
    }

    /// Get a reference to the time integrator.
    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn next_dt(&self, state: &S::State, t: f64, t_end: f64) -> Result<f64> {
        let mut dt = match self.config.time_step {
            TimeStepControl::Fixed(dt) => dt,
            TimeStepControl::Cfl(cfl) => self.semi.max_dt(state, cfl)?,
        };
        if let Some(dt_max) = self.config.dt_max {
            dt = dt.min(dt_max);
        }
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(DgError::InvalidTimeStep { dt });
        }

        // Don't overshoot end time
        if t + dt > t_end {
            dt = t_end - t;
        }
        Ok(dt)
    }

    /// Run the simulation from `t_start` to `t_end`.
    ///
    /// # Arguments
    /// * `state` - Initial solution state (modified in place)
    /// * `t_start` - Starting time
    /// * `t_end` - Ending time
    ///
    /// # Returns
    /// Simulation result with timing and step statistics, or the first
    /// error raised by the discretization, a callback or the interrupt flag.
    pub fn run(&mut self, state: &mut S::State, t_start: f64, t_end: f64) -> Result<SimulationResult> {
        let start_wall = std::time::Instant::now();

        let mut t = t_start;
        let mut n_steps = 0;
        let mut dt_min_used = f64::INFINITY;
        let mut dt_max_used: f64 = 0.0;
        let mut workspace = IntegratorWorkspace::new(&*state);

        log::info!(
            "Starting simulation with {} integrator: t = {:.4} -> {:.4}",
            self.integrator.name(),
            t_start,
            t_end
        );

        for callback in self.step_callbacks.iter_mut() {
            callback.on_step(&self.semi, state, t, 0)?;
        }

        let mut reached_end = true;
        while t < t_end {
            // Check step limit
            if let Some(max_steps) = self.config.max_steps
                && n_steps >= max_steps
            {
                log::warn!("Maximum step limit ({}) reached at t = {:.6e}", max_steps, t);
                reached_end = false;
                break;
            }

            let dt = self.next_dt(state, t, t_end)?;

            // Track dt statistics
            dt_min_used = dt_min_used.min(dt);
            dt_max_used = dt_max_used.max(dt);

            let mut hooks = StageHooks::new(&mut self.stage_callbacks, self.interrupt.as_deref());
            self.integrator
                .step(&mut self.semi, state, &mut workspace, t, dt, &mut hooks)?;

            n_steps += 1;
            // Land exactly on the end time
            t = if t_end - (t + dt) <= 1e-14 * t_end.abs().max(1.0) { t_end } else { t + dt };

            for callback in self.step_callbacks.iter_mut() {
                callback.on_step(&self.semi, state, t, n_steps)?;
            }

            if n_steps % 100 == 0 {
                log::debug!("Step {}: t = {:.4}, dt = {:.2e}", n_steps, t, dt);
            }
        }

        let wall_time = start_wall.elapsed().as_secs_f64();
        log::info!(
            "Simulation complete: {} steps, wall time {:.2}s, dt range [{:.2e}, {:.2e}]",
            n_steps,
            wall_time,
            dt_min_used,
            dt_max_used
        );

        Ok(SimulationResult {
            final_time: t,
            n_steps,
            dt_min: dt_min_used,
            dt_max: dt_max_used,
            wall_time,
            reached_end,
        })
    }
}

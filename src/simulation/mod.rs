//! Simulation runner abstraction.
//!
//! This module provides a high-level interface for running DG simulations
//! that ties together:
//! - A semidiscretization (RHS computation, dt calculation, diagnostics)
//! - Time integrators (SSP-RK3, Carpenter-Kennedy)
//! - Stage callbacks (bounds checks) and step callbacks (analysis)
//!
//! # Example
//! ```ignore
//! use dgsem::simulation::Simulation;
//! use dgsem::time::{BoundsCheckCallback, BoundsCheckConfig, SSPRK3};
//!
//! let mut sim = Simulation::new(semi, SSPRK3)?
//!     .with_cfl(0.1)
//!     .with_stage_callback(BoundsCheckCallback::new(BoundsCheckConfig::default()));
//!
//! let result = sim.run(&mut u, 0.0, 1.0)?;
//! ```

mod runner;

pub use runner::{Simulation, SimulationConfig, SimulationResult, TimeStepControl};

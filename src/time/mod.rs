//! Time integration methods.
//!
//! Explicit Runge-Kutta methods over a generic [`Semidiscretization`]:
//!
//! | Integrator | Order | Stages | SSP |
//! |------------|-------|--------|-----|
//! | [`SSPRK3`] | 3 | 3 | yes |
//! | [`CarpenterKennedy2N54`] | 4 | 5 | no |
//!
//! Subcell limiting bounds each forward Euler stage, so it requires an SSP
//! integrator.

mod callbacks;
mod integrator;

pub use callbacks::{
    AnalysisCallback, AnalysisRecord, BoundsCheckCallback, BoundsCheckConfig, ErrorNorms, StageCallback,
    StepCallback,
};
pub use integrator::{
    CarpenterKennedy2N54, Integrable, IntegratorInfo, IntegratorWorkspace, SSPRK3, Semidiscretization,
    StageHooks, TimeIntegrator,
};

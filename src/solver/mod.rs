//! DGSEM solver components.
//!
//! # Submodules
//!
//! - `solution`: element-major solution container
//! - `volume`: weak form, flux differencing and subcell finite volume kernels
//! - `surface`: interface, boundary and mortar fluxes and the surface integral
//! - `indicators`: shock-capturing smoothness indicators
//! - `subcell`: invariant domain preserving subcell limiter
//! - `parallel`: element loops and per-worker scratch arenas
//! - `dg`: the semidiscretization tying everything together
//!
//! # Volume Integrals
//!
//! | Variant | Description |
//! |---------|-------------|
//! | `WeakForm` | Collocation weak form, conservative systems only |
//! | `FluxDifferencing` | Split form with a symmetric two-point flux |
//! | `ShockCapturingHG` | Element-wise blend with subcell finite volumes |
//! | `SubcellLimiting` | Subcell-wise IDP blend with subcell finite volumes |

mod config;
mod dg;
mod indicators;
mod parallel;
mod solution;
mod subcell;
mod surface;
mod volume;

pub use config::{DgConfig, VolumeIntegral};
pub use dg::DgSemidiscretization;
pub use indicators::{
    IndicatorHennemannGassner, IndicatorLohner, IndicatorScratch, IndicatorVariable, ShockIndicator, smooth_alpha,
};
pub use parallel::{ScratchPool, max_over, try_for_each_chunk, try_for_each_element, try_for_each_mut};
pub use solution::Solution;
pub use subcell::{OneSidedBound, OneSidedVariable, SubcellLimiterIdp};

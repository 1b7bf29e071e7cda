//! Two-point numerical fluxes.
//!
//! Provides numerical fluxes for DG discretizations:
//! - Generic fluxes for any [`Equations`](crate::equations::Equations):
//!   central, local Lax-Friedrichs (Rusanov), HLL
//! - Compressible Euler: entropy-conservative and kinetic-energy-preserving
//!   volume fluxes (Ranocha, Chandrashekar, Shima et al., Kennedy-Gruber)
//! - Shallow water: Wintermeyer et al. and Fjordholm et al. fluxes plus the
//!   nonconservative bottom-topography term
//!
//! # Flux Traits
//!
//! [`NumericalFlux`] is the conservative two-point flux; a system with
//! nonconservative products pairs it with a [`NonconservativeFlux`] through
//! [`FluxPair`]. Everything is resolved statically, so the volume and
//! surface kernels are monomorphized for the chosen flux.

mod euler;
mod generic;
mod shallow_water;
pub mod traits;

pub use euler::{FluxChandrashekar, FluxKennedyGruber, FluxRanocha, FluxShima};
pub use generic::{FluxCentral, FluxHll, FluxLaxFriedrichs};
pub use shallow_water::{
    FluxFjordholmEtAl, FluxNonconservativeWintermeyerEtAl, FluxWintermeyerEtAl,
};
pub use traits::{FluxPair, NonconservativeFlux, NumericalFlux};

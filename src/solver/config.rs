//! Solver configuration.

use super::indicators::ShockIndicator;
use super::subcell::SubcellLimiterIdp;
use crate::equations::Equations;

/// How the volume term of each element is evaluated.
#[derive(Clone)]
pub enum VolumeIntegral<E, const N: usize> {
    /// Collocation weak form D f(u). Not entropy stable; no nonconservative terms.
    WeakForm,
    /// Split form with a symmetric two-point volume flux.
    FluxDifferencing,
    /// Element-wise blend of flux differencing and the subcell finite volume
    /// operator, weighted by a smoothness indicator.
    ShockCapturingHG(ShockIndicator<E, N>),
    /// Subcell-wise blend chosen by the IDP limiter.
    SubcellLimiting(SubcellLimiterIdp<E, N>),
}

impl<E: Equations<N>, const N: usize> VolumeIntegral<E, N> {
    pub fn name(&self) -> &'static str {
        match self {
            VolumeIntegral::WeakForm => "weak_form",
            VolumeIntegral::FluxDifferencing => "flux_differencing",
            VolumeIntegral::ShockCapturingHG(_) => "shock_capturing",
            VolumeIntegral::SubcellLimiting(_) => "subcell_limiting",
        }
    }

    /// Whether the variant evaluates the two-point volume flux.
    pub fn uses_volume_flux(&self) -> bool {
        !matches!(self, VolumeIntegral::WeakForm)
    }

    /// Whether the variant needs the subcell finite volume operator.
    pub(crate) fn uses_subcells(&self) -> bool {
        matches!(
            self,
            VolumeIntegral::ShockCapturingHG(_) | VolumeIntegral::SubcellLimiting(_)
        )
    }
}

/// Discretization parameters.
///
/// `surface_flux` is used on element faces and, for the low-order subcell
/// operator, on subcell interfaces. `volume_flux` must be symmetric.
#[derive(Clone)]
pub struct DgConfig<E, SF, VF, const N: usize> {
    /// Polynomial degree p >= 1
    pub polydeg: usize,
    pub surface_flux: SF,
    pub volume_flux: VF,
    pub volume_integral: VolumeIntegral<E, N>,
}

impl<E: Equations<N>, SF, VF, const N: usize> DgConfig<E, SF, VF, N> {
    /// Flux-differencing discretization of degree `polydeg`.
    pub fn new(polydeg: usize, surface_flux: SF, volume_flux: VF) -> Self {
        Self {
            polydeg,
            surface_flux,
            volume_flux,
            volume_integral: VolumeIntegral::FluxDifferencing,
        }
    }

    pub fn with_volume_integral(mut self, volume_integral: VolumeIntegral<E, N>) -> Self {
        self.volume_integral = volume_integral;
        self
    }

    /// Blend with the subcell finite volume operator where `indicator` flags
    /// under-resolved elements.
    pub fn with_shock_capturing(self, indicator: impl Into<ShockIndicator<E, N>>) -> Self {
        self.with_volume_integral(VolumeIntegral::ShockCapturingHG(indicator.into()))
    }

    /// Limit the antidiffusive subcell fluxes with `limiter`.
    pub fn with_subcell_limiting(self, limiter: SubcellLimiterIdp<E, N>) -> Self {
        self.with_volume_integral(VolumeIntegral::SubcellLimiting(limiter))
    }
}

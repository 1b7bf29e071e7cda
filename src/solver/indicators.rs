//! Smoothness indicators for shock capturing.
//!
//! An indicator maps the nodal values of one element to a blending factor
//! α ∈ [0, α_max]: 0 keeps the high-order volume integral, larger values
//! shift weight to the low-order subcell finite volume operator.

use std::sync::Arc;

use crate::equations::Equations;
use crate::error::{DgError, Result};
use crate::operators::{LobattoBasis, TensorLayout, apply_along_axis};

/// Scalar quantity the indicator inspects, e.g. density times pressure.
pub type IndicatorVariable<E, const N: usize> = Arc<dyn Fn(&[f64; N], &E) -> f64 + Send + Sync>;

/// Modal energy indicator of Hennemann, Winters and Gassner (2021).
///
/// The indicator variable is transformed to orthonormal Legendre modes; the
/// share of energy in the highest modes is compared with a threshold
/// through a logistic function.
#[derive(Clone)]
pub struct IndicatorHennemannGassner<E, const N: usize> {
    /// Upper cap of α
    pub alpha_max: f64,
    /// Values below α_min are set to 0, above 1 - α_min to 1
    pub alpha_min: f64,
    /// Smooth α in space with max(α, ½ α_neighbor)
    pub alpha_smooth: bool,
    variable: IndicatorVariable<E, N>,
}

impl<E: Equations<N>, const N: usize> IndicatorHennemannGassner<E, N> {
    /// Indicator on `variable` with α_max = 0.5, α_min = 0.001 and smoothing.
    pub fn new<F>(variable: F) -> Self
    where
        F: Fn(&[f64; N], &E) -> f64 + Send + Sync + 'static,
    {
        Self {
            alpha_max: 0.5,
            alpha_min: 0.001,
            alpha_smooth: true,
            variable: Arc::new(variable),
        }
    }

    pub fn with_alpha_max(mut self, alpha_max: f64) -> Self {
        self.alpha_max = alpha_max;
        self
    }

    pub fn with_alpha_min(mut self, alpha_min: f64) -> Self {
        self.alpha_min = alpha_min;
        self
    }

    pub fn with_alpha_smooth(mut self, alpha_smooth: bool) -> Self {
        self.alpha_smooth = alpha_smooth;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha_max) || !(0.0..=0.5).contains(&self.alpha_min) {
            return Err(DgError::InvalidConfiguration(format!(
                "indicator needs 0 <= alpha_max <= 1 and 0 <= alpha_min <= 0.5, got {} and {}",
                self.alpha_max, self.alpha_min
            )));
        }
        Ok(())
    }

    /// Raw (unsmoothed) α of one element.
    pub fn element_alpha(
        &self,
        u: &[[f64; N]],
        equations: &E,
        basis: &LobattoBasis,
        layout: &TensorLayout,
        scratch: &mut IndicatorScratch,
    ) -> Result<f64> {
        let n_nodes = layout.n_nodes();
        fill_indicator_values(&self.variable, u, equations, &mut scratch.values[..n_nodes])?;

        // Nodal -> modal, one axis at a time.
        for axis in 0..layout.ndims() {
            apply_along_axis(
                layout,
                &basis.inverse_vandermonde,
                axis,
                &scratch.values[..n_nodes],
                &mut scratch.modal[..n_nodes],
            );
            scratch.values[..n_nodes].copy_from_slice(&scratch.modal[..n_nodes]);
        }

        let polydeg = basis.polydeg;
        let mut total = 0.0;
        let mut clip_1 = 0.0;
        let mut clip_2 = 0.0;
        for (node, m) in scratch.values[..n_nodes].iter().enumerate() {
            let energy = m[0] * m[0];
            let idx = layout.multi_index(node);
            let highest = (0..layout.ndims()).map(|d| idx[d]).max().unwrap_or(0);
            total += energy;
            if highest < polydeg {
                clip_1 += energy;
            }
            if highest + 1 < polydeg {
                clip_2 += energy;
            }
        }

        let fraction_1 = if total > 0.0 { (total - clip_1) / total } else { 0.0 };
        let fraction_2 = if clip_1 > 0.0 { (clip_1 - clip_2) / clip_1 } else { 0.0 };
        let energy = fraction_1.max(fraction_2);

        let threshold = 0.5 * 10f64.powf(-1.8 * (basis.nnodes() as f64).powf(0.25));
        let sharpness = ((1.0 - 1e-4) / 1e-4f64).ln();
        let mut alpha = 1.0 / (1.0 + (-sharpness / threshold * (energy - threshold)).exp());

        if alpha < self.alpha_min {
            alpha = 0.0;
        } else if alpha > 1.0 - self.alpha_min {
            alpha = 1.0;
        }
        Ok(alpha.min(self.alpha_max))
    }
}

/// Second-difference indicator of Löhner (1987) along every grid line.
#[derive(Clone)]
pub struct IndicatorLohner<E, const N: usize> {
    /// Upper cap of α
    pub alpha_max: f64,
    /// Noise filter weight
    pub f_wave: f64,
    /// Smooth α in space with max(α, ½ α_neighbor)
    pub alpha_smooth: bool,
    variable: IndicatorVariable<E, N>,
}

impl<E: Equations<N>, const N: usize> IndicatorLohner<E, N> {
    /// Indicator on `variable` with α_max = 0.5 and f_wave = 0.2.
    pub fn new<F>(variable: F) -> Self
    where
        F: Fn(&[f64; N], &E) -> f64 + Send + Sync + 'static,
    {
        Self {
            alpha_max: 0.5,
            f_wave: 0.2,
            alpha_smooth: false,
            variable: Arc::new(variable),
        }
    }

    pub fn with_alpha_max(mut self, alpha_max: f64) -> Self {
        self.alpha_max = alpha_max;
        self
    }

    pub fn with_f_wave(mut self, f_wave: f64) -> Self {
        self.f_wave = f_wave;
        self
    }

    pub fn with_alpha_smooth(mut self, alpha_smooth: bool) -> Self {
        self.alpha_smooth = alpha_smooth;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha_max) || !(self.f_wave >= 0.0) {
            return Err(DgError::InvalidConfiguration(format!(
                "Löhner indicator needs 0 <= alpha_max <= 1 and f_wave >= 0, got {} and {}",
                self.alpha_max, self.f_wave
            )));
        }
        Ok(())
    }

    /// Raw (unsmoothed) α of one element.
    pub fn element_alpha(
        &self,
        u: &[[f64; N]],
        equations: &E,
        layout: &TensorLayout,
        scratch: &mut IndicatorScratch,
    ) -> Result<f64> {
        let n_nodes = layout.n_nodes();
        let values = &mut scratch.values[..n_nodes];
        fill_indicator_values(&self.variable, u, equations, values)?;

        let n = layout.n();
        let mut estimate: f64 = 0.0;
        for axis in 0..layout.ndims() {
            for t in 0..layout.n_face_nodes() {
                for i in 1..n.saturating_sub(1) {
                    let minus = values[layout.line_node(axis, t, i - 1)][0];
                    let center = values[layout.line_node(axis, t, i)][0];
                    let plus = values[layout.line_node(axis, t, i + 1)][0];

                    let numerator = (plus - 2.0 * center + minus).abs();
                    let denominator = (plus - center).abs()
                        + (center - minus).abs()
                        + self.f_wave * (plus.abs() + 2.0 * center.abs() + minus.abs());
                    if denominator > 0.0 {
                        estimate = estimate.max(numerator / denominator);
                    }
                }
            }
        }
        Ok(estimate.min(self.alpha_max))
    }
}

/// Indicator driving the shock-capturing blend.
#[derive(Clone)]
pub enum ShockIndicator<E, const N: usize> {
    HennemannGassner(IndicatorHennemannGassner<E, N>),
    Lohner(IndicatorLohner<E, N>),
}

impl<E: Equations<N>, const N: usize> ShockIndicator<E, N> {
    pub fn name(&self) -> &'static str {
        match self {
            ShockIndicator::HennemannGassner(_) => "hennemann_gassner",
            ShockIndicator::Lohner(_) => "lohner",
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            ShockIndicator::HennemannGassner(indicator) => indicator.validate(),
            ShockIndicator::Lohner(indicator) => indicator.validate(),
        }
    }

    /// Whether α is smoothed across neighboring elements.
    pub fn alpha_smooth(&self) -> bool {
        match self {
            ShockIndicator::HennemannGassner(indicator) => indicator.alpha_smooth,
            ShockIndicator::Lohner(indicator) => indicator.alpha_smooth,
        }
    }

    /// Raw (unsmoothed) α of one element.
    pub fn element_alpha(
        &self,
        u: &[[f64; N]],
        equations: &E,
        basis: &LobattoBasis,
        layout: &TensorLayout,
        scratch: &mut IndicatorScratch,
    ) -> Result<f64> {
        match self {
            ShockIndicator::HennemannGassner(indicator) => {
                indicator.element_alpha(u, equations, basis, layout, scratch)
            }
            ShockIndicator::Lohner(indicator) => indicator.element_alpha(u, equations, layout, scratch),
        }
    }
}

impl<E: Equations<N>, const N: usize> From<IndicatorHennemannGassner<E, N>> for ShockIndicator<E, N> {
    fn from(indicator: IndicatorHennemannGassner<E, N>) -> Self {
        ShockIndicator::HennemannGassner(indicator)
    }
}

impl<E: Equations<N>, const N: usize> From<IndicatorLohner<E, N>> for ShockIndicator<E, N> {
    fn from(indicator: IndicatorLohner<E, N>) -> Self {
        ShockIndicator::Lohner(indicator)
    }
}

/// Per-worker buffers of the indicator evaluation.
pub struct IndicatorScratch {
    values: Vec<[f64; 1]>,
    modal: Vec<[f64; 1]>,
}

impl IndicatorScratch {
    pub fn new(n_nodes: usize) -> Self {
        Self {
            values: vec![[0.0]; n_nodes],
            modal: vec![[0.0]; n_nodes],
        }
    }
}

fn fill_indicator_values<E, const N: usize>(
    variable: &IndicatorVariable<E, N>,
    u: &[[f64; N]],
    equations: &E,
    values: &mut [[f64; 1]],
) -> Result<()> {
    for (node, (value, state)) in values.iter_mut().zip(u).enumerate() {
        let v = variable(state, equations);
        // The indicator variable is a single derived scalar, reported as variable 0.
        if !v.is_finite() {
            return Err(DgError::NonFiniteState {
                element: 0,
                node,
                variable: 0,
                value: v,
            });
        }
        *value = [v];
    }
    Ok(())
}

/// Spatial smoothing α_k = max(α_k, ½ α_neighbor) using the values from
/// before smoothing.
pub fn smooth_alpha(alpha: &mut [f64], neighbors: &[Vec<usize>], previous: &mut Vec<f64>) {
    previous.clear();
    previous.extend_from_slice(alpha);
    for (k, nbs) in neighbors.iter().enumerate() {
        for &nb in nbs {
            alpha[k] = alpha[k].max(0.5 * previous[nb]);
        }
    }
}

//! DGSEM semidiscretization on tree meshes.
//!
//! Computes the strong-form residual
//!
//! ```text
//! du/dt = -(1/J) (V(u) + S(u)) + s(u, x, t)
//! ```
//!
//! where V is the volume term of the configured [`VolumeIntegral`] and S the
//! surface term built from the numerical fluxes on interfaces, boundaries
//! and mortars. Face fluxes are evaluated first (one writer per face), then
//! every element assembles its own residual independently.

use std::sync::Arc;

use super::config::{DgConfig, VolumeIntegral};
use super::indicators::{IndicatorScratch, smooth_alpha};
use super::parallel::{ScratchPool, max_over, try_for_each_element, try_for_each_mut};
use super::solution::Solution;
use super::subcell::{
    BoundSlot, ElementLimiterInput, ElementLimiterOutput, limit_element, subcell_fluxes_axis,
};
use super::surface::{FaceBuffers, FaceKernels, surface_integral};
use super::volume::{
    flux_differencing_axis, flux_differencing_kernel, subcell_fv_kernel, subcell_normals, weak_form_kernel,
};
use crate::boundary::BoundaryConditions;
use crate::equations::{Direction, Equations, norm};
use crate::error::{BoundsReport, BoundsViolation, DgError, Result};
use crate::flux::NumericalFlux;
use crate::mesh::TreeMesh;
use crate::operators::{ElementGeometry, LobattoBasis, TensorLayout};
use crate::source::SourceTerms;
use crate::time::{AnalysisCallback, Semidiscretization};

/// Per-element state of the subcell limiter that outlives one residual
/// evaluation (read back by the bounds check).
struct ElementCache<const N: usize> {
    /// `[(axis * nfn + t) * (n - 1) + i]`
    antidiffusive: Vec<[f64; N]>,
    /// `[node * n_slots + slot]`
    bounds: Vec<f64>,
    alpha: Vec<f64>,
}

/// Per-worker scratch of the element kernels.
struct ElementScratch<const N: usize> {
    volume: Vec<[f64; N]>,
    low_order: Vec<[f64; N]>,
    surface: Vec<[f64; N]>,
    flux: Vec<[f64; N]>,
    derivative: Vec<[f64; N]>,
    u_safe: Vec<[f64; N]>,
    face_bar: Vec<[f64; N]>,
    indicator: IndicatorScratch,
}

impl<const N: usize> ElementScratch<N> {
    fn new(layout: &TensorLayout) -> Self {
        let n_nodes = layout.n_nodes();
        Self {
            volume: vec![[0.0; N]; n_nodes],
            low_order: vec![[0.0; N]; n_nodes],
            surface: vec![[0.0; N]; n_nodes],
            flux: vec![[0.0; N]; n_nodes],
            derivative: vec![[0.0; N]; n_nodes],
            u_safe: vec![[0.0; N]; n_nodes],
            face_bar: vec![[0.0; N]; layout.n_faces() * layout.n_face_nodes()],
            indicator: IndicatorScratch::new(n_nodes),
        }
    }
}

/// Discontinuous Galerkin spectral element semidiscretization.
///
/// # Type Parameters
///
/// * `E` - Equation system
/// * `SF` - Surface flux (also the low-order subcell flux)
/// * `VF` - Symmetric volume flux
/// * `N` - Number of conservative variables
/// * `D` - Spatial dimension
pub struct DgSemidiscretization<E, SF, VF, const N: usize, const D: usize>
where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
    VF: NumericalFlux<E, N>,
{
    mesh: TreeMesh<D>,
    equations: E,
    basis: LobattoBasis,
    layout: TensorLayout,
    geometry: ElementGeometry,
    surface_flux: SF,
    volume_flux: VF,
    volume_integral: VolumeIntegral<E, N>,
    boundary_conditions: BoundaryConditions<E, N>,
    source_terms: Option<Arc<dyn SourceTerms<E, N>>>,
    variable_names: [&'static str; N],
    /// Subcell interface normals, empty unless a subcell variant is used
    subcell_normals: Vec<Direction>,
    faces: FaceBuffers<N>,
    /// Blending factor per element (shock capturing)
    element_alpha: Vec<f64>,
    alpha_previous: Vec<f64>,
    neighbors: Vec<Vec<usize>>,
    caches: Vec<ElementCache<N>>,
    slots: Vec<BoundSlot>,
    scratch: ScratchPool<ElementScratch<N>>,
    total_volume: f64,
}

impl<E, SF, VF, const N: usize, const D: usize> DgSemidiscretization<E, SF, VF, N, D>
where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
    VF: NumericalFlux<E, N>,
{
    /// Set up operators, geometry and connectivity and validate the
    /// configuration against the mesh.
    pub fn new(
        mesh: TreeMesh<D>,
        equations: E,
        config: DgConfig<E, SF, VF, N>,
        boundary_conditions: BoundaryConditions<E, N>,
    ) -> Result<Self> {
        let DgConfig {
            polydeg,
            surface_flux,
            volume_flux,
            volume_integral,
        } = config;

        if E::NDIMS != D {
            return Err(DgError::InvalidConfiguration(format!(
                "equations are {}-dimensional, mesh is {}-dimensional",
                E::NDIMS,
                D
            )));
        }
        boundary_conditions.validate(&mesh.boundary_tags())?;
        validate_fluxes(&volume_integral, &surface_flux, &volume_flux, &mesh)?;

        let basis = LobattoBasis::new(polydeg)?;
        let layout = basis.layout(D);
        let geometry = ElementGeometry::compute(&mesh, &basis)?;
        check_interface_normals(&mesh, &geometry)?;
        let faces = FaceBuffers::new(&mesh, &layout)?;

        let n_elements = mesh.n_elements();
        let n_nodes = layout.n_nodes();
        let subcell_normals = if volume_integral.uses_subcells() {
            subcell_normals(&geometry, &basis, n_elements)
        } else {
            Vec::new()
        };

        let slots = match &volume_integral {
            VolumeIntegral::SubcellLimiting(limiter) => limiter.slots(),
            _ => Vec::new(),
        };
        let caches: Vec<ElementCache<N>> = (0..n_elements)
            .map(|_| match &volume_integral {
                VolumeIntegral::SubcellLimiting(_) => ElementCache {
                    antidiffusive: vec![[0.0; N]; D * layout.n_face_nodes() * (layout.n() - 1)],
                    bounds: vec![0.0; n_nodes * slots.len()],
                    alpha: vec![0.0; n_nodes],
                },
                _ => ElementCache {
                    antidiffusive: Vec::new(),
                    bounds: Vec::new(),
                    alpha: Vec::new(),
                },
            })
            .collect();

        let neighbors = match &volume_integral {
            VolumeIntegral::ShockCapturingHG(indicator) if indicator.alpha_smooth() => mesh.element_neighbors(),
            _ => Vec::new(),
        };

        let total_volume: f64 = geometry
            .jacobian
            .chunks(n_nodes)
            .map(|jac| {
                jac.iter()
                    .enumerate()
                    .map(|(node, j)| basis.volume_weight(&layout, node) * j)
                    .sum::<f64>()
            })
            .sum();

        log::info!(
            "DGSEM: {} elements, {} mortars, polydeg {}, {} volume integral, surface flux {}, volume flux {}",
            n_elements,
            mesh.mortars().len(),
            polydeg,
            volume_integral.name(),
            surface_flux.name(),
            volume_flux.name()
        );

        Ok(Self {
            variable_names: equations.variable_names(),
            scratch: ScratchPool::new(|| ElementScratch::new(&layout)),
            element_alpha: vec![0.0; n_elements],
            alpha_previous: Vec::with_capacity(n_elements),
            mesh,
            equations,
            basis,
            layout,
            geometry,
            surface_flux,
            volume_flux,
            volume_integral,
            boundary_conditions,
            source_terms: None,
            subcell_normals,
            faces,
            neighbors,
            caches,
            slots,
            total_volume,
        })
    }

    /// Add a source term to the residual.
    pub fn with_source_terms<S>(mut self, source_terms: S) -> Self
    where
        S: SourceTerms<E, N> + 'static,
    {
        log::debug!("Using source terms: {}", source_terms.name());
        self.source_terms = Some(Arc::new(source_terms));
        self
    }

    pub fn mesh(&self) -> &TreeMesh<D> {
        &self.mesh
    }

    pub fn equations(&self) -> &E {
        &self.equations
    }

    pub fn basis(&self) -> &LobattoBasis {
        &self.basis
    }

    pub fn geometry(&self) -> &ElementGeometry {
        &self.geometry
    }

    pub fn volume_integral(&self) -> &VolumeIntegral<E, N> {
        &self.volume_integral
    }

    /// Number of elements.
    pub fn n_elements(&self) -> usize {
        self.mesh.n_elements()
    }

    /// Nodes per element.
    pub fn n_nodes(&self) -> usize {
        self.layout.n_nodes()
    }

    /// Total volume of the domain.
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    /// Zero solution of the right shape.
    pub fn allocate_solution(&self) -> Solution<N> {
        Solution::new(self.n_elements(), self.n_nodes())
    }

    /// Interpolate `initial_condition(x, t)` at the solution nodes.
    pub fn compute_coefficients<F>(&self, initial_condition: F, t: f64) -> Solution<N>
    where
        F: Fn(&Direction, f64) -> [f64; N],
    {
        let mut u = self.allocate_solution();
        for (value, x) in u.data.iter_mut().zip(&self.geometry.coordinates) {
            *value = initial_condition(x, t);
        }
        u
    }

    /// Blending factors of the last shock-capturing residual, one per element.
    pub fn element_alpha(&self) -> &[f64] {
        &self.element_alpha
    }

    /// Subcell blending factors of element `k` from the last limited
    /// residual, one per node (empty without subcell limiting).
    pub fn subcell_alpha(&self, k: usize) -> &[f64] {
        &self.caches[k].alpha
    }

    fn check_shape(&self, u: &Solution<N>, what: &str) -> Result<()> {
        if u.n_elements != self.n_elements() || u.n_nodes != self.n_nodes() || u.data.len() != u.n_elements * u.n_nodes
        {
            return Err(DgError::InvalidConfiguration(format!(
                "{} has shape {} x {}, expected {} x {}",
                what,
                u.n_elements,
                u.n_nodes,
                self.n_elements(),
                self.n_nodes()
            )));
        }
        Ok(())
    }

    /// Evaluate the residual `du = L(u, t)`.
    ///
    /// `dt` is the step size of the forward Euler stage the residual will be
    /// used for; only the subcell limiter reads it.
    pub fn rhs(&mut self, du: &mut Solution<N>, u: &Solution<N>, t: f64, dt: f64) -> Result<()> {
        self.check_shape(u, "state")?;
        self.check_shape(du, "residual")?;
        if let Some((element, node, variable, value)) = u.find_non_finite() {
            return Err(DgError::NonFiniteState {
                element,
                node,
                variable,
                value,
            });
        }
        let limiting = matches!(self.volume_integral, VolumeIntegral::SubcellLimiting(_));
        if limiting && !(dt > 0.0 && dt.is_finite()) {
            return Err(DgError::InvalidTimeStep { dt });
        }

        self.compute_element_alpha(u)?;

        // Phase 1: one flux evaluation per face node.
        let kernels = FaceKernels {
            mesh: &self.mesh,
            layout: &self.layout,
            basis: &self.basis,
            geometry: &self.geometry,
            equations: &self.equations,
            surface_flux: &self.surface_flux,
            boundary_conditions: &self.boundary_conditions,
            with_bar_states: limiting,
        };
        kernels.interfaces(u, &mut self.faces.interfaces)?;
        kernels.boundaries(u, t, &mut self.faces.boundaries)?;
        kernels.mortars(u, &mut self.faces.mortars)?;

        // Phase 2: element-local assembly.
        let n_nodes = self.layout.n_nodes();
        let layout = &self.layout;
        let basis = &self.basis;
        let geometry = &self.geometry;
        let equations = &self.equations;
        let surface_flux = &self.surface_flux;
        let volume_flux = &self.volume_flux;
        let volume_integral = &self.volume_integral;
        let source_terms = self.source_terms.as_deref();
        let faces = &self.faces;
        let normals = &self.subcell_normals;
        let element_alpha = &self.element_alpha;
        let slots = &self.slots;
        let variable_names = &self.variable_names;
        let scratch = &self.scratch;

        let n = layout.n();
        let nfn = layout.n_face_nodes();
        let normals_per_element = D * nfn * (n + 1);
        let antidiffusive_per_axis = nfn * (n - 1);

        try_for_each_element(&mut du.data, n_nodes, &mut self.caches, |k, du_k, cache| {
            let u_k = u.element(k);
            let contravariant = geometry.element_contravariant(k);
            let inverse_jacobian = geometry.element_inverse_jacobian(k);
            let normals_k = if normals.is_empty() {
                &[][..]
            } else {
                &normals[k * normals_per_element..(k + 1) * normals_per_element]
            };

            scratch
                .with(|s| -> Result<()> {
                    s.volume.fill([0.0; N]);
                    match volume_integral {
                        VolumeIntegral::WeakForm => weak_form_kernel(
                            &mut s.volume,
                            u_k,
                            contravariant,
                            equations,
                            basis,
                            layout,
                            &mut s.flux,
                            &mut s.derivative,
                        ),
                        VolumeIntegral::FluxDifferencing => flux_differencing_kernel(
                            &mut s.volume,
                            u_k,
                            contravariant,
                            equations,
                            volume_flux,
                            basis,
                            layout,
                        ),
                        VolumeIntegral::ShockCapturingHG(_) => {
                            flux_differencing_kernel(
                                &mut s.volume,
                                u_k,
                                contravariant,
                                equations,
                                volume_flux,
                                basis,
                                layout,
                            );
                            let alpha = element_alpha[k];
                            if alpha > 0.0 {
                                s.low_order.fill([0.0; N]);
                                subcell_fv_kernel(&mut s.low_order, u_k, normals_k, equations, surface_flux, basis, layout);
                                for (high, low) in s.volume.iter_mut().zip(&s.low_order) {
                                    for v in 0..N {
                                        high[v] = (1.0 - alpha) * high[v] + alpha * low[v];
                                    }
                                }
                            }
                        }
                        VolumeIntegral::SubcellLimiting(_) => {
                            s.low_order.fill([0.0; N]);
                            for axis in 0..D {
                                s.flux.fill([0.0; N]);
                                flux_differencing_axis(
                                    &mut s.flux,
                                    axis,
                                    u_k,
                                    contravariant,
                                    equations,
                                    volume_flux,
                                    basis,
                                    layout,
                                );
                                for (acc, f) in s.volume.iter_mut().zip(&s.flux) {
                                    for v in 0..N {
                                        acc[v] += f[v];
                                    }
                                }
                                let axis_normals = &normals_k[axis * nfn * (n + 1)..(axis + 1) * nfn * (n + 1)];
                                let axis_antidiffusive = &mut cache.antidiffusive
                                    [axis * antidiffusive_per_axis..(axis + 1) * antidiffusive_per_axis];
                                subcell_fluxes_axis(
                                    axis,
                                    u_k,
                                    axis_normals,
                                    &s.flux,
                                    &mut s.low_order,
                                    axis_antidiffusive,
                                    layout,
                                    &basis.weights,
                                    &basis.inverse_weights,
                                    equations,
                                    surface_flux,
                                );
                            }
                        }
                    }

                    s.surface.fill([0.0; N]);
                    surface_integral(&mut s.surface, k, u_k, faces, geometry, basis, equations, surface_flux);

                    // High-order residual; the limiter starts from the low-order one.
                    let volume = match volume_integral {
                        VolumeIntegral::SubcellLimiting(_) => &s.low_order,
                        _ => &s.volume,
                    };
                    for node in 0..n_nodes {
                        for v in 0..N {
                            du_k[node][v] = -inverse_jacobian[node] * (volume[node][v] + s.surface[node][v]);
                        }
                    }
                    if let Some(source_terms) = source_terms {
                        let x = geometry.element_coordinates(k);
                        for node in 0..n_nodes {
                            let s_node = source_terms.source(&u_k[node], &x[node], t, equations);
                            for v in 0..N {
                                du_k[node][v] += s_node[v];
                            }
                        }
                    }

                    if let VolumeIntegral::SubcellLimiting(limiter) = volume_integral {
                        for face in 0..layout.n_faces() {
                            for j in 0..nfn {
                                let bar = faces.bar_state(k, face, j).ok_or_else(|| {
                                    DgError::MeshInconsistency(format!(
                                        "face {} of element {} has no bar state",
                                        face, k
                                    ))
                                })?;
                                s.face_bar[face * nfn + j] = *bar;
                            }
                        }
                        let input = ElementLimiterInput {
                            limiter,
                            slots,
                            variable_names,
                            equations,
                            layout,
                            inverse_weights: &basis.inverse_weights,
                            u: u_k,
                            inverse_jacobian,
                            normals: normals_k,
                            face_bar_states: &s.face_bar,
                            antidiffusive: &cache.antidiffusive,
                            dt,
                        };
                        let mut output = ElementLimiterOutput {
                            du: du_k,
                            bounds: &mut cache.bounds,
                            alpha: &mut cache.alpha,
                            u_safe: &mut s.u_safe,
                        };
                        limit_element(&input, &mut output)?;
                    }
                    Ok(())
                })
                .map_err(|e| e.at_element(k))
        })?;

        if let Some((element, node, variable, value)) = du.find_non_finite() {
            return Err(DgError::NonFiniteState {
                element,
                node,
                variable,
                value,
            });
        }
        Ok(())
    }

    /// Shock-capturing blending factors, smoothed across neighbors.
    fn compute_element_alpha(&mut self, u: &Solution<N>) -> Result<()> {
        let VolumeIntegral::ShockCapturingHG(indicator) = &self.volume_integral else {
            return Ok(());
        };
        let equations = &self.equations;
        let basis = &self.basis;
        let layout = &self.layout;
        let scratch = &self.scratch;
        try_for_each_mut(&mut self.element_alpha, |k, alpha| {
            *alpha = scratch
                .with(|s| indicator.element_alpha(u.element(k), equations, basis, layout, &mut s.indicator))
                .map_err(|e| e.at_element(k))?;
            Ok(())
        })?;
        if indicator.alpha_smooth() {
            smooth_alpha(&mut self.element_alpha, &self.neighbors, &mut self.alpha_previous);
        }
        Ok(())
    }

    /// Largest stable step size for the given CFL number:
    /// `cfl * 2 / (nnodes * max Σ_axis λ_axis / J)`.
    pub fn max_dt(&self, u: &Solution<N>, cfl: f64) -> Result<f64> {
        self.check_shape(u, "state")?;
        if let Some((element, node, variable, value)) = u.find_non_finite() {
            return Err(DgError::NonFiniteState {
                element,
                node,
                variable,
                value,
            });
        }
        let geometry = &self.geometry;
        let equations = &self.equations;
        let n_nodes = self.layout.n_nodes();
        let max_scaled_speed = max_over(self.n_elements(), |k| {
            let u_k = u.element(k);
            let contravariant = geometry.element_contravariant(k);
            let inverse_jacobian = geometry.element_inverse_jacobian(k);
            let mut max_speed: f64 = 0.0;
            for node in 0..n_nodes {
                let speed: f64 = (0..D)
                    .map(|axis| equations.max_abs_speed(&u_k[node], &u_k[node], &contravariant[node][axis]))
                    .sum();
                max_speed = max_speed.max(speed * inverse_jacobian[node]);
            }
            max_speed
        });
        if !(max_scaled_speed > 0.0) {
            return Err(DgError::InvalidTimeStep { dt: f64::INFINITY });
        }
        Ok(cfl * 2.0 / (self.basis.nnodes() as f64 * max_scaled_speed))
    }

    /// Integral of every conservative variable over the domain.
    pub fn integrate(&self, u: &Solution<N>) -> [f64; N] {
        let mut total = [0.0; N];
        for k in 0..self.n_elements() {
            let jacobian = self.geometry.element_jacobian(k);
            for (node, state) in u.element(k).iter().enumerate() {
                let w = self.basis.volume_weight(&self.layout, node) * jacobian[node];
                for v in 0..N {
                    total[v] += w * state[v];
                }
            }
        }
        total
    }

    /// Integral of `f(u)` over the domain.
    pub fn integrate_scalar<F>(&self, u: &Solution<N>, f: F) -> f64
    where
        F: Fn(&[f64; N], &E) -> f64,
    {
        let mut total = 0.0;
        for k in 0..self.n_elements() {
            let jacobian = self.geometry.element_jacobian(k);
            for (node, state) in u.element(k).iter().enumerate() {
                total += self.basis.volume_weight(&self.layout, node) * jacobian[node] * f(state, &self.equations);
            }
        }
        total
    }

    /// Discrete L2 (normalized by the domain volume) and L∞ errors against
    /// `exact(x, t)`, evaluated at the solution nodes.
    pub fn calc_error_norms<F>(&self, u: &Solution<N>, exact: F, t: f64) -> ([f64; N], [f64; N])
    where
        F: Fn(&Direction, f64) -> [f64; N],
    {
        let mut l2 = [0.0; N];
        let mut linf: [f64; N] = [0.0; N];
        for k in 0..self.n_elements() {
            let jacobian = self.geometry.element_jacobian(k);
            let x = self.geometry.element_coordinates(k);
            for (node, state) in u.element(k).iter().enumerate() {
                let reference = exact(&x[node], t);
                let w = self.basis.volume_weight(&self.layout, node) * jacobian[node];
                for v in 0..N {
                    let e = state[v] - reference[v];
                    l2[v] += w * e * e;
                    linf[v] = linf[v].max(e.abs());
                }
            }
        }
        (l2.map(|x| (x / self.total_volume).sqrt()), linf)
    }

    fn slot_label(&self, limiter_slot: BoundSlot) -> String {
        let VolumeIntegral::SubcellLimiting(limiter) = &self.volume_integral else {
            return String::new();
        };
        let name = limiter.slot_name(limiter_slot, &self.variable_names);
        match limiter_slot {
            BoundSlot::PositivityCons(_) | BoundSlot::PositivityNonlinear(_) => format!("{} (positivity)", name),
            slot if slot.is_lower() => format!("{} (min)", name),
            _ => format!("{} (max)", name),
        }
    }

    /// Compare `u` with the bounds of the last limited residual.
    ///
    /// Meant for the forward Euler result `u + dt du` of that residual. A
    /// node violates a bound if it crosses it by more than
    /// `tolerance * max(|bound|, 1)`.
    pub fn check_bounds(&self, u: &Solution<N>, tolerance: f64) -> BoundsReport {
        let VolumeIntegral::SubcellLimiting(limiter) = &self.volume_integral else {
            return BoundsReport::default();
        };
        let n_slots = self.slots.len();
        let labels: Vec<String> = self.slots.iter().map(|&slot| self.slot_label(slot)).collect();
        let mut max_deviation = vec![f64::NEG_INFINITY; n_slots];
        let mut violations = Vec::new();

        for (k, cache) in self.caches.iter().enumerate() {
            for (node, state) in u.element(k).iter().enumerate() {
                for (s, &slot) in self.slots.iter().enumerate() {
                    let bound = cache.bounds[node * n_slots + s];
                    let value = slot.value(state, limiter, &self.equations);
                    let deviation = slot.deviation(value, bound);
                    max_deviation[s] = max_deviation[s].max(deviation);
                    if !(deviation <= tolerance * bound.abs().max(1.0)) {
                        violations.push(BoundsViolation {
                            element: k,
                            node,
                            variable: labels[s].clone(),
                            bound,
                            value,
                            magnitude: deviation,
                        });
                    }
                }
            }
        }

        BoundsReport {
            max_deviation: labels.into_iter().zip(max_deviation).collect(),
            violations,
        }
    }
}

impl<E, SF, VF, const N: usize, const D: usize> Semidiscretization for DgSemidiscretization<E, SF, VF, N, D>
where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
    VF: NumericalFlux<E, N>,
{
    type State = Solution<N>;

    fn rhs(&mut self, du: &mut Solution<N>, u: &Solution<N>, t: f64, dt: f64) -> Result<()> {
        DgSemidiscretization::rhs(self, du, u, t, dt)
    }

    fn max_dt(&self, u: &Solution<N>, cfl: f64) -> Result<f64> {
        DgSemidiscretization::max_dt(self, u, cfl)
    }

    fn requires_ssp(&self) -> bool {
        matches!(self.volume_integral, VolumeIntegral::SubcellLimiting(_))
    }

    fn check_bounds(&self, u: &Solution<N>, tolerance: f64) -> BoundsReport {
        DgSemidiscretization::check_bounds(self, u, tolerance)
    }

    fn integrals(&self, u: &Solution<N>) -> Vec<(String, f64)> {
        let mut integrals: Vec<(String, f64)> = self
            .variable_names
            .iter()
            .zip(self.integrate(u))
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        integrals.push((
            "entropy".to_string(),
            self.integrate_scalar(u, |state, eq| eq.entropy(state)),
        ));
        integrals
    }
}

impl<E, SF, VF, const N: usize, const D: usize> AnalysisCallback<DgSemidiscretization<E, SF, VF, N, D>>
where
    E: Equations<N> + 'static,
    SF: NumericalFlux<E, N> + 'static,
    VF: NumericalFlux<E, N> + 'static,
{
    /// Record L2 and L∞ errors against `exact(x, t)` at every analysis step.
    pub fn with_exact_solution<F>(self, exact: F) -> Self
    where
        F: Fn(&Direction, f64) -> [f64; N] + 'static,
    {
        self.with_error_norms(move |semi: &DgSemidiscretization<E, SF, VF, N, D>, u: &Solution<N>, t: f64| {
            let (l2, linf) = semi.calc_error_norms(u, &exact, t);
            semi.variable_names
                .iter()
                .enumerate()
                .map(|(v, name)| (name.to_string(), l2[v], linf[v]))
                .collect()
        })
    }
}

fn validate_fluxes<E, SF, VF, const N: usize, const D: usize>(
    volume_integral: &VolumeIntegral<E, N>,
    surface_flux: &SF,
    volume_flux: &VF,
    mesh: &TreeMesh<D>,
) -> Result<()>
where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
    VF: NumericalFlux<E, N>,
{
    let nonconservative = surface_flux.has_nonconservative_terms();
    if volume_integral.uses_volume_flux() {
        if !volume_flux.is_symmetric() {
            return Err(DgError::InvalidConfiguration(format!(
                "volume flux {} is not symmetric",
                volume_flux.name()
            )));
        }
        if volume_flux.has_nonconservative_terms() != nonconservative {
            return Err(DgError::InvalidConfiguration(
                "surface and volume flux disagree on nonconservative terms".to_string(),
            ));
        }
    } else if nonconservative {
        return Err(DgError::InvalidConfiguration(
            "the weak form does not support nonconservative terms".to_string(),
        ));
    }

    match volume_integral {
        VolumeIntegral::ShockCapturingHG(indicator) => indicator.validate()?,
        VolumeIntegral::SubcellLimiting(limiter) => {
            limiter.validate()?;
            if nonconservative {
                return Err(DgError::InvalidConfiguration(
                    "subcell limiting does not support nonconservative terms".to_string(),
                ));
            }
            if mesh.has_mortars() {
                return Err(DgError::InvalidConfiguration(
                    "subcell limiting does not support nonconforming meshes".to_string(),
                ));
            }
        }
        VolumeIntegral::WeakForm | VolumeIntegral::FluxDifferencing => {}
    }
    Ok(())
}

/// Both sides of every conforming interface must see opposite normals at
/// matching nodes.
fn check_interface_normals<const D: usize>(mesh: &TreeMesh<D>, geometry: &ElementGeometry) -> Result<()> {
    let nfn = geometry.layout().n_face_nodes();
    for interface in mesh.interfaces() {
        let (left, right) = (interface.left, interface.right);
        for t in 0..nfn {
            let n_left = geometry.face_normal(left.element, left.face, t);
            let n_right = geometry.face_normal(right.element, right.face, t);
            let sum = [n_left[0] + n_right[0], n_left[1] + n_right[1], n_left[2] + n_right[2]];
            if norm(&sum) > 1e-10 * norm(&n_left).max(1.0) {
                return Err(DgError::MeshInconsistency(format!(
                    "normals of elements {} and {} do not match at face node {}",
                    left.element, right.element, t
                )));
            }
        }
    }
    Ok(())
}

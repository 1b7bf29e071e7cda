//! Face coupling: interface, boundary and mortar fluxes and the surface
//! integral.
//!
//! The residual is assembled in two phases. Phase 1 evaluates the numerical
//! flux once per face node and stores, for every element face, the value
//! that element needs (interfaces, boundaries and mortars are processed in
//! parallel, each writing only its own buffer). Phase 2 runs per element
//! and reads those values through [`FaceSource`], so no two threads ever
//! write the same residual entry.
//!
//! Stored values are already oriented with the reading element's outward
//! normal and include half of the nonconservative term:
//!
//! ```text
//! value = f*(u_own, u_other, n_own) + ½ φ(u_own, u_other, n_own)
//! ```

use super::parallel::{try_for_each_chunk, try_for_each_mut};
use super::solution::Solution;
use super::subcell::bar_state;
use crate::boundary::BoundaryConditions;
use crate::equations::{Direction, Equations};
use crate::error::{DgError, Result};
use crate::flux::NumericalFlux;
use crate::mesh::TreeMesh;
use crate::operators::{ElementGeometry, LobattoBasis, MortarPosition, TensorLayout};

/// Where an element face reads its surface flux from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FaceSource {
    Interface { index: usize, side: usize },
    Boundary { index: usize },
    MortarSmall { index: usize, position: usize },
    MortarLarge { index: usize },
}

/// Interface node: one value per side plus the bar state.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InterfaceNode<const N: usize> {
    pub values: [[f64; N]; 2],
    pub bar: [f64; N],
}

/// Boundary node: the interior value plus the bar state.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BoundaryNode<const N: usize> {
    pub value: [f64; N],
    pub bar: [f64; N],
}

/// Values and scratch of one mortar.
#[derive(Clone, Debug)]
pub(crate) struct MortarBuffer<const N: usize> {
    /// `[position * nfn + t]`
    small: Vec<[f64; N]>,
    large: Vec<[f64; N]>,
    u_large: Vec<[f64; N]>,
    u_mortar: Vec<[f64; N]>,
    large_mortar: Vec<[f64; N]>,
}

impl<const N: usize> MortarBuffer<N> {
    fn new(nfn: usize) -> Self {
        Self {
            small: vec![[0.0; N]; 2 * nfn],
            large: vec![[0.0; N]; nfn],
            u_large: vec![[0.0; N]; nfn],
            u_mortar: vec![[0.0; N]; nfn],
            large_mortar: vec![[0.0; N]; nfn],
        }
    }
}

/// Phase-1 output for all faces of the mesh.
pub(crate) struct FaceBuffers<const N: usize> {
    nfn: usize,
    n_faces: usize,
    pub interfaces: Vec<InterfaceNode<N>>,
    pub boundaries: Vec<BoundaryNode<N>>,
    pub mortars: Vec<MortarBuffer<N>>,
    face_sources: Vec<FaceSource>,
}

impl<const N: usize> FaceBuffers<N> {
    /// Allocate the buffers and map every element face to exactly one source.
    pub(crate) fn new<const D: usize>(mesh: &TreeMesh<D>, layout: &TensorLayout) -> Result<Self> {
        let nfn = layout.n_face_nodes();
        let n_faces = layout.n_faces();
        let mut sources: Vec<Option<FaceSource>> = vec![None; mesh.n_elements() * n_faces];

        let mut assign = |element: usize, face: usize, source: FaceSource| -> Result<()> {
            let slot = sources.get_mut(element * n_faces + face).ok_or_else(|| {
                DgError::MeshInconsistency(format!("face {} of element {} out of range", face, element))
            })?;
            if slot.is_some() {
                return Err(DgError::MeshInconsistency(format!(
                    "face {} of element {} is connected twice",
                    face, element
                )));
            }
            *slot = Some(source);
            Ok(())
        };

        for (index, interface) in mesh.interfaces().iter().enumerate() {
            assign(interface.left.element, interface.left.face, FaceSource::Interface { index, side: 0 })?;
            assign(interface.right.element, interface.right.face, FaceSource::Interface { index, side: 1 })?;
        }
        for (index, boundary) in mesh.boundaries().iter().enumerate() {
            assign(boundary.element, boundary.face, FaceSource::Boundary { index })?;
        }
        for (index, mortar) in mesh.mortars().iter().enumerate() {
            assign(mortar.large.element, mortar.large.face, FaceSource::MortarLarge { index })?;
            for (position, small) in mortar.small.iter().enumerate() {
                assign(small.element, small.face, FaceSource::MortarSmall { index, position })?;
            }
        }

        let face_sources = sources
            .into_iter()
            .enumerate()
            .map(|(i, source)| {
                source.ok_or_else(|| {
                    DgError::MeshInconsistency(format!(
                        "face {} of element {} is not connected",
                        i % n_faces,
                        i / n_faces
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            nfn,
            n_faces,
            interfaces: vec![
                InterfaceNode {
                    values: [[0.0; N]; 2],
                    bar: [0.0; N],
                };
                mesh.interfaces().len() * nfn
            ],
            boundaries: vec![
                BoundaryNode {
                    value: [0.0; N],
                    bar: [0.0; N],
                };
                mesh.boundaries().len() * nfn
            ],
            mortars: (0..mesh.mortars().len()).map(|_| MortarBuffer::new(nfn)).collect(),
            face_sources,
        })
    }

    /// Surface flux value for node `t` of `face` of element `k`.
    #[inline]
    pub(crate) fn value(&self, k: usize, face: usize, t: usize) -> &[f64; N] {
        match self.face_sources[k * self.n_faces + face] {
            FaceSource::Interface { index, side } => &self.interfaces[index * self.nfn + t].values[side],
            FaceSource::Boundary { index } => &self.boundaries[index * self.nfn + t].value,
            FaceSource::MortarSmall { index, position } => &self.mortars[index].small[position * self.nfn + t],
            FaceSource::MortarLarge { index } => &self.mortars[index].large[t],
        }
    }

    /// Bar state for node `t` of `face` of element `k` (conforming faces only).
    #[inline]
    pub(crate) fn bar_state(&self, k: usize, face: usize, t: usize) -> Option<&[f64; N]> {
        match self.face_sources[k * self.n_faces + face] {
            FaceSource::Interface { index, .. } => Some(&self.interfaces[index * self.nfn + t].bar),
            FaceSource::Boundary { index } => Some(&self.boundaries[index * self.nfn + t].bar),
            FaceSource::MortarSmall { .. } | FaceSource::MortarLarge { .. } => None,
        }
    }
}

#[inline]
fn add_half<const N: usize>(f: &mut [f64; N], phi: &[f64; N]) {
    for v in 0..N {
        f[v] += 0.5 * phi[v];
    }
}

#[inline]
fn negated(n: &Direction) -> Direction {
    [-n[0], -n[1], -n[2]]
}

/// Shared inputs of the phase-1 face kernels.
pub(crate) struct FaceKernels<'a, E: Equations<N>, SF, const N: usize, const D: usize> {
    pub mesh: &'a TreeMesh<D>,
    pub layout: &'a TensorLayout,
    pub basis: &'a LobattoBasis,
    pub geometry: &'a ElementGeometry,
    pub equations: &'a E,
    pub surface_flux: &'a SF,
    pub boundary_conditions: &'a BoundaryConditions<E, N>,
    pub with_bar_states: bool,
}

impl<E, SF, const N: usize, const D: usize> FaceKernels<'_, E, SF, N, D>
where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
{
    #[inline]
    fn trace(&self, u: &Solution<N>, element: usize, face: usize, t: usize) -> [f64; N] {
        u.get(element, self.layout.face_node(face, t))
    }

    /// Fluxes on all conforming interior faces.
    pub(crate) fn interfaces(&self, u: &Solution<N>, out: &mut [InterfaceNode<N>]) -> Result<()> {
        let nfn = self.layout.n_face_nodes();
        let nonconservative = self.surface_flux.has_nonconservative_terms();
        let interfaces = self.mesh.interfaces();
        try_for_each_chunk(out, nfn, |index, nodes| {
            let interface = &interfaces[index];
            let (left, right) = (interface.left, interface.right);
            for (t, node) in nodes.iter_mut().enumerate() {
                let u_ll = self.trace(u, left.element, left.face, t);
                let u_rr = self.trace(u, right.element, right.face, t);
                let normal = self.geometry.face_normal(left.element, left.face, t);

                let f = self.surface_flux.flux(&u_ll, &u_rr, &normal, self.equations);
                let mut value_left = f;
                let mut value_right = f.map(|x| -x);
                if nonconservative {
                    let phi_left = self.surface_flux.nonconservative(&u_ll, &u_rr, &normal, self.equations);
                    let phi_right =
                        self.surface_flux
                            .nonconservative(&u_rr, &u_ll, &negated(&normal), self.equations);
                    add_half(&mut value_left, &phi_left);
                    add_half(&mut value_right, &phi_right);
                }
                node.values = [value_left, value_right];
                if self.with_bar_states {
                    node.bar = bar_state(&u_ll, &u_rr, &normal, self.equations);
                }
            }
            Ok(())
        })
    }

    /// Fluxes on all physical boundary faces at time `time`.
    pub(crate) fn boundaries(&self, u: &Solution<N>, time: f64, out: &mut [BoundaryNode<N>]) -> Result<()> {
        let nfn = self.layout.n_face_nodes();
        let nonconservative = self.surface_flux.has_nonconservative_terms();
        let boundaries = self.mesh.boundaries();
        try_for_each_chunk(out, nfn, |index, nodes| {
            let boundary = &boundaries[index];
            let condition = self.boundary_conditions.get(boundary.tag).ok_or_else(|| {
                DgError::InvalidConfiguration(format!("no boundary condition on {:?}", boundary.tag))
            })?;
            for (t, node) in nodes.iter_mut().enumerate() {
                let u_inner = self.trace(u, boundary.element, boundary.face, t);
                let normal = self.geometry.face_normal(boundary.element, boundary.face, t);
                let x = self.geometry.face_coordinates(boundary.element, boundary.face, t);

                let mut value = condition.boundary_flux(&u_inner, &normal, &x, time, self.surface_flux, self.equations);
                if nonconservative || self.with_bar_states {
                    let u_outer = condition.external_state(&u_inner, &normal, &x, time, self.equations);
                    if nonconservative {
                        let phi = self.surface_flux.nonconservative(&u_inner, &u_outer, &normal, self.equations);
                        add_half(&mut value, &phi);
                    }
                    if self.with_bar_states {
                        node.bar = bar_state(&u_inner, &u_outer, &normal, self.equations);
                    }
                }
                node.value = value;
            }
            Ok(())
        })
    }

    /// Fluxes on all 2:1 nonconforming faces.
    ///
    /// The large trace is interpolated to each half, the flux is evaluated
    /// there with the small element's normal, and the large side receives
    /// the L2 projection of the mortar fluxes.
    pub(crate) fn mortars(&self, u: &Solution<N>, out: &mut [MortarBuffer<N>]) -> Result<()> {
        let nfn = self.layout.n_face_nodes();
        let nonconservative = self.surface_flux.has_nonconservative_terms();
        let mortar_ops = &self.basis.mortar;
        let mortars = self.mesh.mortars();
        try_for_each_mut(out, |index, buffer| {
            let mortar = &mortars[index];
            for t in 0..nfn {
                buffer.u_large[t] = self.trace(u, mortar.large.element, mortar.large.face, t);
            }
            buffer.large.iter_mut().for_each(|x| *x = [0.0; N]);

            for (position, small) in MortarPosition::ALL.into_iter().zip(mortar.small) {
                let p = match position {
                    MortarPosition::Lower => 0,
                    MortarPosition::Upper => 1,
                };
                mortar_ops.apply(mortar_ops.forward(position), &buffer.u_large, &mut buffer.u_mortar);

                for t in 0..nfn {
                    let u_small = self.trace(u, small.element, small.face, t);
                    let u_large = buffer.u_mortar[t];
                    let normal = self.geometry.face_normal(small.element, small.face, t);

                    let f = self.surface_flux.flux(&u_small, &u_large, &normal, self.equations);
                    let mut value_small = f;
                    let mut value_large = f.map(|x| -2.0 * x);
                    if nonconservative {
                        let phi_small = self.surface_flux.nonconservative(&u_small, &u_large, &normal, self.equations);
                        let phi_large =
                            self.surface_flux
                                .nonconservative(&u_large, &u_small, &negated(&normal), self.equations);
                        add_half(&mut value_small, &phi_small);
                        for v in 0..N {
                            value_large[v] += phi_large[v];
                        }
                    }
                    buffer.small[p * nfn + t] = value_small;
                    buffer.large_mortar[t] = value_large;
                }
                mortar_ops.apply_add(mortar_ops.reverse(position), &buffer.large_mortar, &mut buffer.large);
            }
            Ok(())
        })
    }
}

/// Add the strong-form surface term of element `k` to `acc`:
/// (1/w_0) (value - f(u)·n - ½ φ(u, u, n)) at every face node.
#[allow(clippy::too_many_arguments)]
pub(crate) fn surface_integral<E, SF, const N: usize>(
    acc: &mut [[f64; N]],
    k: usize,
    u: &[[f64; N]],
    faces: &FaceBuffers<N>,
    geometry: &ElementGeometry,
    basis: &LobattoBasis,
    equations: &E,
    surface_flux: &SF,
) where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
{
    let layout = geometry.layout();
    let inv_w = basis.inverse_weights[0];
    let nonconservative = surface_flux.has_nonconservative_terms();
    for face in 0..layout.n_faces() {
        for t in 0..layout.n_face_nodes() {
            let node = layout.face_node(face, t);
            let normal = geometry.face_normal(k, face, t);
            let mut local = equations.flux(&u[node], &normal);
            if nonconservative {
                let phi = surface_flux.nonconservative(&u[node], &u[node], &normal, equations);
                add_half(&mut local, &phi);
            }
            let value = faces.value(k, face, t);
            for v in 0..N {
                acc[node][v] += inv_w * (value[v] - local[v]);
            }
        }
    }
}

//! Volume integral kernels.
//!
//! Every kernel *adds* its contribution to `acc`; the residual is
//! `du = -(1/J) (volume + surface)`. Fluxes are contracted with the
//! contravariant vectors Ja^axis, so all kernels work unchanged on curved
//! elements.
//!
//! - weak form: Σ_j D_ij f(u_j)·Ja_j
//! - flux differencing: Σ_j 2 D_ij f#(u_i, u_j)·{{Ja}}_ij + D_ij φ(u_i, u_j)
//! - subcell finite volume: (F_{i+1/2} - F_{i-1/2}) / w_i with first-order
//!   fluxes on the subcell interfaces

use crate::equations::{Direction, Equations};
use crate::flux::NumericalFlux;
use crate::operators::{ElementGeometry, LobattoBasis, TensorLayout, apply_along_axis};

#[inline]
fn average(a: &Direction, b: &Direction) -> Direction {
    [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1]), 0.5 * (a[2] + b[2])]
}

#[inline]
fn add_scaled<const N: usize>(acc: &mut [f64; N], factor: f64, f: &[f64; N]) {
    for v in 0..N {
        acc[v] += factor * f[v];
    }
}

/// Collocation weak form Σ_axis D (f·Ja^axis).
///
/// `flux` and `derivative` are scratch buffers of one element.
#[allow(clippy::too_many_arguments)]
pub(crate) fn weak_form_kernel<E: Equations<N>, const N: usize>(
    acc: &mut [[f64; N]],
    u: &[[f64; N]],
    contravariant: &[[Direction; 3]],
    equations: &E,
    basis: &LobattoBasis,
    layout: &TensorLayout,
    flux: &mut [[f64; N]],
    derivative: &mut [[f64; N]],
) {
    for axis in 0..layout.ndims() {
        for ((f, state), ja) in flux.iter_mut().zip(u).zip(contravariant) {
            *f = equations.flux(state, &ja[axis]);
        }
        apply_along_axis(layout, &basis.derivative_matrix, axis, flux, derivative);
        for (a, d) in acc.iter_mut().zip(derivative.iter()) {
            add_scaled(a, 1.0, d);
        }
    }
}

/// Flux-differencing volume term along one axis.
///
/// Only pairs j > i are evaluated: the volume flux is symmetric and the
/// diagonal term reduces to the physical flux by consistency.
#[allow(clippy::too_many_arguments)]
pub(crate) fn flux_differencing_axis<E, VF, const N: usize>(
    acc: &mut [[f64; N]],
    axis: usize,
    u: &[[f64; N]],
    contravariant: &[[Direction; 3]],
    equations: &E,
    volume_flux: &VF,
    basis: &LobattoBasis,
    layout: &TensorLayout,
) where
    E: Equations<N>,
    VF: NumericalFlux<E, N>,
{
    let n = layout.n();
    let nonconservative = volume_flux.has_nonconservative_terms();
    for t in 0..layout.n_face_nodes() {
        for i in 0..n {
            let node_i = layout.line_node(axis, t, i);
            let u_i = &u[node_i];
            let ja_i = &contravariant[node_i][axis];

            let d_ii = basis.d(i, i);
            if d_ii != 0.0 {
                add_scaled(&mut acc[node_i], 2.0 * d_ii, &equations.flux(u_i, ja_i));
                if nonconservative {
                    let phi = volume_flux.nonconservative(u_i, u_i, ja_i, equations);
                    add_scaled(&mut acc[node_i], d_ii, &phi);
                }
            }

            for j in i + 1..n {
                let node_j = layout.line_node(axis, t, j);
                let u_j = &u[node_j];
                let ja_avg = average(ja_i, &contravariant[node_j][axis]);

                let f = volume_flux.flux(u_i, u_j, &ja_avg, equations);
                let d_ij = basis.d(i, j);
                let d_ji = basis.d(j, i);
                add_scaled(&mut acc[node_i], 2.0 * d_ij, &f);
                add_scaled(&mut acc[node_j], 2.0 * d_ji, &f);

                if nonconservative {
                    let phi_i = volume_flux.nonconservative(u_i, u_j, &ja_avg, equations);
                    let phi_j = volume_flux.nonconservative(u_j, u_i, &ja_avg, equations);
                    add_scaled(&mut acc[node_i], d_ij, &phi_i);
                    add_scaled(&mut acc[node_j], d_ji, &phi_j);
                }
            }
        }
    }
}

/// Flux-differencing volume term along all axes.
pub(crate) fn flux_differencing_kernel<E, VF, const N: usize>(
    acc: &mut [[f64; N]],
    u: &[[f64; N]],
    contravariant: &[[Direction; 3]],
    equations: &E,
    volume_flux: &VF,
    basis: &LobattoBasis,
    layout: &TensorLayout,
) where
    E: Equations<N>,
    VF: NumericalFlux<E, N>,
{
    for axis in 0..layout.ndims() {
        flux_differencing_axis(acc, axis, u, contravariant, equations, volume_flux, basis, layout);
    }
}

/// First-order subcell finite volume term along all axes.
///
/// `normals` are the subcell interface normals of the element,
/// `[(axis * nfn + t) * (n + 1) + i]`; the outermost ones coincide with the
/// contravariant vectors at the element faces, so the end fluxes cancel
/// against the surface integral for constant states.
pub(crate) fn subcell_fv_kernel<E, SF, const N: usize>(
    acc: &mut [[f64; N]],
    u: &[[f64; N]],
    normals: &[Direction],
    equations: &E,
    surface_flux: &SF,
    basis: &LobattoBasis,
    layout: &TensorLayout,
) where
    E: Equations<N>,
    SF: NumericalFlux<E, N>,
{
    let n = layout.n();
    let nfn = layout.n_face_nodes();
    let nonconservative = surface_flux.has_nonconservative_terms();
    let inv_w = &basis.inverse_weights;

    for axis in 0..layout.ndims() {
        for t in 0..nfn {
            let line_normals = &normals[(axis * nfn + t) * (n + 1)..(axis * nfn + t + 1) * (n + 1)];

            let first = layout.line_node(axis, t, 0);
            let mut f = equations.flux(&u[first], &line_normals[0]);
            if nonconservative {
                let phi = surface_flux.nonconservative(&u[first], &u[first], &line_normals[0], equations);
                add_scaled(&mut f, 0.5, &phi);
            }
            add_scaled(&mut acc[first], -inv_w[0], &f);

            for i in 0..n - 1 {
                let left = layout.line_node(axis, t, i);
                let right = layout.line_node(axis, t, i + 1);
                let normal = &line_normals[i + 1];
                let f = surface_flux.flux(&u[left], &u[right], normal, equations);
                let mut f_left = f;
                let mut f_right = f;
                if nonconservative {
                    let phi_left = surface_flux.nonconservative(&u[left], &u[right], normal, equations);
                    let phi_right = surface_flux.nonconservative(&u[right], &u[left], normal, equations);
                    add_scaled(&mut f_left, 0.5, &phi_left);
                    add_scaled(&mut f_right, 0.5, &phi_right);
                }
                add_scaled(&mut acc[left], inv_w[i], &f_left);
                add_scaled(&mut acc[right], -inv_w[i + 1], &f_right);
            }

            let last = layout.line_node(axis, t, n - 1);
            let mut f = equations.flux(&u[last], &line_normals[n]);
            if nonconservative {
                let phi = surface_flux.nonconservative(&u[last], &u[last], &line_normals[n], equations);
                add_scaled(&mut f, 0.5, &phi);
            }
            add_scaled(&mut acc[last], inv_w[n - 1], &f);
        }
    }
}

/// Subcell interface normals of all elements:
/// n_{-1/2} = Ja_0, n_{i+1/2} = n_{i-1/2} + w_i Σ_j D_ij Ja_j, with the
/// last one pinned to Ja_{n-1} (equal up to round-off by the SBP property).
pub(crate) fn subcell_normals(geometry: &ElementGeometry, basis: &LobattoBasis, n_elements: usize) -> Vec<Direction> {
    let layout = geometry.layout();
    let n = layout.n();
    let nfn = layout.n_face_nodes();
    let ndims = layout.ndims();
    let per_element = ndims * nfn * (n + 1);
    let mut normals = vec![[0.0; 3]; n_elements * per_element];

    for (k, element_normals) in normals.chunks_mut(per_element).enumerate() {
        let ja = geometry.element_contravariant(k);
        for axis in 0..ndims {
            for t in 0..nfn {
                let line = &mut element_normals[(axis * nfn + t) * (n + 1)..(axis * nfn + t + 1) * (n + 1)];
                line[0] = ja[layout.line_node(axis, t, 0)][axis];
                for i in 0..n {
                    let mut next = line[i];
                    for j in 0..n {
                        let ja_j = &ja[layout.line_node(axis, t, j)][axis];
                        let factor = basis.weights[i] * basis.d(i, j);
                        for c in 0..3 {
                            next[c] += factor * ja_j[c];
                        }
                    }
                    line[i + 1] = next;
                }
                line[n] = ja[layout.line_node(axis, t, n - 1)][axis];
            }
        }
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{CompressibleEuler, LinearScalarAdvection};
    use crate::flux::{FluxCentral, FluxLaxFriedrichs, FluxRanocha};
    use crate::mesh::TreeMesh;

    fn curved_mesh() -> TreeMesh<2> {
        TreeMesh::new([2, 2], [-1.0, -1.0], [1.0, 1.0], [true, true])
            .unwrap()
            .with_mapping(|xi| {
                let w = 0.1 * (std::f64::consts::PI * xi[0]).sin() * (std::f64::consts::PI * xi[1]).sin();
                [xi[0] + w, xi[1] - w, 0.0]
            })
    }

    #[test]
    fn test_central_flux_differencing_matches_weak_form() {
        let eq = LinearScalarAdvection::<2>::new([1.0, 0.5]);
        let basis = LobattoBasis::new(4).unwrap();
        let mesh = TreeMesh::new([1, 1], [0.0, 0.0], [2.0, 2.0], [true, true]).unwrap();
        let geometry = ElementGeometry::compute(&mesh, &basis).unwrap();
        let layout = basis.layout(2);
        let n_nodes = layout.n_nodes();

        let u: Vec<[f64; 1]> = geometry
            .element_coordinates(0)
            .iter()
            .map(|x| [(x[0] * 1.3).sin() + x[1] * x[1]])
            .collect();
        let ja = geometry.element_contravariant(0);

        let mut weak = vec![[0.0]; n_nodes];
        let mut flux = vec![[0.0]; n_nodes];
        let mut derivative = vec![[0.0]; n_nodes];
        weak_form_kernel(&mut weak, &u, ja, &eq, &basis, &layout, &mut flux, &mut derivative);

        let mut split = vec![[0.0]; n_nodes];
        flux_differencing_kernel(&mut split, &u, ja, &eq, &FluxCentral, &basis, &layout);

        for (a, b) in weak.iter().zip(&split) {
            assert!((a[0] - b[0]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_state_volume_term_vanishes_on_curved_elements() {
        let eq = CompressibleEuler::<2>::new(1.4);
        let basis = LobattoBasis::new(3).unwrap();
        let mesh = curved_mesh();
        let geometry = ElementGeometry::compute(&mesh, &basis).unwrap();
        let layout = basis.layout(2);
        let n_nodes = layout.n_nodes();
        let u = vec![eq.initial_condition_constant([1.0, 0.3, -0.2, 2.0]); n_nodes];

        // f(u)·Σ_a D_a Ja^a, zero by the discrete metric identities
        for k in 0..mesh.n_elements() {
            let ja = geometry.element_contravariant(k);
            let mut acc = vec![[0.0; 4]; n_nodes];
            flux_differencing_kernel(&mut acc, &u, ja, &eq, &FluxRanocha, &basis, &layout);
            for value in &acc {
                assert!(value.iter().all(|x| x.abs() < 1e-12), "{:?}", value);
            }
        }
    }

    #[test]
    fn test_subcell_normals_telescope_to_face_normals() {
        let basis = LobattoBasis::new(4).unwrap();
        let mesh = curved_mesh();
        let geometry = ElementGeometry::compute(&mesh, &basis).unwrap();
        let normals = subcell_normals(&geometry, &basis, mesh.n_elements());
        let layout = basis.layout(2);
        let n = layout.n();
        let nfn = layout.n_face_nodes();

        for k in 0..mesh.n_elements() {
            let ja = geometry.element_contravariant(k);
            let element = &normals[k * 2 * nfn * (n + 1)..(k + 1) * 2 * nfn * (n + 1)];
            for axis in 0..2 {
                for t in 0..nfn {
                    let line = &element[(axis * nfn + t) * (n + 1)..];
                    // recomputed last normal before pinning
                    let mut sum = line[0];
                    for i in 0..n {
                        for j in 0..n {
                            let ja_j = &ja[layout.line_node(axis, t, j)][axis];
                            for c in 0..3 {
                                sum[c] += basis.weights[i] * basis.d(i, j) * ja_j[c];
                            }
                        }
                    }
                    for c in 0..3 {
                        assert!((sum[c] - line[n][c]).abs() < 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_fv_kernel_vanishes_inside_for_constant_state() {
        let eq = CompressibleEuler::<2>::new(1.4);
        let basis = LobattoBasis::new(3).unwrap();
        let mesh = curved_mesh();
        let geometry = ElementGeometry::compute(&mesh, &basis).unwrap();
        let normals = subcell_normals(&geometry, &basis, mesh.n_elements());
        let layout = basis.layout(2);
        let n_nodes = layout.n_nodes();
        let per_element = 2 * layout.n_face_nodes() * (layout.n() + 1);
        let u = vec![eq.initial_condition_constant([1.0, 0.3, -0.2, 2.0]); n_nodes];

        for k in 0..mesh.n_elements() {
            let mut fv = vec![[0.0; 4]; n_nodes];
            let mut dg = vec![[0.0; 4]; n_nodes];
            subcell_fv_kernel(
                &mut fv,
                &u,
                &normals[k * per_element..(k + 1) * per_element],
                &eq,
                &FluxLaxFriedrichs,
                &basis,
                &layout,
            );
            flux_differencing_kernel(&mut dg, &u, geometry.element_contravariant(k), &eq, &FluxRanocha, &basis, &layout);
            // Both operators see the same end fluxes, so they agree for constants.
            for (a, b) in fv.iter().zip(&dg) {
                for v in 0..4 {
                    assert!((a[v] - b[v]).abs() < 1e-12);
                }
            }
        }
    }
}

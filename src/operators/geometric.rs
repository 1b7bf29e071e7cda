//! Curvilinear element geometry.
//!
//! For each node the mapping X(ξ) provides the Jacobian J = det(∂X/∂ξ) and
//! the contravariant vectors Ja^i = J ∇ξ^i. Physical fluxes enter the DG
//! operator only through Ja^i, so the metric terms are computed with the same
//! collocation derivative as the solution:
//!
//! - 1D: Ja^1 = 1
//! - 2D: Ja^1 = (y_η, -x_η), Ja^2 = (-y_ξ, x_ξ)
//! - 3D: invariant curl form (Kopriva 2006)
//!
//! which satisfies the discrete metric identities Σ_i D_i Ja^i = 0 to
//! round-off and makes constant states exact steady solutions.

use super::{LobattoBasis, TensorLayout, apply_along_axis, face_axis, face_side};
use crate::equations::Direction;
use crate::error::{DgError, Result};
use crate::mesh::TreeMesh;

/// Metric terms at every node of every element (element-major).
#[derive(Clone)]
pub struct ElementGeometry {
    layout: TensorLayout,
    /// Physical node coordinates.
    pub coordinates: Vec<Direction>,
    /// Jacobian determinant J.
    pub jacobian: Vec<f64>,
    /// 1 / J.
    pub inverse_jacobian: Vec<f64>,
    /// `contravariant[node][i]` = Ja^i.
    pub contravariant: Vec<[Direction; 3]>,
}

impl ElementGeometry {
    /// Compute the geometry of all elements of `mesh`.
    pub fn compute<const D: usize>(mesh: &TreeMesh<D>, basis: &LobattoBasis) -> Result<Self> {
        let layout = basis.layout(D);
        let n_nodes = layout.n_nodes();
        let n_total = mesh.n_elements() * n_nodes;

        let mut geometry = Self {
            layout,
            coordinates: Vec::with_capacity(n_total),
            jacobian: Vec::with_capacity(n_total),
            inverse_jacobian: Vec::with_capacity(n_total),
            contravariant: Vec::with_capacity(n_total),
        };

        let mut derivatives = vec![vec![[0.0; 3]; n_nodes]; D];
        let mut curl_terms = vec![[0.0; 3]; n_nodes];
        let mut curl_derivatives = vec![vec![[0.0; 3]; n_nodes]; 3];

        for k in 0..mesh.n_elements() {
            let x = mesh.element_node_coordinates(k, &basis.nodes);
            for (axis, dx) in derivatives.iter_mut().enumerate() {
                apply_along_axis(&layout, &basis.derivative_matrix, axis, &x, dx);
            }

            let mut contravariant = vec![[[0.0; 3]; 3]; n_nodes];
            let mut jacobian = vec![0.0; n_nodes];
            match D {
                1 => {
                    for node in 0..n_nodes {
                        contravariant[node][0] = [1.0, 0.0, 0.0];
                        jacobian[node] = derivatives[0][node][0];
                    }
                }
                2 => {
                    for node in 0..n_nodes {
                        let x_xi = derivatives[0][node];
                        let x_eta = derivatives[1][node];
                        contravariant[node][0] = [x_eta[1], -x_eta[0], 0.0];
                        contravariant[node][1] = [-x_xi[1], x_xi[0], 0.0];
                        jacobian[node] = x_xi[0] * x_eta[1] - x_eta[0] * x_xi[1];
                    }
                }
                _ => {
                    // Ja^i_n = -½ (∇_ξ × (X_l ∇_ξ X_m - X_m ∇_ξ X_l))_i, (n, m, l) cyclic
                    for n in 0..3 {
                        let m = (n + 1) % 3;
                        let l = (n + 2) % 3;
                        for node in 0..n_nodes {
                            for k_axis in 0..3 {
                                curl_terms[node][k_axis] = x[node][l] * derivatives[k_axis][node][m]
                                    - x[node][m] * derivatives[k_axis][node][l];
                            }
                        }
                        for (axis, dw) in curl_derivatives.iter_mut().enumerate() {
                            apply_along_axis(&layout, &basis.derivative_matrix, axis, &curl_terms, dw);
                        }
                        for node in 0..n_nodes {
                            for i in 0..3 {
                                let j = (i + 1) % 3;
                                let k_axis = (i + 2) % 3;
                                contravariant[node][i][n] = -0.5
                                    * (curl_derivatives[j][node][k_axis]
                                        - curl_derivatives[k_axis][node][j]);
                            }
                        }
                    }
                    for node in 0..n_nodes {
                        let a = derivatives[0][node];
                        let b = derivatives[1][node];
                        let c = derivatives[2][node];
                        jacobian[node] = a[0] * (b[1] * c[2] - b[2] * c[1])
                            - a[1] * (b[0] * c[2] - b[2] * c[0])
                            + a[2] * (b[0] * c[1] - b[1] * c[0]);
                    }
                }
            }

            for (node, &j) in jacobian.iter().enumerate() {
                if !(j > 0.0) || !j.is_finite() {
                    return Err(DgError::MeshInconsistency(format!(
                        "non-positive Jacobian {:e} in element {}, node {}",
                        j, k, node
                    )));
                }
            }

            geometry.coordinates.extend_from_slice(&x);
            geometry.inverse_jacobian.extend(jacobian.iter().map(|j| 1.0 / j));
            geometry.jacobian.extend_from_slice(&jacobian);
            geometry.contravariant.extend_from_slice(&contravariant);
        }

        log::debug!(
            "Computed geometry of {} elements ({} nodes each)",
            mesh.n_elements(),
            n_nodes
        );
        Ok(geometry)
    }

    /// Node layout the geometry was computed for.
    #[inline]
    pub fn layout(&self) -> &TensorLayout {
        &self.layout
    }

    /// Node coordinates of element `k`.
    #[inline]
    pub fn element_coordinates(&self, k: usize) -> &[Direction] {
        let n = self.layout.n_nodes();
        &self.coordinates[k * n..(k + 1) * n]
    }

    /// 1/J at the nodes of element `k`.
    #[inline]
    pub fn element_inverse_jacobian(&self, k: usize) -> &[f64] {
        let n = self.layout.n_nodes();
        &self.inverse_jacobian[k * n..(k + 1) * n]
    }

    /// Jacobian at the nodes of element `k`.
    #[inline]
    pub fn element_jacobian(&self, k: usize) -> &[f64] {
        let n = self.layout.n_nodes();
        &self.jacobian[k * n..(k + 1) * n]
    }

    /// Contravariant vectors at the nodes of element `k`.
    #[inline]
    pub fn element_contravariant(&self, k: usize) -> &[[Direction; 3]] {
        let n = self.layout.n_nodes();
        &self.contravariant[k * n..(k + 1) * n]
    }

    /// Outward scaled normal ±Ja^axis at face node `t` of element `k`.
    ///
    /// Its length is the surface element of the face.
    #[inline]
    pub fn face_normal(&self, k: usize, face: usize, t: usize) -> Direction {
        let node = self.layout.face_node(face, t);
        let ja = self.contravariant[k * self.layout.n_nodes() + node][face_axis(face)];
        if face_side(face) == 1 {
            ja
        } else {
            [-ja[0], -ja[1], -ja[2]]
        }
    }

    /// Coordinates of face node `t` of element `k`.
    #[inline]
    pub fn face_coordinates(&self, k: usize, face: usize, t: usize) -> Direction {
        self.coordinates[k * self.layout.n_nodes() + self.layout.face_node(face, t)]
    }
}

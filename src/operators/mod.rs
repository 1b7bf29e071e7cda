//! DG operators on Gauss-Lobatto nodes.
//!
//! This module provides:
//! - The 1D Lobatto basis with its SBP differentiation matrix (`LobattoBasis`)
//! - Tensor-product node layout and the apply-along-axis primitive
//! - L2 mortar operators for 2:1 non-conforming faces
//! - Curvilinear element geometry (`ElementGeometry`)

mod differentiation;
mod geometric;
mod mass;
mod mortar;
mod tensor;

pub use differentiation::{boundary_matrix, differentiation_matrix, sbp_defect};
pub use geometric::ElementGeometry;
pub use mass::exact_mass_matrix;
pub use mortar::{MortarL2, MortarPosition};
pub use tensor::{TensorLayout, apply_along_axis, face_axis, face_side};

use crate::basis::Vandermonde;
use crate::error::{DgError, Result};
use crate::polynomial::{barycentric_weights, gauss_lobatto_nodes, gauss_lobatto_weights};

/// All 1D operators of the Lobatto DGSEM basis bundled together.
///
/// Built once per polynomial degree and shared read-only by every element.
#[derive(Clone)]
pub struct LobattoBasis {
    /// Polynomial degree p
    pub polydeg: usize,
    /// Reference nodes in [-1, 1]
    pub nodes: Vec<f64>,
    /// Quadrature weights
    pub weights: Vec<f64>,
    /// 1 / weights
    pub inverse_weights: Vec<f64>,
    /// Barycentric weights of the nodes
    pub barycentric_weights: Vec<f64>,
    /// Differentiation matrix D[i,j] = ℓ'_j(x_i), row-major
    pub derivative_matrix: Vec<f64>,
    /// Orthonormal Legendre Vandermonde and its inverse
    pub vandermonde: Vandermonde,
    /// Row-major V^{-1}
    pub inverse_vandermonde: Vec<f64>,
    /// L2 mortar operators
    pub mortar: MortarL2,
}

impl LobattoBasis {
    /// Build the basis for polynomial degree `polydeg >= 1`.
    pub fn new(polydeg: usize) -> Result<Self> {
        if polydeg == 0 {
            return Err(DgError::InvalidConfiguration(
                "Lobatto basis needs polynomial degree >= 1".to_string(),
            ));
        }

        let nodes = gauss_lobatto_nodes(polydeg);
        let weights = gauss_lobatto_weights(polydeg, &nodes);
        let inverse_weights = weights.iter().map(|w| 1.0 / w).collect();
        let vandermonde = Vandermonde::new(&nodes);
        let inverse_vandermonde = vandermonde.inverse_row_major();

        log::debug!("Built Lobatto basis of degree {}", polydeg);

        Ok(Self {
            polydeg,
            barycentric_weights: barycentric_weights(&nodes),
            derivative_matrix: differentiation_matrix(&nodes),
            mortar: MortarL2::new(&nodes),
            nodes,
            weights,
            inverse_weights,
            vandermonde,
            inverse_vandermonde,
        })
    }

    /// Nodes per direction (p + 1).
    #[inline]
    pub fn nnodes(&self) -> usize {
        self.polydeg + 1
    }

    /// Entry D[i,j] of the differentiation matrix.
    #[inline]
    pub fn d(&self, i: usize, j: usize) -> f64 {
        self.derivative_matrix[i * self.nnodes() + j]
    }

    /// Tensor layout of this basis in `ndims` dimensions.
    pub fn layout(&self, ndims: usize) -> TensorLayout {
        TensorLayout::new(ndims, self.nnodes())
    }

    /// Tensor-product quadrature weight of a node.
    pub fn volume_weight(&self, layout: &TensorLayout, node: usize) -> f64 {
        let idx = layout.multi_index(node);
        (0..layout.ndims()).map(|d| self.weights[idx[d]]).product()
    }
}

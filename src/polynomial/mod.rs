//! Polynomial evaluation, quadrature nodes and Lagrange interpolation.
//!
//! This module provides:
//! - 1D Legendre polynomials and their derivatives (plain and normalized)
//! - Gauss-Lobatto-Legendre (GLL) and Gauss-Legendre nodes and weights
//! - Barycentric Lagrange interpolation between 1D node sets

mod interpolation;
mod legendre;
mod nodes;

pub use interpolation::{barycentric_weights, interpolation_matrix, lagrange_basis_at};
pub use legendre::{legendre, legendre_and_derivative, legendre_normalized_and_derivative};
pub use nodes::{gauss_legendre_nodes_weights, gauss_lobatto_nodes, gauss_lobatto_weights};

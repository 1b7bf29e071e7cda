//! Mass matrices for nodal DG.
//!
//! With Gauss-Lobatto collocation the DG mass matrix is lumped to diag(w).
//! The exact Lagrange mass matrix M[i,j] = ∫ ℓ_i ℓ_j dx is only needed to
//! build L2 projections (mortars); it is integrated with Gauss-Legendre
//! quadrature, which is exact for the degree-2p integrand.

use crate::polynomial::{barycentric_weights, gauss_legendre_nodes_weights, lagrange_basis_at};
use faer::Mat;

/// Exact mass matrix of the Lagrange basis on `nodes`.
pub fn exact_mass_matrix(nodes: &[f64]) -> Mat<f64> {
    let n = nodes.len();
    let bary = barycentric_weights(nodes);
    let (quad_nodes, quad_weights) = gauss_legendre_nodes_weights(n);

    let mut m = Mat::zeros(n, n);
    for (&xq, &wq) in quad_nodes.iter().zip(&quad_weights) {
        let l = lagrange_basis_at(xq, nodes, &bary);
        for i in 0..n {
            for j in 0..n {
                m[(i, j)] += wq * l[i] * l[j];
            }
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::{gauss_lobatto_nodes, gauss_lobatto_weights};

    #[test]
    fn test_row_sums_are_lobatto_weights() {
        // Σ_j M[i,j] = ∫ ℓ_i dx, which GLL quadrature integrates exactly.
        for polydeg in 1..=6 {
            let nodes = gauss_lobatto_nodes(polydeg);
            let weights = gauss_lobatto_weights(polydeg, &nodes);
            let m = exact_mass_matrix(&nodes);
            for i in 0..=polydeg {
                let row_sum: f64 = (0..=polydeg).map(|j| m[(i, j)]).sum();
                assert!((row_sum - weights[i]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_symmetric_positive_diagonal() {
        let nodes = gauss_lobatto_nodes(4);
        let m = exact_mass_matrix(&nodes);
        for i in 0..5 {
            assert!(m[(i, i)] > 0.0);
            for j in 0..5 {
                assert!((m[(i, j)] - m[(j, i)]).abs() < 1e-15);
            }
        }
    }
}

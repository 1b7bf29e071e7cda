//! Vandermonde matrix for nodal-modal transformations.
//!
//! The Vandermonde matrix V connects nodal and modal representations:
//! - V[i,j] = φ_j(r_i) where φ_j is the j-th orthonormal Legendre polynomial
//! - nodal_values = V * modal_coeffs
//! - modal_coeffs = V^{-1} * nodal_values

use crate::polynomial::legendre_normalized_and_derivative;
use faer::{Mat, linalg::solvers::Solve};

/// Vandermonde matrix and its inverse.
#[derive(Clone)]
pub struct Vandermonde {
    /// Vandermonde matrix: V[i,j] = φ_j(r_i)
    pub v: Mat<f64>,
    /// Inverse Vandermonde matrix
    pub v_inv: Mat<f64>,
    /// Polynomial degree
    pub polydeg: usize,
}

impl Vandermonde {
    /// Build V on the given nodes with orthonormal Legendre modes
    /// φ_j(x) = sqrt((2j+1)/2) P_j(x), j = 0..nodes.len().
    pub fn new(nodes: &[f64]) -> Self {
        let n = nodes.len();
        let v = Mat::from_fn(n, n, |i, j| legendre_normalized_and_derivative(j, nodes[i]).0);

        // Solve V * V_inv = I column by column.
        let lu = v.as_ref().full_piv_lu();
        let mut v_inv = Mat::zeros(n, n);
        for j in 0..n {
            let mut rhs = Mat::zeros(n, 1);
            rhs[(j, 0)] = 1.0;
            let col = lu.solve(&rhs);
            for i in 0..n {
                v_inv[(i, j)] = col[(i, 0)];
            }
        }

        Self {
            v,
            v_inv,
            polydeg: n.saturating_sub(1),
        }
    }

    /// Row-major copy of V^{-1} for the tensor-product kernels.
    pub fn inverse_row_major(&self) -> Vec<f64> {
        let n = self.v_inv.nrows();
        let mut out = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                out.push(self.v_inv[(i, j)]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::gauss_lobatto_nodes;

    #[test]
    fn test_vandermonde_invertibility() {
        for polydeg in 1..=6 {
            let nodes = gauss_lobatto_nodes(polydeg);
            let vander = Vandermonde::new(&nodes);
            let n = polydeg + 1;

            for i in 0..n {
                for j in 0..n {
                    let sum: f64 = (0..n).map(|k| vander.v[(i, k)] * vander.v_inv[(k, j)]).sum();
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert!(
                        (sum - expected).abs() < 1e-12,
                        "V * V^{{-1}} should be identity for degree {}",
                        polydeg
                    );
                }
            }
        }
    }

    #[test]
    fn test_modal_coefficients_of_low_degree_polynomial() {
        // A quadratic has no energy in modes 3 and higher.
        let nodes = gauss_lobatto_nodes(5);
        let vander = Vandermonde::new(&nodes);
        let inv = vander.inverse_row_major();
        let nodal: Vec<f64> = nodes.iter().map(|&x| 1.0 + x - 2.0 * x * x).collect();

        for mode in 3..6 {
            let coeff: f64 = (0..6).map(|j| inv[mode * 6 + j] * nodal[j]).sum();
            assert!(coeff.abs() < 1e-12, "mode {} = {}", mode, coeff);
        }
    }
}

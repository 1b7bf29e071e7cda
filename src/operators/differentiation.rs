//! Collocated differentiation matrix on a 1D node set.
//!
//! D[i,j] = ℓ'_j(x_i) maps nodal values to nodal derivatives. It is built
//! from barycentric weights, D[i,j] = (λ_j/λ_i) / (x_i - x_j) for i ≠ j, and
//! the diagonal is set by the negative-sum rule so that every row sums to
//! zero to round-off. Constants are then differentiated to exact zero, which
//! the discrete metric identities rely on.
//!
//! On Gauss-Lobatto nodes with W = diag(w) the matrix satisfies the
//! summation-by-parts property D^T W + W D = B, B = diag(-1, 0, ..., 0, 1).

use crate::polynomial::barycentric_weights;

/// Differentiation matrix on `nodes` (row-major, n × n).
pub fn differentiation_matrix(nodes: &[f64]) -> Vec<f64> {
    let n = nodes.len();
    let bary = barycentric_weights(nodes);
    let mut d = vec![0.0; n * n];

    for i in 0..n {
        let mut diagonal = 0.0;
        for j in 0..n {
            if i != j {
                let value = (bary[j] / bary[i]) / (nodes[i] - nodes[j]);
                d[i * n + j] = value;
                diagonal -= value;
            }
        }
        d[i * n + i] = diagonal;
    }

    d
}

/// Boundary evaluation matrix B = diag(-1, 0, ..., 0, 1) (row-major).
pub fn boundary_matrix(n: usize) -> Vec<f64> {
    let mut b = vec![0.0; n * n];
    if n > 0 {
        b[0] = -1.0;
        b[n * n - 1] += 1.0;
    }
    b
}

/// Largest entry of |D^T W + W D - B|.
pub fn sbp_defect(d: &[f64], weights: &[f64]) -> f64 {
    let n = weights.len();
    let b = boundary_matrix(n);
    let mut defect: f64 = 0.0;
    for i in 0..n {
        for j in 0..n {
            let q = d[j * n + i] * weights[j] + weights[i] * d[i * n + j];
            defect = defect.max((q - b[i * n + j]).abs());
        }
    }
    defect
}

//! Barycentric Lagrange interpolation on 1D node sets.
//!
//! All dense operators are returned row-major as flat `Vec<f64>`, with
//! `m[i * n_cols + j]` the entry in row `i`, column `j`.

/// Barycentric weights λ_j = 1 / Π_{k≠j} (x_j - x_k).
pub fn barycentric_weights(nodes: &[f64]) -> Vec<f64> {
    nodes
        .iter()
        .enumerate()
        .map(|(j, &xj)| {
            let prod: f64 = nodes
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != j)
                .map(|(_, &xk)| xj - xk)
                .product();
            1.0 / prod
        })
        .collect()
}

/// Values of all Lagrange basis polynomials ℓ_j(x) of the node set.
///
/// Uses the second barycentric form; if `x` coincides with a node the
/// result is the exact unit vector.
pub fn lagrange_basis_at(x: f64, nodes: &[f64], bary: &[f64]) -> Vec<f64> {
    let mut values = vec![0.0; nodes.len()];
    if let Some(j) = nodes.iter().position(|&xj| (x - xj).abs() < f64::EPSILON) {
        values[j] = 1.0;
        return values;
    }

    let mut total = 0.0;
    for (j, (&xj, &lj)) in nodes.iter().zip(bary).enumerate() {
        values[j] = lj / (x - xj);
        total += values[j];
    }
    for v in values.iter_mut() {
        *v /= total;
    }
    values
}

/// Interpolation matrix from `nodes` to `points` (row-major, points × nodes).
pub fn interpolation_matrix(nodes: &[f64], points: &[f64]) -> Vec<f64> {
    let bary = barycentric_weights(nodes);
    let mut matrix = Vec::with_capacity(points.len() * nodes.len());
    for &x in points {
        matrix.extend(lagrange_basis_at(x, nodes, &bary));
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::gauss_lobatto_nodes;

    #[test]
    fn test_partition_of_unity() {
        let nodes = gauss_lobatto_nodes(5);
        let bary = barycentric_weights(&nodes);
        for &x in &[-0.93, -0.2, 0.0, 0.41, 0.999] {
            let sum: f64 = lagrange_basis_at(x, &nodes, &bary).iter().sum();
            assert!((sum - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_reproduces_polynomials_exactly() {
        let polydeg = 4;
        let nodes = gauss_lobatto_nodes(polydeg);
        let bary = barycentric_weights(&nodes);
        let f = |x: f64| 0.5 - x + 2.0 * x.powi(3) - 0.7 * x.powi(4);
        let values: Vec<f64> = nodes.iter().map(|&x| f(x)).collect();

        for &x in &[-1.0, -0.61, 0.13, 0.5, 1.0] {
            let interpolated: f64 = lagrange_basis_at(x, &nodes, &bary)
                .iter()
                .zip(&values)
                .map(|(l, v)| l * v)
                .sum();
            assert!((interpolated - f(x)).abs() < 1e-13, "x = {}", x);
        }
    }

    #[test]
    fn test_interpolation_matrix_at_nodes_is_identity() {
        let nodes = gauss_lobatto_nodes(3);
        let m = interpolation_matrix(&nodes, &nodes);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(m[i * 4 + j], expected);
            }
        }
    }
}

//! Gauss-Lobatto-Legendre and Gauss-Legendre nodes and weights.
//!
//! The p+1 GLL nodes are the roots of (1-x²)P'_p(x). They include the
//! endpoints, so surface quadrature points coincide with volume nodes and the
//! collocated differentiation matrix is a summation-by-parts operator.
//! Gauss-Legendre points are only used where exact quadrature of degree 2p
//! polynomials is needed (mortar mass matrices).

use super::legendre::{legendre, legendre_and_derivative};
use std::f64::consts::PI;

const NEWTON_MAX_ITER: usize = 100;
const NEWTON_TOL: f64 = 1e-15;

/// Compute Gauss-Lobatto-Legendre nodes for polynomial degree `polydeg`.
///
/// Returns polydeg+1 nodes in [-1, 1], including the endpoints.
/// Uses Newton iteration starting from Chebyshev-Lobatto nodes.
pub fn gauss_lobatto_nodes(polydeg: usize) -> Vec<f64> {
    let n = polydeg;
    if n == 0 {
        return vec![0.0];
    }

    let mut nodes: Vec<f64> = (0..=n).map(|j| -(PI * j as f64 / n as f64).cos()).collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    let scale = (n * (n + 1)) as f64;
    for x in nodes.iter_mut().take(n).skip(1) {
        // Newton on L(x) = (1-x²) P'_n(x) with L'(x) = -n(n+1) P_n(x).
        for _ in 0..NEWTON_MAX_ITER {
            let (p_n, dp_n) = legendre_and_derivative(n, *x);
            let update = (1.0 - *x * *x) * dp_n / (scale * p_n);
            *x += update;
            if update.abs() < NEWTON_TOL {
                break;
            }
        }
    }

    // Enforce exact antisymmetry so mirrored nodes agree bit for bit.
    for j in 0..(n + 1) / 2 {
        let x = 0.5 * (nodes[n - j] - nodes[j]);
        nodes[j] = -x;
        nodes[n - j] = x;
    }
    if n % 2 == 0 {
        nodes[n / 2] = 0.0;
    }

    nodes
}

/// Gauss-Lobatto-Legendre weights w_j = 2 / (p(p+1) [P_p(x_j)]²).
pub fn gauss_lobatto_weights(polydeg: usize, nodes: &[f64]) -> Vec<f64> {
    if polydeg == 0 {
        return vec![2.0];
    }
    let denom = (polydeg * (polydeg + 1)) as f64;
    nodes
        .iter()
        .map(|&x| {
            let p = legendre(polydeg, x);
            2.0 / (denom * p * p)
        })
        .collect()
}

/// Gauss-Legendre nodes and weights with `n_nodes` points.
///
/// Exact for polynomials up to degree 2 n_nodes - 1. The nodes are the
/// roots of P_n, found by Newton iteration from the Chebyshev guess, and the
/// weights are 2 / ((1-x²) P'_n(x)²).
pub fn gauss_legendre_nodes_weights(n_nodes: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n_nodes;
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];

    for j in 0..n {
        let mut x = -(PI * (j as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..NEWTON_MAX_ITER {
            let (p, dp) = legendre_and_derivative(n, x);
            let update = p / dp;
            x -= update;
            if update.abs() < NEWTON_TOL {
                break;
            }
        }
        let (_, dp) = legendre_and_derivative(n, x);
        nodes[j] = x;
        weights[j] = 2.0 / ((1.0 - x * x) * dp * dp);
    }

    (nodes, weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact_monomial_integral(k: usize) -> f64 {
        if k % 2 == 0 { 2.0 / (k + 1) as f64 } else { 0.0 }
    }

    #[test]
    fn test_nodes_endpoints_and_symmetry() {
        for polydeg in 1..=8 {
            let nodes = gauss_lobatto_nodes(polydeg);
            assert_eq!(nodes.len(), polydeg + 1);
            assert_eq!(nodes[0], -1.0);
            assert_eq!(nodes[polydeg], 1.0);
            for i in 0..nodes.len() {
                assert_eq!(nodes[i], -nodes[polydeg - i], "Nodes should be antisymmetric");
            }
            assert!(nodes.windows(2).all(|w| w[0] < w[1]), "Nodes should be sorted");
        }
    }

    #[test]
    fn test_nodes_are_gll() {
        for polydeg in 2..=8 {
            let nodes = gauss_lobatto_nodes(polydeg);
            for j in 1..polydeg {
                let (_, dp) = legendre_and_derivative(polydeg, nodes[j]);
                assert!(
                    dp.abs() < 1e-12,
                    "Interior node {} should be root of P'_N, got {}",
                    j,
                    dp
                );
            }
        }
    }

    #[test]
    fn test_known_nodes() {
        let nodes = gauss_lobatto_nodes(2);
        assert!((nodes[1] - 0.0).abs() < 1e-14);

        let weights = gauss_lobatto_weights(2, &nodes);
        assert!((weights[0] - 1.0 / 3.0).abs() < 1e-14);
        assert!((weights[1] - 4.0 / 3.0).abs() < 1e-14);
        assert!((weights[2] - 1.0 / 3.0).abs() < 1e-14);
    }

    #[test]
    fn test_lobatto_quadrature_exactness() {
        for polydeg in 1..=6 {
            let nodes = gauss_lobatto_nodes(polydeg);
            let weights = gauss_lobatto_weights(polydeg, &nodes);
            for k in 0..=2 * polydeg - 1 {
                let numerical: f64 = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();
                let exact = exact_monomial_integral(k);
                assert!(
                    (numerical - exact).abs() < 1e-12,
                    "Degree {}, monomial {}: expected {}, got {}",
                    polydeg,
                    k,
                    exact,
                    numerical
                );
            }
        }
    }

    #[test]
    fn test_gauss_quadrature_exactness() {
        for n_nodes in 1..=7 {
            let (nodes, weights) = gauss_legendre_nodes_weights(n_nodes);
            assert!(nodes.iter().all(|x| x.abs() < 1.0), "Gauss nodes are interior");
            for k in 0..=2 * n_nodes - 1 {
                let numerical: f64 = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();
                assert!(
                    (numerical - exact_monomial_integral(k)).abs() < 1e-12,
                    "{} Gauss points, monomial {}",
                    n_nodes,
                    k
                );
            }
        }
    }
}

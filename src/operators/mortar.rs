//! L2 mortar operators for a 2:1 split face.
//!
//! A large face with reference coordinate ξ ∈ [-1, 1] is covered by two
//! small faces; the lower one sees ξ = (η - 1)/2 and the upper one
//! ξ = (η + 1)/2 in its own coordinate η. States travel from the large face
//! to the mortars by interpolation (`forward_*`), fluxes travel back by the
//! L2 projection `reverse_* = 0.5 M^{-1} F^T M`. The projection is the
//! adjoint of the interpolation in the M inner product, which gives
//! w^T R = 0.5 w^T: whatever the small faces integrate, the large face
//! integrates the same amount.

use super::mass::exact_mass_matrix;
use crate::polynomial::interpolation_matrix;
use faer::{Mat, linalg::solvers::Solve};

/// Index of a mortar half along the split face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MortarPosition {
    /// Half covering ξ ∈ [-1, 0].
    Lower,
    /// Half covering ξ ∈ [0, 1].
    Upper,
}

impl MortarPosition {
    /// Both halves in order.
    pub const ALL: [MortarPosition; 2] = [MortarPosition::Lower, MortarPosition::Upper];

    /// Offset of the half-interval center in large-face coordinates.
    pub fn offset(self) -> f64 {
        match self {
            MortarPosition::Lower => -0.5,
            MortarPosition::Upper => 0.5,
        }
    }
}

/// Forward and reverse mortar operators (row-major n × n).
#[derive(Clone, Debug)]
pub struct MortarL2 {
    n: usize,
    forward_lower: Vec<f64>,
    forward_upper: Vec<f64>,
    reverse_lower: Vec<f64>,
    reverse_upper: Vec<f64>,
}

impl MortarL2 {
    /// Build the operators for the node set of one face direction.
    pub fn new(nodes: &[f64]) -> Self {
        let n = nodes.len();
        let mass = exact_mass_matrix(nodes);
        let lu = mass.as_ref().full_piv_lu();

        let build = |position: MortarPosition| {
            let points: Vec<f64> = nodes.iter().map(|&eta| 0.5 * eta + position.offset()).collect();
            let forward = interpolation_matrix(nodes, &points);

            // rhs = 0.5 F^T M
            let rhs = Mat::from_fn(n, n, |i, j| {
                0.5 * (0..n).map(|k| forward[k * n + i] * mass[(k, j)]).sum::<f64>()
            });
            let reverse = lu.solve(&rhs);

            let mut reverse_flat = Vec::with_capacity(n * n);
            for i in 0..n {
                for j in 0..n {
                    reverse_flat.push(reverse[(i, j)]);
                }
            }
            (forward, reverse_flat)
        };

        let (forward_lower, reverse_lower) = build(MortarPosition::Lower);
        let (forward_upper, reverse_upper) = build(MortarPosition::Upper);

        Self {
            n,
            forward_lower,
            forward_upper,
            reverse_lower,
            reverse_upper,
        }
    }

    /// Interpolation from the large face to one mortar half.
    pub fn forward(&self, position: MortarPosition) -> &[f64] {
        match position {
            MortarPosition::Lower => &self.forward_lower,
            MortarPosition::Upper => &self.forward_upper,
        }
    }

    /// L2 projection from one mortar half back onto the large face.
    pub fn reverse(&self, position: MortarPosition) -> &[f64] {
        match position {
            MortarPosition::Lower => &self.reverse_lower,
            MortarPosition::Upper => &self.reverse_upper,
        }
    }

    /// `out = op * input` for vector-valued nodal data.
    pub fn apply<const N: usize>(&self, op: &[f64], input: &[[f64; N]], out: &mut [[f64; N]]) {
        let n = self.n;
        for i in 0..n {
            let mut acc = [0.0; N];
            for j in 0..n {
                let a = op[i * n + j];
                for v in 0..N {
                    acc[v] += a * input[j][v];
                }
            }
            out[i] = acc;
        }
    }

    /// `out += op * input` for vector-valued nodal data.
    pub fn apply_add<const N: usize>(&self, op: &[f64], input: &[[f64; N]], out: &mut [[f64; N]]) {
        let n = self.n;
        for i in 0..n {
            for j in 0..n {
                let a = op[i * n + j];
                for v in 0..N {
                    out[i][v] += a * input[j][v];
                }
            }
        }
    }
}

//! Nodal solution storage.
//!
//! Values are stored element-major with all variables of a node together:
//! `data[k * n_nodes + i]` holds the N conservative variables of node `i`
//! in element `k`. Flux kernels always touch all variables of a node at
//! once, and each element is a contiguous slice that can be handed to a
//! worker thread.

use crate::time::Integrable;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Nodal values of N conservative variables on every element.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<const N: usize> {
    /// Nodal values, element-major
    pub data: Vec<[f64; N]>,
    /// Number of elements
    pub n_elements: usize,
    /// Number of nodes per element
    pub n_nodes: usize,
}

impl<const N: usize> Solution<N> {
    /// Zero-initialized storage.
    pub fn new(n_elements: usize, n_nodes: usize) -> Self {
        Self {
            data: vec![[0.0; N]; n_elements * n_nodes],
            n_elements,
            n_nodes,
        }
    }

    /// State at node `i` of element `k`.
    #[inline]
    pub fn get(&self, k: usize, i: usize) -> [f64; N] {
        self.data[k * self.n_nodes + i]
    }

    /// Overwrite the state at node `i` of element `k`.
    #[inline]
    pub fn set(&mut self, k: usize, i: usize, values: [f64; N]) {
        self.data[k * self.n_nodes + i] = values;
    }

    /// All nodes of element `k`.
    #[inline]
    pub fn element(&self, k: usize) -> &[[f64; N]] {
        &self.data[k * self.n_nodes..(k + 1) * self.n_nodes]
    }

    /// All nodes of element `k`, mutable.
    #[inline]
    pub fn element_mut(&mut self, k: usize) -> &mut [[f64; N]] {
        &mut self.data[k * self.n_nodes..(k + 1) * self.n_nodes]
    }

    /// Maximum absolute value of one variable.
    pub fn max_abs_var(&self, var: usize) -> f64 {
        self.data.iter().map(|u| u[var].abs()).fold(0.0, f64::max)
    }

    /// Maximum absolute value across all variables.
    pub fn max_abs(&self) -> f64 {
        (0..N).map(|v| self.max_abs_var(v)).fold(0.0, f64::max)
    }

    /// Copy all values from a solution of the same shape.
    pub fn copy_from(&mut self, other: &Self) {
        self.data.copy_from_slice(&other.data);
    }

    /// First non-finite value as (element, node, variable, value).
    pub fn find_non_finite(&self) -> Option<(usize, usize, usize, f64)> {
        self.data.iter().enumerate().find_map(|(idx, u)| {
            u.iter()
                .position(|x| !x.is_finite())
                .map(|v| (idx / self.n_nodes, idx % self.n_nodes, v, u[v]))
        })
    }
}

impl<const N: usize> Integrable for Solution<N> {
    fn scale(&mut self, c: f64) {
        #[cfg(feature = "parallel")]
        let iter = self.data.par_iter_mut();
        #[cfg(not(feature = "parallel"))]
        let iter = self.data.iter_mut();

        iter.for_each(|u| {
            for x in u.iter_mut() {
                *x *= c;
            }
        });
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        debug_assert_eq!(self.data.len(), other.data.len());

        #[cfg(feature = "parallel")]
        let iter = self.data.par_iter_mut().zip(other.data.par_iter());
        #[cfg(not(feature = "parallel"))]
        let iter = self.data.iter_mut().zip(other.data.iter());

        iter.for_each(|(a, b)| {
            for v in 0..N {
                a[v] += c * b[v];
            }
        });
    }

    fn zeros_like(&self) -> Self {
        Self::new(self.n_elements, self.n_nodes)
    }

    fn assign(&mut self, other: &Self) {
        self.copy_from(other);
    }
}

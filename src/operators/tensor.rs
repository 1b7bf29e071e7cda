//! Tensor-product node layout and the apply-along-axis primitive.
//!
//! Nodes of a D-dimensional element are stored with the first axis fastest:
//! flat index `i0 + n*(i1 + n*i2)`. Faces are numbered `2*axis + side`,
//! side 0 at ξ_axis = -1 and side 1 at ξ_axis = +1. The nodes of a face, and
//! the lines along an axis, are enumerated by the remaining axes in
//! increasing order, so two elements sharing a face see the same ordering.

/// Reference axis of a face.
#[inline]
pub fn face_axis(face: usize) -> usize {
    face / 2
}

/// Side (0: minus, 1: plus) of a face along its axis.
#[inline]
pub fn face_side(face: usize) -> usize {
    face % 2
}

/// Node layout of a tensor-product element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorLayout {
    ndims: usize,
    n: usize,
    n_nodes: usize,
    n_face_nodes: usize,
}

impl TensorLayout {
    /// Layout for `ndims` dimensions with `n` nodes per direction.
    pub fn new(ndims: usize, n: usize) -> Self {
        debug_assert!((1..=3).contains(&ndims), "1 to 3 dimensions supported");
        Self {
            ndims,
            n,
            n_nodes: n.pow(ndims as u32),
            n_face_nodes: n.pow(ndims as u32 - 1),
        }
    }

    #[inline]
    pub fn ndims(&self) -> usize {
        self.ndims
    }

    /// Nodes per direction.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        2 * self.ndims
    }

    /// Nodes per face, which is also the number of lines along any axis.
    #[inline]
    pub fn n_face_nodes(&self) -> usize {
        self.n_face_nodes
    }

    /// Distance in flat index between neighbors along `axis`.
    #[inline]
    pub fn stride(&self, axis: usize) -> usize {
        self.n.pow(axis as u32)
    }

    /// Flat index of a multi-index (unused trailing entries are ignored).
    #[inline]
    pub fn node_index(&self, idx: [usize; 3]) -> usize {
        let mut flat = 0;
        for axis in (0..self.ndims).rev() {
            flat = flat * self.n + idx[axis];
        }
        flat
    }

    /// Multi-index of a flat node index.
    #[inline]
    pub fn multi_index(&self, mut node: usize) -> [usize; 3] {
        let mut idx = [0; 3];
        for entry in idx.iter_mut().take(self.ndims) {
            *entry = node % self.n;
            node /= self.n;
        }
        idx
    }

    /// Node at position `along` on the `t`-th line parallel to `axis`.
    #[inline]
    pub fn line_node(&self, axis: usize, t: usize, along: usize) -> usize {
        let mut idx = [0; 3];
        let mut rest = t;
        for d in 0..self.ndims {
            if d == axis {
                idx[d] = along;
            } else {
                idx[d] = rest % self.n;
                rest /= self.n;
            }
        }
        self.node_index(idx)
    }

    /// Flat index of the `t`-th node on `face`.
    #[inline]
    pub fn face_node(&self, face: usize, t: usize) -> usize {
        let along = if face_side(face) == 0 { 0 } else { self.n - 1 };
        self.line_node(face_axis(face), t, along)
    }
}

/// `output = (I ⊗ .. ⊗ A ⊗ .. ⊗ I) input` with the n × n row-major matrix
/// `a` acting on `axis`.
pub fn apply_along_axis<const N: usize>(
    layout: &TensorLayout,
    a: &[f64],
    axis: usize,
    input: &[[f64; N]],
    output: &mut [[f64; N]],
) {
    let n = layout.n();
    let stride = layout.stride(axis);
    for t in 0..layout.n_face_nodes() {
        let start = layout.line_node(axis, t, 0);
        for i in 0..n {
            let mut acc = [0.0; N];
            for j in 0..n {
                let aij = a[i * n + j];
                let u = &input[start + j * stride];
                for v in 0..N {
                    acc[v] += aij * u[v];
                }
            }
            output[start + i * stride] = acc;
        }
    }
}

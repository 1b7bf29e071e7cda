//! Logically Cartesian tree mesh with optional one-level refinement.
//!
//! Root cells tile the reference box [-1, 1]^D; a mapping closure sends the
//! reference box to physical space, so curved domains are obtained from a
//! smooth mapping. In 2D selected root cells can be split into four
//! children, which introduces 2:1 nonconforming faces (mortars).
//!
//! Element ordering: root cells in lexicographic order (first axis
//! fastest); a refined root contributes its four children in the order
//! `c0 + 2*c1` in place of itself.

use std::sync::Arc;

use super::BoundaryTag;
use crate::equations::Direction;
use crate::error::{DgError, Result};
use crate::operators::TensorLayout;
use crate::polynomial::{barycentric_weights, lagrange_basis_at};

/// Map from reference coordinates of the whole root grid to physical space.
pub type MeshMapping = Arc<dyn Fn(&Direction) -> Direction + Send + Sync>;

/// One leaf cell of the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeElement {
    /// Index of the root cell along each axis.
    pub root: [usize; 3],
    /// 0 for a root cell, 1 for a child.
    pub level: u8,
    /// Child position (0 lower, 1 upper) along each axis; zero for roots.
    pub child: [usize; 3],
}

/// Reference to an element and one of its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementFace {
    pub element: usize,
    pub face: usize,
}

impl ElementFace {
    pub fn new(element: usize, face: usize) -> Self {
        Self { element, face }
    }
}

/// Conforming face between two elements.
///
/// `left` owns its plus face along the axis, `right` its minus face; both
/// enumerate the shared face nodes in the same order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interface {
    pub left: ElementFace,
    pub right: ElementFace,
}

impl Interface {
    /// Reference axis normal to the face.
    pub fn axis(&self) -> usize {
        self.left.face / 2
    }
}

/// Element face on the domain boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryFace {
    pub element: usize,
    pub face: usize,
    pub tag: BoundaryTag,
}

/// 2:1 nonconforming face: one large element face covered by two small ones.
///
/// `small[0]` covers the lower half of the large face along its tangential
/// axis, `small[1]` the upper half. Small faces point towards the large
/// element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mortar {
    pub large: ElementFace,
    pub small: [ElementFace; 2],
}

#[derive(Clone, Copy, Debug)]
enum RootCell {
    Leaf(usize),
    Refined([usize; 4]),
}

/// Tree mesh in `D` dimensions.
#[derive(Clone)]
pub struct TreeMesh<const D: usize> {
    cells: [usize; D],
    periodicity: [bool; D],
    mapping: MeshMapping,
    refined: Vec<bool>,
    root_cells: Vec<RootCell>,
    elements: Vec<TreeElement>,
    interfaces: Vec<Interface>,
    boundaries: Vec<BoundaryFace>,
    mortars: Vec<Mortar>,
}

impl<const D: usize> TreeMesh<D> {
    /// Uniform mesh of the box `[lower, upper]` with `cells` root cells per
    /// axis.
    pub fn new(
        cells: [usize; D],
        lower: [f64; D],
        upper: [f64; D],
        periodicity: [bool; D],
    ) -> Result<Self> {
        if !(1..=3).contains(&D) {
            return Err(DgError::MeshInconsistency(format!(
                "tree meshes exist in 1 to 3 dimensions, got {}",
                D
            )));
        }
        if cells.iter().any(|&c| c == 0) {
            return Err(DgError::MeshInconsistency(
                "need at least one root cell per axis".to_string(),
            ));
        }
        for d in 0..D {
            if !(lower[d] < upper[d]) {
                return Err(DgError::MeshInconsistency(format!(
                    "empty domain along axis {}: [{}, {}]",
                    d, lower[d], upper[d]
                )));
            }
        }

        let mapping: MeshMapping = Arc::new(move |xi: &Direction| {
            let mut x = [0.0; 3];
            for d in 0..D {
                x[d] = lower[d] + 0.5 * (xi[d] + 1.0) * (upper[d] - lower[d]);
            }
            x
        });

        let n_roots = cells.iter().product();
        let mut mesh = Self {
            cells,
            periodicity,
            mapping,
            refined: vec![false; n_roots],
            root_cells: Vec::new(),
            elements: Vec::new(),
            interfaces: Vec::new(),
            boundaries: Vec::new(),
            mortars: Vec::new(),
        };
        mesh.build_connectivity();
        Ok(mesh)
    }

    /// Replace the affine box mapping by a general one, taking reference
    /// coordinates in [-1, 1]^D of the whole root grid.
    ///
    /// The mapping must be orientation preserving; this is checked when the
    /// geometry is computed. For periodic axes it must map opposite sides
    /// onto matching point sets.
    pub fn with_mapping<F>(mut self, mapping: F) -> Self
    where
        F: Fn(&Direction) -> Direction + Send + Sync + 'static,
    {
        self.mapping = Arc::new(mapping);
        self
    }

    /// Split the given root cells into 2^D children (2D only).
    pub fn refine(mut self, roots: &[[usize; D]]) -> Result<Self> {
        if roots.is_empty() {
            return Ok(self);
        }
        if D != 2 {
            return Err(DgError::MeshInconsistency(format!(
                "nonconforming refinement is only supported in 2D, mesh has {} dimensions",
                D
            )));
        }
        for root in roots {
            for d in 0..D {
                if root[d] >= self.cells[d] {
                    return Err(DgError::MeshInconsistency(format!(
                        "root cell {:?} outside the {:?} grid",
                        root, self.cells
                    )));
                }
            }
            let mut idx = [0; 3];
            idx[..D].copy_from_slice(root);
            let linear = self.root_linear(idx);
            self.refined[linear] = true;
        }
        self.build_connectivity();
        log::debug!(
            "Refined {} root cells: {} elements, {} mortars",
            roots.len(),
            self.elements.len(),
            self.mortars.len()
        );
        Ok(self)
    }

    #[inline]
    pub fn ndims(&self) -> usize {
        D
    }

    #[inline]
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Root cells per axis.
    pub fn cells(&self) -> [usize; D] {
        self.cells
    }

    pub fn periodicity(&self) -> [bool; D] {
        self.periodicity
    }

    pub fn elements(&self) -> &[TreeElement] {
        &self.elements
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn boundaries(&self) -> &[BoundaryFace] {
        &self.boundaries
    }

    pub fn mortars(&self) -> &[Mortar] {
        &self.mortars
    }

    /// Whether any face is nonconforming.
    pub fn has_mortars(&self) -> bool {
        !self.mortars.is_empty()
    }

    /// Domain sides that carry boundary faces.
    pub fn boundary_tags(&self) -> Vec<BoundaryTag> {
        BoundaryTag::sides(D)
            .iter()
            .copied()
            .filter(|tag| !self.periodicity[tag.axis()])
            .collect()
    }

    /// Physical coordinates of the tensor-product nodes of element `k`.
    ///
    /// Children are not mapped directly: their nodes are evaluated on the
    /// degree-p interpolant of the root cell, so the faces of siblings and
    /// of the large neighbor describe the same polynomial curve.
    pub fn element_node_coordinates(&self, k: usize, nodes: &[f64]) -> Vec<Direction> {
        let element = &self.elements[k];
        let layout = TensorLayout::new(D, nodes.len());
        let root_coordinates: Vec<Direction> = (0..layout.n_nodes())
            .map(|node| {
                let idx = layout.multi_index(node);
                let mut xi = [0.0; 3];
                for d in 0..D {
                    xi[d] = nodes[idx[d]];
                }
                (self.mapping)(&self.global_reference(element.root, &xi))
            })
            .collect();

        if element.level == 0 {
            return root_coordinates;
        }

        let bary = barycentric_weights(nodes);
        let lagrange: Vec<Vec<Vec<f64>>> = (0..D)
            .map(|d| {
                let offset = element.child[d] as f64 - 0.5;
                nodes
                    .iter()
                    .map(|&xi| lagrange_basis_at(0.5 * xi + offset, nodes, &bary))
                    .collect()
            })
            .collect();

        (0..layout.n_nodes())
            .map(|node| {
                let idx = layout.multi_index(node);
                let mut x = [0.0; 3];
                for (source, coordinate) in root_coordinates.iter().enumerate() {
                    let jdx = layout.multi_index(source);
                    let weight: f64 = (0..D).map(|d| lagrange[d][idx[d]][jdx[d]]).product();
                    if weight != 0.0 {
                        for c in 0..3 {
                            x[c] += weight * coordinate[c];
                        }
                    }
                }
                x
            })
            .collect()
    }

    /// Elements sharing a face (conforming or mortar) with each element.
    pub fn element_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.n_elements()];
        let mut link = |a: usize, b: usize| {
            if a != b {
                if !neighbors[a].contains(&b) {
                    neighbors[a].push(b);
                }
                if !neighbors[b].contains(&a) {
                    neighbors[b].push(a);
                }
            }
        };
        for interface in &self.interfaces {
            link(interface.left.element, interface.right.element);
        }
        for mortar in &self.mortars {
            for small in &mortar.small {
                link(mortar.large.element, small.element);
            }
        }
        neighbors
    }

    fn global_reference(&self, root: [usize; 3], xi: &Direction) -> Direction {
        let mut g = [0.0; 3];
        for d in 0..D {
            g[d] = -1.0 + (2.0 * root[d] as f64 + 1.0 + xi[d]) / self.cells[d] as f64;
        }
        g
    }

    fn root_linear(&self, idx: [usize; 3]) -> usize {
        let mut linear = 0;
        for d in (0..D).rev() {
            linear = linear * self.cells[d] + idx[d];
        }
        linear
    }

    fn root_index(&self, mut linear: usize) -> [usize; 3] {
        let mut idx = [0; 3];
        for d in 0..D {
            idx[d] = linear % self.cells[d];
            linear /= self.cells[d];
        }
        idx
    }

    fn neighbor_root(&self, root: [usize; 3], axis: usize) -> Option<[usize; 3]> {
        let mut next = root;
        if root[axis] + 1 < self.cells[axis] {
            next[axis] += 1;
            Some(next)
        } else if self.periodicity[axis] {
            next[axis] = 0;
            Some(next)
        } else {
            None
        }
    }

    /// Leaf elements of a root cell touching its `side` face along `axis`,
    /// ordered along the tangential axis.
    fn face_elements(&self, linear: usize, axis: usize, side: usize) -> Vec<usize> {
        match self.root_cells[linear] {
            RootCell::Leaf(id) => vec![id],
            RootCell::Refined(ids) => (0..2)
                .map(|t| {
                    let mut c = [0; 2];
                    c[axis] = side;
                    c[1 - axis] = t;
                    ids[c[0] + 2 * c[1]]
                })
                .collect(),
        }
    }

    fn build_connectivity(&mut self) {
        self.root_cells.clear();
        self.elements.clear();
        self.interfaces.clear();
        self.boundaries.clear();
        self.mortars.clear();

        for linear in 0..self.refined.len() {
            let root = self.root_index(linear);
            if self.refined[linear] {
                let mut ids = [0; 4];
                for (c, id) in ids.iter_mut().enumerate() {
                    *id = self.elements.len();
                    self.elements.push(TreeElement {
                        root,
                        level: 1,
                        child: [c % 2, c / 2, 0],
                    });
                }
                self.root_cells.push(RootCell::Refined(ids));
            } else {
                self.root_cells.push(RootCell::Leaf(self.elements.len()));
                self.elements.push(TreeElement {
                    root,
                    level: 0,
                    child: [0; 3],
                });
            }
        }

        for linear in 0..self.root_cells.len() {
            let root = self.root_index(linear);

            if let RootCell::Refined(ids) = self.root_cells[linear] {
                for axis in 0..D {
                    for t in 0..2 {
                        let mut lo = [0; 2];
                        lo[1 - axis] = t;
                        let mut hi = lo;
                        hi[axis] = 1;
                        self.interfaces.push(Interface {
                            left: ElementFace::new(ids[lo[0] + 2 * lo[1]], 2 * axis + 1),
                            right: ElementFace::new(ids[hi[0] + 2 * hi[1]], 2 * axis),
                        });
                    }
                }
            }

            for axis in 0..D {
                if root[axis] == 0 && !self.periodicity[axis] {
                    for element in self.face_elements(linear, axis, 0) {
                        self.boundaries.push(BoundaryFace {
                            element,
                            face: 2 * axis,
                            tag: BoundaryTag::from_face(2 * axis),
                        });
                    }
                }

                let Some(next) = self.neighbor_root(root, axis) else {
                    for element in self.face_elements(linear, axis, 1) {
                        self.boundaries.push(BoundaryFace {
                            element,
                            face: 2 * axis + 1,
                            tag: BoundaryTag::from_face(2 * axis + 1),
                        });
                    }
                    continue;
                };

                let lower = self.face_elements(linear, axis, 1);
                let upper = self.face_elements(self.root_linear(next), axis, 0);
                match (lower.len(), upper.len()) {
                    (1, 2) => self.mortars.push(Mortar {
                        large: ElementFace::new(lower[0], 2 * axis + 1),
                        small: [
                            ElementFace::new(upper[0], 2 * axis),
                            ElementFace::new(upper[1], 2 * axis),
                        ],
                    }),
                    (2, 1) => self.mortars.push(Mortar {
                        large: ElementFace::new(upper[0], 2 * axis),
                        small: [
                            ElementFace::new(lower[0], 2 * axis + 1),
                            ElementFace::new(lower[1], 2 * axis + 1),
                        ],
                    }),
                    _ => {
                        for (&left, &right) in lower.iter().zip(&upper) {
                            self.interfaces.push(Interface {
                                left: ElementFace::new(left, 2 * axis + 1),
                                right: ElementFace::new(right, 2 * axis),
                            });
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::gauss_lobatto_nodes;

    fn count_faces<const D: usize>(mesh: &TreeMesh<D>) -> usize {
        2 * mesh.interfaces().len()
            + mesh.boundaries().len()
            + mesh.mortars().iter().map(|_| 3).sum::<usize>()
    }

    #[test]
    fn test_uniform_periodic_mesh() {
        let mesh = TreeMesh::new([4, 3], [0.0, 0.0], [1.0, 1.0], [true, true]).unwrap();
        assert_eq!(mesh.n_elements(), 12);
        assert_eq!(mesh.interfaces().len(), 24);
        assert!(mesh.boundaries().is_empty());
        assert_eq!(count_faces(&mesh), 4 * 12);
    }

    #[test]
    fn test_boundaries_are_tagged_by_side() {
        let mesh = TreeMesh::new([2, 2], [0.0, 0.0], [1.0, 1.0], [true, false]).unwrap();
        assert_eq!(mesh.boundaries().len(), 4);
        assert!(mesh
            .boundaries()
            .iter()
            .all(|b| matches!(b.tag, BoundaryTag::YMin | BoundaryTag::YMax)));
        assert_eq!(mesh.boundary_tags(), vec![BoundaryTag::YMin, BoundaryTag::YMax]);
    }

    #[test]
    fn test_refinement_creates_mortars() {
        let mesh = TreeMesh::new([3, 3], [0.0, 0.0], [1.0, 1.0], [true, true])
            .unwrap()
            .refine(&[[1, 1]])
            .unwrap();
        assert_eq!(mesh.n_elements(), 8 + 4);
        assert_eq!(mesh.mortars().len(), 4);
        assert!(mesh.has_mortars());
        // Every element face is accounted for exactly once.
        assert_eq!(count_faces(&mesh), 4 * mesh.n_elements());

        for mortar in mesh.mortars() {
            for small in &mortar.small {
                assert_eq!(small.face, mortar.large.face ^ 1);
                assert_eq!(mesh.elements()[small.element].level, 1);
            }
        }
    }

    #[test]
    fn test_refinement_rejected_in_3d() {
        let mesh = TreeMesh::new([2, 2, 2], [0.0; 3], [1.0; 3], [true; 3]).unwrap();
        assert!(matches!(
            mesh.refine(&[[0, 0, 0]]),
            Err(DgError::MeshInconsistency(_))
        ));
    }

    #[test]
    fn test_invalid_box_rejected() {
        assert!(TreeMesh::new([2], [1.0], [0.0], [false]).is_err());
        assert!(TreeMesh::new([0, 2], [0.0, 0.0], [1.0, 1.0], [false, false]).is_err());
    }

    #[test]
    fn test_child_coordinates_follow_root_interpolant() {
        let nodes = gauss_lobatto_nodes(3);
        let mesh = TreeMesh::new([1, 1], [0.0, 0.0], [2.0, 2.0], [false, false])
            .unwrap()
            .refine(&[[0, 0]])
            .unwrap();
        // Affine mapping: children are exact quarter boxes.
        let coords = mesh.element_node_coordinates(3, &nodes);
        let first = coords[0];
        let last = coords[coords.len() - 1];
        assert!((first[0] - 1.0).abs() < 1e-14 && (first[1] - 1.0).abs() < 1e-14);
        assert!((last[0] - 2.0).abs() < 1e-14 && (last[1] - 2.0).abs() < 1e-14);
    }
}

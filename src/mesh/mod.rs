//! Mesh representation.
//!
//! Provides the connectivity consumed by the DG kernels:
//! - Logically Cartesian tree mesh with curved mappings (`TreeMesh`)
//! - Conforming interfaces, 2:1 mortars and tagged boundary faces
//! - Domain side tags for attaching boundary conditions

mod boundary_tags;
mod tree;

pub use boundary_tags::BoundaryTag;
pub use tree::{
    BoundaryFace, ElementFace, Interface, MeshMapping, Mortar, TreeElement, TreeMesh,
};

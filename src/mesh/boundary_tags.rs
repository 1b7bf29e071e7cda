//! Tags for the sides of the logically Cartesian domain.
//!
//! A boundary face carries the tag of the domain side it lies on, and
//! boundary conditions are attached per tag. The numbering matches the
//! element face numbering `2*axis + side`.

/// Side of the computational domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoundaryTag {
    /// ξ_1 = -1
    XMin,
    /// ξ_1 = +1
    XMax,
    /// ξ_2 = -1
    YMin,
    /// ξ_2 = +1
    YMax,
    /// ξ_3 = -1
    ZMin,
    /// ξ_3 = +1
    ZMax,
}

impl BoundaryTag {
    /// All tags in face order.
    pub const ALL: [BoundaryTag; 6] = [
        BoundaryTag::XMin,
        BoundaryTag::XMax,
        BoundaryTag::YMin,
        BoundaryTag::YMax,
        BoundaryTag::ZMin,
        BoundaryTag::ZMax,
    ];

    /// Tag of the domain side that element face `face` lies on.
    pub fn from_face(face: usize) -> Self {
        Self::ALL[face]
    }

    /// Face number `2*axis + side`.
    pub fn face(&self) -> usize {
        *self as usize
    }

    /// Reference axis normal to this side.
    pub fn axis(&self) -> usize {
        self.face() / 2
    }

    /// Whether this is the upper side along its axis.
    pub fn is_max(&self) -> bool {
        self.face() % 2 == 1
    }

    /// Tags that exist in `ndims` dimensions.
    pub fn sides(ndims: usize) -> &'static [BoundaryTag] {
        &Self::ALL[..2 * ndims]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_roundtrip() {
        for face in 0..6 {
            assert_eq!(BoundaryTag::from_face(face).face(), face);
        }
        assert_eq!(BoundaryTag::YMax.axis(), 1);
        assert!(BoundaryTag::YMax.is_max());
        assert!(!BoundaryTag::ZMin.is_max());
        assert_eq!(BoundaryTag::sides(2).len(), 4);
    }
}

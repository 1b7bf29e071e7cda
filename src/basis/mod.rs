//! Modal basis representations.
//!
//! The nodal DG operators live in [`crate::operators`]; this module only
//! provides the nodal-modal transform used by modal smoothness indicators.

mod vandermonde;

pub use vandermonde::Vandermonde;

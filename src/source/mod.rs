//! Source terms.
//!
//! Source terms represent contributions that are not part of the
//! hyperbolic flux, e.g. manufactured-solution forcing for convergence
//! studies. They are evaluated at each node and added to the residual.

mod terms;

pub use terms::{CombinedSource, SourceTerms};

//! Boundary conditions.
//!
//! Boundary conditions specify the exterior state (or the flux directly)
//! at boundary faces. They are attached per side of the domain with
//! [`BoundaryConditions`]; a non-periodic side without a condition is a
//! setup error.
//!
//! | BC Type | Description |
//! |---------|-------------|
//! | `BoundaryConditionDirichlet` | Prescribed exterior state u_b(x, t) |
//! | `BoundaryConditionDoNothing` | Supersonic outflow, physical flux of the interior trace |
//! | `BoundaryConditionSlipWall` | Mirror state, zero normal mass flux |

mod conditions;

pub use conditions::{
    BoundaryCondition, BoundaryConditionDirichlet, BoundaryConditionDoNothing,
    BoundaryConditionSlipWall, BoundaryConditions,
};

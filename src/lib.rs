//! # dgsem
//!
//! Discontinuous Galerkin spectral element methods (DGSEM) for hyperbolic
//! conservation laws on tensor-product elements.
//!
//! This crate provides:
//! - Polynomial bases on Gauss-Lobatto nodes with SBP operators
//! - Entropy-conservative flux differencing and nonconservative terms
//! - Surface coupling on conforming interfaces, boundaries and 2:1 mortars
//! - Shock capturing by element-wise blending with subcell finite volumes
//! - An invariant domain preserving (IDP) subcell limiter
//! - Explicit Runge-Kutta time integration with stage callbacks
//! - Element-parallel residual evaluation (feature `parallel`, on by default)
//!
//! # Example
//!
//! ```
//! use dgsem::boundary::BoundaryConditions;
//! use dgsem::equations::LinearScalarAdvection;
//! use dgsem::flux::{FluxCentral, FluxLaxFriedrichs};
//! use dgsem::mesh::TreeMesh;
//! use dgsem::simulation::Simulation;
//! use dgsem::solver::{DgConfig, DgSemidiscretization};
//! use dgsem::time::SSPRK3;
//!
//! let mesh = TreeMesh::new([4, 4], [-1.0, -1.0], [1.0, 1.0], [true, true]).unwrap();
//! let equations = LinearScalarAdvection::new([1.0, 1.0]);
//! let config = DgConfig::new(3, FluxLaxFriedrichs, FluxCentral);
//! let semi = DgSemidiscretization::new(mesh, equations, config, BoundaryConditions::periodic()).unwrap();
//!
//! let mut u = semi.compute_coefficients(|x, _t| [1.0 + 0.5 * (std::f64::consts::PI * (x[0] + x[1])).sin()], 0.0);
//! let mass = semi.integrate(&u)[0];
//!
//! let mut sim = Simulation::new(semi, SSPRK3).unwrap().with_cfl(0.5);
//! let result = sim.run(&mut u, 0.0, 0.1).unwrap();
//! assert!(result.reached_end);
//! assert!((sim.semi().integrate(&u)[0] - mass).abs() < 1e-12);
//! ```

pub mod basis;
pub mod boundary;
pub mod equations;
pub mod error;
pub mod flux;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod simulation;
pub mod solver;
pub mod source;
pub mod time;

// Re-export main types for convenience
pub use boundary::{BoundaryCondition, BoundaryConditions};
pub use equations::{CompressibleEuler, Equations, LinearScalarAdvection, NonlinearVariable, ShallowWater2D};
pub use error::{BoundsReport, BoundsViolation, DgError, Result};
pub use flux::{NonconservativeFlux, NumericalFlux};
pub use mesh::{BoundaryTag, TreeMesh};
pub use operators::{ElementGeometry, LobattoBasis, TensorLayout};
pub use simulation::{Simulation, SimulationConfig, SimulationResult, TimeStepControl};
pub use solver::{
    DgConfig, DgSemidiscretization, IndicatorHennemannGassner, IndicatorLohner, OneSidedBound, Solution,
    SubcellLimiterIdp, VolumeIntegral,
};
pub use source::SourceTerms;
pub use time::{
    AnalysisCallback, BoundsCheckCallback, BoundsCheckConfig, CarpenterKennedy2N54, SSPRK3, Semidiscretization,
    TimeIntegrator,
};

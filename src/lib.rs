//! buckleup - linear buckling analysis of rectangular plates
//!
//! Performs an eigenvalue buckling analysis of a rectangular plate under
//! biaxial in-plane edge stress on top of a general nonlinear FE engine,
//! using a two-pass stiffness-extraction technique:
//! - symmetric mesh sizing so the plate centerlines land on node lines
//! - tributary-length distribution of the edge stresses into nodal forces
//! - two static passes capturing the reference and the loaded tangent
//!   stiffness; their difference is the geometric stiffness
//! - the generalized eigenproblem K0·x = λ·ΔK·x, filtered to positive
//!   critical load factors in ascending order
//! - per-mode model rebuilds that realize each eigenvector as an imposed
//!   displacement field for visualization
//!
//! The FE engine itself is a collaborator consumed through the
//! [`engine::FeEngine`] trait; this crate implements only the buckling
//! procedure and its numerical policies.
//!
//! ## Example
//! ```rust,ignore
//! use buckleup::prelude::*;
//!
//! let config = AnalysisConfig::default(); // 1 m x 1 m steel plate
//! let mut engine = MyEngine::new();       // any FeEngine implementation
//! let mut renderer = PngRenderer::new("out");
//!
//! let report = BucklingAnalysis::new(config).run(&mut engine, &mut renderer)?;
//! println!("{report}");
//! # Ok::<(), buckleup::error::BucklingError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod eigen;
pub mod engine;
pub mod error;
pub mod loads;
pub mod mesh;
pub mod model;
pub mod modes;
pub mod render;
pub mod results;
pub mod stiffness;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::BucklingAnalysis;
    pub use crate::config::{
        AnalysisConfig, LoadCase, MaterialProperties, PlateGeometry, SupportConfig,
    };
    pub use crate::eigen::ModeCandidate;
    pub use crate::engine::{Convergence, EngineError, EngineResult, FeEngine, NodeTag};
    pub use crate::error::{BucklingError, BucklingResult};
    pub use crate::mesh::{element_sizes, ElementSizes};
    pub use crate::render::{NullRenderer, PngRenderer, Renderer};
    pub use crate::results::{BucklingReport, DeformedShape, ModeRecord};
    pub use crate::stiffness::{DofMap, StiffnessExtraction};
}

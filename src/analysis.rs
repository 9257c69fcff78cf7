//! Top-level buckling analysis orchestration
//!
//! Strictly sequential: geometry and input checks, model build, the two
//! stiffness-extraction passes, the eigen solve, then one rebuild-and-solve
//! cycle per retained mode. Every step must finish before the next starts
//! because each one reads state the previous step fixed (the DofMap above
//! all). The engine is borrowed mutably for the whole run, which keeps its
//! single global analysis context under exclusive control.

use crate::config::AnalysisConfig;
use crate::eigen;
use crate::engine::FeEngine;
use crate::error::BucklingResult;
use crate::mesh;
use crate::model::PlateModel;
use crate::modes;
use crate::render::Renderer;
use crate::results::{BucklingReport, DeformedShape};
use crate::stiffness;

/// One configured buckling run
#[derive(Debug, Clone)]
pub struct BucklingAnalysis {
    config: AnalysisConfig,
}

impl BucklingAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Execute the full procedure against the given engine and renderer.
    ///
    /// Geometry and eigen-feasibility failures abort with no partial
    /// output; a failed per-mode reconstruction only costs that mode its
    /// shape.
    pub fn run<E: FeEngine, R: Renderer>(
        &self,
        engine: &mut E,
        renderer: &mut R,
    ) -> BucklingResult<BucklingReport> {
        // Mesh sizing comes first: degenerate dimensions must surface as a
        // geometry error before any engine call is made
        let sizes = mesh::element_sizes(
            self.config.geometry.width,
            self.config.geometry.height,
            self.config.nelem,
        )?;
        self.config.validate()?;

        log::info!(
            "Building {}x{} m plate model, element size {:.4} m",
            self.config.geometry.width,
            self.config.geometry.height,
            sizes.global
        );
        let model = PlateModel::new(&self.config, sizes);
        model.build(engine)?;
        renderer.render_model(&DeformedShape::capture(engine)?, "model")?;

        let extraction = stiffness::extract(engine, &self.config, &sizes)?;
        renderer.render_deformed(&DeformedShape::capture(engine)?, "static_defo")?;

        let candidates = eigen::solve_buckling_modes(
            &extraction.k0,
            &extraction.delta_k,
            self.config.nmodes,
        )?;

        let records = modes::reconstruct_modes(
            engine,
            renderer,
            &self.config,
            sizes,
            &extraction.dof_map,
            &candidates,
        )?;

        Ok(BucklingReport {
            modes: records,
            free_dofs: extraction.dof_map.free_dof_count(),
        })
    }
}

//! Mode-shape reconstruction
//!
//! The eigenvectors live on the free-DOF vector space and are not directly
//! renderable. Each retained mode is realized as an actual displacement
//! state: the model is rebuilt from scratch (the loaded extraction pass
//! leaves nonlinear state behind, and the engine has no checkpoint/restore,
//! so wipe-and-rebuild is the isolation mechanism), the plate-bending
//! components of the eigenvector (Uz, Rx, Ry) are imposed as prescribed
//! nodal displacements through the original DofMap, and one static step
//! realizes the constraints. A mode whose step does not converge is skipped
//! without affecting its siblings.

use crate::config::AnalysisConfig;
use crate::eigen::ModeCandidate;
use crate::engine::{
    Algorithm, ConstraintHandler, FeEngine, Integrator, Numberer, SystemType, TimeSeries,
};
use crate::error::BucklingResult;
use crate::mesh::ElementSizes;
use crate::model::PlateModel;
use crate::render::Renderer;
use crate::results::{DeformedShape, ModeRecord};
use crate::stiffness::DofMap;

const PATTERN_TAG: u32 = 1;

/// Local DOF indices carrying plate-bending behavior: Uz, Rx, Ry
const BENDING_DOFS: std::ops::RangeInclusive<usize> = 2..=4;

/// Rebuild and solve one model per retained mode, returning a record per
/// candidate in ascending load-factor order.
pub fn reconstruct_modes<E: FeEngine, R: Renderer>(
    engine: &mut E,
    renderer: &mut R,
    config: &AnalysisConfig,
    sizes: ElementSizes,
    dof_map: &DofMap,
    candidates: &[ModeCandidate],
) -> BucklingResult<Vec<ModeRecord>> {
    let model = PlateModel::new(config, sizes);
    let mut records = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        // The candidate keeps its rank in the positive spectrum, so the
        // numbering stays truthful even when lower modes were skipped
        let mode = candidate.rank;
        log::info!(
            "Reconstructing mode {mode} (load factor {:.6})",
            candidate.lambda
        );

        let shape = match reconstruct_one(engine, &model, dof_map, candidate)? {
            Some(shape) => {
                renderer.render_deformed(&shape, &format!("mode_{mode}"))?;
                Some(shape)
            }
            None => {
                log::warn!("Static analysis for mode {mode} failed; skipping its shape");
                None
            }
        };

        records.push(ModeRecord {
            mode,
            load_factor: candidate.lambda,
            critical_sigma_x: candidate.lambda * config.load.sigma_x * 1.0e-6,
            critical_sigma_y: candidate.lambda * config.load.sigma_y * 1.0e-6,
            shape,
        });
    }

    Ok(records)
}

/// One reset-to-baseline, impose, solve cycle. `Ok(None)` means the step
/// did not converge.
fn reconstruct_one<E: FeEngine>(
    engine: &mut E,
    model: &PlateModel<'_>,
    dof_map: &DofMap,
    candidate: &ModeCandidate,
) -> BucklingResult<Option<DeformedShape>> {
    model.build(engine)?;

    engine.set_system(SystemType::BandGeneral)?;
    engine.set_integrator(Integrator::LoadControl {
        incr: 1.0,
        max_iter: 100,
    })?;
    engine.set_constraint_handler(ConstraintHandler::Transformation)?;
    engine.set_algorithm(Algorithm::ModifiedNewton)?;
    engine.set_numberer(Numberer::Rcm)?;
    engine.set_static_analysis()?;

    // The engine requires an active pattern before prescribed displacements
    // can be attached; a constant zero-magnitude one serves
    engine.define_time_series(PATTERN_TAG, TimeSeries::Constant)?;
    engine.define_load_pattern(PATTERN_TAG, PATTERN_TAG)?;

    for (tag, dofs) in dof_map.entries() {
        for local in BENDING_DOFS {
            let global = dofs[local];
            if global >= 0 {
                engine.impose_displacement(*tag, local, candidate.shape[global as usize])?;
            }
        }
    }

    model.apply_supports(engine)?;

    if !engine.analyze(1)?.is_converged() {
        return Ok(None);
    }
    Ok(Some(DeformedShape::capture(engine)?))
}

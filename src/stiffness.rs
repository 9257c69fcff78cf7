//! Two-pass tangent-stiffness extraction
//!
//! The engine exposes no buckling analysis of its own, but it does expose
//! the assembled tangent stiffness. Solving once without load yields the
//! reference stiffness K0 and fixes the free-DOF numbering; solving again
//! under the edge loads applied in a single increment yields the loaded
//! tangent stiffness K1 on the same numbering. Their difference
//! ΔK = K0 - K1 is the load-induced stiffness reduction, i.e. the geometric
//! stiffness the eigenproblem is built on.
//!
//! The numbering captured in the first pass is reused verbatim by every
//! later step, so the topology must not change between passes; that
//! invariant is checked explicitly after the loaded pass.

use nalgebra::DMatrix;

use crate::config::AnalysisConfig;
use crate::engine::{
    Algorithm, ConstraintHandler, EngineError, FeEngine, Integrator, NodeTag, Numberer,
    SystemType, TimeSeries,
};
use crate::error::{BucklingError, BucklingResult, ExtractionPass};
use crate::loads;
use crate::mesh::ElementSizes;

const LOAD_TIME_SERIES_TAG: u32 = 1;
const LOAD_PATTERN_TAG: u32 = 1;

/// Snapshot of the engine's free-DOF numbering
///
/// Maps every (node, local DOF) pair to its global free-DOF index, with -1
/// for constrained DOFs. Captured once during the reference pass and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DofMap {
    entries: Vec<(NodeTag, Vec<i64>)>,
    free_dofs: usize,
}

impl DofMap {
    /// Query the engine's current numbering.
    pub fn capture<E: FeEngine>(engine: &E) -> BucklingResult<Self> {
        let mut entries = Vec::new();
        for tag in engine.node_tags() {
            entries.push((tag, engine.node_dofs(tag)?));
        }
        Ok(Self {
            entries,
            free_dofs: engine.system_size()?,
        })
    }

    /// Number of free DOFs (the eigenproblem dimension N)
    pub fn free_dof_count(&self) -> usize {
        self.free_dofs
    }

    /// Per-node numbering in node-definition order
    pub fn entries(&self) -> &[(NodeTag, Vec<i64>)] {
        &self.entries
    }
}

/// Output of the two extraction passes
#[derive(Debug, Clone)]
pub struct StiffnessExtraction {
    /// Reference tangent stiffness (unloaded)
    pub k0: DMatrix<f64>,
    /// Geometric stiffness ΔK = K0 - K1
    pub delta_k: DMatrix<f64>,
    /// Free-DOF numbering both matrices are indexed by
    pub dof_map: DofMap,
}

/// Run both extraction passes on an already built model.
///
/// Fatal on non-convergence of either pass: failure here indicates a
/// degenerate model (zero thickness, zero modulus, ...) rather than a
/// buckling outcome.
pub fn extract<E: FeEngine>(
    engine: &mut E,
    config: &AnalysisConfig,
    sizes: &ElementSizes,
) -> BucklingResult<StiffnessExtraction> {
    // Reference pass: zero load increment, full matrix storage so the
    // assembled tangent can be read back
    engine.set_system(SystemType::FullGeneral)?;
    engine.set_integrator(Integrator::LoadControl {
        incr: 0.0,
        max_iter: 1,
    })?;
    engine.set_algorithm(Algorithm::ModifiedNewton)?;
    engine.set_constraint_handler(ConstraintHandler::Plain)?;
    engine.set_numberer(Numberer::Rcm)?;
    engine.set_static_analysis()?;

    log::info!("Extracting reference stiffness K0");
    if !engine.analyze(1)?.is_converged() {
        return Err(BucklingError::ModelExtraction {
            pass: ExtractionPass::Reference,
            detail: "static analysis did not converge; check the input values".into(),
        });
    }

    let dof_map = DofMap::capture(engine)?;
    let n = dof_map.free_dof_count();
    let k0 = read_stiffness(engine, n)?;

    // Loaded pass: edge loads applied in one full increment on the same
    // model instance
    engine.define_time_series(LOAD_TIME_SERIES_TAG, TimeSeries::Linear)?;
    engine.define_load_pattern(LOAD_PATTERN_TAG, LOAD_TIME_SERIES_TAG)?;
    loads::distribute_edge_loads(engine, &config.geometry, &config.load, sizes)?;

    engine.set_system(SystemType::FullGeneral)?;
    engine.set_integrator(Integrator::LoadControl {
        incr: 1.0,
        max_iter: 100,
    })?;
    engine.set_algorithm(Algorithm::ModifiedNewton)?;

    log::info!("Extracting loaded stiffness K1");
    if !engine.analyze(1)?.is_converged() {
        return Err(BucklingError::ModelExtraction {
            pass: ExtractionPass::Loaded,
            detail: "loaded static analysis did not converge; check the input values".into(),
        });
    }

    if DofMap::capture(engine)? != dof_map {
        return Err(BucklingError::DofMapMismatch);
    }

    let k1 = read_stiffness(engine, n)?;
    let delta_k = &k0 - k1;

    Ok(StiffnessExtraction {
        k0,
        delta_k,
        dof_map,
    })
}

/// Read the flattened tangent stiffness back and reshape it to N×N.
fn read_stiffness<E: FeEngine>(engine: &E, n: usize) -> BucklingResult<DMatrix<f64>> {
    let flat = engine.tangent_stiffness()?;
    if flat.len() != n * n {
        return Err(BucklingError::Engine(EngineError(format!(
            "tangent stiffness has {} entries, expected {n}x{n}",
            flat.len()
        ))));
    }
    Ok(DMatrix::from_row_slice(n, n, &flat))
}

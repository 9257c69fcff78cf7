//! FE engine abstraction
//!
//! The buckling procedure drives a general nonlinear finite-element engine
//! through this trait instead of binding to one implementation. The trait
//! mirrors the command surface the procedure actually needs: model and mesh
//! definition, coordinate-plane boundary conditions, solver configuration,
//! single-step static analysis, and tangent-stiffness / DOF-numbering
//! queries.
//!
//! An engine holds a single mutable global analysis context, so exactly one
//! model may exist at a time. Callers own the engine exclusively (`&mut`)
//! for the duration of a run and must call [`FeEngine::reset`] before
//! rebuilding a model.

use thiserror::Error;

/// Engine-side fault (singular system, unknown tag, backend failure, ...)
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct EngineError(pub String);

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError(s.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Node identifier assigned by the engine
pub type NodeTag = u32;

/// Constraint mask over the six nodal DOFs (Ux, Uy, Uz, Rx, Ry, Rz);
/// `true` clamps the DOF
pub type DofMask = [bool; 6];

/// Shell element formulation selector for quad meshing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// Geometrically nonlinear quadrilateral shell (tracks the load-induced
    /// change of tangent stiffness the extraction relies on)
    NonlinearQuad,
}

/// Linear-system storage scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemType {
    /// Full dense storage; required when the tangent matrix is read back
    FullGeneral,
    /// Banded storage for plain displacement solves
    BandGeneral,
}

/// Static integrator selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Integrator {
    /// Load-controlled stepping with increment `incr` and an iteration
    /// budget per step
    LoadControl { incr: f64, max_iter: usize },
}

/// Iterative solution algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    ModifiedNewton,
}

/// Constraint-handling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintHandler {
    /// Direct elimination of single-point constraints
    Plain,
    /// Transformation method; required for prescribed-displacement
    /// constraints
    Transformation,
}

/// DOF numbering scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numberer {
    /// Reverse Cuthill-McKee
    Rcm,
}

/// Time-series shape for a load pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSeries {
    /// Factor grows linearly with pseudo-time
    Linear,
    /// Constant unit factor
    Constant,
}

/// Outcome of a static-analysis step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Converged,
    Diverged,
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }
}

/// Command surface of the external FE engine
pub trait FeEngine {
    /// Tear down the current model and analysis state entirely
    fn reset(&mut self);

    /// Start a fresh model with `ndm` spatial dimensions and `ndf` DOFs per
    /// node
    fn init_model(&mut self, ndm: usize, ndf: usize) -> EngineResult<()>;

    /// Define an isotropic elastic nD material
    fn define_elastic_isotropic(&mut self, tag: u32, e: f64, v: f64, rho: f64)
        -> EngineResult<()>;

    /// Define a plate-fiber section referencing a previously defined material
    fn define_plate_fiber_section(
        &mut self,
        tag: u32,
        material_tag: u32,
        thickness: f64,
    ) -> EngineResult<()>;

    /// Define a node at the given coordinates
    fn define_node(&mut self, tag: NodeTag, x: f64, y: f64, z: f64) -> EngineResult<()>;

    /// Mesh the polyline through `nodes` with segments of length `size`,
    /// creating intermediate nodes
    fn mesh_line(&mut self, tag: u32, nodes: &[NodeTag], size: f64) -> EngineResult<()>;

    /// Mesh the quadrilateral region bounded by previously meshed lines with
    /// shell elements of the selected formulation and section
    fn mesh_quad(
        &mut self,
        tag: u32,
        lines: &[u32],
        size: f64,
        shell: ShellKind,
        section_tag: u32,
    ) -> EngineResult<()>;

    /// Clamp the masked DOFs of every existing node on the plane x = `x`
    /// (within the engine's coordinate tolerance)
    fn fix_x(&mut self, x: f64, mask: DofMask) -> EngineResult<()>;

    /// Clamp the masked DOFs of every existing node on the plane y = `y`
    fn fix_y(&mut self, y: f64, mask: DofMask) -> EngineResult<()>;

    // Solver configuration. Each setter replaces the previous choice; the
    // combination becomes active with `set_static_analysis`.
    fn set_system(&mut self, system: SystemType) -> EngineResult<()>;
    fn set_integrator(&mut self, integrator: Integrator) -> EngineResult<()>;
    fn set_algorithm(&mut self, algorithm: Algorithm) -> EngineResult<()>;
    fn set_constraint_handler(&mut self, handler: ConstraintHandler) -> EngineResult<()>;
    fn set_numberer(&mut self, numberer: Numberer) -> EngineResult<()>;
    fn set_static_analysis(&mut self) -> EngineResult<()>;

    /// Define a time series under `tag`
    fn define_time_series(&mut self, tag: u32, series: TimeSeries) -> EngineResult<()>;

    /// Create a plain load pattern bound to a time series; subsequent loads
    /// and prescribed displacements attach to it
    fn define_load_pattern(&mut self, tag: u32, time_series_tag: u32) -> EngineResult<()>;

    /// Add a nodal load (force and moment components) to the active pattern
    fn apply_load(&mut self, node: NodeTag, components: [f64; 6]) -> EngineResult<()>;

    /// Prescribe a displacement at one nodal DOF (0-based local index) in
    /// the active pattern
    fn impose_displacement(&mut self, node: NodeTag, dof: usize, value: f64)
        -> EngineResult<()>;

    /// Run `steps` static-analysis steps, reporting convergence
    fn analyze(&mut self, steps: usize) -> EngineResult<Convergence>;

    /// Number of free DOFs in the current numbering
    fn system_size(&self) -> EngineResult<usize>;

    /// Current tangent stiffness, flattened row-major over the free DOFs
    fn tangent_stiffness(&self) -> EngineResult<Vec<f64>>;

    /// All node tags in definition order
    fn node_tags(&self) -> Vec<NodeTag>;

    /// Coordinates of a node
    fn node_coordinates(&self, node: NodeTag) -> EngineResult<[f64; 3]>;

    /// Global free-DOF index per local DOF of a node; -1 marks a constrained
    /// DOF
    fn node_dofs(&self, node: NodeTag) -> EngineResult<Vec<i64>>;

    /// Current displacement state of a node
    fn node_displacement(&self, node: NodeTag) -> EngineResult<[f64; 6]>;
}

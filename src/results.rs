//! Result types for the buckling analysis

use serde::{Deserialize, Serialize};

use crate::engine::{EngineResult, FeEngine, NodeTag};

/// Position and displacement state of one node
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeformedNode {
    pub tag: NodeTag,
    /// Undeformed coordinates [x, y, z]
    pub coords: [f64; 3],
    /// Displacement components [Ux, Uy, Uz, Rx, Ry, Rz]
    pub displacement: [f64; 6],
}

/// Nodal displacement field of the current engine state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeformedShape {
    pub nodes: Vec<DeformedNode>,
}

impl DeformedShape {
    /// Snapshot every node of the current model.
    pub fn capture<E: FeEngine>(engine: &E) -> EngineResult<Self> {
        let mut nodes = Vec::new();
        for tag in engine.node_tags() {
            nodes.push(DeformedNode {
                tag,
                coords: engine.node_coordinates(tag)?,
                displacement: engine.node_displacement(tag)?,
            });
        }
        Ok(Self { nodes })
    }

    /// Largest absolute out-of-plane displacement
    pub fn max_out_of_plane(&self) -> f64 {
        self.nodes
            .iter()
            .map(|n| n.displacement[2].abs())
            .fold(0.0, f64::max)
    }
}

/// One analyzed buckling mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeRecord {
    /// Mode number: 1-based rank of the eigenvalue in the ascending
    /// positive spectrum
    pub mode: usize,
    /// Critical load factor λ
    pub load_factor: f64,
    /// λ · sigma_x [N/mm²]
    pub critical_sigma_x: f64,
    /// λ · sigma_y [N/mm²]
    pub critical_sigma_y: f64,
    /// Reconstructed deformed shape; `None` when the reconstruction pass
    /// did not converge
    pub shape: Option<DeformedShape>,
}

/// Complete output of one buckling run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucklingReport {
    pub modes: Vec<ModeRecord>,
    /// Free-DOF count of the analyzed model
    pub free_dofs: usize,
}

impl BucklingReport {
    /// Serialize the report to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for BucklingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "+-----------+--------------------------+------------------+------------------+"
        )?;
        writeln!(
            f,
            "| Eigenmode | Critical load factor [-] | Sxx,crit [N/mm2] | Syy,crit [N/mm2] |"
        )?;
        writeln!(
            f,
            "+-----------+--------------------------+------------------+------------------+"
        )?;
        for record in &self.modes {
            writeln!(
                f,
                "| {:>9} | {:>24.6} | {:>16.6} | {:>16.6} |",
                record.mode, record.load_factor, record.critical_sigma_x, record.critical_sigma_y
            )?;
        }
        write!(
            f,
            "+-----------+--------------------------+------------------+------------------+"
        )
    }
}

//! Deterministic scripted FE engine for integration tests
//!
//! Stands in for the external nonlinear FE engine: it honors the full
//! command surface (model building, plane clamps, DOF numbering, load
//! patterns, prescribed displacements) with real bookkeeping, but
//! synthesizes the tangent stiffness instead of assembling shell elements.
//! The synthetic matrices keep the properties the buckling procedure relies
//! on: the reference stiffness is diagonal positive definite, and the
//! loaded stiffness shifts by a load-proportional diagonal whose sign
//! follows the net edge-load direction (inward/compressive loads soften the
//! model, outward/tensile loads stiffen it). Degenerate sections (zero
//! thickness or modulus) make the static analysis diverge, as a real
//! engine's element state determination would.

use std::collections::HashMap;

use buckleup::engine::{
    Algorithm, ConstraintHandler, Convergence, DofMask, EngineError, EngineResult, FeEngine,
    Integrator, NodeTag, Numberer, ShellKind, SystemType, TimeSeries,
};

const COORD_TOL: f64 = 1e-9;

#[derive(Debug, Clone)]
struct GridNode {
    tag: NodeTag,
    coords: [f64; 3],
    fixed: [bool; 6],
}

#[derive(Debug, Clone)]
struct LineMesh {
    size: f64,
    vertical: bool,
}

#[derive(Debug, Default)]
pub struct GridEngine {
    nodes: Vec<GridNode>,
    lines: Vec<LineMesh>,
    material: Option<(f64, f64)>,
    thickness: Option<f64>,
    pattern_active: bool,
    loads: HashMap<NodeTag, [f64; 6]>,
    prescribed: HashMap<(NodeTag, usize), f64>,
    numbering: Option<HashMap<NodeTag, [i64; 6]>>,
    free_dofs: usize,
    stiffness: Vec<f64>,
    displacements: HashMap<NodeTag, [f64; 6]>,
    /// Test knob: make this many prescribed-displacement solves diverge.
    /// Survives `reset` so it can be armed before a run.
    pub fail_prescribed_passes: usize,
}

impl GridEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while no model-building command has reached the engine
    pub fn is_untouched(&self) -> bool {
        self.nodes.is_empty() && self.material.is_none() && self.thickness.is_none()
    }

    fn node(&self, tag: NodeTag) -> EngineResult<&GridNode> {
        self.nodes
            .iter()
            .find(|n| n.tag == tag)
            .ok_or_else(|| EngineError(format!("unknown node tag {tag}")))
    }

    fn next_tag(&self) -> NodeTag {
        self.nodes.iter().map(|n| n.tag).max().unwrap_or(0) + 1
    }

    fn find_or_create(&mut self, x: f64, y: f64) -> NodeTag {
        if let Some(node) = self
            .nodes
            .iter()
            .find(|n| (n.coords[0] - x).abs() < COORD_TOL && (n.coords[1] - y).abs() < COORD_TOL)
        {
            return node.tag;
        }
        let tag = self.next_tag();
        self.nodes.push(GridNode {
            tag,
            coords: [x, y, 0.0],
            fixed: [false; 6],
        });
        tag
    }

    fn assign_numbering(&mut self) {
        let mut map = HashMap::new();
        let mut next = 0i64;
        for node in &self.nodes {
            let mut dofs = [-1i64; 6];
            for (local, slot) in dofs.iter_mut().enumerate() {
                if !node.fixed[local] {
                    *slot = next;
                    next += 1;
                }
            }
            map.insert(node.tag, dofs);
        }
        self.numbering = Some(map);
        self.free_dofs = next as usize;
    }

    /// Net load work direction: negative when the edge loads point inward
    /// (compression), positive when they point outward (tension)
    fn load_measure(&self) -> f64 {
        let mut w = 0.0;
        for (tag, force) in &self.loads {
            if let Ok(node) = self.node(*tag) {
                w += force[0] * node.coords[0].signum() + force[1] * node.coords[1].signum();
            }
        }
        w
    }

    fn synthesize_stiffness(&mut self) {
        let n = self.free_dofs;
        let w = self.load_measure();
        let numbering = self.numbering.clone().unwrap_or_default();
        let mut k = vec![0.0; n * n];
        for node in &self.nodes {
            let dofs = numbering[&node.tag];
            for (local, &global) in dofs.iter().enumerate() {
                if global < 0 {
                    continue;
                }
                let i = global as usize;
                let base = 1.0 + 0.01 * i as f64;
                // Only the plate-bending DOFs (Uz, Rx, Ry) feel the
                // membrane stress state
                let geo = if (2..=4).contains(&local) {
                    0.3 + ((i * 37) % 97) as f64 / 97.0
                } else {
                    0.0
                };
                k[i * n + i] = base + w * geo;
            }
        }
        self.stiffness = k;
    }
}

impl FeEngine for GridEngine {
    fn reset(&mut self) {
        let keep = self.fail_prescribed_passes;
        *self = Self::default();
        self.fail_prescribed_passes = keep;
    }

    fn init_model(&mut self, ndm: usize, ndf: usize) -> EngineResult<()> {
        if ndm != 3 || ndf != 6 {
            return Err(EngineError(format!(
                "unsupported model space: ndm = {ndm}, ndf = {ndf}"
            )));
        }
        Ok(())
    }

    fn define_elastic_isotropic(
        &mut self,
        _tag: u32,
        e: f64,
        v: f64,
        _rho: f64,
    ) -> EngineResult<()> {
        self.material = Some((e, v));
        Ok(())
    }

    fn define_plate_fiber_section(
        &mut self,
        _tag: u32,
        _material_tag: u32,
        thickness: f64,
    ) -> EngineResult<()> {
        if self.material.is_none() {
            return Err(EngineError("section references an undefined material".into()));
        }
        self.thickness = Some(thickness);
        Ok(())
    }

    fn define_node(&mut self, tag: NodeTag, x: f64, y: f64, z: f64) -> EngineResult<()> {
        if self.nodes.iter().any(|n| n.tag == tag) {
            return Err(EngineError(format!("duplicate node tag {tag}")));
        }
        self.nodes.push(GridNode {
            tag,
            coords: [x, y, z],
            fixed: [false; 6],
        });
        Ok(())
    }

    fn mesh_line(&mut self, _tag: u32, nodes: &[NodeTag], size: f64) -> EngineResult<()> {
        let [a, b] = [nodes[0], nodes[1]];
        let start = self.node(a)?.coords;
        let end = self.node(b)?.coords;
        let length = ((end[0] - start[0]).powi(2) + (end[1] - start[1]).powi(2)).sqrt();
        let segments = (length / size).round().max(1.0) as usize;
        for i in 1..segments {
            let t = i as f64 / segments as f64;
            let x = start[0] + (end[0] - start[0]) * t;
            let y = start[1] + (end[1] - start[1]) * t;
            self.find_or_create(x, y);
        }
        self.lines.push(LineMesh {
            size,
            vertical: (end[0] - start[0]).abs() < COORD_TOL,
        });
        Ok(())
    }

    fn mesh_quad(
        &mut self,
        _tag: u32,
        _lines: &[u32],
        _size: f64,
        _shell: ShellKind,
        _section_tag: u32,
    ) -> EngineResult<()> {
        if self.thickness.is_none() {
            return Err(EngineError("quad mesh references an undefined section".into()));
        }
        let spacing_h = self
            .lines
            .iter()
            .find(|l| l.vertical)
            .map(|l| l.size)
            .ok_or_else(|| EngineError("no vertical boundary line meshed".into()))?;
        let spacing_w = self
            .lines
            .iter()
            .find(|l| !l.vertical)
            .map(|l| l.size)
            .ok_or_else(|| EngineError("no horizontal boundary line meshed".into()))?;

        let xs: Vec<f64> = self.nodes.iter().map(|n| n.coords[0]).collect();
        let ys: Vec<f64> = self.nodes.iter().map(|n| n.coords[1]).collect();
        let (min_x, max_x) = (
            xs.iter().cloned().fold(f64::INFINITY, f64::min),
            xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        );
        let (min_y, max_y) = (
            ys.iter().cloned().fold(f64::INFINITY, f64::min),
            ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        );

        let cols = ((max_x - min_x) / spacing_w).round().max(1.0) as usize;
        let rows = ((max_y - min_y) / spacing_h).round().max(1.0) as usize;
        for r in 0..=rows {
            let y = min_y + (max_y - min_y) * r as f64 / rows as f64;
            for c in 0..=cols {
                let x = min_x + (max_x - min_x) * c as f64 / cols as f64;
                self.find_or_create(x, y);
            }
        }
        Ok(())
    }

    fn fix_x(&mut self, x: f64, mask: DofMask) -> EngineResult<()> {
        for node in &mut self.nodes {
            if (node.coords[0] - x).abs() < 1e-10 {
                for (local, clamp) in mask.iter().enumerate() {
                    node.fixed[local] |= clamp;
                }
            }
        }
        Ok(())
    }

    fn fix_y(&mut self, y: f64, mask: DofMask) -> EngineResult<()> {
        for node in &mut self.nodes {
            if (node.coords[1] - y).abs() < 1e-10 {
                for (local, clamp) in mask.iter().enumerate() {
                    node.fixed[local] |= clamp;
                }
            }
        }
        Ok(())
    }

    fn set_system(&mut self, _system: SystemType) -> EngineResult<()> {
        Ok(())
    }

    fn set_integrator(&mut self, _integrator: Integrator) -> EngineResult<()> {
        Ok(())
    }

    fn set_algorithm(&mut self, _algorithm: Algorithm) -> EngineResult<()> {
        Ok(())
    }

    fn set_constraint_handler(&mut self, _handler: ConstraintHandler) -> EngineResult<()> {
        Ok(())
    }

    fn set_numberer(&mut self, _numberer: Numberer) -> EngineResult<()> {
        Ok(())
    }

    fn set_static_analysis(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn define_time_series(&mut self, _tag: u32, _series: TimeSeries) -> EngineResult<()> {
        Ok(())
    }

    fn define_load_pattern(&mut self, _tag: u32, _time_series_tag: u32) -> EngineResult<()> {
        self.pattern_active = true;
        Ok(())
    }

    fn apply_load(&mut self, node: NodeTag, components: [f64; 6]) -> EngineResult<()> {
        if !self.pattern_active {
            return Err(EngineError("no active load pattern".into()));
        }
        self.node(node)?;
        let entry = self.loads.entry(node).or_insert([0.0; 6]);
        for (slot, value) in entry.iter_mut().zip(components) {
            *slot += value;
        }
        Ok(())
    }

    fn impose_displacement(&mut self, node: NodeTag, dof: usize, value: f64) -> EngineResult<()> {
        if !self.pattern_active {
            return Err(EngineError("no active load pattern".into()));
        }
        self.node(node)?;
        self.prescribed.insert((node, dof), value);
        Ok(())
    }

    fn analyze(&mut self, _steps: usize) -> EngineResult<Convergence> {
        let (e, _) = self
            .material
            .ok_or_else(|| EngineError("no material defined".into()))?;
        let thickness = self
            .thickness
            .ok_or_else(|| EngineError("no section defined".into()))?;

        // A zero-stiffness model never converges
        if thickness <= 0.0 || e <= 0.0 {
            return Ok(Convergence::Diverged);
        }

        if !self.prescribed.is_empty() && self.fail_prescribed_passes > 0 {
            self.fail_prescribed_passes -= 1;
            return Ok(Convergence::Diverged);
        }

        self.assign_numbering();

        if self.prescribed.is_empty() {
            self.synthesize_stiffness();
            // Mild in-plane settling under the edge loads
            let w = self.load_measure();
            self.displacements = self
                .nodes
                .iter()
                .map(|n| {
                    let mut d = [0.0; 6];
                    d[0] = w * 1e-12 * n.coords[0];
                    d[1] = w * 1e-12 * n.coords[1];
                    (n.tag, d)
                })
                .collect();
        } else {
            // The static step realizes the prescribed displacements exactly
            self.displacements.clear();
            for ((tag, dof), value) in &self.prescribed {
                let entry = self.displacements.entry(*tag).or_insert([0.0; 6]);
                entry[*dof] = *value;
            }
        }

        Ok(Convergence::Converged)
    }

    fn system_size(&self) -> EngineResult<usize> {
        if self.numbering.is_none() {
            return Err(EngineError("no analysis has been run".into()));
        }
        Ok(self.free_dofs)
    }

    fn tangent_stiffness(&self) -> EngineResult<Vec<f64>> {
        if self.stiffness.is_empty() {
            return Err(EngineError("no stiffness has been assembled".into()));
        }
        Ok(self.stiffness.clone())
    }

    fn node_tags(&self) -> Vec<NodeTag> {
        self.nodes.iter().map(|n| n.tag).collect()
    }

    fn node_coordinates(&self, node: NodeTag) -> EngineResult<[f64; 3]> {
        Ok(self.node(node)?.coords)
    }

    fn node_dofs(&self, node: NodeTag) -> EngineResult<Vec<i64>> {
        let numbering = self
            .numbering
            .as_ref()
            .ok_or_else(|| EngineError("no DOF numbering assigned".into()))?;
        numbering
            .get(&node)
            .map(|dofs| dofs.to_vec())
            .ok_or_else(|| EngineError(format!("unknown node tag {node}")))
    }

    fn node_displacement(&self, node: NodeTag) -> EngineResult<[f64; 6]> {
        self.node(node)?;
        Ok(self.displacements.get(&node).copied().unwrap_or([0.0; 6]))
    }
}

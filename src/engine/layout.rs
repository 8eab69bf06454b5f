use std::collections::HashMap;
use std::f32::consts::TAU;

use log::debug;

use crate::graph::GraphNode;
use crate::util::stable_pair;

use super::interaction::ViewMode;
use super::math::Vec3;

/// Ring radius per hop distance; index 0 is the focus at the origin.
pub const RING_RADII: [f32; 6] = [0.0, 4.0, 8.0, 13.0, 19.0, 26.0];
pub const OUTERMOST_RING: usize = RING_RADII.len() - 1;

/// Per-ring angular phase so consecutive rings do not line up spoke-for-spoke.
const RING_PHASE_STEP: f32 = 0.37;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
    pub view: ViewMode,
    /// Vertical lift per ring in 3D.
    pub vertical_lift: f32,
    /// Amplitude of the deterministic per-node vertical jitter in 3D.
    pub jitter: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            view: ViewMode::ThreeD,
            vertical_lift: 1.2,
            jitter: 0.35,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodePosition {
    pub node_id: String,
    pub position: Vec3,
}

/// Positions for one graph, in input node order, with lookup by node id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    positions: Vec<NodePosition>,
    index_by_id: HashMap<String, usize>,
}

impl Layout {
    pub fn positions(&self) -> &[NodePosition] {
        &self.positions
    }

    pub fn get(&self, node_id: &str) -> Option<Vec3> {
        self.index_by_id
            .get(node_id)
            .map(|&index| self.positions[index].position)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Ring index for a hop distance. Unknown or negative distances land on the outermost ring, and
/// distances past the table are clamped to it.
pub fn ring_index(hop_distance: Option<i32>) -> usize {
    match hop_distance {
        Some(hop) if hop >= 0 => (hop as usize).min(OUTERMOST_RING),
        _ => OUTERMOST_RING,
    }
}

pub fn ring_radius(hop_distance: Option<i32>) -> f32 {
    RING_RADII[ring_index(hop_distance)]
}

/// Radii of the structural ring guides shown for a hop depth (hops 1..=depth).
pub fn visible_ring_radii(hops: u8) -> Vec<f32> {
    let depth = usize::from(hops).min(OUTERMOST_RING);
    RING_RADII[1..=depth].to_vec()
}

pub fn compute_layout(nodes: &[GraphNode], options: &LayoutOptions) -> Layout {
    let mut rings: [Vec<usize>; RING_RADII.len()] = Default::default();
    for (index, node) in nodes.iter().enumerate() {
        rings[ring_index(node.hop_distance)].push(index);
    }

    let mut positions = vec![Vec3::ZERO; nodes.len()];
    for (ring, members) in rings.iter_mut().enumerate() {
        if members.is_empty() {
            continue;
        }
        members.sort_by(|a, b| nodes[*a].node_id.cmp(&nodes[*b].node_id));

        let radius = RING_RADII[ring];
        let count = members.len() as f32;
        let phase = ring as f32 * RING_PHASE_STEP;

        for (slot, &index) in members.iter().enumerate() {
            let angle = phase + (slot as f32 / count) * TAU;
            let y = match options.view {
                ViewMode::TwoD => 0.0,
                ViewMode::ThreeD => {
                    let (_, jitter) = stable_pair(&nodes[index].node_id);
                    ring as f32 * options.vertical_lift + jitter * options.jitter
                }
            };
            positions[index] = Vec3::new(radius * angle.cos(), y, radius * angle.sin());
        }
    }

    debug!("computed {:?} layout for {} nodes", options.view, nodes.len());

    let mut index_by_id = HashMap::with_capacity(nodes.len());
    let positions = nodes
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(index, (node, position))| {
            index_by_id.entry(node.node_id.clone()).or_insert(index);
            NodePosition {
                node_id: node.node_id.clone(),
                position,
            }
        })
        .collect();

    Layout {
        positions,
        index_by_id,
    }
}

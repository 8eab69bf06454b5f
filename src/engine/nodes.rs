use std::collections::HashSet;

use crate::graph::{GraphEdge, GraphNode, NodeKind};

use super::color::{ColorCache, Rgb, dimmed, impact_intensity};
use super::interaction::InteractionState;

const SCALE_LOG_FACTOR: f32 = 0.3;
const SCALE_BASE: f32 = 0.45;
const FOCUS_SCALE_MULTIPLIER: f32 = 1.4;
const SELECTED_WHITE_BLEND: f32 = 0.35;
const HOVERED_WHITE_BLEND: f32 = 0.20;
const WIREFRAME_WHITE_BLEND: f32 = 0.45;
const BASE_OPACITY: f32 = 0.92;
const DIMMED_OPACITY: f32 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeShape {
    Sphere,
    Cube,
    Octahedron,
}

impl NodeShape {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Software => Self::Sphere,
            NodeKind::Dependency => Self::Cube,
            NodeKind::Runtime => Self::Octahedron,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
    pub node_id: String,
    pub shape: NodeShape,
    pub scale: f32,
    pub fill: Rgb,
    pub opacity: f32,
    pub wireframe: Rgb,
    pub emissive: f32,
    pub is_focus: bool,
    pub is_selected: bool,
    pub is_hovered: bool,
    pub dimmed: bool,
}

/// The active node and everything one edge away from it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    active: Option<String>,
    members: HashSet<String>,
}

impl Neighborhood {
    pub fn compute(edges: &[GraphEdge], active: Option<&str>) -> Self {
        let Some(active) = active else {
            return Self::default();
        };

        let mut members = HashSet::from([active.to_owned()]);
        for edge in edges {
            if edge.from_id == active {
                members.insert(edge.to_id.clone());
            } else if edge.to_id == active {
                members.insert(edge.from_id.clone());
            }
        }

        Self {
            active: Some(active.to_owned()),
            members,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.members.contains(node_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

pub fn node_scale(prod_interface_count: u32, is_focus: bool) -> f32 {
    let scale = (prod_interface_count as f32 + 1.0).log2() * SCALE_LOG_FACTOR + SCALE_BASE;
    if is_focus {
        scale * FOCUS_SCALE_MULTIPLIER
    } else {
        scale
    }
}

/// Visual attributes for one node under the current interaction state.
pub fn render_node(
    node: &GraphNode,
    state: &InteractionState,
    neighborhood: &Neighborhood,
    colors: &mut ColorCache,
) -> NodeVisual {
    let node_id = node.node_id.as_str();
    let is_focus = state.focus_node_id.as_deref() == Some(node_id);
    let is_selected = state.selected_node_id.as_deref() == Some(node_id);
    let is_hovered = state.hovered_node_id.as_deref() == Some(node_id);
    let is_dimmed = neighborhood.is_active() && !neighborhood.contains(node_id);

    let color_key = node.color_key.as_deref();
    let owner = colors.vivid_owner_color(color_key);
    let fill = if is_dimmed {
        dimmed(owner)
    } else if is_focus {
        Rgb::NEAR_WHITE
    } else if is_selected {
        owner.lerp(Rgb::WHITE, SELECTED_WHITE_BLEND)
    } else if is_hovered {
        owner.lerp(Rgb::WHITE, HOVERED_WHITE_BLEND)
    } else {
        colors.confidence_color(color_key, node.confidence_score)
    };

    let wireframe = if is_dimmed {
        fill
    } else {
        owner.lerp(Rgb::WHITE, WIREFRAME_WHITE_BLEND)
    };

    NodeVisual {
        node_id: node.node_id.clone(),
        shape: NodeShape::for_kind(node.kind),
        scale: node_scale(node.prod_interface_count, is_focus),
        fill,
        opacity: if is_dimmed { DIMMED_OPACITY } else { BASE_OPACITY },
        wireframe,
        emissive: if is_dimmed {
            0.0
        } else {
            impact_intensity(node.impact_score)
        },
        is_focus,
        is_selected,
        is_hovered,
        dimmed: is_dimmed,
    }
}

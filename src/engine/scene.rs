//! Per-frame orchestration of the pure components.
//!
//! The scene keeps the current graph and memoizes the expensive pure outputs by the inputs they
//! depend on: layout by `(query hash, view)`, edge geometry by `(query hash, view, active node)`,
//! the neighborhood by `(query hash, active node)` and labels by the full interaction tuple. A
//! frame is an immutable bundle of primitives; the renderer owns any buffer reuse.

use std::sync::Arc;

use log::debug;

use crate::graph::{GraphNode, GraphResponse, NodeKind};
use crate::util::{format_ratio, format_score};

use super::color::{ColorCache, DEFAULT_CACHE_CAPACITY};
use super::edges::{EdgePasses, dash_offset, route_edges};
use super::interaction::{InteractionState, ViewMode};
use super::labels::{NodeLabel, select_labels};
use super::layout::{Layout, LayoutOptions, RING_RADII, compute_layout, visible_ring_radii};
use super::math::Vec3;
use super::nodes::{Neighborhood, NodeVisual, render_node};

const HALO_SCALE: f32 = 1.7;
const HALO_PULSE_SPEED: f32 = 2.4;
const LABEL_CLEARANCE: f32 = 0.45;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSettings {
    pub vertical_lift: f32,
    pub layout_jitter: f32,
    pub color_cache_capacity: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        let layout = LayoutOptions::default();
        Self {
            vertical_lift: layout.vertical_lift,
            layout_jitter: layout.jitter,
            color_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl SceneSettings {
    fn layout_options(&self, view: ViewMode) -> LayoutOptions {
        LayoutOptions {
            view,
            vertical_lift: self.vertical_lift,
            jitter: self.layout_jitter,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
    pub visual: NodeVisual,
    pub position: Vec3,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel {
    pub label: NodeLabel,
    pub anchor: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingGuide {
    pub hop: u8,
    pub radius: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusHalo {
    pub center: Vec3,
    pub radius: f32,
    /// In [0, 1], animated from elapsed time.
    pub pulse: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub node_id: String,
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneFrame {
    pub nodes: Vec<PlacedNode>,
    pub edges: Arc<EdgePasses>,
    pub dash_offset: f32,
    pub labels: Vec<PlacedLabel>,
    pub rings: Vec<RingGuide>,
    pub focus_halo: Option<FocusHalo>,
    pub tooltip: Option<Tooltip>,
    pub truncation_notice: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneCounts {
    pub nodes: usize,
    pub highlighted_edges: usize,
    pub background_edges: usize,
    pub skipped_edges: usize,
}

impl SceneFrame {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn counts(&self) -> SceneCounts {
        SceneCounts {
            nodes: self.nodes.len(),
            highlighted_edges: self.edges.highlighted_count(),
            background_edges: self.edges.background_count(),
            skipped_edges: self.edges.skipped,
        }
    }

    /// Whether the frame changes with time alone (dash flow or the focus pulse).
    pub fn is_animated(&self) -> bool {
        self.edges.highlighted_count() > 0 || self.focus_halo.is_some()
    }
}

type EdgeKey = (String, ViewMode, Option<String>);
type LabelKey = (String, Option<String>, Option<String>, Option<String>);

#[derive(Debug, Default)]
pub struct Scene {
    settings: SceneSettings,
    graph: Option<Arc<GraphResponse>>,
    colors: ColorCache,
    layout_key: Option<(String, ViewMode)>,
    layout: Arc<Layout>,
    edge_key: Option<EdgeKey>,
    edges: Arc<EdgePasses>,
    neighborhood_key: Option<(String, Option<String>)>,
    neighborhood: Neighborhood,
    label_key: Option<LabelKey>,
    labels: Vec<NodeLabel>,
}

impl Scene {
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            settings,
            colors: ColorCache::new(settings.color_cache_capacity),
            ..Self::default()
        }
    }

    /// Replaces the graph wholesale; every derived cache is rebuilt lazily on the next frame.
    pub fn set_graph(&mut self, response: GraphResponse) {
        self.colors.begin_session(&response.query_hash);
        self.graph = Some(Arc::new(response));
        self.layout_key = None;
        self.edge_key = None;
        self.neighborhood_key = None;
        self.label_key = None;
    }

    pub fn graph(&self) -> Option<&GraphResponse> {
        self.graph.as_deref()
    }

    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.graph.as_deref().and_then(|graph| graph.node(node_id))
    }

    pub fn layout(&mut self, view: ViewMode) -> Arc<Layout> {
        let Some(graph) = self.graph.clone() else {
            return Arc::new(Layout::default());
        };

        let key = (graph.query_hash.clone(), view);
        if self.layout_key.as_ref() != Some(&key) {
            debug!("recomputing layout for graph {} ({:?})", graph.query_hash, view);
            self.layout = Arc::new(compute_layout(
                &graph.nodes,
                &self.settings.layout_options(view),
            ));
            self.layout_key = Some(key);
        }
        Arc::clone(&self.layout)
    }

    pub fn neighborhood(&mut self, active: Option<&str>) -> &Neighborhood {
        let Some(graph) = self.graph.clone() else {
            self.neighborhood = Neighborhood::default();
            return &self.neighborhood;
        };

        let key = (graph.query_hash.clone(), active.map(str::to_owned));
        if self.neighborhood_key.as_ref() != Some(&key) {
            self.neighborhood = Neighborhood::compute(&graph.edges, active);
            self.neighborhood_key = Some(key);
        }
        &self.neighborhood
    }

    fn edges(&mut self, layout: &Layout, active: Option<&str>, view: ViewMode) -> Arc<EdgePasses> {
        let Some(graph) = self.graph.clone() else {
            return Arc::default();
        };

        let key = (graph.query_hash.clone(), view, active.map(str::to_owned));
        if self.edge_key.as_ref() != Some(&key) {
            self.edges = Arc::new(route_edges(&graph.edges, layout, active, view));
            self.edge_key = Some(key);
        }
        Arc::clone(&self.edges)
    }

    fn labels(&mut self, state: &InteractionState) -> Vec<NodeLabel> {
        let Some(graph) = self.graph.clone() else {
            return Vec::new();
        };

        let key = (
            graph.query_hash.clone(),
            state.focus_node_id.clone(),
            state.hovered_node_id.clone(),
            state.selected_node_id.clone(),
        );
        if self.label_key.as_ref() != Some(&key) {
            self.labels = select_labels(&graph.nodes, state);
            self.label_key = Some(key);
        }
        self.labels.clone()
    }

    /// Builds the primitives for one frame. An absent or empty graph yields an empty scene.
    pub fn frame(&mut self, state: &InteractionState, elapsed_secs: f32) -> SceneFrame {
        let rings = ring_guides(state.hops, state.view, self.settings.vertical_lift);
        let Some(graph) = self.graph.clone() else {
            return SceneFrame {
                rings,
                ..SceneFrame::default()
            };
        };

        let layout = self.layout(state.view);
        let active = state.active_node_id().map(str::to_owned);
        let neighborhood = self.neighborhood(active.as_deref()).clone();
        let edges = self.edges(&layout, active.as_deref(), state.view);

        let nodes = graph
            .nodes
            .iter()
            .filter_map(|node| {
                let position = layout.get(&node.node_id)?;
                Some(PlacedNode {
                    visual: render_node(node, state, &neighborhood, &mut self.colors),
                    position,
                    kind: node.kind,
                })
            })
            .collect::<Vec<_>>();

        let labels = self
            .labels(state)
            .into_iter()
            .filter_map(|label| {
                let placed = nodes
                    .iter()
                    .find(|placed| placed.visual.node_id == label.node_id)?;
                Some(PlacedLabel {
                    anchor: placed.position
                        + Vec3::UP * (placed.visual.scale + LABEL_CLEARANCE),
                    label,
                })
            })
            .collect();

        let focus_halo = state.focus_node_id.as_deref().and_then(|focus| {
            let placed = nodes.iter().find(|placed| placed.visual.node_id == focus)?;
            Some(FocusHalo {
                center: placed.position,
                radius: placed.visual.scale * HALO_SCALE,
                pulse: 0.5 + 0.5 * (elapsed_secs * HALO_PULSE_SPEED).sin(),
            })
        });

        let tooltip = state
            .hovered_node_id
            .as_deref()
            .and_then(|hovered| graph.node(hovered))
            .map(tooltip_for);

        SceneFrame {
            nodes,
            edges,
            dash_offset: dash_offset(elapsed_secs),
            labels,
            rings,
            focus_halo,
            tooltip,
            truncation_notice: truncation_notice(&graph),
        }
    }
}

/// Structural rings for hops `1..=hops`, lifted like the nodes on them in 3D.
pub fn ring_guides(hops: u8, view: ViewMode, vertical_lift: f32) -> Vec<RingGuide> {
    visible_ring_radii(hops)
        .into_iter()
        .enumerate()
        .map(|(offset, radius)| {
            let hop = offset as u8 + 1;
            let height = match view {
                ViewMode::TwoD => 0.0,
                ViewMode::ThreeD => f32::from(hop) * vertical_lift,
            };
            debug_assert_eq!(RING_RADII[usize::from(hop)], radius);
            RingGuide {
                hop,
                radius,
                height,
            }
        })
        .collect()
}

pub fn truncation_notice(graph: &GraphResponse) -> Option<String> {
    graph.truncated.then(|| {
        format!(
            "Partial view: showing {} of {} nodes (limit {}). \
             Reduce the hop depth to see the whole blast radius.",
            graph.nodes.len(),
            graph.meta.subgraph_size,
            graph.meta.node_limit
        )
    })
}

pub fn tooltip_for(node: &GraphNode) -> Tooltip {
    let mut lines = vec![
        format!("{} · hop {}", node.kind.label(), hop_label(node.hop_distance)),
        format!(
            "owner: {}",
            node.owner_id.as_deref().unwrap_or("unowned")
        ),
        format!(
            "impact {} · confidence {} · completeness {}",
            format_score(node.impact_score),
            format_ratio(node.confidence_score),
            format_ratio(node.completeness_score)
        ),
        format!("environments: {}", node.environments.summary()),
    ];
    if node.kind == NodeKind::Software {
        lines.push(format!(
            "interfaces: {} prod / {} total",
            node.prod_interface_count, node.total_interface_count
        ));
    }
    lines.push(format!("connections: {}", node.dependency_degree));
    if !node.missing_fields.is_empty() {
        lines.push(format!("missing: {}", node.missing_fields.join(", ")));
    }

    Tooltip {
        node_id: node.node_id.clone(),
        title: node.display_name.clone(),
        lines,
    }
}

fn hop_label(hop_distance: Option<i32>) -> String {
    hop_distance.map_or_else(|| "?".to_owned(), |hop| hop.to_string())
}

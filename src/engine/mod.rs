//! Pure presentation engine: layout, styling, edge routing, labels, search, interaction and
//! camera. Nothing in here touches egui; the front end turns a [`SceneFrame`] into shapes.

mod camera;
mod color;
mod edges;
mod interaction;
mod labels;
mod layout;
mod math;
mod nodes;
mod scene;
mod search;

pub use camera::{Camera, CameraCommand, DEFAULT_TRANSITION_SECS, Projection};
pub use color::{
    ColorCache, ConfidenceTier, DEFAULT_CACHE_CAPACITY, Hsl, Rgb, desaturate_for_confidence,
    desaturate_for_tier, dimmed, impact_intensity, owner_color, vivid,
};
pub use edges::{
    CURVE_SEGMENTS, DASH_SPEED, DEST_DIM_FACTOR, DashPattern, EdgeBatch, EdgePartition,
    EdgePasses, HIGHLIGHT_CAP, LineStyle, RoutedEdge, WeightTier, control_points, dash_offset,
    direction_gradient, partition_edges, partition_edges_where, route_edges, sample_cubic,
};
pub use interaction::{
    Command, InputEvent, InteractionController, InteractionState, Key, KeyPress, SHORTCUT_HELP,
    ShareState, ViewMode,
};
pub use labels::{LabelTier, MAX_LABELS, NodeLabel, WARNING_GLYPH, select_labels};
pub use layout::{
    Layout, LayoutOptions, NodePosition, OUTERMOST_RING, RING_RADII, compute_layout, ring_index,
    ring_radius, visible_ring_radii,
};
pub use math::Vec3;
pub use nodes::{Neighborhood, NodeShape, NodeVisual, node_scale, render_node};
pub use scene::{
    FocusHalo, PlacedLabel, PlacedNode, RingGuide, Scene, SceneCounts, SceneFrame, SceneSettings,
    Tooltip, ring_guides, tooltip_for, truncation_notice,
};
pub use search::{DEFAULT_RESULT_LIMIT, SearchEntry, SearchIndex};

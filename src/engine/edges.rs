//! Curved edge geometry and the highlighted/background split.
//!
//! Each edge becomes a sampled cubic Bézier. Edges touching the active node (selected, else
//! hovered) form the neighborhood set; at most [`HIGHLIGHT_CAP`] of them, the heaviest, are drawn
//! in the dashed animated pass and everything else goes to the solid background pass. Both passes
//! are bucketed by weight tier so each batch shares one line width.

use std::cmp::Ordering;

use log::warn;

use crate::graph::{EdgeStrength, GraphEdge};

use super::color::Rgb;
use super::interaction::ViewMode;
use super::layout::Layout;
use super::math::Vec3;

pub const HIGHLIGHT_CAP: usize = 12;
pub const CURVE_SEGMENTS: usize = 18;
pub const DEST_DIM_FACTOR: f32 = 0.7;
/// Dash offset advance in pattern units per second.
pub const DASH_SPEED: f32 = 1.6;

const ARC_BULGE_RATIO: f32 = 0.18;
const ARC_BULGE_MAX: f32 = 3.0;
const LATERAL_RATIO: f32 = 0.08;
const LIFT_RATIO: f32 = 0.12;
const HIGHLIGHT_WIDTH_BOOST: f32 = 1.8;
const BACKGROUND_OPACITY: f32 = 0.22;
const HIGHLIGHT_OPACITY: f32 = 0.95;

const BACKGROUND_COLOR: Rgb = Rgb::new(0.42, 0.48, 0.56);
const CONFIRMED_HIGHLIGHT_COLOR: Rgb = Rgb::new(0.98, 0.72, 0.36);
const DECLARED_HIGHLIGHT_COLOR: Rgb = Rgb::new(0.62, 0.78, 1.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeightTier {
    Light,
    Medium,
    Heavy,
}

impl WeightTier {
    pub const ALL: [Self; 3] = [Self::Light, Self::Medium, Self::Heavy];

    pub fn from_weight(weight: f32) -> Self {
        if weight >= 0.7 {
            Self::Heavy
        } else if weight >= 0.35 {
            Self::Medium
        } else {
            Self::Light
        }
    }

    pub fn line_width(self) -> f32 {
        match self {
            Self::Light => 0.8,
            Self::Medium => 1.4,
            Self::Heavy => 2.2,
        }
    }
}

/// Dash length and gap, in world units along the curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashPattern {
    pub dash: f32,
    pub gap: f32,
}

impl DashPattern {
    pub const CONFIRMED: Self = Self {
        dash: 0.9,
        gap: 0.15,
    };
    pub const DECLARED: Self = Self {
        dash: 0.35,
        gap: 0.35,
    };

    pub fn for_strength(strength: EdgeStrength) -> Self {
        match strength {
            EdgeStrength::Confirmed => Self::CONFIRMED,
            EdgeStrength::Declared => Self::DECLARED,
        }
    }

    pub fn period(self) -> f32 {
        self.dash + self.gap
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineStyle {
    Solid,
    Dashed(DashPattern),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutedEdge {
    /// Index into the graph's edge list.
    pub edge_index: usize,
    pub from_id: String,
    pub to_id: String,
    pub strength: EdgeStrength,
    pub weight: f32,
    /// `CURVE_SEGMENTS + 1` samples from source to destination.
    pub points: Vec<Vec3>,
    /// One color per sample: full brightness at the source, `DEST_DIM_FACTOR` at the destination.
    pub colors: Vec<Rgb>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeBatch {
    pub tier: WeightTier,
    pub style: LineStyle,
    pub line_width: f32,
    pub opacity: f32,
    pub edges: Vec<RoutedEdge>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgePasses {
    pub background: Vec<EdgeBatch>,
    pub highlighted: Vec<EdgeBatch>,
    /// Edges skipped because an endpoint had no position or the edge loops back on itself.
    pub skipped: usize,
}

impl EdgePasses {
    pub fn highlighted_count(&self) -> usize {
        self.highlighted.iter().map(|batch| batch.edges.len()).sum()
    }

    pub fn background_count(&self) -> usize {
        self.background.iter().map(|batch| batch.edges.len()).sum()
    }

    pub fn highlighted_edges(&self) -> impl Iterator<Item = &RoutedEdge> {
        self.highlighted.iter().flat_map(|batch| batch.edges.iter())
    }

    pub fn background_edges(&self) -> impl Iterator<Item = &RoutedEdge> {
        self.background.iter().flat_map(|batch| batch.edges.iter())
    }
}

/// Edge indices split into the highlighted set and the background set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgePartition {
    pub highlighted: Vec<usize>,
    pub background: Vec<usize>,
}

/// Splits edges around `active`. When more than [`HIGHLIGHT_CAP`] edges touch it, only the
/// heaviest stay highlighted (ties keep input order) and the rest join the background.
pub fn partition_edges(edges: &[GraphEdge], active: Option<&str>) -> EdgePartition {
    partition_edges_where(edges, active, |_| true)
}

/// Like [`partition_edges`], but edges rejected by `keep` land in neither set and never take
/// a highlight slot.
pub fn partition_edges_where(
    edges: &[GraphEdge],
    active: Option<&str>,
    keep: impl Fn(&GraphEdge) -> bool,
) -> EdgePartition {
    let candidates = edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| keep(edge))
        .map(|(index, _)| index);

    let Some(active) = active else {
        return EdgePartition {
            highlighted: Vec::new(),
            background: candidates.collect(),
        };
    };

    let mut neighborhood = Vec::new();
    let mut background = Vec::new();
    for index in candidates {
        if edges[index].touches(active) {
            neighborhood.push(index);
        } else {
            background.push(index);
        }
    }

    if neighborhood.len() > HIGHLIGHT_CAP {
        neighborhood.sort_by(|a, b| {
            edges[*b]
                .weight
                .partial_cmp(&edges[*a].weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        background.extend(neighborhood.drain(HIGHLIGHT_CAP..));
        background.sort_unstable();
        neighborhood.sort_unstable();
    }

    EdgePartition {
        highlighted: neighborhood,
        background,
    }
}

/// Cubic Bézier control points bowed away from the origin, pushed sideways and lifted.
pub fn control_points(from: Vec3, to: Vec3, view: ViewMode) -> [Vec3; 4] {
    let delta = to - from;
    let length = delta.length();
    let mid = from.lerp(to, 0.5);

    let lateral_dir = Vec3::new(-delta.z, 0.0, delta.x).normalized();
    let mut outward = mid.horizontal().normalized();
    if outward == Vec3::ZERO {
        outward = lateral_dir;
    }

    let bulge = (length * ARC_BULGE_RATIO).min(ARC_BULGE_MAX);
    let lift = match view {
        ViewMode::TwoD => 0.0,
        ViewMode::ThreeD => length * LIFT_RATIO,
    };
    let offset = outward * bulge + lateral_dir * (length * LATERAL_RATIO) + Vec3::UP * lift;

    [
        from,
        from.lerp(to, 0.25) + offset,
        from.lerp(to, 0.75) + offset,
        to,
    ]
}

pub fn sample_cubic(control: &[Vec3; 4], segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|step| {
            let t = step as f32 / segments as f32;
            let u = 1.0 - t;
            control[0] * (u * u * u)
                + control[1] * (3.0 * u * u * t)
                + control[2] * (3.0 * u * t * t)
                + control[3] * (t * t * t)
        })
        .collect()
}

/// Per-sample direction gradient from `base` at the source to `base * DEST_DIM_FACTOR`.
pub fn direction_gradient(base: Rgb, samples: usize) -> Vec<Rgb> {
    let last = samples.saturating_sub(1).max(1) as f32;
    (0..samples)
        .map(|step| {
            let t = step as f32 / last;
            base.scale(1.0 + (DEST_DIM_FACTOR - 1.0) * t)
        })
        .collect()
}

/// Dash offset for the animated pass; a function of elapsed time only.
pub fn dash_offset(elapsed_secs: f32) -> f32 {
    -(elapsed_secs * DASH_SPEED)
}

fn route_edge(
    edges: &[GraphEdge],
    index: usize,
    layout: &Layout,
    view: ViewMode,
    base: Rgb,
) -> Option<RoutedEdge> {
    let edge = &edges[index];
    let from = layout.get(&edge.from_id)?;
    let to = layout.get(&edge.to_id)?;
    if edge.from_id == edge.to_id {
        return None;
    }

    let points = sample_cubic(&control_points(from, to, view), CURVE_SEGMENTS);
    let colors = direction_gradient(base, points.len());
    Some(RoutedEdge {
        edge_index: index,
        from_id: edge.from_id.clone(),
        to_id: edge.to_id.clone(),
        strength: edge.strength,
        weight: edge.weight,
        points,
        colors,
    })
}

fn highlight_color(strength: EdgeStrength) -> Rgb {
    match strength {
        EdgeStrength::Confirmed => CONFIRMED_HIGHLIGHT_COLOR,
        EdgeStrength::Declared => DECLARED_HIGHLIGHT_COLOR,
    }
}

/// Routes every edge with both endpoints positioned and groups them into draw batches.
pub fn route_edges(
    edges: &[GraphEdge],
    layout: &Layout,
    active: Option<&str>,
    view: ViewMode,
) -> EdgePasses {
    let routable = |edge: &GraphEdge| {
        edge.from_id != edge.to_id
            && layout.get(&edge.from_id).is_some()
            && layout.get(&edge.to_id).is_some()
    };
    let partition = partition_edges_where(edges, active, routable);
    let mut passes = EdgePasses {
        skipped: edges.len() - partition.highlighted.len() - partition.background.len(),
        ..EdgePasses::default()
    };

    for tier in WeightTier::ALL {
        passes.background.push(EdgeBatch {
            tier,
            style: LineStyle::Solid,
            line_width: tier.line_width(),
            opacity: BACKGROUND_OPACITY,
            edges: Vec::new(),
        });
        for strength in [EdgeStrength::Confirmed, EdgeStrength::Declared] {
            passes.highlighted.push(EdgeBatch {
                tier,
                style: LineStyle::Dashed(DashPattern::for_strength(strength)),
                line_width: tier.line_width() * HIGHLIGHT_WIDTH_BOOST,
                opacity: HIGHLIGHT_OPACITY,
                edges: Vec::new(),
            });
        }
    }

    for &index in &partition.background {
        let Some(routed) = route_edge(edges, index, layout, view, BACKGROUND_COLOR) else {
            passes.skipped += 1;
            continue;
        };
        let tier = WeightTier::from_weight(routed.weight);
        if let Some(batch) = passes.background.iter_mut().find(|batch| batch.tier == tier) {
            batch.edges.push(routed);
        }
    }

    for &index in &partition.highlighted {
        let strength = edges[index].strength;
        let Some(routed) = route_edge(edges, index, layout, view, highlight_color(strength))
        else {
            passes.skipped += 1;
            continue;
        };
        let tier = WeightTier::from_weight(routed.weight);
        let style = LineStyle::Dashed(DashPattern::for_strength(strength));
        if let Some(batch) = passes
            .highlighted
            .iter_mut()
            .find(|batch| batch.tier == tier && batch.style == style)
        {
            batch.edges.push(routed);
        }
    }

    if passes.skipped > 0 {
        warn!("skipped {} unroutable edges", passes.skipped);
    }

    passes.background.retain(|batch| !batch.edges.is_empty());
    passes.highlighted.retain(|batch| !batch.edges.is_empty());
    passes
}

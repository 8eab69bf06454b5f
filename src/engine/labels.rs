use std::cmp::Ordering;
use std::collections::HashSet;

use crate::graph::{GraphNode, NodeKind};

use super::color::{ConfidenceTier, Rgb};
use super::interaction::InteractionState;

pub const MAX_LABELS: usize = 8;
pub const WARNING_GLYPH: &str = "\u{26a0} ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelTier {
    Bright,
    Medium,
    Dim,
}

impl LabelTier {
    pub fn from_confidence(confidence: f32) -> Self {
        match ConfidenceTier::from_score(confidence) {
            ConfidenceTier::High => Self::Bright,
            ConfidenceTier::Medium => Self::Medium,
            ConfidenceTier::Low => Self::Dim,
        }
    }

    pub fn font_size(self) -> f32 {
        match self {
            Self::Bright => 14.0,
            Self::Medium => 12.5,
            Self::Dim => 11.0,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Self::Bright => Rgb::new(0.96, 0.97, 1.0),
            Self::Medium => Rgb::new(0.76, 0.79, 0.84),
            Self::Dim => Rgb::new(0.52, 0.55, 0.60),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeLabel {
    pub node_id: String,
    pub text: String,
    pub tier: LabelTier,
    pub warning: bool,
}

/// Picks at most [`MAX_LABELS`] nodes: focus, hovered, selected, then software nodes by impact.
pub fn select_labels(nodes: &[GraphNode], state: &InteractionState) -> Vec<NodeLabel> {
    let mut picked: Vec<&GraphNode> = Vec::with_capacity(MAX_LABELS);
    let mut seen: HashSet<&str> = HashSet::new();

    for wanted in [
        state.focus_node_id.as_deref(),
        state.hovered_node_id.as_deref(),
        state.selected_node_id.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(node) = nodes.iter().find(|node| node.node_id == wanted) {
            try_pick(node, &mut picked, &mut seen);
        }
    }

    let mut software = nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Software)
        .collect::<Vec<_>>();
    software.sort_by(|a, b| {
        b.impact_score
            .partial_cmp(&a.impact_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    for node in software {
        if picked.len() >= MAX_LABELS {
            break;
        }
        try_pick(node, &mut picked, &mut seen);
    }

    picked
        .into_iter()
        .map(|node| label_for(node, state))
        .collect()
}

fn try_pick<'a>(
    node: &'a GraphNode,
    picked: &mut Vec<&'a GraphNode>,
    seen: &mut HashSet<&'a str>,
) {
    if picked.len() < MAX_LABELS && seen.insert(node.node_id.as_str()) {
        picked.push(node);
    }
}

fn label_for(node: &GraphNode, state: &InteractionState) -> NodeLabel {
    let forced_bright = state.focus_node_id.as_deref() == Some(node.node_id.as_str())
        || state.selected_node_id.as_deref() == Some(node.node_id.as_str());
    let tier = if forced_bright {
        LabelTier::Bright
    } else {
        LabelTier::from_confidence(node.confidence_score)
    };

    let warning = !node.missing_fields.is_empty() && node.confidence_score < 0.7;
    let text = if warning {
        format!("{WARNING_GLYPH}{}", node.display_name)
    } else {
        node.display_name.clone()
    };

    NodeLabel {
        node_id: node.node_id.clone(),
        text,
        tier,
        warning,
    }
}

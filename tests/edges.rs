use blastview::engine::{
    CURVE_SEGMENTS, DashPattern, HIGHLIGHT_CAP, LayoutOptions, LineStyle, ViewMode, WeightTier,
    compute_layout, partition_edges, partition_edges_where, route_edges,
};
use blastview::graph::{EdgeStrength, GraphEdge, GraphNode, NodeKind};

/// A hub with 20 spokes, weights 0.05, 0.10, ... 0.95 interleaved so input order differs from
/// weight order.
fn hub_edges() -> Vec<GraphEdge> {
    let order = [7, 0, 13, 4, 19, 9, 2, 16, 11, 5, 18, 1, 14, 8, 3, 17, 10, 6, 15, 12];
    let mut edges = order
        .iter()
        .map(|&rank| {
            let weight = 0.05 + rank as f32 * (0.90 / 19.0);
            GraphEdge::new(
                "svc:hub",
                format!("svc:spoke{rank:02}"),
                EdgeStrength::Confirmed,
                weight,
            )
        })
        .collect::<Vec<_>>();
    edges.push(GraphEdge::new(
        "svc:spoke00",
        "svc:spoke01",
        EdgeStrength::Declared,
        0.99,
    ));
    edges
}

fn hub_nodes() -> Vec<GraphNode> {
    let mut nodes = vec![GraphNode::new("svc:hub", NodeKind::Software, Some(0))];
    nodes.extend((0..20).map(|rank| {
        GraphNode::new(format!("svc:spoke{rank:02}"), NodeKind::Software, Some(1))
    }));
    nodes
}

#[test]
fn highlight_cap_keeps_the_twelve_heaviest() {
    let edges = hub_edges();
    let partition = partition_edges(&edges, Some("svc:hub"));

    assert_eq!(partition.highlighted.len(), HIGHLIGHT_CAP);
    assert_eq!(partition.background.len(), edges.len() - HIGHLIGHT_CAP);

    let lightest_kept = partition
        .highlighted
        .iter()
        .map(|&index| edges[index].weight)
        .fold(f32::INFINITY, f32::min);
    let heaviest_dropped = partition
        .background
        .iter()
        .filter(|&&index| edges[index].touches("svc:hub"))
        .map(|&index| edges[index].weight)
        .fold(f32::NEG_INFINITY, f32::max);
    assert!(lightest_kept > heaviest_dropped);

    let dropped_spokes = partition
        .background
        .iter()
        .filter(|&&index| edges[index].touches("svc:hub"))
        .count();
    assert_eq!(dropped_spokes, 8);
}

#[test]
fn small_neighborhood_is_fully_highlighted() {
    let edges = vec![
        GraphEdge::new("svc:a", "svc:b", EdgeStrength::Confirmed, 0.9),
        GraphEdge::new("svc:c", "svc:a", EdgeStrength::Declared, 0.2),
        GraphEdge::new("svc:b", "svc:c", EdgeStrength::Declared, 0.5),
    ];
    let partition = partition_edges(&edges, Some("svc:a"));
    assert_eq!(partition.highlighted, vec![0, 1]);
    assert_eq!(partition.background, vec![2]);
}

#[test]
fn no_active_node_puts_everything_in_background() {
    let edges = hub_edges();
    let partition = partition_edges(&edges, None);
    assert!(partition.highlighted.is_empty());
    assert_eq!(partition.background.len(), edges.len());
}

#[test]
fn routed_passes_respect_cap_and_styles() {
    let nodes = hub_nodes();
    let edges = hub_edges();
    let layout = compute_layout(&nodes, &LayoutOptions::default());
    let passes = route_edges(&edges, &layout, Some("svc:hub"), ViewMode::ThreeD);

    assert_eq!(passes.highlighted_count(), HIGHLIGHT_CAP);
    assert_eq!(passes.background_count(), edges.len() - HIGHLIGHT_CAP);
    assert_eq!(passes.skipped, 0);

    for batch in &passes.highlighted {
        assert!(matches!(batch.style, LineStyle::Dashed(_)));
        for edge in &batch.edges {
            assert_eq!(WeightTier::from_weight(edge.weight), batch.tier);
            assert_eq!(
                batch.style,
                LineStyle::Dashed(DashPattern::for_strength(edge.strength))
            );
            assert_eq!(edge.points.len(), CURVE_SEGMENTS + 1);
            assert_eq!(edge.colors.len(), edge.points.len());
        }
    }
    for batch in &passes.background {
        assert_eq!(batch.style, LineStyle::Solid);
    }
}

#[test]
fn edges_without_positions_are_skipped() {
    let nodes = vec![GraphNode::new("svc:a", NodeKind::Software, Some(0))];
    let edges = vec![
        GraphEdge::new("svc:a", "svc:ghost", EdgeStrength::Confirmed, 0.5),
        GraphEdge::new("svc:a", "svc:a", EdgeStrength::Confirmed, 0.5),
    ];
    let layout = compute_layout(&nodes, &LayoutOptions::default());
    let passes = route_edges(&edges, &layout, Some("svc:a"), ViewMode::TwoD);

    assert_eq!(passes.highlighted_count(), 0);
    assert_eq!(passes.background_count(), 0);
    assert_eq!(passes.skipped, 2);
}

#[test]
fn unroutable_edges_do_not_take_highlight_slots() {
    let mut nodes = vec![GraphNode::new("svc:hub", NodeKind::Software, Some(0))];
    nodes.extend(
        (0..5).map(|n| GraphNode::new(format!("svc:real{n}"), NodeKind::Software, Some(1))),
    );
    let mut edges = (0..12)
        .map(|n| {
            GraphEdge::new(
                "svc:hub",
                format!("svc:ghost{n:02}"),
                EdgeStrength::Confirmed,
                0.9,
            )
        })
        .collect::<Vec<_>>();
    edges.push(GraphEdge::new("svc:hub", "svc:hub", EdgeStrength::Confirmed, 0.95));
    edges.extend((0..5).map(|n| {
        GraphEdge::new("svc:hub", format!("svc:real{n}"), EdgeStrength::Declared, 0.5)
    }));
    let layout = compute_layout(&nodes, &LayoutOptions::default());

    let passes = route_edges(&edges, &layout, Some("svc:hub"), ViewMode::ThreeD);
    assert_eq!(passes.highlighted_count(), 5);
    assert_eq!(passes.background_count(), 0);
    assert_eq!(passes.skipped, 13);
    assert!(
        passes
            .highlighted_edges()
            .all(|edge| edge.to_id.starts_with("svc:real"))
    );

    let partition = partition_edges_where(&edges, Some("svc:hub"), |edge| {
        !edge.to_id.starts_with("svc:ghost")
    });
    assert_eq!(partition.highlighted, (12..18).collect::<Vec<_>>());
    assert!(partition.background.is_empty());
}

#[test]
fn confirmed_dashes_are_longer_than_declared() {
    let confirmed = DashPattern::for_strength(EdgeStrength::Confirmed);
    let declared = DashPattern::for_strength(EdgeStrength::Declared);
    assert!(confirmed.dash > declared.dash);
    assert!(confirmed.gap < declared.gap);
}

#[test]
fn weight_tiers_widen_with_weight() {
    assert_eq!(WeightTier::from_weight(0.1), WeightTier::Light);
    assert_eq!(WeightTier::from_weight(0.5), WeightTier::Medium);
    assert_eq!(WeightTier::from_weight(0.9), WeightTier::Heavy);
    assert!(WeightTier::Light.line_width() < WeightTier::Medium.line_width());
    assert!(WeightTier::Medium.line_width() < WeightTier::Heavy.line_width());
}

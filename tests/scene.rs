use std::sync::Arc;

use blastview::engine::{
    InteractionState, MAX_LABELS, Scene, SceneSettings, ViewMode, ring_guides, tooltip_for,
    truncation_notice,
};
use blastview::graph::{
    Catalog, CatalogProvider, FocusKind, FocusRef, GraphDataProvider, GraphQuery,
};

fn scene_for(id: &str, hops: u8, node_limit: usize) -> Scene {
    let provider = CatalogProvider::new(Catalog::bundled().unwrap(), node_limit);
    let response = provider
        .query(&GraphQuery::new(
            "acme",
            &FocusRef::new(FocusKind::Service, id, id),
            hops,
        ))
        .unwrap();
    let mut scene = Scene::new(SceneSettings::default());
    scene.set_graph(response);
    scene
}

fn focused(node_id: &str, hops: u8) -> InteractionState {
    InteractionState {
        focus_node_id: Some(node_id.to_owned()),
        hops,
        ..InteractionState::default()
    }
}

#[test]
fn empty_scene_still_draws_ring_guides() {
    let mut scene = Scene::default();
    let frame = scene.frame(&InteractionState::default(), 0.0);
    assert!(frame.is_empty());
    assert_eq!(frame.rings.len(), 3);
    assert!(frame.focus_halo.is_none());
    assert!(!frame.is_animated());
}

#[test]
fn frame_places_every_node_with_a_halo_and_labels() {
    let mut scene = scene_for("checkout", 2, 300);
    let node_count = scene.graph().unwrap().nodes.len();
    let frame = scene.frame(&focused("svc:checkout", 2), 1.0);

    assert_eq!(frame.nodes.len(), node_count);
    assert!(frame.labels.len() <= MAX_LABELS);
    assert!(frame
        .labels
        .iter()
        .any(|placed| placed.label.node_id == "svc:checkout"));
    for placed in &frame.labels {
        let node = frame
            .nodes
            .iter()
            .find(|node| node.visual.node_id == placed.label.node_id)
            .unwrap();
        assert!(placed.anchor.y > node.position.y);
    }

    let halo = frame.focus_halo.unwrap();
    assert!((0.0..=1.0).contains(&halo.pulse));
    assert_eq!(frame.rings.len(), 2);
    assert!(frame.truncation_notice.is_none());
}

#[test]
fn selection_highlights_and_animates() {
    let mut scene = scene_for("checkout", 2, 300);
    let state = InteractionState {
        selected_node_id: Some("svc:payments".to_owned()),
        ..focused("svc:checkout", 2)
    };
    let frame = scene.frame(&state, 0.5);
    let counts = frame.counts();

    assert!(counts.highlighted_edges > 0);
    assert!(counts.highlighted_edges <= 12);
    assert!(frame.is_animated());

    let dimmed = frame.nodes.iter().filter(|node| node.visual.dimmed).count();
    assert!(dimmed > 0);
    let payments = frame
        .nodes
        .iter()
        .find(|node| node.visual.node_id == "svc:payments")
        .unwrap();
    assert!(payments.visual.is_selected);
    assert!(!payments.visual.dimmed);
}

#[test]
fn dash_offset_advances_with_time_only() {
    let mut scene = scene_for("checkout", 1, 300);
    let state = focused("svc:checkout", 1);
    let early = scene.frame(&state, 1.0);
    let late = scene.frame(&state, 2.0);
    let again = scene.frame(&state, 1.0);

    assert_ne!(early.dash_offset, late.dash_offset);
    assert_eq!(early.dash_offset, again.dash_offset);
    assert!(Arc::ptr_eq(&early.edges, &late.edges));
}

#[test]
fn layout_is_cached_per_view() {
    let mut scene = scene_for("checkout", 2, 300);
    let first = scene.layout(ViewMode::ThreeD);
    let second = scene.layout(ViewMode::ThreeD);
    assert!(Arc::ptr_eq(&first, &second));

    let flat = scene.layout(ViewMode::TwoD);
    assert!(!Arc::ptr_eq(&first, &flat));
    assert!(flat.positions().iter().all(|node| node.position.y == 0.0));
}

#[test]
fn hovered_node_gets_a_tooltip() {
    let mut scene = scene_for("checkout", 1, 300);
    let state = InteractionState {
        hovered_node_id: Some("rt:postgres".to_owned()),
        ..focused("svc:checkout", 1)
    };
    let frame = scene.frame(&state, 0.0);
    let tooltip = frame.tooltip.unwrap();
    assert_eq!(tooltip.node_id, "rt:postgres");
    assert_eq!(tooltip.title, "postgres");
    assert!(tooltip.lines[0].starts_with("runtime"));

    let node = scene.node("rt:postgres").unwrap();
    assert_eq!(tooltip_for(node), tooltip);
}

#[test]
fn truncated_graphs_carry_a_notice() {
    let mut scene = scene_for("checkout", 5, 4);
    let graph = scene.graph().unwrap();
    assert!(graph.truncated);
    let notice = truncation_notice(graph).unwrap();
    assert!(notice.contains("4 of"));

    let frame = scene.frame(&focused("svc:checkout", 5), 0.0);
    assert_eq!(frame.truncation_notice, Some(notice));
}

#[test]
fn ring_guides_lift_in_three_d_only() {
    let flat = ring_guides(3, ViewMode::TwoD, 1.2);
    assert!(flat.iter().all(|ring| ring.height == 0.0));

    let lifted = ring_guides(3, ViewMode::ThreeD, 1.2);
    assert_eq!(
        lifted.iter().map(|ring| ring.hop).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!((lifted[2].height - 3.6).abs() < 1e-5);
}

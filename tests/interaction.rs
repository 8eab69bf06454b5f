use blastview::engine::{
    CameraCommand, Command, InputEvent, InteractionController, Key, KeyPress, ShareState,
    ViewMode, ring_guides,
};
use blastview::graph::{
    EdgeStrength, FocusKind, FocusRef, GraphEdge, GraphNode, GraphResponse, NodeKind,
};

fn checkout() -> FocusRef {
    FocusRef::new(FocusKind::Service, "checkout", "Checkout")
}

fn graph() -> GraphResponse {
    let mut nodes = Vec::new();
    for (id, hop, impact) in [
        ("svc:checkout", 0, 40.0),
        ("svc:payments", 1, 90.0),
        ("svc:pricing", 1, 10.0),
        ("rt:postgres", 1, 60.0),
    ] {
        let mut node = GraphNode::new(id, NodeKind::Software, Some(hop));
        node.impact_score = impact;
        nodes.push(node);
    }
    nodes[0].display_name = "Checkout".to_owned();
    GraphResponse {
        focus_node_id: "svc:checkout".to_owned(),
        nodes,
        edges: vec![
            GraphEdge::new("svc:checkout", "svc:payments", EdgeStrength::Confirmed, 0.9),
            GraphEdge::new("svc:checkout", "svc:pricing", EdgeStrength::Declared, 0.2),
        ],
        query_hash: "q1".to_owned(),
        ..GraphResponse::default()
    }
}

fn loaded() -> InteractionController {
    let mut controller = InteractionController::new(Some(checkout()), 3, ViewMode::ThreeD);
    controller.load_graph(&graph());
    controller
}

fn press(controller: &mut InteractionController, key: Key) -> Vec<Command> {
    controller.handle(InputEvent::KeyPressed(KeyPress::new(key)))
}

fn fly_to(node_id: &str) -> Command {
    Command::Camera(CameraCommand::FlyToNode(node_id.to_owned()))
}

#[test]
fn loading_a_graph_sets_the_focus_node() {
    let controller = loaded();
    assert_eq!(
        controller.state().focus_node_id.as_deref(),
        Some("svc:checkout")
    );
    assert_eq!(controller.state().hovered_node_id, None);
}

#[test]
fn hover_is_ignored_while_typing() {
    let mut controller = loaded();
    controller.handle(InputEvent::PointerOver(Some("svc:payments".to_owned())));
    assert_eq!(
        controller.state().hovered_node_id.as_deref(),
        Some("svc:payments")
    );

    controller.handle(InputEvent::InputFocusChanged(true));
    assert_eq!(controller.state().hovered_node_id, None);
    controller.handle(InputEvent::PointerOver(Some("svc:pricing".to_owned())));
    assert_eq!(controller.state().hovered_node_id, None);
}

#[test]
fn click_selects_and_flies() {
    let mut controller = loaded();
    let commands = controller.handle(InputEvent::Click("svc:pricing".to_owned()));
    assert_eq!(commands, vec![fly_to("svc:pricing")]);
    assert_eq!(
        controller.state().selected_node_id.as_deref(),
        Some("svc:pricing")
    );

    assert!(controller
        .handle(InputEvent::Click("svc:unknown".to_owned()))
        .is_empty());
    assert_eq!(
        controller.state().selected_node_id.as_deref(),
        Some("svc:pricing")
    );
}

#[test]
fn slash_focuses_search_and_escape_unwinds() {
    let mut controller = loaded();
    controller.handle(InputEvent::Click("svc:payments".to_owned()));

    assert_eq!(press(&mut controller, Key::Slash), vec![Command::FocusSearch]);
    assert!(controller.input_focused());

    // Shortcuts other than Escape are swallowed while typing.
    assert!(press(&mut controller, Key::V).is_empty());
    assert!(press(&mut controller, Key::Digit(1)).is_empty());
    assert_eq!(controller.state().view, ViewMode::ThreeD);
    assert_eq!(controller.state().hops, 3);

    assert_eq!(press(&mut controller, Key::Escape), vec![Command::BlurSearch]);
    assert!(!controller.input_focused());
    assert!(controller.state().selected_node_id.is_some());

    assert!(press(&mut controller, Key::Escape).is_empty());
    assert_eq!(controller.state().selected_node_id, None);
}

#[test]
fn tab_cycles_by_impact_and_wraps() {
    let mut controller = loaded();
    let order = ["svc:payments", "rt:postgres", "svc:checkout", "svc:pricing"];

    for expected in order.iter().chain(order.first()) {
        let commands = press(&mut controller, Key::Tab);
        assert_eq!(commands, vec![fly_to(expected)]);
        assert_eq!(
            controller.state().selected_node_id.as_deref(),
            Some(*expected)
        );
    }

    let commands = controller.handle(InputEvent::KeyPressed(KeyPress::shifted(Key::Tab)));
    assert_eq!(commands, vec![fly_to("svc:pricing")]);
}

#[test]
fn shift_tab_from_nothing_starts_at_the_end() {
    let mut controller = loaded();
    let commands = controller.handle(InputEvent::KeyPressed(KeyPress::shifted(Key::Tab)));
    assert_eq!(commands, vec![fly_to("svc:pricing")]);
}

#[test]
fn f_flies_to_selection_then_focus_then_resets() {
    let mut controller = loaded();
    assert_eq!(press(&mut controller, Key::F), vec![fly_to("svc:checkout")]);

    controller.handle(InputEvent::Click("svc:payments".to_owned()));
    assert_eq!(press(&mut controller, Key::F), vec![fly_to("svc:payments")]);

    let mut empty = InteractionController::new(None, 3, ViewMode::ThreeD);
    assert_eq!(
        press(&mut empty, Key::F),
        vec![Command::Camera(CameraCommand::Reset)]
    );
}

#[test]
fn v_toggles_view() {
    let mut controller = loaded();
    assert_eq!(
        press(&mut controller, Key::V),
        vec![Command::Camera(CameraCommand::SetView(ViewMode::TwoD))]
    );
    assert_eq!(controller.state().view, ViewMode::TwoD);
    press(&mut controller, Key::V);
    assert_eq!(controller.state().view, ViewMode::ThreeD);
}

#[test]
fn digit_one_requeries_and_leaves_a_single_ring() {
    let mut controller = loaded();
    let commands = press(&mut controller, Key::Digit(1));
    assert_eq!(
        commands,
        vec![Command::Query {
            focus: checkout(),
            hops: 1
        }]
    );
    assert_eq!(controller.state().hops, 1);

    let state = controller.state();
    let radii = ring_guides(state.hops, state.view, 1.2)
        .iter()
        .map(|ring| ring.radius)
        .collect::<Vec<_>>();
    assert_eq!(radii, vec![4.0]);

    assert!(press(&mut controller, Key::Digit(1)).is_empty());
    assert!(press(&mut controller, Key::Digit(7)).is_empty());
}

#[test]
fn search_selection_changes_focus_and_requeries() {
    let mut controller = loaded();
    controller.handle(InputEvent::Click("svc:payments".to_owned()));

    let postgres = FocusRef::new(FocusKind::Dependency, "postgres", "postgres");
    let commands = controller.handle(InputEvent::SearchSelected(postgres.clone()));
    assert_eq!(
        commands,
        vec![
            Command::BlurSearch,
            Command::Query {
                focus: postgres.clone(),
                hops: 3
            }
        ]
    );
    assert_eq!(controller.focus(), Some(&postgres));
    assert_eq!(controller.state().selected_node_id, None);
}

#[test]
fn stale_selection_is_dropped_on_new_graph() {
    let mut controller = loaded();
    controller.handle(InputEvent::Click("svc:pricing".to_owned()));

    let mut next = graph();
    next.nodes.retain(|node| node.node_id != "svc:pricing");
    next.edges.retain(|edge| !edge.touches("svc:pricing"));
    controller.load_graph(&next);
    assert_eq!(controller.state().selected_node_id, None);
}

#[test]
fn share_state_round_trips_through_text() {
    let mut controller = loaded();
    controller.handle(InputEvent::Click("rt:postgres".to_owned()));
    press(&mut controller, Key::V);

    let share = controller.share_state().unwrap();
    let text = share.to_string();
    assert_eq!(
        text,
        "focusKind=service&focusId=checkout&hops=3&selected=rt%3Apostgres&view=2d"
    );
    assert_eq!(text.parse::<ShareState>().unwrap(), share);

    let with_prefix = format!("blastview://open?{text}");
    assert_eq!(with_prefix.parse::<ShareState>().unwrap(), share);
}

#[test]
fn share_state_restores_pending_selection() {
    let share: ShareState = "focusKind=service&focusId=checkout&hops=2&selected=svc%3Apayments"
        .parse()
        .unwrap();
    assert_eq!(share.view, ViewMode::ThreeD);

    let mut controller = InteractionController::from_share_state(&share);
    assert_eq!(controller.state().hops, 2);
    assert_eq!(controller.state().selected_node_id, None);

    controller.load_graph(&graph());
    assert_eq!(
        controller.state().selected_node_id.as_deref(),
        Some("svc:payments")
    );
}

#[test]
fn malformed_share_state_is_rejected() {
    assert!("focusId=checkout".parse::<ShareState>().is_err());
    assert!("focusKind=service".parse::<ShareState>().is_err());
    assert!("focusKind=planet&focusId=x".parse::<ShareState>().is_err());
    assert!("focusKind=service&focusId=x&hops=9".parse::<ShareState>().is_err());
    assert!("focusKind=service&focusId=x&view=4d".parse::<ShareState>().is_err());
}

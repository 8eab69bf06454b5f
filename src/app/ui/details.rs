use eframe::egui::{self, RichText, Ui};

use blastview::engine::{ConfidenceTier, InputEvent};
use blastview::graph::{FocusRef, GraphNode, NodeKind};
use blastview::util::{format_ratio, format_score};

use super::super::ViewModel;

struct Neighbor {
    node_id: String,
    display_name: String,
    outgoing: bool,
    strength: &'static str,
    weight: f32,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.controller.state().selected_node_id.clone() else {
            ui.label("Click a node, or press Tab to walk nodes by impact.");
            return;
        };

        let Some(node) = self.scene.node(&selected_id).cloned() else {
            ui.label("Selected node is not part of the current graph.");
            return;
        };
        let neighbors = self.neighbors(&selected_id);

        ui.label(RichText::new(&node.display_name).strong());
        ui.small(node.node_id.as_str());
        ui.add_space(6.0);

        Self::draw_node_facts(ui, &node);

        ui.add_space(6.0);
        let mut recenter = None;
        ui.horizontal(|ui| {
            if ui.button("Fly to").clicked() {
                let commands = self.controller.handle(InputEvent::Click(selected_id.clone()));
                self.execute(commands);
            }
            let is_focus =
                self.controller.state().focus_node_id.as_deref() == Some(node.node_id.as_str());
            if ui
                .add_enabled(!is_focus, egui::Button::new("Focus blast radius here"))
                .clicked()
            {
                recenter = Some(FocusRef::for_node(&node));
            }
        });
        if let Some(focus) = recenter {
            let commands = self.controller.handle(InputEvent::SearchSelected(focus));
            self.execute(commands);
        }

        ui.separator();
        ui.label(RichText::new(format!("Direct neighbors ({})", neighbors.len())).strong());
        if neighbors.is_empty() {
            ui.label("No connections inside the current graph.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("neighbor_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for neighbor in &neighbors {
                    let arrow = if neighbor.outgoing { "→" } else { "←" };
                    let label = format!(
                        "{arrow} {}  ({}, {:.2})",
                        neighbor.display_name, neighbor.strength, neighbor.weight
                    );
                    if ui
                        .link(label)
                        .on_hover_text(neighbor.node_id.as_str())
                        .clicked()
                    {
                        clicked = Some(neighbor.node_id.clone());
                    }
                }
            });

        if let Some(node_id) = clicked {
            let commands = self.controller.handle(InputEvent::Click(node_id));
            self.execute(commands);
        }
    }

    fn draw_node_facts(ui: &mut Ui, node: &GraphNode) {
        let tier = match ConfidenceTier::from_score(node.confidence_score) {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        };

        egui::Grid::new("node_facts")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                let mut row = |name: &str, value: String| {
                    ui.label(name);
                    ui.label(value);
                    ui.end_row();
                };

                row("Kind", node.kind.label().to_owned());
                row(
                    "Owner",
                    node.owner_id.clone().unwrap_or_else(|| "unowned".to_owned()),
                );
                row(
                    "Hop distance",
                    node.hop_distance
                        .map_or_else(|| "unknown".to_owned(), |hop| hop.to_string()),
                );
                row("Impact", format_score(node.impact_score));
                row(
                    "Confidence",
                    format!("{} ({tier})", format_ratio(node.confidence_score)),
                );
                row("Completeness", format_ratio(node.completeness_score));
                row("Environments", node.environments.summary());
                if node.kind == NodeKind::Software {
                    row(
                        "Interfaces",
                        format!(
                            "{} prod / {} total",
                            node.prod_interface_count, node.total_interface_count
                        ),
                    );
                }
                row("Connections", node.dependency_degree.to_string());
            });

        if !node.missing_fields.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new("Missing catalog fields").strong());
            for field in &node.missing_fields {
                ui.label(format!("- {field}"));
            }
        }
    }

    fn neighbors(&self, node_id: &str) -> Vec<Neighbor> {
        let Some(graph) = self.scene.graph() else {
            return Vec::new();
        };

        let mut neighbors = graph
            .edges
            .iter()
            .filter(|edge| edge.touches(node_id) && edge.from_id != edge.to_id)
            .filter_map(|edge| {
                let outgoing = edge.from_id == node_id;
                let other = if outgoing { &edge.to_id } else { &edge.from_id };
                let other_node = graph.node(other)?;
                Some(Neighbor {
                    node_id: other.clone(),
                    display_name: other_node.display_name.clone(),
                    outgoing,
                    strength: edge.strength.label(),
                    weight: edge.weight,
                })
            })
            .collect::<Vec<_>>();
        neighbors.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        neighbors
    }
}

use eframe::egui::{self, Color32, Key, RichText, Ui};

use blastview::engine::{InputEvent, SHORTCUT_HELP, SearchEntry, ViewMode};
use blastview::graph::{MAX_HOPS, MIN_HOPS};

use super::super::ViewModel;

const WARNING_COLOR: Color32 = Color32::from_rgb(246, 190, 92);
const ERROR_COLOR: Color32 = Color32::from_rgb(240, 110, 96);

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Blast Radius");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();

        ui.label("Hop depth")
            .on_hover_text("How many hops away from the focus to include (keys 1-5).");
        let mut hops = self.controller.state().hops;
        ui.horizontal(|ui| {
            for depth in MIN_HOPS..=MAX_HOPS {
                ui.selectable_value(&mut hops, depth, depth.to_string());
            }
        });
        if hops != self.controller.state().hops {
            let commands = self.controller.set_hops(hops);
            self.execute(commands);
        }

        ui.add_space(4.0);
        ui.label("View").on_hover_text("Toggle with the v key.");
        let mut view = self.controller.state().view;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut view, ViewMode::TwoD, "2D");
            ui.selectable_value(&mut view, ViewMode::ThreeD, "3D");
        });
        if view != self.controller.state().view {
            let commands = self.controller.set_view(view);
            self.execute(commands);
        }

        if let Some(graph) = self.scene.graph()
            && graph.truncated
        {
            ui.add_space(6.0);
            ui.label(
                RichText::new(format!(
                    "Partial graph: {} of {} reachable nodes shown. \
                     Lower the hop depth to see everything.",
                    graph.nodes.len(),
                    graph.meta.subgraph_size
                ))
                .color(WARNING_COLOR),
            );
        }

        if let Some(error) = &self.query_error {
            ui.add_space(6.0);
            ui.label(RichText::new(format!("Query failed: {error}")).color(ERROR_COLOR));
            ui.label("Try a smaller hop depth or a different focus.");
        }

        ui.separator();
        self.draw_share_link(ui);

        ui.separator();
        egui::CollapsingHeader::new("Legend")
            .default_open(false)
            .show(ui, |ui| {
                ui.label("● software service   ■ dependency   ◆ runtime");
                ui.label("Highlighted edges flow from caller to callee.");
                ui.label("Long dashes: confirmed link. Short dashes: declared only.");
                ui.label("Faded color: low metadata confidence.");
                ui.label("⚠ marks nodes with missing catalog fields.");
            });

        egui::CollapsingHeader::new("Keyboard shortcuts")
            .default_open(false)
            .show(ui, |ui| {
                egui::Grid::new("shortcuts").num_columns(2).show(ui, |ui| {
                    for (keys, action) in SHORTCUT_HELP {
                        ui.monospace(*keys);
                        ui.label(*action);
                        ui.end_row();
                    }
                });
            });
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search (service, domain or dependency)");
        let search_response = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("press / to search")
                .desired_width(f32::INFINITY),
        );

        if std::mem::take(&mut self.focus_search_requested) {
            search_response.request_focus();
        }
        if std::mem::take(&mut self.blur_search_requested) {
            search_response.surrender_focus();
        }
        if search_response.gained_focus() && !self.controller.input_focused() {
            let commands = self.controller.handle(InputEvent::InputFocusChanged(true));
            self.execute(commands);
        }
        if search_response.lost_focus() && self.controller.input_focused() {
            let commands = self.controller.handle(InputEvent::InputFocusChanged(false));
            self.execute(commands);
        }

        let submitted =
            search_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
        let results = self
            .search_index
            .query(&self.search, self.search_result_limit)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();

        if self.search.trim().is_empty() {
            return;
        }
        if results.is_empty() {
            ui.label(RichText::new("No matches.").weak());
            return;
        }

        let mut chosen = results
            .first()
            .filter(|_| submitted)
            .map(SearchEntry::focus_ref);
        egui::ScrollArea::vertical()
            .id_salt("search_results")
            .max_height(260.0)
            .show(ui, |ui| {
                for entry in &results {
                    let detail = entry.detail.as_deref().unwrap_or_default();
                    let text = format!("{}  ·  {}  {}", entry.display_name, entry.kind, detail);
                    if ui.selectable_label(false, text).clicked() {
                        chosen = Some(entry.focus_ref());
                    }
                }
            });

        if let Some(focus) = chosen {
            self.search.clear();
            let commands = self.controller.handle(InputEvent::SearchSelected(focus));
            self.execute(commands);
        }
    }

    fn draw_share_link(&mut self, ui: &mut Ui) {
        ui.label("Share link");
        let Some(share) = self.controller.share_state() else {
            ui.label(RichText::new("No focus yet.").weak());
            return;
        };

        let mut link = share.to_string();
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut link)
                    .interactive(false)
                    .desired_width(ui.available_width() - 56.0),
            );
            if ui.button("Copy").clicked() {
                ui.ctx().copy_text(link.clone());
            }
        });
        ui.small("Start with --link \"<this>\" to restore the view.");
    }
}

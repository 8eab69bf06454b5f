use std::sync::Arc;
use std::time::Instant;

use eframe::egui::{self, Align, Context, Layout};
use log::{error, info};

use blastview::engine::{
    Camera, CameraCommand, Command, InteractionController, Scene, SceneSettings, SearchIndex,
};
use blastview::graph::{Catalog, CatalogProvider, GraphQuery, QueryRunner};

use super::super::{LaunchOptions, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(catalog: Catalog, launch: &LaunchOptions) -> Self {
        let config = &launch.config;
        let organization_id = launch.organization_id(&catalog);
        let search_index = SearchIndex::build(&catalog);
        info!(
            "catalog `{}` loaded: {} services, {} searchable entries",
            catalog.organization_id,
            catalog.services.len(),
            search_index.len()
        );

        let focus = launch.focus.clone().or_else(|| catalog.default_focus());
        let controller = InteractionController::new(focus, launch.hops, launch.view)
            .with_pending_selection(launch.selected.clone());

        let provider = Arc::new(CatalogProvider::new(catalog, config.node_limit));
        let mut model = Self {
            runner: QueryRunner::new(provider),
            search_index,
            controller,
            scene: Scene::new(SceneSettings {
                vertical_lift: config.vertical_lift,
                layout_jitter: config.layout_jitter,
                color_cache_capacity: config.color_cache_capacity,
            }),
            camera: Camera::new(launch.view, config.camera_transition_secs),
            organization_id,
            catalog_label: launch.catalog.to_string(),
            search: String::new(),
            search_result_limit: config.search_result_limit,
            focus_search_requested: false,
            blur_search_requested: false,
            pending_keys: Vec::new(),
            query_error: None,
            last_meta: None,
            started: Instant::now(),
        };

        if let Some(query) = model.controller.current_query() {
            model.execute(vec![query]);
        }
        model
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.poll_queries();
        self.handle_keyboard(ctx);

        let dt = ctx.input(|input| input.stable_dt).min(0.1);
        let camera_moving = self.camera.update(dt);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("blastview");
                    ui.separator();
                    ui.label(format!("org: {}", self.organization_id));
                    ui.label(format!("catalog: {}", self.catalog_label));
                    if let Some(focus) = self.controller.focus() {
                        ui.label(format!("focus: {} {}", focus.kind, focus.display_name));
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(meta) = &self.last_meta {
                            ui.label(format!(
                                "{} of {} services reached in {:.1} ms",
                                meta.subgraph_size, meta.total_services_in_org, meta.compute_time_ms
                            ));
                        }
                        if self.runner.is_loading() {
                            ui.spinner();
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        if camera_moving || self.runner.is_loading() {
            ctx.request_repaint();
        }
    }

    /// Carries out controller commands.
    pub(in crate::app) fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Camera(camera_command) => {
                    let layout = self.scene.layout(self.controller.state().view);
                    self.camera.apply(&camera_command, &layout);
                }
                Command::FocusSearch => self.focus_search_requested = true,
                Command::BlurSearch => self.blur_search_requested = true,
                Command::Query { focus, hops } => {
                    let query = GraphQuery::new(self.organization_id.clone(), &focus, hops);
                    self.runner.issue(query);
                }
            }
        }
    }

    fn poll_queries(&mut self) {
        let Some(completed) = self.runner.poll() else {
            return;
        };

        match completed.outcome {
            Ok(response) => {
                let previous_focus = self.controller.state().focus_node_id.clone();
                self.controller.load_graph(&response);
                self.last_meta = Some(response.meta.clone());
                self.query_error = None;
                self.scene.set_graph(response);

                if self.controller.state().focus_node_id != previous_focus {
                    let layout = self.scene.layout(self.controller.state().view);
                    self.camera.apply(&CameraCommand::Reset, &layout);
                }
            }
            Err(query_error) => {
                error!(
                    "query for {} `{}` at {} hops failed: {query_error}",
                    completed.query.focus_kind, completed.query.focus_id, completed.query.hops
                );
                self.query_error = Some(query_error);
            }
        }
    }
}

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use anyhow::Result;
use eframe::egui::{self, Context, RawInput};
use log::error;

use blastview::config::Config;
use blastview::engine::{Camera, InteractionController, KeyPress, Scene, SearchIndex, ViewMode};
use blastview::graph::{Catalog, FocusRef, QueryError, QueryMeta, QueryRunner};

mod graph;
mod render_utils;
mod ui;

/// Where the organization catalog comes from.
#[derive(Clone, Debug)]
pub enum CatalogSource {
    Bundled,
    Path(PathBuf),
}

impl CatalogSource {
    pub fn load(&self) -> Result<Catalog> {
        match self {
            Self::Bundled => Catalog::bundled(),
            Self::Path(path) => Catalog::load(path),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => f.write_str("bundled demo catalog"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything the viewer needs to start, after config and flags are merged.
#[derive(Clone, Debug)]
pub struct LaunchOptions {
    pub catalog: CatalogSource,
    pub focus: Option<FocusRef>,
    pub hops: u8,
    pub view: ViewMode,
    pub selected: Option<String>,
    pub config: Config,
}

impl LaunchOptions {
    pub fn organization_id(&self, catalog: &Catalog) -> String {
        self.config
            .organization_id
            .clone()
            .unwrap_or_else(|| catalog.organization_id.clone())
    }
}

pub struct BlastViewApp {
    launch: LaunchOptions,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Catalog, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    runner: QueryRunner,
    search_index: SearchIndex,
    controller: InteractionController,
    scene: Scene,
    camera: Camera,
    organization_id: String,
    catalog_label: String,
    search: String,
    search_result_limit: usize,
    focus_search_requested: bool,
    blur_search_requested: bool,
    /// Shortcut presses egui would otherwise consume for widget focus navigation.
    pending_keys: Vec<KeyPress>,
    query_error: Option<QueryError>,
    last_meta: Option<QueryMeta>,
    started: Instant,
}

impl BlastViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, launch: LaunchOptions) -> Self {
        let state = Self::start_load(&launch);
        Self { launch, state }
    }

    fn spawn_load(source: CatalogSource) -> Receiver<Result<Catalog, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(launch: &LaunchOptions) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(launch.catalog.clone()),
        }
    }
}

impl eframe::App for BlastViewApp {
    fn raw_input_hook(&mut self, _ctx: &Context, raw_input: &mut RawInput) {
        if let AppState::Ready(model) = &mut self.state {
            model.intercept_navigation_keys(raw_input);
        }
    }

    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(catalog)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            catalog,
                            &self.launch,
                        ))));
                    }
                    Ok(Err(message)) => {
                        error!("failed to load catalog: {message}");
                        transition = Some(AppState::Error(message));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {}...", self.launch.catalog));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the service catalog");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.launch));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

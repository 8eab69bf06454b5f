mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{info, warn};

use blastview::config::Config;
use blastview::engine::{ShareState, ViewMode};
use blastview::graph::{
    CatalogProvider, FocusRef, GraphDataProvider, GraphQuery, MAX_HOPS, MIN_HOPS,
};

use app::{CatalogSource, LaunchOptions};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Catalog JSON to explore; defaults to the config's catalog, then the bundled demo.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Config file to use instead of the per-user one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial focus as `kind:id`, e.g. `service:checkout` or `domain:commerce`.
    #[arg(long)]
    focus: Option<FocusRef>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u8).range(i64::from(MIN_HOPS)..=i64::from(MAX_HOPS))
    )]
    hops: Option<u8>,

    /// `2d` or `3d`.
    #[arg(long)]
    view: Option<ViewMode>,

    /// Node id to select once the first graph loads.
    #[arg(long)]
    selected: Option<String>,

    /// Restore a shared view, e.g. `focusKind=service&focusId=checkout&hops=2&view=3d`.
    #[arg(long)]
    link: Option<ShareState>,

    /// Print the query response as JSON and exit without opening a window.
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|error| {
            warn!("using default config: {error:#}");
            Config::default()
        }),
    };
    let launch = resolve_launch(&args, config);

    if args.dump {
        return dump(&launch);
    }

    info!("starting viewer with {}", launch.catalog);
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "blastview",
        options,
        Box::new(move |cc| Ok(Box::new(app::BlastViewApp::new(cc, launch)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

/// Precedence: explicit flags, then `--link`, then the config file.
fn resolve_launch(args: &Args, config: Config) -> LaunchOptions {
    let mut launch = LaunchOptions {
        catalog: args
            .catalog
            .clone()
            .or_else(|| config.catalog_path.clone())
            .map_or(CatalogSource::Bundled, CatalogSource::Path),
        focus: None,
        hops: config.default_hops,
        view: config.default_view,
        selected: None,
        config,
    };

    if let Some(link) = &args.link {
        launch.focus = Some(FocusRef::new(
            link.focus_kind,
            link.focus_id.clone(),
            link.focus_id.clone(),
        ));
        launch.hops = link.hops;
        launch.view = link.view;
        launch.selected = link.selected_node_id.clone();
    }

    if let Some(focus) = &args.focus {
        launch.focus = Some(focus.clone());
    }
    if let Some(hops) = args.hops {
        launch.hops = hops;
    }
    if let Some(view) = args.view {
        launch.view = view;
    }
    if let Some(selected) = &args.selected {
        launch.selected = Some(selected.clone());
    }

    launch
}

fn dump(launch: &LaunchOptions) -> Result<()> {
    let catalog = launch.catalog.load()?;
    let focus = launch
        .focus
        .clone()
        .or_else(|| catalog.default_focus())
        .context("catalog has no services to focus on")?;
    let organization_id = launch.organization_id(&catalog);

    let provider = CatalogProvider::new(catalog, launch.config.node_limit);
    let response = provider.query(&GraphQuery::new(organization_id, &focus, launch.hops))?;

    let json =
        serde_json::to_string_pretty(&response).context("failed to serialize graph response")?;
    println!("{json}");
    Ok(())
}

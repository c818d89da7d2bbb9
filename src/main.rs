mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use eframe::egui;

use cli::{Cli, Commands};
use ninebox_dashboard::app::NineBoxApp;
use ninebox_dashboard::config::DashboardConfig;
use ninebox_dashboard::data::loader::LoadOptions;
use ninebox_dashboard::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data.path = data;
    }
    let options = LoadOptions {
        thresholds: config.thresholds,
        recompute_categories: config.data.recompute_categories,
    };
    let data_path = config.data.path.as_path();

    match cli.command {
        None => run_dashboard(data_path, options),
        Some(Commands::Summary { filters }) => cli::summary(data_path, &options, filters),
        Some(Commands::Export { filters, out_dir }) => {
            cli::export(data_path, &options, filters, &out_dir)
        }
    }
}

fn run_dashboard(data_path: &Path, options: LoadOptions) -> Result<()> {
    // Loaded once up front; the UI only re-reads on Reload / Open.
    let mut state = AppState::new(options);
    state.load(data_path);

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "9-Box Talent Dashboard",
        native,
        Box::new(move |_cc| Ok(Box::new(NineBoxApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}

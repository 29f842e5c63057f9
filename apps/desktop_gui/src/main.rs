use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod media;
mod ui;

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::config::{load_settings, load_settings_from};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::PosterStudioApp;

const APP_NAME: &str = "Poster Studio";

#[derive(Parser, Debug)]
#[command(name = "poster-studio", about = "Generate book posters from a cover image")]
struct Args {
    /// Base URL of the poster generation service.
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file to read instead of ./poster.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    }
    .with_server_url(args.server_url.as_deref())?;
    tracing::info!(server_url = %settings.server_url, "starting {APP_NAME}");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    let _worker = backend_bridge::runtime::launch(cmd_rx, ui_tx, settings.server_url.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    let server_url = settings.server_url;
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(PosterStudioApp::new(cmd_tx, ui_rx, server_url)))),
    )
    .map_err(|err| anyhow!("failed to run {APP_NAME}: {err}"))
}

mod backend_bridge;
mod controller;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::{load_settings, LaunchParams};
use crossbeam_channel::bounded;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, reducer::PaymentUiState};
use crate::ui::PaymentApp;

#[derive(Parser, Debug)]
#[command(name = "watt-desktop", about = "Desktop shell for energy payments")]
struct Args {
    /// Settings file; defaults to ./watt.toml
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frame launch URL carrying `id` and `amount` query parameters
    #[arg(long)]
    launch_url: Option<String>,
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    amount: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let settings = load_settings(args.config.as_deref());
    let contract = settings.contract()?;

    let mut launch = LaunchParams::new(args.id, args.amount);
    if let Some(url) = args.launch_url.as_deref() {
        launch = launch.or(LaunchParams::from_url(url)?);
    }
    let poll_interval = settings.confirmation_poll_interval();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Watt-A-Frame")
            .with_inner_size([480.0, 640.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Watt-A-Frame",
        options,
        Box::new(move |_cc| {
            let state = PaymentUiState::new(contract, launch);
            Ok(Box::new(PaymentApp::new(state, cmd_tx, ui_rx, poll_interval)))
        }),
    )
    .map_err(|err| anyhow!("desktop shell failed: {err}"))
}

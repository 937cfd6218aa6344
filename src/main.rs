//! Desktop Organizer
//!
//! Groups desktop files into collapsible category windows and keeps
//! per-day notes on a calendar.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod core;
mod ui;

use app::OrganizerApp;
use crate::core::paths::AppPaths;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Desktop Organizer...");

    let paths = AppPaths::resolve()?;
    tracing::info!("Storage folder: {}", paths.storage.display());

    // Files are pulled in before the window opens so the first frame is complete
    let app = OrganizerApp::startup(paths)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 420.0])
            .with_position(app.main_pos)
            .with_title("Desktop Organizer"),
        ..Default::default()
    };

    eframe::run_native(
        "Desktop Organizer",
        native_options,
        Box::new(move |cc| Ok(Box::new(app.attach(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}

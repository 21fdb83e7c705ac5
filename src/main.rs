//! Notiq - markdown editor with native and limited file access
//!
//! Documents are opened and saved through native file handles where the
//! platform allows it, and through import and download otherwise.

mod app;
mod core;
mod ui;

use app::NotiqApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Notiq...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Notiq")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Notiq",
        native_options,
        Box::new(|cc| Ok(Box::new(NotiqApp::new(cc)))),
    )
}

//! Murmur client: a threaded conversation view with a markdown composer.
//!
//! Architecture:
//! - Main thread: runs the egui UI
//! - Backend thread: runs a Tokio runtime for the async services
//! - Communication via crossbeam channels (lock-free, sync-safe)

use eframe::egui;
use murmur_client::app::MurmurApp;

fn main() -> eframe::Result<()> {
    murmur_client::logging::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Murmur",
        options,
        Box::new(|cc| Ok(Box::new(MurmurApp::new(cc)))),
    )
}

use std::path::Path;

use eframe::egui;

use stay_scope::app::StayScopeApp;
use stay_scope::data::loader;
use stay_scope::state::AppState;

/// Loaded automatically when present; otherwise start empty and use
/// File → Open.
const DEFAULT_DATA_PATH: &str = "data/listings.csv";

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::default();
    let default_path = Path::new(DEFAULT_DATA_PATH);
    if default_path.exists() {
        match loader::load_cached(default_path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                // A present-but-broken dataset is fatal, not a degraded start.
                log::error!("failed to load {DEFAULT_DATA_PATH}: {e:#}");
                eprintln!("Error: failed to load {DEFAULT_DATA_PATH}: {e:#}");
                std::process::exit(1);
            }
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Stay Scope – Listings Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(StayScopeApp::new(state)))),
    )
}

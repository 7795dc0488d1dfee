mod app;
mod color;
mod config;
mod state;
mod ui;

use app::ExchangeStatsApp;
use config::{ViewerConfig, MIN_WINDOW_SIZE, WINDOW_SIZE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::from_env();
    log::debug!("Viewer configuration: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(MIN_WINDOW_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        "NTU Outbound Exchange Stats",
        options,
        Box::new(move |_cc| Ok(Box::new(ExchangeStatsApp::new(&config)))),
    )
}

use eframe::egui;

use crate::config::ViewerConfig;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExchangeStatsApp {
    pub state: AppState,
}

impl ExchangeStatsApp {
    /// Build the app and load the configured data file. A missing default
    /// file only leaves the viewer empty; the user can open one from the menu.
    pub fn new(config: &ViewerConfig) -> Self {
        let mut state = AppState::new(config.preferred_department.clone());
        if config.data_path.exists() {
            state.load_path(&config.data_path);
        } else {
            log::info!(
                "No data file at {}, waiting for File → Open…",
                config.data_path.display()
            );
        }
        Self { state }
    }
}

impl eframe::App for ExchangeStatsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: statistics ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – year range and department
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone the handle so we can mutate state while reading the dataset.
    let (Some(dataset), Some(query)) = (state.dataset.clone(), state.query.clone()) else {
        ui.label("No dataset loaded.");
        return;
    };
    let Some((first_year, last_year)) = dataset.year_bounds() else {
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year range ----
            ui.strong("Academic year");
            let mut year_min = query.year_min;
            let mut year_max = query.year_max;
            if ui
                .add(egui::Slider::new(&mut year_min, first_year..=last_year).text("from"))
                .changed()
            {
                state.set_year_min(year_min);
            }
            if ui
                .add(egui::Slider::new(&mut year_max, first_year..=last_year).text("to"))
                .changed()
            {
                state.set_year_max(year_max);
            }
            if ui.small_button("Full range").clicked() {
                state.reset_range();
            }
            ui.separator();

            // ---- Department selector, grouped by faculty ----
            ui.strong("Department");
            egui::ComboBox::from_id_salt("slct_department")
                .selected_text(&query.department)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for (faculty, departments) in dataset.departments_by_faculty() {
                        ui.label(RichText::new(faculty).weak().small());
                        for dept in departments {
                            if ui
                                .selectable_label(query.department == *dept, dept)
                                .clicked()
                            {
                                state.set_department(dept);
                            }
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.result().is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export statistics…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
        }

        if let Some(ds) = &state.dataset {
            let source = state
                .source_path
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let matched = state.result().map_or(0, |r| r.total);
            ui.label(format!(
                "{source}: {} records ({} incomplete dropped), {} departments, {matched} matching",
                ds.len(),
                ds.rejected_rows(),
                ds.departments().len(),
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open exchange records")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export statistics")
        .add_filter("JSON", &["json"])
        .set_file_name("exchange_stats.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_json(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

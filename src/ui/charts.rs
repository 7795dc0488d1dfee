use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};

use exchange_stats::QueryResult;

use crate::color::{accent_ramp, category_palette, ACCENT};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render summary cards, the three charts and the institution table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(query), Some(result)) = (&state.query, state.result()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view exchange statistics  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            summary_cards(ui, result);
            ui.separator();

            if result.is_empty() {
                ui.add_space(24.0);
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(
                        RichText::new("No exchanges match the current selection")
                            .italics()
                            .size(16.0),
                    );
                });
                return;
            }

            let dept = &query.department;

            let years: Vec<(String, usize)> = result
                .by_year
                .by_key_asc()
                .into_iter()
                .map(|(y, n)| (y.to_string(), n))
                .collect();
            let year_colors = vec![ACCENT; years.len()];
            bar_chart(ui, "hist_year", &format!("{dept}: exchanges per year"), years, year_colors);

            let countries = by_count(&result.by_country);
            let country_colors = category_palette(countries.len());
            bar_chart(
                ui,
                "hist_country",
                &format!("{dept}: destination countries"),
                countries,
                country_colors,
            );

            let schools = by_count(&result.by_institution);
            let school_colors = accent_ramp(schools.len());
            bar_chart(
                ui,
                "hist_school",
                &format!("{dept}: destination institutions"),
                schools.clone(),
                school_colors,
            );

            ui.separator();
            institution_table(ui, &schools);
        });
}

fn by_count(dist: &exchange_stats::FrequencyDistribution<String>) -> Vec<(String, usize)> {
    dist.by_count_desc()
        .into_iter()
        .map(|(k, n)| (k.clone(), n))
        .collect()
}

// ---------------------------------------------------------------------------
// Summary cards
// ---------------------------------------------------------------------------

fn summary_cards(ui: &mut Ui, result: &QueryResult) {
    let cards = [
        (format!("{}%", result.one_semester_pct), "of students went for one semester"),
        (result.total.to_string(), "students went on exchange"),
        (result.distinct_countries.to_string(), "countries"),
        (result.distinct_institutions.to_string(), "institutions"),
    ];

    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (col, (value, caption)) in cols.iter_mut().zip(cards.iter()) {
            col.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(value).size(32.0).strong().color(ACCENT));
                ui.label(*caption);
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// One bar per `(label, count)` entry, in the given order.
fn bar_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    entries: Vec<(String, usize)>,
    colors: Vec<Color32>,
) {
    ui.add_space(8.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(title);
    });

    let bars: Vec<Bar> = entries
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((label, count), color))| {
            Bar::new(i as f64, *count as f64)
                .name(label)
                .fill(color)
                .width(0.7)
        })
        .collect();

    let labels: Vec<String> = entries.into_iter().map(|(label, _)| label).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .y_axis_label("Students")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Institution table
// ---------------------------------------------------------------------------

fn institution_table(ui: &mut Ui, schools: &[(String, usize)]) {
    egui::CollapsingHeader::new(RichText::new("All institutions").strong())
        .id_salt("institution_table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::remainder())
                .column(Column::auto().at_least(60.0))
                .header(20.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("Institution");
                    });
                    header.col(|ui: &mut Ui| {
                        ui.strong("Students");
                    });
                })
                .body(|mut body| {
                    for (name, count) in schools {
                        body.row(18.0, |mut row| {
                            row.col(|ui: &mut Ui| {
                                ui.label(name);
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(count.to_string());
                            });
                        });
                    }
                });
        });
}

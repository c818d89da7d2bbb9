use std::collections::BTreeSet;

use anyhow::Context;
use eframe::egui::{self, Button, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{PotentialRange, PromotionStatus, Selection};
use crate::data::model::BoxCategory;
use crate::present::{
    filtered_csv, filtered_export_name, summary_csv, thousands, SUMMARY_EXPORT_NAME,
};
use crate::state::{AppState, StatusLine};

/// Id pickers list at most this many matches at a time.
const MAX_ID_OPTIONS: usize = 200;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Core Filters");
    ui.separator();

    // The table is shared read-only; hold our own handle so `state` stays free.
    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Promotion status ----
            ui.strong("Promotion Status");
            for status in PromotionStatus::ALL {
                changed |= ui
                    .radio_value(&mut state.criteria.promotion, status, status.label())
                    .changed();
            }
            ui.add_space(6.0);

            // ---- Potential range ----
            if let Some((lo, hi)) = table.potential_bounds {
                ui.strong("Potential Score Range (model probabilities)");
                let range = state
                    .criteria
                    .potential
                    .get_or_insert(PotentialRange { min: lo, max: hi });
                // Two decimals are shown only; the stored bound keeps full precision.
                let two_dp = |v: f64, _: std::ops::RangeInclusive<usize>| format!("{v:.2}");
                let min_changed = ui
                    .add(egui::Slider::new(&mut range.min, lo..=hi).custom_formatter(two_dp).text("min"))
                    .changed();
                let max_changed = ui
                    .add(egui::Slider::new(&mut range.max, lo..=hi).custom_formatter(two_dp).text("max"))
                    .changed();
                if min_changed || max_changed {
                    *range = range.snapped_to(lo, hi);
                }
                if range.min > range.max {
                    if min_changed {
                        range.max = range.min;
                    } else {
                        range.min = range.max;
                    }
                }
                changed |= min_changed || max_changed;
                ui.add_space(6.0);
            }

            // ---- 9-box categories ----
            let n_cats = state.criteria.categories.len();
            egui::CollapsingHeader::new(RichText::new(format!("9-Box Category  ({n_cats})")).strong())
                .id_salt("categories")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() && n_cats > 0 {
                        state.criteria.categories.clear();
                        changed = true;
                    }
                    for cat in BoxCategory::all() {
                        let mut checked = state.criteria.categories.contains(&cat);
                        if ui.checkbox(&mut checked, cat.to_string()).changed() {
                            if checked {
                                state.criteria.categories.insert(cat);
                            } else {
                                state.criteria.categories.remove(&cat);
                            }
                            changed = true;
                        }
                    }
                });

            ui.separator();
            ui.heading("Additional Filters");

            // ---- Id pickers (two independent selections) ----
            changed |= id_picker(
                ui,
                "employee_ids",
                "Employee IDs",
                &table.employee_ids,
                &mut state.criteria.employee_ids,
                &mut state.employee_search,
            );
            changed |= id_picker(
                ui,
                "manager_ids",
                "Manager IDs",
                &table.manager_ids,
                &mut state.criteria.manager_ids,
                &mut state.manager_search,
            );
            ui.add_space(6.0);

            // ---- Single-select dropdowns ----
            changed |= single_select(
                ui,
                "department",
                "Department",
                &table.departments,
                &mut state.criteria.department,
            );
            changed |= single_select(
                ui,
                "role_level",
                "Role Level",
                &table.role_levels,
                &mut state.criteria.role_level,
            );
            changed |= single_select(
                ui,
                "education_level",
                "Education Level",
                &table.education_levels,
                &mut state.criteria.education_level,
            );

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });

    // Recompute the view and aggregates after any widget change.
    if changed {
        state.refilter();
    }
}

/// Searchable multi-select over identifier values. Empty selection = no filter.
fn id_picker(
    ui: &mut Ui,
    id_salt: &str,
    title: &str,
    options: &[String],
    selected: &mut BTreeSet<String>,
    search: &mut String,
) -> bool {
    let mut changed = false;
    let header = format!("{title}  ({} selected)", selected.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(id_salt)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.add(egui::TextEdit::singleline(search).hint_text("search").desired_width(110.0));
                if ui.small_button("Clear").clicked() && !selected.is_empty() {
                    selected.clear();
                    changed = true;
                }
            });

            let needle = search.trim();
            ScrollArea::vertical()
                .id_salt(id_salt)
                .max_height(160.0)
                .show(ui, |ui: &mut Ui| {
                    let matches = options
                        .iter()
                        .filter(|id| needle.is_empty() || id.contains(needle))
                        .take(MAX_ID_OPTIONS);
                    for id in matches {
                        let mut checked = selected.contains(id);
                        if ui.checkbox(&mut checked, id.as_str()).changed() {
                            if checked {
                                selected.insert(id.clone());
                            } else {
                                selected.remove(id);
                            }
                            changed = true;
                        }
                    }
                });
        });

    changed
}

/// Dropdown with an "All" sentinel followed by the observed values.
fn single_select(
    ui: &mut Ui,
    id_salt: &str,
    title: &str,
    options: &BTreeSet<String>,
    selection: &mut Selection,
) -> bool {
    let mut changed = false;
    ui.strong(title);
    egui::ComboBox::from_id_salt(id_salt)
        .selected_text(selection.label().to_string())
        .show_ui(ui, |ui: &mut Ui| {
            changed |= ui.selectable_value(selection, Selection::All, "All").changed();
            for value in options {
                changed |= ui
                    .selectable_value(selection, Selection::Only(value.clone()), value.as_str())
                    .changed();
            }
        });
    changed
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
            if ui.add_enabled(state.source.is_some(), Button::new("Reload")).clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        let has_rows = state.snapshot.as_ref().is_some_and(|s| s.has_data());
        ui.menu_button("Export", |ui: &mut Ui| {
            if ui
                .add_enabled(has_rows, Button::new("Filtered data (CSV)…"))
                .clicked()
            {
                export_filtered(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_rows, Button::new("Summary statistics (CSV)…"))
                .clicked()
            {
                export_summary(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} employees loaded, {} visible",
                thousands(table.len()),
                thousands(state.visible_indices.len())
            ));
        }

        if let Some(status) = &state.status {
            ui.separator();
            match status {
                StatusLine::Info(msg) => ui.label(msg.as_str()),
                StatusLine::Error(msg) => ui.label(RichText::new(msg.as_str()).color(Color32::RED)),
            };
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open employee data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

fn export_filtered(state: &mut AppState) {
    let payload = match state.view() {
        Some(view) => filtered_csv(&view),
        None => return,
    };
    let name = filtered_export_name(&state.criteria.department, &state.criteria.role_level);
    save_export(state, &name, payload);
}

fn export_summary(state: &mut AppState) {
    let Some(snapshot) = &state.snapshot else {
        return;
    };
    let payload = summary_csv(&snapshot.summary);
    save_export(state, SUMMARY_EXPORT_NAME, payload);
}

/// Ask for a destination and write `payload` there.
fn save_export(state: &mut AppState, file_name: &str, payload: anyhow::Result<Vec<u8>>) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export CSV")
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    let written = payload.and_then(|bytes| {
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))
    });
    state.status = Some(match written {
        Ok(()) => {
            log::info!("Exported {}", path.display());
            StatusLine::Info(format!("Saved {}", path.display()))
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            StatusLine::Error(format!("Export failed: {e:#}"))
        }
    });
}

use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::FilteredView;
use crate::data::model::EmployeeRecord;
use crate::present::{display_row, DISPLAY_COLUMNS};

/// Scrollable detail table of the filtered employees.
pub fn employee_table(ui: &mut Ui, view: &FilteredView<'_>) {
    let records: Vec<&EmployeeRecord> = view.iter().collect();

    ScrollArea::horizontal().id_salt("employee_table_h").show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(400.0)
            .columns(Column::auto().at_least(70.0), DISPLAY_COLUMNS.len())
            .header(22.0, |mut header| {
                for (_, title) in DISPLAY_COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                // Only visible rows are laid out.
                body.rows(20.0, records.len(), |mut row| {
                    let cells = display_row(records[row.index()]);
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

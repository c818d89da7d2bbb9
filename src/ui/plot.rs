use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Plot, PlotPoint, Points, Text};

use crate::color::{goodness_color, hex_to_color32, SALARY_COLOR};
use crate::data::aggregate::{HeadlineMetrics, SalarySpread};
use crate::present::{thousands, BarSeries, HeatmapSpec};
use crate::state::{AppState, DashboardSnapshot};

use super::table;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render metrics, charts and the detail table in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.load_failed {
        let msg = state.status.as_ref().map(|s| s.text()).unwrap_or("Failed to load data.");
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(RichText::new(msg).color(Color32::RED));
        });
        return;
    }

    let (Some(snapshot), Some(view)) = (&state.snapshot, state.view()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view employees  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metric_cards(ui, &snapshot.metrics);
            ui.separator();

            if !snapshot.has_data() {
                ui.label("No employees match the current filters.");
                return;
            }

            charts(ui, snapshot);

            ui.separator();
            ui.heading("Detailed Employee Data");
            table::employee_table(ui, &view);
        });
}

fn charts(ui: &mut Ui, snapshot: &DashboardSnapshot) {
    ui.heading("9-Box Grid");
    heatmap(ui, &snapshot.heatmap);
    ui.add_space(12.0);

    ui.heading("9-Box Category Distribution");
    distribution_chart(ui, &snapshot.bars);
    ui.add_space(12.0);

    ui.heading("Salary Distribution");
    salary_boxplot(ui, snapshot.salary.as_ref());
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

fn metric_cards(ui: &mut Ui, m: &HeadlineMetrics) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "Total Employees",
            m.total,
            format!("{:.1}% of Eligible EEs", m.total_share),
        );
        metric_card(
            &mut cols[1],
            "Actually Promoted",
            m.promoted,
            format!("{:.1}% of Selected EEs", m.promoted_share),
        );
        metric_card(
            &mut cols[2],
            "High Potential Talent",
            m.high_potential,
            format!("{:.1}% of Selected EEs", m.high_potential_share),
        );
        metric_card(
            &mut cols[3],
            "Stars (High/High)",
            m.stars,
            format!("{:.1}% of Selected EEs", m.stars_share),
        );
    });
}

fn metric_card(ui: &mut Ui, label: &str, value: usize, caption: String) {
    ui.group(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(thousands(value)).size(26.0).strong());
        ui.small(caption);
    });
}

// ---------------------------------------------------------------------------
// 9-box heatmap (painted directly; egui_plot has no heatmap primitive)
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, spec: &HeatmapSpec) {
    const AXIS_W: f32 = 130.0;
    const LABEL_H: f32 = 26.0;
    const CELL_H: f32 = 120.0;

    let width = ui.available_width().min(960.0);
    let (rect, _) = ui.allocate_exact_size(vec2(width, CELL_H * 3.0 + LABEL_H * 2.0), Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();

    let grid = Rect::from_min_max(
        pos2(rect.left() + AXIS_W, rect.top()),
        pos2(rect.right(), rect.top() + CELL_H * 3.0),
    );
    let cell_w = grid.width() / 3.0;
    // High potential is drawn on the top row.
    let row_top = |row: usize| grid.top() + (2 - row) as f32 * CELL_H;

    for row in 0..3 {
        for col in 0..3 {
            let cell = Rect::from_min_size(
                pos2(grid.left() + col as f32 * cell_w, row_top(row)),
                vec2(cell_w, CELL_H),
            )
            .shrink(2.0);
            painter.rect_filled(cell, 4.0, goodness_color(spec.z[row][col], HeatmapSpec::MAX_SCORE));
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                &spec.annotations[row][col],
                FontId::proportional(14.0),
                Color32::BLACK,
            );
        }

        painter.text(
            pos2(grid.left() - 8.0, row_top(row) + CELL_H / 2.0),
            Align2::RIGHT_CENTER,
            &spec.row_labels[row],
            FontId::proportional(14.0),
            text_color,
        );
    }

    for (col, label) in spec.col_labels.iter().enumerate() {
        painter.text(
            pos2(grid.left() + (col as f32 + 0.5) * cell_w, grid.bottom() + LABEL_H / 2.0),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(14.0),
            text_color,
        );
    }

    painter.text(
        pos2(grid.center().x, grid.bottom() + LABEL_H * 1.5),
        Align2::CENTER_CENTER,
        spec.x_title,
        FontId::proportional(15.0),
        text_color,
    );
    painter.text(
        rect.left_top(),
        Align2::LEFT_TOP,
        spec.y_title,
        FontId::proportional(15.0),
        text_color,
    );
}

// ---------------------------------------------------------------------------
// Distribution bars
// ---------------------------------------------------------------------------

fn distribution_chart(ui: &mut Ui, series: &BarSeries) {
    let n = series.bars.len();
    // Largest bar at the top: bar i sits at y = n - 1 - i.
    let y_of = |i: usize| (n - 1 - i) as f64;
    let max = series.max_count() as f64;

    let bars: Vec<Bar> = series
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(y_of(i), b.count as f64)
                .name(b.category.to_string())
                .fill(hex_to_color32(b.color))
        })
        .collect();
    let y_labels: Vec<String> = series.bars.iter().rev().map(|b| b.category.to_string()).collect();

    Plot::new("category_distribution")
        .height(60.0 + 40.0 * n as f32)
        .x_axis_label("Number of Employees")
        .y_axis_min_width(260.0)
        .y_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if v >= 0.0 && (v - v.round()).abs() < 1e-6 {
                y_labels.get(v.round() as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .include_x(0.0)
        .include_x(max * 1.4)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
            for (i, b) in series.bars.iter().enumerate() {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(b.count as f64 + max * 0.02, y_of(i)),
                        format!("{}   {}", thousands(b.count), b.legend),
                    )
                    .anchor(Align2::LEFT_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Salary boxplot
// ---------------------------------------------------------------------------

fn salary_boxplot(ui: &mut Ui, spread: Option<&SalarySpread>) {
    let Some(s) = spread else {
        ui.label("No salary data available for current filters.");
        return;
    };

    let color = hex_to_color32(SALARY_COLOR);
    let elem = BoxElem::new(0.0, BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker))
        .name("Salary")
        .fill(color.gamma_multiply(0.4))
        .stroke(Stroke::new(1.5, color));

    let outliers: Vec<[f64; 2]> = s.outliers.iter().map(|&v| [v, 0.0]).collect();

    Plot::new("salary_distribution")
        .height(160.0)
        .x_axis_label("salary")
        .show_axes([true, false])
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).horizontal());
            if !outliers.is_empty() {
                plot_ui.points(Points::new(outliers).radius(3.0).color(color));
            }
        });
}

//! Renderer-agnostic chart specs and CSV export payloads.
//!
//! Nothing in here depends on egui; the dashboard and the CLI both consume
//! these structures.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::color::{category_color, category_legend};
use crate::data::aggregate::{Distribution, Grid, SummaryRow};
use crate::data::filter::{FilteredView, Selection};
use crate::data::model::{BoxCategory, EmployeeRecord, Tier};

pub const SUMMARY_EXPORT_NAME: &str = "9box_summary_statistics.csv";

/// Format an integer with `,` thousands separators.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapSpec {
    /// Ordinal goodness per cell, `0` (Low/Low) to [`HeatmapSpec::MAX_SCORE`] (High/High).
    pub z: [[u8; 3]; 3],
    /// Bottom to top.
    pub row_labels: [String; 3],
    /// Left to right.
    pub col_labels: [String; 3],
    pub annotations: [[String; 3]; 3],
    pub x_title: &'static str,
    pub y_title: &'static str,
}

impl HeatmapSpec {
    pub const MAX_SCORE: u8 = 8;

    pub fn from_grid(grid: &Grid) -> Self {
        let z = [0u8, 1, 2].map(|row| [0u8, 1, 2].map(|col| row * 3 + col));
        let annotations = grid.cells.map(|row| {
            row.map(|cell| {
                format!(
                    "{}\n({}%)\n\n{} Potential /\n{} Performance",
                    thousands(cell.count),
                    cell.percentage,
                    cell.category.potential,
                    cell.category.performance
                )
            })
        });

        HeatmapSpec {
            z,
            row_labels: Tier::ALL.map(|t| format!("{t} Potential")),
            col_labels: Tier::ALL.map(|t| format!("{t} Rating")),
            annotations,
            x_title: "Performance Rating",
            y_title: "Potential Score",
        }
    }
}

// ---------------------------------------------------------------------------
// Distribution bars
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: BoxCategory,
    pub count: usize,
    pub color: &'static str,
    pub legend: &'static str,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarSeries {
    /// Descending by count.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Categories with no employees are left out.
    pub fn from_distribution(dist: &Distribution) -> Self {
        let mut bars: Vec<Bar> = dist
            .entries()
            .filter(|&(_, count)| count > 0)
            .map(|(category, count)| Bar {
                category,
                count,
                color: category_color(category),
                legend: category_legend(category),
            })
            .collect();
        // Stable: ties keep canonical category order.
        bars.sort_by(|a, b| b.count.cmp(&a.count));
        BarSeries { bars }
    }

    pub fn max_count(&self) -> usize {
        self.bars.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Detail table / filtered export
// ---------------------------------------------------------------------------

/// Detail-table columns in display order: `(source field, header)`.
pub const DISPLAY_COLUMNS: [(&str, &str); 22] = [
    ("employee_id", "Employee ID"),
    ("promoted", "Actually Promoted"),
    ("prediction_promoted", "Model Prediction"),
    ("manager_id", "Manager ID"),
    ("department", "Department"),
    ("role_level", "Role Level"),
    ("education_level", "Education"),
    ("years_in_company", "Company Tenure"),
    ("years_in_role", "Role Tenure"),
    ("performance_rating", "Performance"),
    ("awards", "Awards"),
    ("kpis_count", "KPIs Ct"),
    ("kpis_achieved_pct", "KPIs Achieved"),
    ("peer_review_score", "Peer Score"),
    ("training_courses_completed", "Training Courses"),
    ("certification_count", "Certifications"),
    ("mentorship_participation", "Mentorship"),
    ("projects_delivered", "Projects"),
    ("salary", "Salary"),
    ("performance_intervention", "performance_intervention"),
    ("box_category", "9-Box Category"),
    ("potential", "Potential Score"),
];

fn yes_no(flag: bool) -> String {
    let text = if flag { "Yes" } else { "No" };
    text.to_string()
}

/// One record rendered as display cells, aligned with [`DISPLAY_COLUMNS`].
pub fn display_row(rec: &EmployeeRecord) -> [String; 22] {
    [
        rec.employee_id.clone(),
        yes_no(rec.promoted),
        yes_no(rec.prediction_promoted),
        rec.manager_id.clone(),
        rec.department.clone(),
        rec.role_level.clone(),
        rec.education_level.clone(),
        rec.years_in_company.to_string(),
        rec.years_in_role.to_string(),
        rec.performance_rating.to_string(),
        rec.awards.to_string(),
        rec.kpis_count.to_string(),
        rec.kpis_achieved_pct.to_string(),
        rec.peer_review_score.to_string(),
        rec.training_courses_completed.to_string(),
        rec.certification_count.to_string(),
        rec.mentorship_participation.to_string(),
        rec.projects_delivered.to_string(),
        rec.salary.to_string(),
        rec.performance_intervention.to_string(),
        rec.box_category.to_string(),
        rec.potential.to_string(),
    ]
}

/// UTF-8 CSV of the filtered rows with human-readable headers.
pub fn filtered_csv(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(DISPLAY_COLUMNS.iter().map(|&(_, header)| header))
        .context("writing CSV header")?;
    for rec in view.iter() {
        writer
            .write_record(display_row(rec))
            .with_context(|| format!("writing employee {}", rec.employee_id))?;
    }
    writer.into_inner().context("flushing CSV buffer")
}

/// `9box_filtered_data_{department}_{role}.csv`.
pub fn filtered_export_name(department: &Selection, role_level: &Selection) -> String {
    format!(
        "9box_filtered_data_{}_{}.csv",
        file_safe(department.label()),
        file_safe(role_level.label())
    )
}

/// Replace path separators and characters Windows rejects in file names.
fn file_safe(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary export
// ---------------------------------------------------------------------------

pub const SUMMARY_COLUMNS: [&str; 5] =
    ["Category", "Count", "Promoted", "Avg Potential", "Avg Performance"];

/// UTF-8 CSV with one line per category; undefined means are left blank.
pub fn summary_csv(rows: &[SummaryRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(SUMMARY_COLUMNS)
        .context("writing CSV header")?;
    for row in rows {
        let mean = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        writer
            .write_record([
                row.category.to_string(),
                row.count.to_string(),
                row.promoted.to_string(),
                mean(row.avg_potential),
                mean(row.avg_performance),
            ])
            .with_context(|| format!("writing summary for {}", row.category))?;
    }
    writer.into_inner().context("flushing CSV buffer")
}

/// Summary rows as an Arrow table, for pretty-printing in the terminal.
pub fn summary_batch(rows: &[SummaryRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(SUMMARY_COLUMNS[0], DataType::Utf8, false),
        Field::new(SUMMARY_COLUMNS[1], DataType::UInt64, false),
        Field::new(SUMMARY_COLUMNS[2], DataType::UInt64, false),
        Field::new(SUMMARY_COLUMNS[3], DataType::Float64, true),
        Field::new(SUMMARY_COLUMNS[4], DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.category.to_string()),
        )),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.count as u64))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.promoted as u64))),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.avg_potential).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.avg_performance).collect::<Vec<_>>(),
        )),
    ];
    RecordBatch::try_new(schema, columns).context("building summary table")
}

//! End-to-end scenarios: load a CSV from disk, filter it through the
//! session state, and read back the exported files.

use std::collections::BTreeSet;
use std::path::PathBuf;

use ninebox_dashboard::data::filter::{PotentialRange, Selection};
use ninebox_dashboard::data::loader::LoadOptions;
use ninebox_dashboard::data::model::{BoxCategory, Tier};
use ninebox_dashboard::present::{
    display_row, filtered_csv, filtered_export_name, summary_csv, DISPLAY_COLUMNS,
    SUMMARY_EXPORT_NAME,
};
use ninebox_dashboard::state::{AppState, StatusLine};
use tempfile::TempDir;

const HEADER: &str = "employee_id,manager_id,department,role_level,education_level,\
performance_rating,potential,promoted,prediction_promoted,box_category,salary,\
years_in_company,years_in_role,awards,kpis_count,kpis_achieved_pct,peer_review_score,\
training_courses_completed,certification_count,mentorship_participation,\
projects_delivered,performance_intervention";

/// Ten employees, four of them in the top-right box.
const ROWS: [&str; 10] = [
    "1,100,Sales,Senior,Master,5,0.95,1,1,High Potential / High Performance,90000,6,2,2,5,95,4.5,4,2,1,9,0",
    "2,200,Sales,Senior,Bachelor,5,0.95,1,1,High Potential / High Performance,88000,5,2,1,5,92,4.4,3,1,1,8,0",
    "3,100,Sales,Lead,Master,5,0.70,0,1,High Potential / High Performance,99000,9,4,3,6,90,4.1,5,3,0,12,0",
    "4,200,Sales,Junior,PhD,5,0.70,1,1,High Potential / High Performance,61000,2,1,0,4,88,4.0,2,0,1,4,0",
    "5,100,Sales,Junior,Bachelor,3,0.50,0,1,Moderate Potential / Moderate Performance,52000,3,2,0,4,70,3.2,2,0,0,3,0",
    "6,200,Engineering,Mid,Bachelor,2,0.20,0,0,Low Potential / Low Performance,70000,4,3,0,5,55,2.8,1,0,0,2,1",
    "7,100,Engineering,Senior,Master,4,0.40,0,0,Moderate Potential / High Performance,82000,7,3,1,5,80,3.9,3,1,0,7,0",
    "8,200,Engineering,Junior,Bachelor,1,0.10,0,0,Low Potential / Low Performance,48000,1,1,0,3,40,2.1,0,0,0,1,1",
    "9,100,Engineering,Mid,PhD,3,0.60,1,1,Moderate Potential / Moderate Performance,75000,5,2,1,4,72,3.4,4,2,1,5,0",
    "10,200,Engineering,Lead,Master,5,0.30,0,0,Low Potential / High Performance,105000,11,5,2,6,85,4.2,2,1,1,10,0",
];

const STARS: BoxCategory = BoxCategory::new(Tier::High, Tier::High);

fn write_table(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("final_data.csv");
    let body = format!("{HEADER}\n{}\n", ROWS.join("\n"));
    std::fs::write(&path, body).unwrap();
    path
}

fn loaded_state(dir: &TempDir) -> AppState {
    let mut state = AppState::new(LoadOptions::default());
    state.load(&write_table(dir));
    assert!(!state.load_failed, "status: {:?}", state.status);
    state
}

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn potential_filter_shrinks_the_star_box() {
    let dir = TempDir::new().unwrap();
    let mut state = loaded_state(&dir);

    let snapshot = state.snapshot.as_ref().unwrap();
    assert_eq!(snapshot.grid.cell(STARS).count, 4);
    assert_eq!(snapshot.grid.cell(STARS).percentage, 40);

    state.criteria.potential = Some(PotentialRange { min: 0.0, max: 0.9 });
    state.refilter();

    let snapshot = state.snapshot.as_ref().unwrap();
    assert_eq!(snapshot.metrics.total, 8);
    assert_eq!(snapshot.grid.cell(STARS).count, 2);
    assert_eq!(snapshot.grid.cell(STARS).percentage, 25);
    assert_eq!(snapshot.metrics.stars, 2);
    assert!((snapshot.metrics.total_share - 80.0).abs() < 1e-9);
}

#[test]
fn unmatched_department_leaves_nothing_to_draw() {
    let dir = TempDir::new().unwrap();
    let mut state = loaded_state(&dir);

    state.criteria.department = Selection::Only("Marketing".into());
    state.refilter();

    let snapshot = state.snapshot.as_ref().unwrap();
    assert!(!snapshot.has_data());
    assert_eq!(snapshot.metrics.total, 0);
    assert_eq!(snapshot.metrics.promoted_share, 0.0);
    assert!(snapshot.grid.iter().all(|c| c.count == 0 && c.percentage == 0));
    assert!(snapshot.bars.bars.is_empty());
    assert!(snapshot.salary.is_none());
    assert_eq!(snapshot.summary.len(), 9);
    assert!(state.view().unwrap().is_empty());
}

#[test]
fn employee_and_manager_ids_intersect() {
    let dir = TempDir::new().unwrap();
    let mut state = loaded_state(&dir);

    state.criteria.employee_ids = ids(&["1", "2", "3"]);
    state.criteria.manager_ids = ids(&["200"]);
    state.refilter();

    let view = state.view().unwrap();
    let kept: Vec<&str> = view.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(kept, ["2"]);
}

#[test]
fn reset_restores_the_full_table() {
    let dir = TempDir::new().unwrap();
    let mut state = loaded_state(&dir);

    state.criteria.role_level = Selection::Only("Lead".into());
    state.refilter();
    assert_eq!(state.visible_indices, [2, 9]);

    state.reset_filters();
    assert_eq!(state.visible_indices.len(), 10);
    assert_eq!(state.criteria.potential, Some(PotentialRange { min: 0.10, max: 0.95 }));
}

#[test]
fn missing_file_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let mut state = AppState::new(LoadOptions::default());
    state.load(&dir.path().join("final_data.csv"));

    assert!(state.load_failed);
    assert!(state.table.is_none());
    match &state.status {
        Some(StatusLine::Error(text)) => assert!(text.starts_with("Data file not found")),
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn reload_picks_up_edits() {
    let dir = TempDir::new().unwrap();
    let mut state = loaded_state(&dir);

    let path = dir.path().join("final_data.csv");
    std::fs::write(&path, format!("{HEADER}\n{}\n", ROWS[..3].join("\n"))).unwrap();
    state.reload();

    assert_eq!(state.table.as_ref().unwrap().len(), 3);
    assert_eq!(state.snapshot.as_ref().unwrap().grid.cell(STARS).count, 3);
}

#[test]
fn filtered_export_reads_back() {
    let dir = TempDir::new().unwrap();
    let mut state = loaded_state(&dir);

    state.criteria.department = Selection::Only("Sales".into());
    state.refilter();
    let view = state.view().unwrap();

    let name = filtered_export_name(&state.criteria.department, &state.criteria.role_level);
    assert_eq!(name, "9box_filtered_data_Sales_All.csv");
    let out = dir.path().join(&name);
    std::fs::write(&out, filtered_csv(&view).unwrap()).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 22);
    assert_eq!(&headers[0], "Employee ID");
    let category_col = headers.iter().position(|h| h == "9-Box Category").unwrap();

    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 5);
    let titles: Vec<&str> = DISPLAY_COLUMNS.iter().map(|&(_, title)| title).collect();
    assert_eq!(headers.iter().collect::<Vec<_>>(), titles);
    for (exported, rec) in records.iter().zip(view.iter()) {
        let expected = display_row(rec);
        let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
        assert_eq!(exported.iter().collect::<Vec<_>>(), expected);
    }
    let exported_ids: Vec<&str> = records.iter().map(|r| &r[0]).collect();
    assert_eq!(exported_ids, ["1", "2", "3", "4", "5"]);
    assert_eq!(&records[0][1], "Yes");
    assert_eq!(&records[2][1], "No");
    assert_eq!(&records[4][category_col], "Moderate Potential / Moderate Performance");
}

#[test]
fn export_name_with_separator_stays_in_the_directory() {
    let dir = TempDir::new().unwrap();
    let mut state = loaded_state(&dir);

    state.criteria.department = Selection::Only("Sales/Marketing".into());
    state.refilter();

    let name = filtered_export_name(&state.criteria.department, &state.criteria.role_level);
    let out = dir.path().join(&name);
    std::fs::write(&out, filtered_csv(&state.view().unwrap()).unwrap()).unwrap();
    assert_eq!(out.parent(), Some(dir.path()));
    assert!(out.is_file());
}

#[test]
fn summary_export_reads_back() {
    let dir = TempDir::new().unwrap();
    let state = loaded_state(&dir);

    let snapshot = state.snapshot.as_ref().unwrap();
    let out = dir.path().join(SUMMARY_EXPORT_NAME);
    std::fs::write(&out, summary_csv(&snapshot.summary).unwrap()).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 9);

    let star_row = records
        .iter()
        .find(|r| &r[0] == "High Potential / High Performance")
        .unwrap();
    assert_eq!(&star_row[1], "4");
    assert_eq!(&star_row[2], "3");
    let avg_potential: f64 = star_row[3].parse().unwrap();
    assert!((avg_potential - 0.825).abs() < 1e-9);
    assert_eq!(&star_row[4], "5");

    let empty_row = records
        .iter()
        .find(|r| &r[0] == "High Potential / Low Performance")
        .unwrap();
    assert_eq!(&empty_row[1], "0");
    assert_eq!(&empty_row[3], "");
    assert_eq!(&empty_row[4], "");
}

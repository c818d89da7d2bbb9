use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Deserializer};

use crate::config::Thresholds;
use crate::error::LoadError;

use super::classify::bucket;
use super::model::{BoxCategory, EmployeeRecord, EmployeeTable};

/// Settings that affect how rows are turned into [`EmployeeRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub thresholds: Thresholds,
    /// Ignore `box_category` and derive every label from the scores.
    pub recompute_categories: bool,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an employee table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one employee per line (the default export format)
/// * `.json`    – `[{ "employee_id": 1, "potential": 0.42, ... }, ...]`
/// * `.parquet` – one column per field, as written by `df.to_parquet()`
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<EmployeeTable, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::DataNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    }
    .map_err(|reason| LoadError::Malformed {
        path: path.to_path_buf(),
        reason,
    })?;

    let table = EmployeeTable::from_records(resolve_rows(rows, options));
    log::info!("Loaded {} employees from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Raw rows – schema as stored in the source file
// ---------------------------------------------------------------------------

/// One source row before its box category is resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEmployeeRow {
    #[serde(deserialize_with = "text_or_number")]
    pub employee_id: String,
    #[serde(deserialize_with = "text_or_number")]
    pub manager_id: String,
    pub department: String,
    pub role_level: String,
    pub education_level: String,
    pub performance_rating: f64,
    pub potential: f64,
    #[serde(deserialize_with = "flag")]
    pub promoted: bool,
    #[serde(deserialize_with = "flag")]
    pub prediction_promoted: bool,
    #[serde(default)]
    pub box_category: Option<String>,
    pub salary: f64,
    pub years_in_company: f64,
    pub years_in_role: f64,
    pub awards: f64,
    pub kpis_count: f64,
    pub kpis_achieved_pct: f64,
    pub peer_review_score: f64,
    pub training_courses_completed: f64,
    pub certification_count: f64,
    pub mentorship_participation: f64,
    pub projects_delivered: f64,
    pub performance_intervention: f64,
}

/// Turn raw rows into records, trusting `box_category` when it is a known label.
fn resolve_rows(rows: Vec<RawEmployeeRow>, options: &LoadOptions) -> Vec<EmployeeRecord> {
    if options.recompute_categories {
        log::info!("Recomputing 9-box categories for {} rows from thresholds", rows.len());
    }

    rows.into_iter()
        .map(|raw| {
            let derived = || bucket(raw.potential, raw.performance_rating, &options.thresholds);
            let box_category = if options.recompute_categories {
                derived()
            } else {
                match raw.box_category.as_deref().map(str::trim) {
                    Some(label) if !label.is_empty() => {
                        label.parse::<BoxCategory>().unwrap_or_else(|e| {
                            log::warn!("Employee {}: {e}, deriving from scores", raw.employee_id);
                            derived()
                        })
                    }
                    _ => {
                        log::warn!(
                            "Employee {}: no box_category, deriving from scores",
                            raw.employee_id
                        );
                        derived()
                    }
                }
            };

            EmployeeRecord {
                employee_id: raw.employee_id,
                manager_id: raw.manager_id,
                department: raw.department,
                role_level: raw.role_level,
                education_level: raw.education_level,
                performance_rating: raw.performance_rating,
                potential: raw.potential,
                promoted: raw.promoted,
                prediction_promoted: raw.prediction_promoted,
                box_category,
                salary: raw.salary,
                years_in_company: raw.years_in_company,
                years_in_role: raw.years_in_role,
                awards: raw.awards,
                kpis_count: raw.kpis_count,
                kpis_achieved_pct: raw.kpis_achieved_pct,
                peer_review_score: raw.peer_review_score,
                training_courses_completed: raw.training_courses_completed,
                certification_count: raw.certification_count,
                mentorship_participation: raw.mentorship_participation,
                projects_delivered: raw.projects_delivered,
                performance_intervention: raw.performance_intervention,
            }
        })
        .collect()
}

// -- Lenient field decoders (pandas writes 0/1, JSON may carry numbers) --

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn text_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(de)? {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Scalar::Float(f) => f.to_string(),
        Scalar::Text(s) => s,
    })
}

fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let parsed = match Scalar::deserialize(de)? {
        Scalar::Bool(b) => Some(b),
        Scalar::Int(i) => Some(i != 0),
        Scalar::Float(f) => Some(f != 0.0),
        Scalar::Text(s) => parse_flag_text(&s),
    };
    parsed.ok_or_else(|| serde::de::Error::custom("expected 0/1, true/false or yes/no"))
}

fn parse_flag_text(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the column names listed in [`RawEmployeeRow`].
/// Extra columns are ignored; column order does not matter.
fn load_csv(path: &Path) -> Result<Vec<RawEmployeeRow>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let mut rows = Vec::new();

    for (row_no, result) in reader.deserialize::<RawEmployeeRow>().enumerate() {
        let row = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
fn load_json(path: &Path) -> Result<Vec<RawEmployeeRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: serde_json::Value = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            RawEmployeeRow::deserialize(rec).with_context(|| format!("Row {i} is not a valid employee"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per employee field.
///
/// Numeric columns may be any integer or float width, flags may be boolean
/// or integer, identifiers may be integer or string. Works with files written
/// by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Vec<RawEmployeeRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        rows.extend(batch_rows(&batch)?);
    }
    Ok(rows)
}

fn batch_rows(batch: &RecordBatch) -> Result<Vec<RawEmployeeRow>> {
    let employee_id = text_column(batch, "employee_id")?;
    let manager_id = text_column(batch, "manager_id")?;
    let department = text_column(batch, "department")?;
    let role_level = text_column(batch, "role_level")?;
    let education_level = text_column(batch, "education_level")?;
    let box_category = optional_text_column(batch, "box_category")?;
    let num = |name: &str| float_column(batch, name);
    let performance_rating = num("performance_rating")?;
    let potential = num("potential")?;
    let promoted = num("promoted")?;
    let prediction_promoted = num("prediction_promoted")?;
    let salary = num("salary")?;
    let years_in_company = num("years_in_company")?;
    let years_in_role = num("years_in_role")?;
    let awards = num("awards")?;
    let kpis_count = num("kpis_count")?;
    let kpis_achieved_pct = num("kpis_achieved_pct")?;
    let peer_review_score = num("peer_review_score")?;
    let training_courses_completed = num("training_courses_completed")?;
    let certification_count = num("certification_count")?;
    let mentorship_participation = num("mentorship_participation")?;
    let projects_delivered = num("projects_delivered")?;
    let performance_intervention = num("performance_intervention")?;

    Ok((0..batch.num_rows())
        .map(|i| RawEmployeeRow {
            employee_id: employee_id[i].clone(),
            manager_id: manager_id[i].clone(),
            department: department[i].clone(),
            role_level: role_level[i].clone(),
            education_level: education_level[i].clone(),
            performance_rating: performance_rating[i],
            potential: potential[i],
            promoted: promoted[i] != 0.0,
            prediction_promoted: prediction_promoted[i] != 0.0,
            box_category: box_category.as_ref().and_then(|c| c[i].clone()),
            salary: salary[i],
            years_in_company: years_in_company[i],
            years_in_role: years_in_role[i],
            awards: awards[i],
            kpis_count: kpis_count[i],
            kpis_achieved_pct: kpis_achieved_pct[i],
            peer_review_score: peer_review_score[i],
            training_courses_completed: training_courses_completed[i],
            certification_count: certification_count[i],
            mentorship_participation: mentorship_participation[i],
            projects_delivered: projects_delivered[i],
            performance_intervention: performance_intervention[i],
        })
        .collect())
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Parquet file missing '{name}' column"))
}

/// Read a column as `f64`, casting integer and boolean types. Nulls are rejected.
fn float_column(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let col = column(batch, name)?;
    if col.null_count() > 0 {
        bail!("column '{name}' contains null values");
    }
    let casted = cast(col.as_ref(), &DataType::Float64)
        .with_context(|| format!("column '{name}' is {:?}, expected a number", col.data_type()))?;
    Ok(casted.as_primitive::<Float64Type>().values().to_vec())
}

/// Read a column as text, casting numeric identifiers. Nulls are kept as `None`.
fn strings(col: &ArrayRef, name: &str) -> Result<Vec<Option<String>>> {
    let casted = cast(col.as_ref(), &DataType::Utf8)
        .with_context(|| format!("column '{name}' is {:?}, expected text", col.data_type()))?;
    let arr = casted.as_string::<i32>();
    Ok((0..arr.len())
        .map(|i| (!arr.is_null(i)).then(|| arr.value(i).to_string()))
        .collect())
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<Vec<String>> {
    strings(column(batch, name)?, name)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.with_context(|| format!("Row {i}: null value in '{name}'")))
        .collect()
}

fn optional_text_column(batch: &RecordBatch, name: &str) -> Result<Option<Vec<Option<String>>>> {
    match batch.column_by_name(name) {
        Some(col) => Ok(Some(strings(col, name)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Tier;

    const HEADER: &str = "employee_id,manager_id,department,role_level,education_level,\
performance_rating,potential,promoted,prediction_promoted,box_category,salary,\
years_in_company,years_in_role,awards,kpis_count,kpis_achieved_pct,peer_review_score,\
training_courses_completed,certification_count,mentorship_participation,\
projects_delivered,performance_intervention";

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_is_data_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("final_data.csv"), &LoadOptions::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.xlsx", "");
        assert!(matches!(
            load_file(&path, &LoadOptions::default()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn csv_rows_keep_their_precomputed_label() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n\
             17,3,Sales,Senior,Master,2,0.9,1,0,High Potential / High Performance,70000,5,2,1,4,80,4.2,3,1,1,6,0\n"
        );
        let path = write(&dir, "final_data.csv", &body);
        let table = load_file(&path, &LoadOptions::default()).unwrap();

        let rec = &table.records[0];
        assert_eq!(rec.employee_id, "17");
        assert!(rec.promoted);
        assert!(!rec.prediction_promoted);
        // Label wins even though the scores would bucket differently.
        assert_eq!(rec.box_category, BoxCategory::new(Tier::High, Tier::High));
    }

    #[test]
    fn blank_or_unknown_labels_fall_back_to_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n\
             1,3,Sales,Senior,Master,2,0.9,0,0,,1,1,1,1,1,1,1,1,1,1,1,1\n\
             2,3,Sales,Senior,Master,5,0.1,0,0,Superstar,1,1,1,1,1,1,1,1,1,1,1,1\n"
        );
        let path = write(&dir, "final_data.csv", &body);
        let table = load_file(&path, &LoadOptions::default()).unwrap();

        assert_eq!(table.records[0].box_category, BoxCategory::new(Tier::High, Tier::Low));
        assert_eq!(table.records[1].box_category, BoxCategory::new(Tier::Low, Tier::High));
    }

    #[test]
    fn recompute_mode_overrides_labels() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n\
             1,3,Sales,Senior,Master,1,0.1,0,0,High Potential / High Performance,1,1,1,1,1,1,1,1,1,1,1,1\n"
        );
        let path = write(&dir, "final_data.csv", &body);
        let options = LoadOptions {
            recompute_categories: true,
            ..LoadOptions::default()
        };
        let table = load_file(&path, &options).unwrap();
        assert_eq!(table.records[0].box_category, BoxCategory::new(Tier::Low, Tier::Low));
    }

    #[test]
    fn malformed_csv_reports_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n\
             1,3,Sales,Senior,Master,not-a-number,0.1,0,0,,1,1,1,1,1,1,1,1,1,1,1,1\n"
        );
        let path = write(&dir, "final_data.csv", &body);
        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
        assert!(err.to_string().contains("CSV row 1"));
    }

    #[test]
    fn json_accepts_numeric_ids_and_boolean_flags() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"[{
            "employee_id": 42, "manager_id": "M-1", "department": "IT",
            "role_level": "Junior", "education_level": "Bachelor",
            "performance_rating": 4, "potential": 0.5,
            "promoted": true, "prediction_promoted": 1,
            "box_category": "Moderate Potential / High Performance",
            "salary": 40000, "years_in_company": 2, "years_in_role": 1,
            "awards": 0, "kpis_count": 3, "kpis_achieved_pct": 66.6,
            "peer_review_score": 3.9, "training_courses_completed": 1,
            "certification_count": 0, "mentorship_participation": 1,
            "projects_delivered": 2, "performance_intervention": 0
        }]"#;
        let path = write(&dir, "final_data.json", body);
        let table = load_file(&path, &LoadOptions::default()).unwrap();

        let rec = &table.records[0];
        assert_eq!(rec.employee_id, "42");
        assert_eq!(rec.manager_id, "M-1");
        assert!(rec.promoted && rec.prediction_promoted);
        assert_eq!(table.potential_bounds, Some((0.5, 0.5)));
    }

    #[test]
    fn flag_text_accepts_yes_no() {
        assert_eq!(parse_flag_text("Yes"), Some(true));
        assert_eq!(parse_flag_text(" no "), Some(false));
        assert_eq!(parse_flag_text("maybe"), None);
    }
}

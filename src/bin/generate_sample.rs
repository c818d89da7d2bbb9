use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use ninebox_dashboard::config::Thresholds;
use ninebox_dashboard::data::classify::bucket;

/// Write a synthetic scored employee table for trying out the dashboard.
#[derive(Parser)]
#[command(name = "generate-sample")]
struct Args {
    /// Output file; a .parquet extension writes Parquet, anything else CSV
    #[arg(long, default_value = "final_data.csv")]
    out: PathBuf,
    #[arg(long, default_value_t = 500)]
    rows: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const DEPARTMENTS: [&str; 5] = ["Sales", "Engineering", "Finance", "Operations", "HR"];
const ROLE_LEVELS: [&str; 4] = ["Junior", "Mid", "Senior", "Lead"];
const EDUCATION_LEVELS: [&str; 4] = ["High School", "Bachelor", "Master", "PhD"];
const MANAGERS: u64 = 40;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[derive(Debug, Serialize)]
struct SampleRow {
    employee_id: i64,
    manager_id: i64,
    department: String,
    role_level: String,
    education_level: String,
    performance_rating: f64,
    potential: f64,
    promoted: i64,
    prediction_promoted: i64,
    box_category: String,
    salary: f64,
    years_in_company: f64,
    years_in_role: f64,
    awards: f64,
    kpis_count: f64,
    kpis_achieved_pct: f64,
    peer_review_score: f64,
    training_courses_completed: f64,
    certification_count: f64,
    mentorship_participation: f64,
    projects_delivered: f64,
    performance_intervention: f64,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn generate(rows: usize, seed: u64, thresholds: &Thresholds) -> Vec<SampleRow> {
    let mut rng = SimpleRng::new(seed);

    (0..rows)
        .map(|i| {
            let role_level = rng.pick(&ROLE_LEVELS);
            let seniority = ROLE_LEVELS.iter().position(|r| *r == role_level).unwrap_or(0) as f64;

            let performance_rating = rng.gauss(3.2, 1.0).round().clamp(1.0, 5.0);
            let years_in_company = round2(rng.gauss(4.0 + 2.0 * seniority, 2.0).max(0.5));
            let years_in_role = round2((years_in_company * rng.next_f64()).max(0.25));
            let awards = rng.below(4) as f64;
            let kpis_count = (3 + rng.below(6)) as f64;
            let kpis_achieved_pct =
                round2((40.0 + 12.0 * performance_rating + rng.gauss(0.0, 8.0)).clamp(0.0, 100.0));
            let peer_review_score =
                round2(rng.gauss(3.0 + 0.3 * (performance_rating - 3.0), 0.6).clamp(1.0, 5.0));
            let training_courses_completed = rng.below(10) as f64;
            let certification_count = rng.below(5) as f64;
            let mentorship_participation = f64::from(u8::from(rng.chance(0.35)));
            let projects_delivered = (1 + rng.below(12)) as f64;
            let performance_intervention =
                f64::from(u8::from(performance_rating <= 2.0 && rng.chance(0.5)));
            let salary = (45_000.0 + 18_000.0 * seniority + rng.gauss(0.0, 7_500.0))
                .max(30_000.0)
                .round();

            // Stand-in for the promotion model's score.
            let logit = 0.9 * (performance_rating - 3.0)
                + 0.25 * awards
                + 0.02 * (kpis_achieved_pct - 70.0)
                + 0.4 * mentorship_participation
                - 0.15 * years_in_role
                + rng.gauss(0.0, 0.6);
            let potential = round2(sigmoid(logit));
            let promoted = rng.chance(potential * 0.8);
            let prediction_promoted = potential >= 0.5;

            let category = bucket(potential, performance_rating, thresholds);

            SampleRow {
                employee_id: 1000 + i as i64,
                manager_id: 1 + rng.below(MANAGERS) as i64,
                department: rng.pick(&DEPARTMENTS).to_string(),
                role_level: role_level.to_string(),
                education_level: rng.pick(&EDUCATION_LEVELS).to_string(),
                performance_rating,
                potential,
                promoted: i64::from(promoted),
                prediction_promoted: i64::from(prediction_promoted),
                box_category: category.to_string(),
                salary,
                years_in_company,
                years_in_role,
                awards,
                kpis_count,
                kpis_achieved_pct,
                peer_review_score,
                training_courses_completed,
                certification_count,
                mentorship_participation,
                projects_delivered,
                performance_intervention,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let text = |f: fn(&SampleRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let float = |f: fn(&SampleRow) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: fn(&SampleRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let flag = |f: fn(&SampleRow) -> i64| -> ArrayRef {
        Arc::new(BooleanArray::from(rows.iter().map(|r| f(r) != 0).collect::<Vec<_>>()))
    };

    let columns: Vec<(&str, DataType, ArrayRef)> = vec![
        ("employee_id", DataType::Int64, int(|r| r.employee_id)),
        ("manager_id", DataType::Int64, int(|r| r.manager_id)),
        ("department", DataType::Utf8, text(|r| r.department.as_str())),
        ("role_level", DataType::Utf8, text(|r| r.role_level.as_str())),
        ("education_level", DataType::Utf8, text(|r| r.education_level.as_str())),
        ("performance_rating", DataType::Float64, float(|r| r.performance_rating)),
        ("potential", DataType::Float64, float(|r| r.potential)),
        ("promoted", DataType::Boolean, flag(|r| r.promoted)),
        ("prediction_promoted", DataType::Boolean, flag(|r| r.prediction_promoted)),
        ("box_category", DataType::Utf8, text(|r| r.box_category.as_str())),
        ("salary", DataType::Float64, float(|r| r.salary)),
        ("years_in_company", DataType::Float64, float(|r| r.years_in_company)),
        ("years_in_role", DataType::Float64, float(|r| r.years_in_role)),
        ("awards", DataType::Float64, float(|r| r.awards)),
        ("kpis_count", DataType::Float64, float(|r| r.kpis_count)),
        ("kpis_achieved_pct", DataType::Float64, float(|r| r.kpis_achieved_pct)),
        ("peer_review_score", DataType::Float64, float(|r| r.peer_review_score)),
        ("training_courses_completed", DataType::Float64, float(|r| r.training_courses_completed)),
        ("certification_count", DataType::Float64, float(|r| r.certification_count)),
        ("mentorship_participation", DataType::Float64, float(|r| r.mentorship_participation)),
        ("projects_delivered", DataType::Float64, float(|r| r.projects_delivered)),
        ("performance_intervention", DataType::Float64, float(|r| r.performance_intervention)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, ty, _)| Field::new(*name, ty.clone(), false))
            .collect::<Vec<_>>(),
    ));
    let arrays = columns.into_iter().map(|(_, _, array)| array).collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = generate(args.rows, args.seed, &Thresholds::default());

    let is_parquet = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&args.out, &rows)?;
    } else {
        write_csv(&args.out, &rows)?;
    }

    log::info!("seed {} produced {} rows", args.seed, rows.len());
    println!("Wrote {} employees to {}", rows.len(), args.out.display());
    Ok(())
}

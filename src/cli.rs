use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::{Args, Parser, Subcommand, ValueEnum};

use ninebox_dashboard::data::aggregate::{summarize, Distribution, Grid, HeadlineMetrics};
use ninebox_dashboard::data::filter::{
    apply, FilterCriteria, PotentialRange, PromotionStatus, Selection,
};
use ninebox_dashboard::data::loader::{load_file, LoadOptions};
use ninebox_dashboard::data::model::{BoxCategory, EmployeeTable, Tier};
use ninebox_dashboard::present::{
    filtered_csv, filtered_export_name, summary_batch, summary_csv, thousands, BarSeries,
    SUMMARY_EXPORT_NAME,
};

#[derive(Parser)]
#[command(name = "ninebox-dashboard")]
#[command(about = "9-box talent classification dashboard for promotion model outputs", long_about = None)]
pub struct Cli {
    /// Employee table (.csv, .json or .parquet); overrides the config file
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// TOML config file (default: ./ninebox.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Without a subcommand the desktop dashboard opens
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print headline metrics, the 9-box grid and per-category statistics
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write the filtered employees and the summary statistics as CSV files
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum StatusArg {
    #[default]
    All,
    Promoted,
    NotPromoted,
}

impl From<StatusArg> for PromotionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => PromotionStatus::All,
            StatusArg::Promoted => PromotionStatus::Promoted,
            StatusArg::NotPromoted => PromotionStatus::NotPromoted,
        }
    }
}

/// Same selectors as the dashboard side panel.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Actual promotion outcome
    #[arg(long, value_enum, default_value_t = StatusArg::All)]
    pub status: StatusArg,
    /// Lowest potential score kept (inclusive)
    #[arg(long)]
    pub potential_min: Option<f64>,
    /// Highest potential score kept (inclusive)
    #[arg(long)]
    pub potential_max: Option<f64>,
    /// 9-box label, e.g. "High Potential / High Performance" (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<BoxCategory>,
    /// Employee id (repeatable)
    #[arg(long = "employee-id")]
    pub employee_ids: Vec<String>,
    /// Manager id (repeatable)
    #[arg(long = "manager-id")]
    pub manager_ids: Vec<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub education: Option<String>,
}

impl FilterArgs {
    /// Build criteria; a single potential bound is completed from the table.
    pub fn into_criteria(self, table: &EmployeeTable) -> FilterCriteria {
        let potential = match (self.potential_min, self.potential_max) {
            (None, None) => None,
            (min, max) => {
                let (lo, hi) = table
                    .potential_bounds
                    .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
                Some(PotentialRange {
                    min: min.unwrap_or(lo),
                    max: max.unwrap_or(hi),
                })
            }
        };

        FilterCriteria {
            promotion: self.status.into(),
            potential,
            categories: self.categories.into_iter().collect(),
            employee_ids: self.employee_ids.into_iter().collect(),
            manager_ids: self.manager_ids.into_iter().collect(),
            department: Selection::from_value(self.department.as_deref()),
            role_level: Selection::from_value(self.role.as_deref()),
            education_level: Selection::from_value(self.education.as_deref()),
        }
    }
}

fn load(path: &Path, options: &LoadOptions) -> Result<EmployeeTable> {
    load_file(path, options).with_context(|| format!("cannot open {}", path.display()))
}

/// `summary` subcommand.
pub fn summary(path: &Path, options: &LoadOptions, filters: FilterArgs) -> Result<()> {
    let table = load(path, options)?;
    let criteria = filters.into_criteria(&table);
    let view = apply(&table, &criteria);

    let m = HeadlineMetrics::compute(&view);
    println!("Total Employees        {:>8}   {:.1}% of Eligible EEs", thousands(m.total), m.total_share);
    println!("Actually Promoted      {:>8}   {:.1}% of Selected EEs", thousands(m.promoted), m.promoted_share);
    println!("High Potential Talent  {:>8}   {:.1}% of Selected EEs", thousands(m.high_potential), m.high_potential_share);
    println!("Stars (High/High)      {:>8}   {:.1}% of Selected EEs", thousands(m.stars), m.stars_share);

    if view.is_empty() {
        println!();
        println!("No employees match the current filters.");
        return Ok(());
    }

    println!();
    println!("9-Box Grid (rows: potential, columns: performance rating)");
    let grid = Grid::from_view(&view);
    print!("{:<20}", "");
    for perf in Tier::ALL {
        print!("{:>16}", format!("{perf} Rating"));
    }
    println!();
    for pot in Tier::ALL.into_iter().rev() {
        print!("{:<20}", format!("{pot} Potential"));
        for perf in Tier::ALL {
            let cell = grid.cell(BoxCategory::new(pot, perf));
            print!("{:>16}", format!("{} ({}%)", thousands(cell.count), cell.percentage));
        }
        println!();
    }

    println!();
    println!("9-Box Category Distribution");
    for bar in BarSeries::from_distribution(&Distribution::from_view(&view)).bars {
        println!("{:<44}{:>8}   {}", bar.category.to_string(), thousands(bar.count), bar.legend);
    }

    println!();
    println!("Summary Statistics");
    let batch = summary_batch(&summarize(&view))?;
    println!("{}", pretty_format_batches(&[batch]).context("formatting summary table")?);
    Ok(())
}

/// `export` subcommand: the two CSV payloads the dashboard offers for download.
pub fn export(path: &Path, options: &LoadOptions, filters: FilterArgs, out_dir: &Path) -> Result<()> {
    let table = load(path, options)?;
    let criteria = filters.into_criteria(&table);
    let view = apply(&table, &criteria);

    if view.is_empty() {
        log::warn!("Filters match no employees; nothing exported");
        println!("No employees match the current filters.");
        return Ok(());
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let filtered_path = out_dir.join(filtered_export_name(&criteria.department, &criteria.role_level));
    std::fs::write(&filtered_path, filtered_csv(&view)?)
        .with_context(|| format!("writing {}", filtered_path.display()))?;

    let summary_path = out_dir.join(SUMMARY_EXPORT_NAME);
    std::fs::write(&summary_path, summary_csv(&summarize(&view))?)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    log::info!("Exported {} employees to {}", view.len(), out_dir.display());
    println!("Wrote {}", filtered_path.display());
    println!("Wrote {}", summary_path.display());
    Ok(())
}

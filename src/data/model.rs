use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Tier – one discretisation bucket of a score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Low,
    Moderate,
    High,
}

impl Tier {
    /// Ascending order; doubles as the grid axis order.
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Moderate, Tier::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "Low",
            Tier::Moderate => "Moderate",
            Tier::High => "High",
        }
    }

    /// Position on a grid axis (Low = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    fn parse(s: &str) -> Option<Tier> {
        match s.trim() {
            "Low" => Some(Tier::Low),
            "Moderate" => Some(Tier::Moderate),
            "High" => Some(Tier::High),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BoxCategory – one of the nine (potential, performance) cells
// ---------------------------------------------------------------------------

/// A 9-box cell. Ordering is potential-major, then performance, both ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoxCategory {
    pub potential: Tier,
    pub performance: Tier,
}

impl BoxCategory {
    pub const fn new(potential: Tier, performance: Tier) -> Self {
        Self {
            potential,
            performance,
        }
    }

    /// All nine categories in canonical order (Low/Low … High/High).
    pub fn all() -> impl Iterator<Item = BoxCategory> {
        Tier::ALL.into_iter().flat_map(|potential| {
            Tier::ALL
                .into_iter()
                .map(move |performance| BoxCategory::new(potential, performance))
        })
    }

    /// Index into a flat array of nine cells, matching [`BoxCategory::all`].
    pub fn index(self) -> usize {
        self.potential.index() * 3 + self.performance.index()
    }

    pub fn is_star(self) -> bool {
        self.potential == Tier::High && self.performance == Tier::High
    }
}

impl fmt::Display for BoxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Potential / {} Performance",
            self.potential, self.performance
        )
    }
}

/// Returned when a label is not one of the nine canonical categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown 9-box category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for BoxCategory {
    type Err = UnknownCategory;

    /// Parse `"<Tier> Potential / <Tier> Performance"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCategory(s.to_string());
        let (pot, perf) = s.split_once('/').ok_or_else(unknown)?;
        let potential = pot
            .trim()
            .strip_suffix("Potential")
            .and_then(Tier::parse)
            .ok_or_else(unknown)?;
        let performance = perf
            .trim()
            .strip_suffix("Performance")
            .and_then(Tier::parse)
            .ok_or_else(unknown)?;
        Ok(BoxCategory::new(potential, performance))
    }
}

// ---------------------------------------------------------------------------
// EmployeeRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single scored employee. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub manager_id: String,
    pub department: String,
    pub role_level: String,
    pub education_level: String,
    /// Ordinal rating, typically 1–5.
    pub performance_rating: f64,
    /// Model-derived promotion probability.
    pub potential: f64,
    /// Actual outcome.
    pub promoted: bool,
    /// Model outcome.
    pub prediction_promoted: bool,
    pub box_category: BoxCategory,

    // Display-only attributes.
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

// ---------------------------------------------------------------------------
// EmployeeTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed selector options.
#[derive(Debug, Clone, Default)]
pub struct EmployeeTable {
    pub records: Vec<EmployeeRecord>,
    pub departments: BTreeSet<String>,
    pub role_levels: BTreeSet<String>,
    pub education_levels: BTreeSet<String>,
    /// Sorted numerically where ids are numbers.
    pub employee_ids: Vec<String>,
    pub manager_ids: Vec<String>,
    /// Observed `(min, max)` of `potential`; `None` for an empty table.
    pub potential_bounds: Option<(f64, f64)>,
}

impl EmployeeTable {
    /// Build selector indices from the loaded records.
    pub fn from_records(records: Vec<EmployeeRecord>) -> Self {
        let mut departments = BTreeSet::new();
        let mut role_levels = BTreeSet::new();
        let mut education_levels = BTreeSet::new();
        let mut employee_ids = BTreeSet::new();
        let mut manager_ids = BTreeSet::new();
        let mut potential_bounds: Option<(f64, f64)> = None;

        for rec in &records {
            departments.insert(rec.department.clone());
            role_levels.insert(rec.role_level.clone());
            education_levels.insert(rec.education_level.clone());
            employee_ids.insert(rec.employee_id.clone());
            manager_ids.insert(rec.manager_id.clone());
            if rec.potential.is_finite() {
                potential_bounds = Some(match potential_bounds {
                    Some((lo, hi)) => (lo.min(rec.potential), hi.max(rec.potential)),
                    None => (rec.potential, rec.potential),
                });
            }
        }

        EmployeeTable {
            records,
            departments,
            role_levels,
            education_levels,
            employee_ids: sorted_ids(employee_ids),
            manager_ids: sorted_ids(manager_ids),
            potential_bounds,
        }
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Numeric ids first in numeric order, then everything else lexically.
fn sorted_ids(ids: BTreeSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    ids
}

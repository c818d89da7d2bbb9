use std::collections::BTreeSet;

use super::model::{BoxCategory, EmployeeRecord, EmployeeTable};

// ---------------------------------------------------------------------------
// Selector values
// ---------------------------------------------------------------------------

/// Single-select with an "All" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `"All"` (any case) maps to [`Selection::All`].
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            None => Selection::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Selection::All,
            Some(v) => Selection::Only(v.to_string()),
        }
    }

    /// Label for widgets and export file names.
    pub fn label(&self) -> &str {
        match self {
            Selection::All => "All",
            Selection::Only(v) => v,
        }
    }
}

/// Tri-state selector over the actual promotion outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionStatus {
    #[default]
    All,
    Promoted,
    NotPromoted,
}

impl PromotionStatus {
    pub const ALL: [PromotionStatus; 3] = [
        PromotionStatus::All,
        PromotionStatus::Promoted,
        PromotionStatus::NotPromoted,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PromotionStatus::All => "All",
            PromotionStatus::Promoted => "Promoted",
            PromotionStatus::NotPromoted => "Not Promoted",
        }
    }
}

/// Inclusive `[min, max]` interval on `potential`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialRange {
    pub min: f64,
    pub max: f64,
}

/// Half of the 0.01 step the potential sliders display.
pub const POTENTIAL_SNAP: f64 = 0.005;

impl PotentialRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Pin a bound within [`POTENTIAL_SNAP`] of the observed `lo`/`hi` to
    /// that exact edge, so a slider pulled to its end keeps the edge rows.
    pub fn snapped_to(self, lo: f64, hi: f64) -> Self {
        let pin = |v: f64| {
            if (v - lo).abs() <= POTENTIAL_SNAP {
                lo
            } else if (v - hi).abs() <= POTENTIAL_SNAP {
                hi
            } else {
                v
            }
        };
        PotentialRange {
            min: pin(self.min),
            max: pin(self.max),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria – immutable value object, one slot per attribute
// ---------------------------------------------------------------------------

/// Every slot is independent. Inactive slots (`All`, `None`, empty set)
/// contribute no constraint, so `FilterCriteria::default()` keeps every row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub promotion: PromotionStatus,
    pub potential: Option<PotentialRange>,
    pub categories: BTreeSet<BoxCategory>,
    pub employee_ids: BTreeSet<String>,
    pub manager_ids: BTreeSet<String>,
    pub department: Selection,
    pub role_level: Selection,
    pub education_level: Selection,
}

impl FilterCriteria {
    /// Criteria whose potential range spans the table's observed bounds.
    pub fn spanning(table: &EmployeeTable) -> Self {
        FilterCriteria {
            potential: table
                .potential_bounds
                .map(|(min, max)| PotentialRange { min, max }),
            ..FilterCriteria::default()
        }
    }

    /// Expand the active slots into predicates.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = Vec::new();

        if let Selection::Only(v) = &self.department {
            preds.push(Predicate::Department(v.clone()));
        }
        if let Selection::Only(v) = &self.role_level {
            preds.push(Predicate::RoleLevel(v.clone()));
        }
        if let Selection::Only(v) = &self.education_level {
            preds.push(Predicate::EducationLevel(v.clone()));
        }
        match self.promotion {
            PromotionStatus::All => {}
            PromotionStatus::Promoted => preds.push(Predicate::Promoted(true)),
            PromotionStatus::NotPromoted => preds.push(Predicate::Promoted(false)),
        }
        if let Some(range) = self.potential {
            preds.push(Predicate::PotentialWithin(range));
        }
        if !self.employee_ids.is_empty() {
            preds.push(Predicate::EmployeeIdIn(self.employee_ids.clone()));
        }
        if !self.manager_ids.is_empty() {
            preds.push(Predicate::ManagerIdIn(self.manager_ids.clone()));
        }
        if !self.categories.is_empty() {
            preds.push(Predicate::CategoryIn(self.categories.clone()));
        }
        preds
    }
}

// ---------------------------------------------------------------------------
// Predicate – a single row constraint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Department(String),
    RoleLevel(String),
    EducationLevel(String),
    Promoted(bool),
    PotentialWithin(PotentialRange),
    EmployeeIdIn(BTreeSet<String>),
    ManagerIdIn(BTreeSet<String>),
    CategoryIn(BTreeSet<BoxCategory>),
}

impl Predicate {
    pub fn matches(&self, rec: &EmployeeRecord) -> bool {
        match self {
            Predicate::Department(v) => rec.department == *v,
            Predicate::RoleLevel(v) => rec.role_level == *v,
            Predicate::EducationLevel(v) => rec.education_level == *v,
            Predicate::Promoted(flag) => rec.promoted == *flag,
            Predicate::PotentialWithin(range) => range.contains(rec.potential),
            Predicate::EmployeeIdIn(ids) => ids.contains(&rec.employee_id),
            Predicate::ManagerIdIn(ids) => ids.contains(&rec.manager_id),
            Predicate::CategoryIn(cats) => cats.contains(&rec.box_category),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – rows passing every predicate
// ---------------------------------------------------------------------------

/// Borrowed subset of a table, stored as ascending row indices.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a EmployeeTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over every row of `table`.
    pub fn all(table: &'a EmployeeTable) -> Self {
        Self::from_indices(table, (0..table.len()).collect())
    }

    /// Wrap indices computed earlier (e.g. cached in the session state).
    /// Out-of-range indices are dropped.
    pub fn from_indices(table: &'a EmployeeTable, mut indices: Vec<usize>) -> Self {
        indices.retain(|&i| i < table.len());
        FilteredView { table, indices }
    }

    pub fn table(&self) -> &'a EmployeeTable {
        self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EmployeeRecord> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records[i])
    }
}

/// Return the view of rows satisfying all active criteria.
pub fn apply<'a>(table: &'a EmployeeTable, criteria: &FilterCriteria) -> FilteredView<'a> {
    apply_predicates(table, &criteria.predicates())
}

/// AND of `predicates`; an empty slice keeps every row.
pub fn apply_predicates<'a>(table: &'a EmployeeTable, predicates: &[Predicate]) -> FilteredView<'a> {
    let indices = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| predicates.iter().all(|p| p.matches(rec)))
        .map(|(i, _)| i)
        .collect();
    FilteredView { table, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Tier;

    fn rec(id: &str, manager: &str, dept: &str, potential: f64, promoted: bool) -> EmployeeRecord {
        EmployeeRecord {
            employee_id: id.to_string(),
            manager_id: manager.to_string(),
            department: dept.to_string(),
            role_level: "Mid".to_string(),
            education_level: "Bachelor".to_string(),
            performance_rating: 3.0,
            potential,
            promoted,
            prediction_promoted: promoted,
            box_category: BoxCategory::new(Tier::Moderate, Tier::Moderate),
            salary: 50_000.0,
            years_in_company: 3.0,
            years_in_role: 1.0,
            awards: 0.0,
            kpis_count: 4.0,
            kpis_achieved_pct: 75.0,
            peer_review_score: 3.5,
            training_courses_completed: 2.0,
            certification_count: 1.0,
            mentorship_participation: 0.0,
            projects_delivered: 5.0,
            performance_intervention: 0.0,
        }
    }

    fn table() -> EmployeeTable {
        EmployeeTable::from_records(vec![
            rec("1", "100", "Sales", 0.10, false),
            rec("2", "100", "Sales", 0.50, true),
            rec("3", "200", "IT", 0.90, true),
            rec("4", "200", "IT", 0.70, false),
        ])
    }

    #[test]
    fn default_criteria_keep_everything() {
        let t = table();
        assert_eq!(apply(&t, &FilterCriteria::default()).indices(), &[0, 1, 2, 3]);
        assert_eq!(apply(&t, &FilterCriteria::spanning(&t)).len(), 4);
    }

    #[test]
    fn all_sentinel_is_no_constraint() {
        assert_eq!(Selection::from_value(Some("ALL")), Selection::All);
        assert_eq!(Selection::from_value(None), Selection::All);
        assert_eq!(
            Selection::from_value(Some("IT")),
            Selection::Only("IT".to_string())
        );
    }

    #[test]
    fn range_is_inclusive_at_both_ends() {
        let t = table();
        let criteria = FilterCriteria {
            potential: Some(PotentialRange { min: 0.5, max: 0.9 }),
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&t, &criteria).indices(), &[1, 2, 3]);
    }

    #[test]
    fn promotion_status_is_tri_state() {
        let t = table();
        let promoted = FilterCriteria {
            promotion: PromotionStatus::Promoted,
            ..FilterCriteria::default()
        };
        let not_promoted = FilterCriteria {
            promotion: PromotionStatus::NotPromoted,
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&t, &promoted).indices(), &[1, 2]);
        assert_eq!(apply(&t, &not_promoted).indices(), &[0, 3]);
    }

    #[test]
    fn employee_and_manager_ids_are_independent_slots() {
        let t = table();
        let criteria = FilterCriteria {
            employee_ids: ["2", "3"].iter().map(|s| s.to_string()).collect(),
            manager_ids: ["200"].iter().map(|s| s.to_string()).collect(),
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.predicates().len(), 2);
        assert_eq!(apply(&t, &criteria).indices(), &[2]);
    }

    #[test]
    fn unknown_department_yields_empty_view() {
        let t = table();
        let criteria = FilterCriteria {
            department: Selection::Only("Legal".to_string()),
            ..FilterCriteria::default()
        };
        assert!(apply(&t, &criteria).is_empty());
    }

    #[test]
    fn empty_table_stays_empty() {
        let t = EmployeeTable::default();
        let criteria = FilterCriteria {
            department: Selection::Only("IT".to_string()),
            promotion: PromotionStatus::Promoted,
            ..FilterCriteria::spanning(&t)
        };
        assert!(criteria.potential.is_none());
        assert!(apply(&t, &criteria).is_empty());
    }

    #[test]
    fn stale_indices_are_dropped() {
        let t = table();
        let view = FilteredView::from_indices(&t, vec![1, 3, 99]);
        assert_eq!(view.indices(), &[1, 3]);
    }

    #[test]
    fn range_pulled_to_the_edges_keeps_edge_rows() {
        let t = EmployeeTable::from_records(vec![
            rec("1", "100", "Sales", 0.1057, false),
            rec("2", "100", "Sales", 0.9843, true),
        ]);
        let (lo, hi) = t.potential_bounds.unwrap();

        // What a two-decimal slider reports at either end.
        let shown = PotentialRange { min: 0.11, max: 0.98 };
        let criteria = FilterCriteria {
            potential: Some(shown.snapped_to(lo, hi)),
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.potential, Some(PotentialRange { min: lo, max: hi }));
        assert_eq!(apply(&t, &criteria).len(), 2);
    }

    #[test]
    fn snapping_leaves_interior_bounds_alone() {
        let range = PotentialRange { min: 0.3, max: 0.6 }.snapped_to(0.1, 0.9);
        assert_eq!(range, PotentialRange { min: 0.3, max: 0.6 });
    }
}

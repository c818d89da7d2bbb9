use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::aggregate::{
    summarize, Distribution, Grid, HeadlineMetrics, SalarySpread, SummaryRow,
};
use crate::data::filter::{apply, FilterCriteria, FilteredView};
use crate::data::loader::{load_file, LoadOptions};
use crate::data::model::EmployeeTable;
use crate::present::{BarSeries, HeatmapSpec};

// ---------------------------------------------------------------------------
// Derived dashboard content
// ---------------------------------------------------------------------------

/// Everything the central panel draws, derived from one filtered view.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub metrics: HeadlineMetrics,
    pub grid: Grid,
    pub heatmap: HeatmapSpec,
    pub bars: BarSeries,
    pub summary: Vec<SummaryRow>,
    pub salary: Option<SalarySpread>,
}

impl DashboardSnapshot {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let grid = Grid::from_view(view);
        let heatmap = HeatmapSpec::from_grid(&grid);
        DashboardSnapshot {
            metrics: HeadlineMetrics::compute(view),
            bars: BarSeries::from_distribution(&Distribution::from_view(view)),
            summary: summarize(view),
            salary: SalarySpread::from_view(view),
            grid,
            heatmap,
        }
    }

    /// Charts and tables are skipped when nothing matches.
    pub fn has_data(&self) -> bool {
        self.metrics.total > 0
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Message shown in the top bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Info(String),
    Error(String),
}

impl StatusLine {
    pub fn text(&self) -> &str {
        match self {
            StatusLine::Info(t) | StatusLine::Error(t) => t,
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until a file loads successfully). Read-only once set.
    pub table: Option<Arc<EmployeeTable>>,

    /// File the table was read from, kept for Reload.
    pub source: Option<PathBuf>,

    /// Active filter selections.
    pub criteria: FilterCriteria,

    /// Indices of employees passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over `visible_indices`.
    pub snapshot: Option<DashboardSnapshot>,

    pub load_options: LoadOptions,

    /// Status / error message shown in the UI.
    pub status: Option<StatusLine>,

    /// Set when the last load failed; the dashboard renders nothing else.
    pub load_failed: bool,

    /// Search text of the employee-id and manager-id pickers.
    pub employee_search: String,
    pub manager_search: String,
}

impl AppState {
    pub fn new(load_options: LoadOptions) -> Self {
        Self {
            table: None,
            source: None,
            criteria: FilterCriteria::default(),
            visible_indices: Vec::new(),
            snapshot: None,
            load_options,
            status: None,
            load_failed: false,
            employee_search: String::new(),
            manager_search: String::new(),
        }
    }

    /// Read `path`, replacing the current table on success.
    pub fn load(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
        match load_file(path, &self.load_options) {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.table = None;
                self.snapshot = None;
                self.visible_indices.clear();
                self.load_failed = true;
                self.status = Some(StatusLine::Error(if e.is_not_found() {
                    format!(
                        "Data file not found. Please ensure '{}' exists.",
                        path.display()
                    )
                } else {
                    format!("Error: {e}")
                }));
            }
        }
    }

    /// Drop the cached table and read the same file again.
    pub fn reload(&mut self) {
        if let Some(path) = self.source.clone() {
            log::info!("Reloading {}", path.display());
            self.load(&path);
        }
    }

    /// Ingest a newly loaded table and reset filters to span it.
    pub fn set_table(&mut self, table: EmployeeTable) {
        self.criteria = FilterCriteria::spanning(&table);
        self.table = Some(Arc::new(table));
        self.status = None;
        self.load_failed = false;
        self.refilter();
    }

    /// Clear every filter back to "show all".
    pub fn reset_filters(&mut self) {
        let Some(criteria) = self.table.as_deref().map(FilterCriteria::spanning) else {
            return;
        };
        self.criteria = criteria;
        self.refilter();
    }

    /// Recompute the filtered view and all aggregates after a filter change.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let view = apply(table, &self.criteria);
        log::debug!("Filters keep {} of {} employees", view.len(), table.len());
        self.snapshot = Some(DashboardSnapshot::compute(&view));
        self.visible_indices = view.indices().to_vec();
    }

    /// The cached filtered view, if a table is loaded.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        let table = self.table.as_deref()?;
        Some(FilteredView::from_indices(table, self.visible_indices.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Selection;

    #[test]
    fn missing_file_halts_with_a_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(LoadOptions::default());
        state.load(&dir.path().join("final_data.csv"));

        assert!(state.load_failed);
        assert!(state.table.is_none());
        assert!(state.snapshot.is_none());
        assert!(state
            .status
            .as_ref()
            .unwrap()
            .text()
            .starts_with("Data file not found"));
    }

    #[test]
    fn empty_selection_produces_an_empty_snapshot() {
        let mut state = AppState::new(LoadOptions::default());
        state.set_table(EmployeeTable::default());
        state.criteria.department = Selection::Only("Finance".to_string());
        state.refilter();

        let snapshot = state.snapshot.as_ref().unwrap();
        assert!(!snapshot.has_data());
        assert_eq!(snapshot.metrics.total_share, 0.0);
        assert!(snapshot.bars.bars.is_empty());
        assert_eq!(state.view().unwrap().len(), 0);
    }
}

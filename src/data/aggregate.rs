//! Grouped counts, shares and means over a [`FilteredView`].
//!
//! Everything here is recomputed from scratch on each filter change and is
//! total over empty views: ratios against an empty population are zero.

use super::filter::FilteredView;
use super::model::{BoxCategory, Tier};

/// Whole-number percentage, rounded to nearest. `0` when `total == 0`.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

/// Percentage as a float for one-decimal captions. `0.0` when `total == 0`.
pub fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

fn category_counts(view: &FilteredView<'_>) -> [usize; 9] {
    let mut counts = [0usize; 9];
    for rec in view.iter() {
        counts[rec.box_category.index()] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Grid – 3×3 matrix, rows = potential tier, columns = performance tier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub category: BoxCategory,
    pub count: usize,
    /// Share of the filtered population, rounded.
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// `cells[potential.index()][performance.index()]`.
    pub cells: [[GridCell; 3]; 3],
    pub total: usize,
}

impl Grid {
    pub fn from_view(view: &FilteredView<'_>) -> Self {
        let counts = category_counts(view);
        let total = view.len();
        let cells = Tier::ALL.map(|potential| {
            Tier::ALL.map(|performance| {
                let category = BoxCategory::new(potential, performance);
                let count = counts[category.index()];
                GridCell {
                    category,
                    count,
                    percentage: percentage(count, total),
                }
            })
        });
        Grid { cells, total }
    }

    pub fn cell(&self, category: BoxCategory) -> &GridCell {
        &self.cells[category.potential.index()][category.performance.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().flatten()
    }
}

// ---------------------------------------------------------------------------
// Distribution – per-category counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    counts: [usize; 9],
}

impl Distribution {
    pub fn from_view(view: &FilteredView<'_>) -> Self {
        Distribution {
            counts: category_counts(view),
        }
    }

    pub fn count(&self, category: BoxCategory) -> usize {
        self.counts[category.index()]
    }

    /// All nine categories in canonical order, zero counts included.
    pub fn entries(&self) -> impl Iterator<Item = (BoxCategory, usize)> + '_ {
        BoxCategory::all().map(|c| (c, self.count(c)))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Aggregates for one category. Means are `None` when `count == 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: BoxCategory,
    pub count: usize,
    pub promoted: usize,
    pub avg_potential: Option<f64>,
    pub avg_performance: Option<f64>,
}

/// One row per category, all nine present so exports keep a fixed shape.
pub fn summarize(view: &FilteredView<'_>) -> Vec<SummaryRow> {
    let mut counts = [0usize; 9];
    let mut promoted = [0usize; 9];
    let mut potential_sum = [0f64; 9];
    let mut performance_sum = [0f64; 9];

    for rec in view.iter() {
        let i = rec.box_category.index();
        counts[i] += 1;
        promoted[i] += usize::from(rec.promoted);
        potential_sum[i] += rec.potential;
        performance_sum[i] += rec.performance_rating;
    }

    BoxCategory::all()
        .map(|category| {
            let i = category.index();
            let mean = |sum: f64| (counts[i] > 0).then(|| sum / counts[i] as f64);
            SummaryRow {
                category,
                count: counts[i],
                promoted: promoted[i],
                avg_potential: mean(potential_sum[i]),
                avg_performance: mean(performance_sum[i]),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Headline metrics (the four cards above the charts)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlineMetrics {
    pub total: usize,
    /// Size of the unfiltered table.
    pub eligible: usize,
    /// `total` as a share of `eligible`.
    pub total_share: f64,
    pub promoted: usize,
    pub promoted_share: f64,
    pub high_potential: usize,
    pub high_potential_share: f64,
    pub stars: usize,
    pub stars_share: f64,
}

impl HeadlineMetrics {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let total = view.len();
        let eligible = view.table().len();
        let mut promoted = 0;
        let mut high_potential = 0;
        let mut stars = 0;
        for rec in view.iter() {
            promoted += usize::from(rec.promoted);
            high_potential += usize::from(rec.box_category.potential == Tier::High);
            stars += usize::from(rec.box_category.is_star());
        }

        HeadlineMetrics {
            total,
            eligible,
            total_share: share(total, eligible),
            promoted,
            promoted_share: share(promoted, total),
            high_potential,
            high_potential_share: share(high_potential, total),
            stars,
            stars_share: share(stars, total),
        }
    }
}

// ---------------------------------------------------------------------------
// Salary spread for the boxplot
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers (1.5 × IQR).
#[derive(Debug, Clone, PartialEq)]
pub struct SalarySpread {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub min: f64,
    pub max: f64,
    /// Every salary beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
}

impl SalarySpread {
    /// `None` when the view holds no finite salaries.
    pub fn from_view(view: &FilteredView<'_>) -> Option<Self> {
        let mut values: Vec<f64> = view
            .iter()
            .map(|r| r.salary)
            .filter(|s| s.is_finite())
            .collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        let min = values[0];
        let max = values[values.len() - 1];
        let lower_whisker = values.iter().copied().find(|&v| v >= lo_fence).unwrap_or(min);
        let upper_whisker = values.iter().rev().copied().find(|&v| v <= hi_fence).unwrap_or(max);
        let outliers = values
            .iter()
            .copied()
            .filter(|&v| v < lower_whisker || v > upper_whisker)
            .collect();

        Some(SalarySpread {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            min,
            max,
            outliers,
        })
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

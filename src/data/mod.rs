/// Data layer: core types, loading, filtering, classification and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → EmployeeTable (box categories resolved)
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ EmployeeTable  │  Vec<EmployeeRecord>, selector indices
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → FilteredView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  grid, distribution, summary rows, metrics
///   └───────────┘
/// ```

pub mod aggregate;
pub mod classify;
pub mod filter;
pub mod loader;
pub mod model;

/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + clean rows → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, distinct years / departments / faculties
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Query (year range, department) → matching records
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  counts, one-semester %, frequency distributions
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
pub mod stats;

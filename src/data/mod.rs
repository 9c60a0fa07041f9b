/// Data layer: core types, loading, blob parsing and flattening.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ flatten   │  parser per row (parallel) → union of metric keys → FlatTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  FlatTable → CSV, PcaSummary → JSON
///   └──────────┘
/// ```

pub mod flatten;
pub mod loader;
pub mod model;
pub mod parser;
pub mod writer;

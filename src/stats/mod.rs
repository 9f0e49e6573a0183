//! Stats module - grade aggregation and index statistics

mod calculator;

pub use calculator::{
    Aggregate, ColumnSummary, GradeScale, IndexTable, LinearFit, StatsCalculator,
    DEFAULT_ROUND_THRESHOLD, DEFAULT_TARGET_SCALE,
};

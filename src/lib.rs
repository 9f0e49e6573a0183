//! Gradify - Spreadsheet Grade Analysis & Chart Export
//!
//! Loads a table of student grades and paired test scores, validates its
//! header sets and derives summary tables, test/grade index tables and charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod grades;
pub mod logging;
pub mod stats;

pub use config::{BenefitCatalog, ChartLabels, ProcessorConfig, TableLabels};
pub use error::{GradeError, SchemaViolation};
pub use grades::GradeTableProcessor;

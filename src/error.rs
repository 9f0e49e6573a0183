//! Error types shared by every stage of the grade pipeline.

use crate::charts::ChartError;
use crate::data::{LoaderError, ProcessorError, WriterError};
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Structural problems found while validating the header sets of a table.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("invalid pairing: grade header count differs from test-score header count")]
    InvalidPairing,
    #[error("empty schema: no grade headers were given")]
    EmptySchema,
    #[error("missing grade columns: grade headers are not all in the header list")]
    MissingGradeColumns,
    #[error("missing test-score columns: test-score headers are not all in the header list")]
    MissingTestScoreColumns,
    #[error("schema mismatch")]
    SchemaMismatch,
}

#[derive(Error, Debug)]
pub enum GradeError {
    #[error("Schema validation failed: {0}")]
    SchemaValidation(#[from] SchemaViolation),
    #[error("Wrong number of names for {context}: expected {expected}, got {actual}")]
    HeaderCount {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Names for {0} must be unique")]
    DuplicateNames(&'static str),
    #[error("File {} already exists", .0.display())]
    FileAlreadyExists(PathBuf),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GradeError {
    /// Builds a `HeaderCount` error when `names` does not hold exactly `expected` entries.
    pub fn check_count<T>(
        context: &'static str,
        names: &[T],
        expected: usize,
    ) -> Result<(), GradeError> {
        if names.len() == expected {
            Ok(())
        } else {
            Err(GradeError::HeaderCount {
                context,
                expected,
                actual: names.len(),
            })
        }
    }
}

/// Fails with `FileAlreadyExists` when something is already at `path`.
pub fn ensure_absent(path: &std::path::Path) -> Result<(), GradeError> {
    if path.is_file() {
        Err(GradeError::FileAlreadyExists(path.to_path_buf()))
    } else {
        Ok(())
    }
}

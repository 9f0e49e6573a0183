//! Data Processor Module
//! Numeric coercion of grade columns and subject identity extraction.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column not found: {0}")]
    MissingColumn(String),
}

/// Cleaning and extraction helpers over the loaded DataFrame.
pub struct DataProcessor;

impl DataProcessor {
    /// Map a raw cell to the numeric domain: missing, non-numeric and
    /// infinite values all become zero.
    #[inline]
    pub fn clean_value(value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }

    /// Read a column as cleaned `f64` values.
    pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, ProcessorError> {
        let column = df
            .column(name)
            .map_err(|_| ProcessorError::MissingColumn(name.to_string()))?;

        // Non-strict cast: unparsable text turns into null.
        let value_f64 = column.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;

        Ok(value_ca.into_iter().map(Self::clean_value).collect())
    }

    /// Read several columns as cleaned numeric vectors, in the given order.
    pub fn numeric_columns(
        df: &DataFrame,
        names: &[String],
    ) -> Result<Vec<Vec<f64>>, ProcessorError> {
        names
            .iter()
            .map(|name| Self::numeric_column(df, name))
            .collect()
    }

    /// Subject labels from `name_column`, or 1-based row numbers when the
    /// column does not exist.
    pub fn identity_labels(df: &DataFrame, name_column: &str) -> Result<Vec<String>, ProcessorError> {
        let Ok(column) = df.column(name_column) else {
            tracing::warn!(
                column = name_column,
                "name column not found, using row numbers as subject labels"
            );
            return Ok((1..=df.height()).map(|i| i.to_string()).collect());
        };

        // Float IDs print without a trailing ".0".
        if column.dtype().is_float() {
            let as_float = column.cast(&DataType::Float64)?;
            return Ok(as_float
                .f64()?
                .into_iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
                .collect());
        }

        let as_text = column.cast(&DataType::String)?;
        let text_ca = as_text.str()?;

        Ok(text_ca
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    /// Build a DataFrame from a label column followed by numeric columns.
    pub fn labelled_frame(
        label_name: &str,
        labels: Vec<String>,
        columns: &[(String, Vec<f64>)],
    ) -> Result<DataFrame, ProcessorError> {
        let mut cols = Vec::with_capacity(columns.len() + 1);
        cols.push(Column::new(label_name.into(), labels));
        cols.extend(
            columns
                .iter()
                .map(|(name, values)| Column::new(name.as_str().into(), values.as_slice())),
        );
        Ok(DataFrame::new(cols)?)
    }

    /// Build a DataFrame of numeric columns only.
    pub fn numeric_frame(columns: &[(String, Vec<f64>)]) -> Result<DataFrame, ProcessorError> {
        let cols = columns
            .iter()
            .map(|(name, values)| Column::new(name.as_str().into(), values.as_slice()))
            .collect();
        Ok(DataFrame::new(cols)?)
    }

    /// Text cells of a column; nulls are skipped.
    pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>, ProcessorError> {
        let column = df
            .column(name)
            .map_err(|_| ProcessorError::MissingColumn(name.to_string()))?;
        let as_text = column.cast(&DataType::String)?;

        Ok(as_text
            .str()?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_value() {
        assert_eq!(DataProcessor::clean_value(Some(2.5)), 2.5);
        assert_eq!(DataProcessor::clean_value(None), 0.0);
        assert_eq!(DataProcessor::clean_value(Some(f64::INFINITY)), 0.0);
        assert_eq!(DataProcessor::clean_value(Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_numeric_column_coerces_text() {
        let df = df!(
            "Q1" => &["4", "abc", "", "2.5"]
        )
        .unwrap();

        let values = DataProcessor::numeric_column(&df, "Q1").unwrap();
        assert_eq!(values, vec![4.0, 0.0, 0.0, 2.5]);
    }

    #[test]
    fn test_numeric_column_missing() {
        let df = df!("Q1" => &[1.0]).unwrap();
        assert!(matches!(
            DataProcessor::numeric_column(&df, "Q2"),
            Err(ProcessorError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_identity_labels_default_to_row_numbers() {
        let df = df!("Q1" => &[1.0, 2.0, 3.0]).unwrap();
        let labels = DataProcessor::identity_labels(&df, "Name").unwrap();
        assert_eq!(labels, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_identity_labels_from_column() {
        let df = df!("Name" => &["Anna", "Boris"], "Q1" => &[1.0, 2.0]).unwrap();
        let labels = DataProcessor::identity_labels(&df, "Name").unwrap();
        assert_eq!(labels, vec!["Anna", "Boris"]);
    }

    #[test]
    fn test_identity_labels_from_float_ids() {
        let df = df!("Id" => &[Some(101.0), None, Some(2.5)]).unwrap();
        let labels = DataProcessor::identity_labels(&df, "Id").unwrap();
        assert_eq!(labels, vec!["101", "", "2.5"]);
    }
}

//! Spreadsheet Loader Module
//! Reads xlsx/xls/ods workbooks through calamine and CSV files through Polars.

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read spreadsheet: {0}")]
    SpreadsheetError(#[from] calamine::Error),
    #[error("Failed to build table: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Spreadsheet contains no sheets")]
    NoSheets,
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("No data loaded")]
    NoData,
}

/// Handles spreadsheet loading into a Polars DataFrame.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a spreadsheet, picking the reader from the file extension.
    pub fn load(&mut self, path: &Path) -> Result<&DataFrame, LoaderError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let df = match extension.as_str() {
            "csv" => Self::read_csv(path)?,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::read_workbook(path)?,
            other => return Err(LoaderError::UnsupportedFormat(other.to_string())),
        };

        tracing::debug!(rows = df.height(), columns = df.width(), "spreadsheet loaded");
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Read only the header row of a spreadsheet.
    pub fn read_headers(path: &Path) -> Result<Vec<String>, LoaderError> {
        let mut loader = Self::new();
        loader.load(path)?;
        Ok(loader.get_columns())
    }

    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// First sheet of the workbook, first row as headers.
    fn read_workbook(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook: Sheets<_> = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoaderError::NoSheets)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        Ok(Self::range_to_dataframe(&range)?)
    }

    /// Convert a calamine cell range into a DataFrame.
    ///
    /// Columns whose cells are all numbers (or empty) become Float64; any other
    /// column is kept as text.
    pub(crate) fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame, PolarsError> {
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(DataFrame::empty());
        };
        let body: Vec<&[Data]> = rows.collect();

        let headers = Self::unique_headers(header_row);
        let mut columns = Vec::with_capacity(headers.len());

        for (idx, name) in headers.into_iter().enumerate() {
            let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(idx)).collect();

            let is_numeric = cells.iter().all(|cell| {
                matches!(
                    cell,
                    None | Some(Data::Empty) | Some(Data::Int(_)) | Some(Data::Float(_))
                )
            });

            let column = if is_numeric {
                let values: Vec<Option<f64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Some(Data::Int(v)) => Some(*v as f64),
                        Some(Data::Float(v)) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            } else {
                let values: Vec<Option<String>> = cells
                    .iter()
                    .map(|cell| match cell {
                        None | Some(Data::Empty) => None,
                        Some(other) => Some(other.to_string()),
                    })
                    .collect();
                Column::new(name.into(), values)
            };
            columns.push(column);
        }

        DataFrame::new(columns)
    }

    /// Header names with blanks filled in and duplicates suffixed, so every
    /// column can be addressed by name.
    fn unique_headers(header_row: &[Data]) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();

        header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let base = match cell {
                    Data::Empty => format!("Unnamed: {}", idx),
                    other => other.to_string(),
                };
                let count = seen.entry(base.clone()).or_insert(0);
                let name = if *count == 0 {
                    base
                } else {
                    format!("{}.{}", base, count)
                };
                *count += 1;
                name
            })
            .collect()
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Take ownership of the loaded DataFrame.
    pub fn into_dataframe(self) -> Result<DataFrame, LoaderError> {
        self.df.ok_or(LoaderError::NoData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_headers() {
        let row = vec![
            Data::String("Q1".to_string()),
            Data::Empty,
            Data::String("Q1".to_string()),
        ];
        assert_eq!(
            DataLoader::unique_headers(&row),
            vec!["Q1", "Unnamed: 1", "Q1.1"]
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let mut loader = DataLoader::new();
        let result = loader.load(Path::new("grades.txt"));
        assert!(matches!(result, Err(LoaderError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_csv_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.csv");
        std::fs::write(&path, "Name,Q1,Q2\nAnna,1,2\nBoris,3,x\n").unwrap();

        let mut loader = DataLoader::new();
        loader.load(&path).unwrap();

        assert_eq!(loader.get_columns(), vec!["Name", "Q1", "Q2"]);
        assert_eq!(loader.get_row_count(), 2);
    }
}

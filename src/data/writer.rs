//! Spreadsheet Writer Module
//! Writes DataFrames to xlsx workbooks with rust_xlsxwriter.

use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to write xlsx: {0}")]
    XlsxError(#[from] XlsxError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Table too large for a worksheet")]
    TooLarge,
}

/// Writes tables to xlsx files, one worksheet per file.
pub struct SpreadsheetWriter;

impl SpreadsheetWriter {
    /// Write a single table with its header row.
    pub fn save(df: &DataFrame, path: &Path) -> Result<(), WriterError> {
        Self::save_side_by_side(&[df], path)
    }

    /// Write several tables next to each other on one sheet, separated by a
    /// blank column.
    pub fn save_side_by_side(tables: &[&DataFrame], path: &Path) -> Result<(), WriterError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header_format = Format::new().set_bold();

        let mut col_offset: usize = 0;
        for (idx, df) in tables.iter().enumerate() {
            if idx > 0 {
                // Separator column keeps a single-space header.
                let sep = Self::col_index(col_offset)?;
                worksheet.write_string_with_format(0, sep, " ", &header_format)?;
                col_offset += 1;
            }
            Self::write_frame(worksheet, df, col_offset, &header_format)?;
            col_offset += df.width();
        }

        workbook.save(path)?;
        tracing::debug!(path = %path.display(), tables = tables.len(), "workbook saved");
        Ok(())
    }

    fn write_frame(
        worksheet: &mut Worksheet,
        df: &DataFrame,
        col_offset: usize,
        header_format: &Format,
    ) -> Result<(), WriterError> {
        for (i, column) in df.get_columns().iter().enumerate() {
            let col = Self::col_index(col_offset + i)?;
            worksheet.write_string_with_format(0, col, column.name().as_str(), header_format)?;

            if matches!(column.dtype(), DataType::String) {
                for (row, value) in column.str()?.into_iter().enumerate() {
                    if let Some(text) = value {
                        worksheet.write_string(Self::row_index(row)?, col, text)?;
                    }
                }
            } else {
                let as_f64 = column.cast(&DataType::Float64)?;
                for (row, value) in as_f64.f64()?.into_iter().enumerate() {
                    let row = Self::row_index(row)?;
                    match value {
                        Some(v) if v.is_finite() => {
                            worksheet.write_number(row, col, v)?;
                        }
                        Some(v) if v.is_infinite() => {
                            let text = if v > 0.0 { "inf" } else { "-inf" };
                            worksheet.write_string(row, col, text)?;
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Data rows start below the header row.
    fn row_index(row: usize) -> Result<u32, WriterError> {
        u32::try_from(row + 1).map_err(|_| WriterError::TooLarge)
    }

    fn col_index(col: usize) -> Result<u16, WriterError> {
        u16::try_from(col).map_err(|_| WriterError::TooLarge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.xlsx");
        let df = df!(
            "Students" => &["Anna", "Boris"],
            "Sum" => &[3.0, 8.0]
        )
        .unwrap();

        SpreadsheetWriter::save(&df, &path).unwrap();

        let mut loader = DataLoader::new();
        let loaded = loader.load(&path).unwrap();
        assert_eq!(loaded.height(), 2);
        assert_eq!(loader.get_columns(), vec!["Students", "Sum"]);
    }

    #[test]
    fn test_side_by_side_adds_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.xlsx");
        let left = df!("A" => &[1.0, 2.0]).unwrap();
        let right = df!("B" => &[3.0]).unwrap();

        SpreadsheetWriter::save_side_by_side(&[&left, &right], &path).unwrap();

        let headers = DataLoader::read_headers(&path).unwrap();
        assert_eq!(headers, vec!["A", " ", "B"]);
    }
}

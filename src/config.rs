//! Processor configuration: grading scale, display labels and chart titles.
//!
//! Every default is built fresh by its `Default` impl; nothing here is shared
//! mutable state.

use crate::stats::{GradeScale, DEFAULT_ROUND_THRESHOLD, DEFAULT_TARGET_SCALE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for a [`crate::GradeTableProcessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Grading system derived averages are normalized into.
    pub target_scale: f64,
    /// Fractional cutoff at which a grade rounds up.
    pub round_threshold: f64,
    /// Header of the label column in to-view and index tables.
    pub student_column: String,
    /// Names of the row-average column and column-average row of the index table.
    pub index_headers: Vec<String>,
    /// Overrides for the Sum / Average / Round column names.
    pub derived_columns: Option<Vec<String>>,
    /// Overrides for the Max / Sum / Average / Average-in-scale row names.
    pub summary_rows: Option<Vec<String>>,
    pub charts: ChartLabels,
    /// Catalog for the study aid chart.
    pub benefits: BenefitCatalog,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            target_scale: DEFAULT_TARGET_SCALE,
            round_threshold: DEFAULT_ROUND_THRESHOLD,
            student_column: "Students".to_string(),
            index_headers: vec!["LSI".to_string(), "LTI".to_string()],
            derived_columns: None,
            summary_rows: None,
            charts: ChartLabels::default(),
            benefits: BenefitCatalog::default(),
        }
    }
}

impl ProcessorConfig {
    /// Load a JSON config; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn scale(&self) -> GradeScale {
        GradeScale {
            target: self.target_scale,
            round_threshold: self.round_threshold,
        }
    }

    /// Column and row names for the derived tables.
    pub fn labels(&self) -> TableLabels {
        let defaults = TableLabels::for_scale(&self.scale());
        TableLabels {
            derived_columns: self
                .derived_columns
                .clone()
                .unwrap_or(defaults.derived_columns),
            summary_rows: self.summary_rows.clone().unwrap_or(defaults.summary_rows),
            student_column: self.student_column.clone(),
            index_headers: self.index_headers.clone(),
        }
    }
}

/// Names used when building derived tables. Counts are checked at use.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLabels {
    /// Sum, Average, Round (exactly 3).
    pub derived_columns: Vec<String>,
    /// Max, Sum, Average, Average-in-scale (exactly 4).
    pub summary_rows: Vec<String>,
    pub student_column: String,
    /// Row-average column, column-average row (exactly 2).
    pub index_headers: Vec<String>,
}

impl TableLabels {
    pub fn for_scale(scale: &GradeScale) -> Self {
        let average = format!("Average {}", scale.target);
        Self {
            derived_columns: vec![
                "Sum".to_string(),
                average.clone(),
                format!("Round {}", scale.round_threshold),
            ],
            summary_rows: vec![
                "Max".to_string(),
                "Sum".to_string(),
                "Average".to_string(),
                average,
            ],
            student_column: "Students".to_string(),
            index_headers: vec!["LSI".to_string(), "LTI".to_string()],
        }
    }
}

impl Default for TableLabels {
    fn default() -> Self {
        Self::for_scale(&GradeScale::default())
    }
}

/// Titles and axis labels of the exported charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLabels {
    pub grades_pie_title: String,
    pub tests_pie_title: String,
    /// Title, x label, y label.
    pub popularity: Vec<String>,
    /// Title, performance label, motivation label.
    pub correlation: Vec<String>,
    /// Title, y label, x label.
    pub benefits: Vec<String>,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            grades_pie_title: "Average performance by grades".to_string(),
            tests_pie_title: "Test score evaluation".to_string(),
            popularity: vec![
                "Task popularity".to_string(),
                "Task types".to_string(),
                "Average scores".to_string(),
            ],
            correlation: vec![
                "Performance against motivation in the group".to_string(),
                "Performance".to_string(),
                "Motivation".to_string(),
            ],
            benefits: vec![
                "Study aids".to_string(),
                "Count".to_string(),
                "Study aid".to_string(),
            ],
        }
    }
}

/// Free-text survey column and the catalog matched against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenefitCatalog {
    /// Column holding the free-text answers.
    pub column: String,
    /// Category names shown on the chart.
    pub categories: Vec<String>,
    /// Substrings searched for in the answers, paired with `categories` by position.
    pub terms: Vec<String>,
}

impl Default for BenefitCatalog {
    fn default() -> Self {
        Self {
            column: "Which study aids did you mainly use?".to_string(),
            categories: vec![
                "E-textbooks".to_string(),
                "Workbooks".to_string(),
                "Video lectures".to_string(),
                "Printed textbooks".to_string(),
            ],
            terms: vec![
                "e-textbooks".to_string(),
                "workbooks".to_string(),
                "video lectures".to_string(),
                "printed textbooks".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        let labels = ProcessorConfig::default().labels();
        assert_eq!(labels.derived_columns, vec!["Sum", "Average 5", "Round 0.5"]);
        assert_eq!(labels.summary_rows, vec!["Max", "Sum", "Average", "Average 5"]);
        assert_eq!(labels.student_column, "Students");
    }

    #[test]
    fn test_labels_follow_scale() {
        let config = ProcessorConfig {
            target_scale: 10.0,
            round_threshold: 0.7,
            ..Default::default()
        };
        let labels = config.labels();
        assert_eq!(labels.derived_columns[1], "Average 10");
        assert_eq!(labels.derived_columns[2], "Round 0.7");
        assert_eq!(labels.summary_rows[3], "Average 10");
    }

    #[test]
    fn test_partial_json() {
        let config: ProcessorConfig =
            serde_json::from_str(r#"{"target_scale": 100, "student_column": "Name"}"#).unwrap();
        assert_eq!(config.target_scale, 100.0);
        assert_eq!(config.student_column, "Name");
        assert_eq!(config.round_threshold, DEFAULT_ROUND_THRESHOLD);
        assert_eq!(config.index_headers, vec!["LSI", "LTI"]);
    }
}

//! Table Validator Module
//! Confirms the grade/test-score header sets before any computation runs.

use crate::error::SchemaViolation;

/// Structural checks over header lists.
pub struct TableValidator;

impl TableValidator {
    /// Validate header sets against a table's actual column headers.
    ///
    /// Checks run in a fixed order and the first failing one is reported:
    /// pairing, emptiness, grade membership, test-score membership and finally
    /// master list membership in the table.
    pub fn check_headers<S: AsRef<str>>(
        table_headers: &[S],
        headers: &[String],
        grade_headers: &[String],
        test_headers: &[String],
    ) -> Result<(), SchemaViolation> {
        let contains = |list: &[String], name: &String| list.iter().any(|h| h == name);

        if grade_headers.len() != test_headers.len() {
            return Err(SchemaViolation::InvalidPairing);
        }
        if grade_headers.is_empty() {
            return Err(SchemaViolation::EmptySchema);
        }
        if !grade_headers.iter().all(|h| contains(headers, h)) {
            return Err(SchemaViolation::MissingGradeColumns);
        }
        if !test_headers.iter().all(|h| contains(headers, h)) {
            return Err(SchemaViolation::MissingTestScoreColumns);
        }
        if !headers
            .iter()
            .all(|h| table_headers.iter().any(|t| t.as_ref() == h))
        {
            return Err(SchemaViolation::SchemaMismatch);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_headers() {
        let table = ["Name", "Q1", "Q2", "T1", "T2"];
        let result = TableValidator::check_headers(
            &table,
            &names(&["Q1", "Q2", "T1", "T2"]),
            &names(&["Q1", "Q2"]),
            &names(&["T1", "T2"]),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_pairing_checked_before_emptiness() {
        let table = ["Q1"];
        let result = TableValidator::check_headers(&table, &names(&["Q1"]), &[], &names(&["Q1"]));
        assert_eq!(result, Err(SchemaViolation::InvalidPairing));
    }

    #[test]
    fn test_empty_schema() {
        let table = ["Q1"];
        let result = TableValidator::check_headers(&table, &names(&["Q1"]), &[], &[]);
        assert_eq!(result, Err(SchemaViolation::EmptySchema));
    }

    #[test]
    fn test_missing_grade_columns() {
        let table = ["Q1", "T1"];
        let result = TableValidator::check_headers(
            &table,
            &names(&["T1"]),
            &names(&["Q1"]),
            &names(&["T1"]),
        );
        assert_eq!(result, Err(SchemaViolation::MissingGradeColumns));
    }

    #[test]
    fn test_missing_test_columns() {
        let table = ["Q1", "T1"];
        let result = TableValidator::check_headers(
            &table,
            &names(&["Q1"]),
            &names(&["Q1"]),
            &names(&["T1"]),
        );
        assert_eq!(result, Err(SchemaViolation::MissingTestScoreColumns));
    }

    #[test]
    fn test_schema_mismatch() {
        let table = ["Q1", "Q2", "T1"];
        let result = TableValidator::check_headers(
            &table,
            &names(&["Q1", "Q2", "T1", "T2"]),
            &names(&["Q1", "Q2"]),
            &names(&["T1", "T2"]),
        );
        assert_eq!(result, Err(SchemaViolation::SchemaMismatch));
    }
}

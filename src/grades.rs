//! Grade Table Processor
//! Loads a grade spreadsheet once, validates its header sets and derives the
//! student-grade, test-grade and index views, with chart and xlsx exports.

use crate::charts::{ChartPlotter, StaticChartRenderer};
use crate::config::{BenefitCatalog, ProcessorConfig, TableLabels};
use crate::data::{DataLoader, DataProcessor, SpreadsheetWriter, TableValidator};
use crate::error::{ensure_absent, GradeError};
use crate::stats::{Aggregate, GradeScale, StatsCalculator};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Number of files written by [`GradeTableProcessor::export_charts`].
pub const CHART_FILES_WITH_BENEFITS: usize = 6;
/// Number of files written by [`GradeTableProcessor::export_charts_without_benefits`].
pub const CHART_FILES_WITHOUT_BENEFITS: usize = 5;

/// Default chart file names, in the order the batch exporters expect.
pub fn default_chart_files() -> Vec<String> {
    [
        "grades_pie.png",
        "tests_pie.png",
        "benefits.png",
        "popularity.png",
        "motivation.png",
        "education.png",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// In-memory grade table with its validated header sets.
pub struct GradeTableProcessor {
    data_table: DataFrame,
    grade_headers: Vec<String>,
    test_headers: Vec<String>,
    name_column: String,
    names: Vec<String>,
    config: ProcessorConfig,
}

impl GradeTableProcessor {
    /// Load and validate a spreadsheet.
    pub fn open(
        path: &Path,
        grade_headers: &[String],
        test_headers: &[String],
        name_column: &str,
        config: ProcessorConfig,
    ) -> Result<Self, GradeError> {
        info!(path = %path.display(), "loading grade table");
        let mut loader = DataLoader::new();
        loader.load(path)?;
        let df = loader.into_dataframe()?;

        Self::from_dataframe(df, grade_headers, test_headers, name_column, config)
    }

    /// Validate an already loaded table.
    pub fn from_dataframe(
        df: DataFrame,
        grade_headers: &[String],
        test_headers: &[String],
        name_column: &str,
        config: ProcessorConfig,
    ) -> Result<Self, GradeError> {
        let headers: Vec<String> = grade_headers
            .iter()
            .chain(test_headers)
            .cloned()
            .collect();
        let table_headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        TableValidator::check_headers(&table_headers, &headers, grade_headers, test_headers)?;
        info!(
            subjects = df.height(),
            items = grade_headers.len(),
            "grade table validated"
        );

        let names = DataProcessor::identity_labels(&df, name_column)?;

        Ok(Self {
            data_table: df,
            grade_headers: grade_headers.to_vec(),
            test_headers: test_headers.to_vec(),
            name_column: name_column.to_string(),
            names,
            config,
        })
    }

    /// Header row of a spreadsheet file.
    pub fn read_headers(path: &Path) -> Result<Vec<String>, GradeError> {
        Ok(DataLoader::read_headers(path)?)
    }

    /// The loaded dataset, as read.
    pub fn data_table(&self) -> &DataFrame {
        &self.data_table
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn grade_headers(&self) -> &[String] {
        &self.grade_headers
    }

    pub fn test_headers(&self) -> &[String] {
        &self.test_headers
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Labels built from the processor configuration.
    pub fn labels(&self) -> TableLabels {
        self.config.labels()
    }

    fn scale(&self) -> GradeScale {
        self.config.scale()
    }

    // ------------------------------------------------------------------
    // Derived tables
    // ------------------------------------------------------------------

    /// Selected columns (cleaned) with Sum, Average and Round appended.
    pub fn derived_table(
        df: &DataFrame,
        headers: &[String],
        derived_names: &[String],
        scale: &GradeScale,
    ) -> Result<DataFrame, GradeError> {
        GradeError::check_count("derived columns", derived_names, 3)?;

        let columns = DataProcessor::numeric_columns(df, headers)?;
        let aggregate = StatsCalculator::aggregate(&columns, scale);

        let named = Self::named_columns(headers, columns, derived_names, aggregate);
        Ok(DataProcessor::numeric_frame(&named)?)
    }

    /// Derived table with a label column and Max/Sum/Average/Average-in-scale
    /// rows appended below the subjects.
    pub fn view_table(
        df: &DataFrame,
        headers: &[String],
        names: &[String],
        labels: &TableLabels,
        scale: &GradeScale,
    ) -> Result<DataFrame, GradeError> {
        GradeError::check_count("summary rows", &labels.summary_rows, 4)?;
        GradeError::check_count("derived columns", &labels.derived_columns, 3)?;

        let columns = DataProcessor::numeric_columns(df, headers)?;
        let aggregate = StatsCalculator::aggregate(&columns, scale);
        let mut named = Self::named_columns(headers, columns, &labels.derived_columns, aggregate);

        for (_, values) in named.iter_mut() {
            let summary = StatsCalculator::summarize(values, scale.target);
            values.extend(summary.to_array());
        }

        let row_labels: Vec<String> = names
            .iter()
            .chain(&labels.summary_rows)
            .cloned()
            .collect();

        Ok(DataProcessor::labelled_frame(
            &labels.student_column,
            row_labels,
            &named,
        )?)
    }

    fn named_columns(
        headers: &[String],
        columns: Vec<Vec<f64>>,
        derived_names: &[String],
        aggregate: Aggregate,
    ) -> Vec<(String, Vec<f64>)> {
        let mut named: Vec<(String, Vec<f64>)> =
            headers.iter().cloned().zip(columns).collect();
        named.push((derived_names[0].clone(), aggregate.sum));
        named.push((derived_names[1].clone(), aggregate.average));
        named.push((derived_names[2].clone(), aggregate.round));
        named
    }

    fn aggregate_for(&self, headers: &[String]) -> Result<Aggregate, GradeError> {
        let columns = DataProcessor::numeric_columns(&self.data_table, headers)?;
        Ok(StatsCalculator::aggregate(&columns, &self.scale()))
    }

    /// Student grades with Sum, Average and Round columns.
    pub fn grades_table(&self, labels: &TableLabels) -> Result<DataFrame, GradeError> {
        Self::derived_table(
            &self.data_table,
            &self.grade_headers,
            &labels.derived_columns,
            &self.scale(),
        )
    }

    /// Student grades with derived columns, summary rows and subject labels.
    pub fn grades_view(&self, labels: &TableLabels) -> Result<DataFrame, GradeError> {
        Self::view_table(
            &self.data_table,
            &self.grade_headers,
            &self.names,
            labels,
            &self.scale(),
        )
    }

    /// Test-score grades with Sum, Average and Round columns.
    pub fn tests_table(&self, labels: &TableLabels) -> Result<DataFrame, GradeError> {
        Self::derived_table(
            &self.data_table,
            &self.test_headers,
            &labels.derived_columns,
            &self.scale(),
        )
    }

    /// Test-score grades with derived columns, summary rows and subject labels.
    pub fn tests_view(&self, labels: &TableLabels) -> Result<DataFrame, GradeError> {
        Self::view_table(
            &self.data_table,
            &self.test_headers,
            &self.names,
            labels,
            &self.scale(),
        )
    }

    /// Test-score / grade ratio table.
    ///
    /// Item columns are named "1".."n" by pair position. The row-average column
    /// and the column-average row take the two `index_headers` names.
    pub fn index_table(&self, labels: &TableLabels) -> Result<DataFrame, GradeError> {
        GradeError::check_count("index headers", &labels.index_headers, 2)?;

        let grades = DataProcessor::numeric_columns(&self.data_table, &self.grade_headers)?;
        let tests = DataProcessor::numeric_columns(&self.data_table, &self.test_headers)?;
        let index = StatsCalculator::index_table(&grades, &tests);

        let mut named: Vec<(String, Vec<f64>)> = index
            .ratios
            .into_iter()
            .enumerate()
            .map(|(i, column)| ((i + 1).to_string(), column))
            .collect();
        named.push((labels.index_headers[0].clone(), index.row_average));

        for ((_, values), average) in named.iter_mut().zip(index.column_average) {
            values.push(average);
        }

        let row_labels: Vec<String> = self
            .names
            .iter()
            .chain(std::iter::once(&labels.index_headers[1]))
            .cloned()
            .collect();

        Ok(DataProcessor::labelled_frame(
            &labels.student_column,
            row_labels,
            &named,
        )?)
    }

    // ------------------------------------------------------------------
    // Chart exports
    // ------------------------------------------------------------------

    /// Pie chart of rounded student grades.
    pub fn export_grades_pie(&self, path: &Path, title: &str) -> Result<(), GradeError> {
        ensure_absent(path)?;
        let aggregate = self.aggregate_for(&self.grade_headers)?;
        let distribution = ChartPlotter::grade_distribution(&aggregate.round);

        StaticChartRenderer::draw_grade_pie(path, title, &distribution)?;
        info!(path = %path.display(), "grade distribution chart exported");
        Ok(())
    }

    /// Pie chart of rounded test-score grades.
    pub fn export_tests_pie(&self, path: &Path, title: &str) -> Result<(), GradeError> {
        ensure_absent(path)?;
        let aggregate = self.aggregate_for(&self.test_headers)?;
        let distribution = ChartPlotter::grade_distribution(&aggregate.round);

        StaticChartRenderer::draw_grade_pie(path, title, &distribution)?;
        info!(path = %path.display(), "test distribution chart exported");
        Ok(())
    }

    /// Per-item average of the test scores in the target scale.
    pub fn item_popularity(&self) -> Result<Vec<f64>, GradeError> {
        let columns = DataProcessor::numeric_columns(&self.data_table, &self.test_headers)?;
        let target = self.scale().target;

        Ok(columns
            .iter()
            .map(|c| StatsCalculator::summarize(c, target).average_scaled)
            .collect())
    }

    /// Bar chart of [`Self::item_popularity`]. `labels` is title, x label, y label.
    pub fn export_popularity_chart(
        &self,
        path: &Path,
        labels: &[String],
    ) -> Result<(), GradeError> {
        ensure_absent(path)?;
        GradeError::check_count("popularity chart labels", labels, 3)?;

        let bars = ChartPlotter::popularity(&self.item_popularity()?);
        StaticChartRenderer::draw_popularity_bars(path, labels, &bars)?;
        info!(path = %path.display(), "popularity chart exported");
        Ok(())
    }

    /// Two scatter charts of student average against test average, one per
    /// regression direction. `labels` is title, performance label, motivation label.
    pub fn export_correlation_charts(
        &self,
        grades_on_x: &Path,
        tests_on_x: &Path,
        labels: &[String],
    ) -> Result<(), GradeError> {
        ensure_absent(grades_on_x)?;
        ensure_absent(tests_on_x)?;
        GradeError::check_count("correlation chart labels", labels, 3)?;

        let grades = self.aggregate_for(&self.grade_headers)?.average;
        let tests = self.aggregate_for(&self.test_headers)?.average;

        let forward = ChartPlotter::correlation(&grades, &tests);
        StaticChartRenderer::draw_correlation(
            grades_on_x,
            &labels[0],
            &labels[2],
            &labels[1],
            &forward,
        )?;

        let backward = ChartPlotter::correlation(&tests, &grades);
        StaticChartRenderer::draw_correlation(
            tests_on_x,
            &labels[0],
            &labels[1],
            &labels[2],
            &backward,
        )?;

        info!(
            first = %grades_on_x.display(),
            second = %tests_on_x.display(),
            "correlation charts exported"
        );
        Ok(())
    }

    /// Counts of catalog mentions in the free-text column.
    pub fn benefit_tally(&self, catalog: &BenefitCatalog) -> Result<Vec<(String, usize)>, GradeError> {
        let unique_terms: HashSet<&String> = catalog.terms.iter().collect();
        let unique_categories: HashSet<&String> = catalog.categories.iter().collect();
        if unique_terms.len() != unique_categories.len() {
            return Err(GradeError::HeaderCount {
                context: "study aid categories",
                expected: unique_terms.len(),
                actual: unique_categories.len(),
            });
        }
        GradeError::check_count("study aid categories", &catalog.categories, unique_terms.len())?;

        let answers = DataProcessor::text_column(&self.data_table, &catalog.column)?;
        Ok(ChartPlotter::benefit_tally(
            &answers,
            &catalog.categories,
            &catalog.terms,
        ))
    }

    /// Bar chart of [`Self::benefit_tally`]. `labels` is title, y label, x label.
    pub fn export_benefits_chart(
        &self,
        path: &Path,
        catalog: &BenefitCatalog,
        labels: &[String],
    ) -> Result<(), GradeError> {
        ensure_absent(path)?;
        let tally = self.benefit_tally(catalog)?;
        GradeError::check_count("study aid chart labels", labels, 3)?;

        StaticChartRenderer::draw_benefit_bars(path, labels, &tally)?;
        info!(path = %path.display(), "study aid chart exported");
        Ok(())
    }

    fn batch_paths(
        dir: &Path,
        file_names: &[String],
        expected: usize,
    ) -> Result<Vec<PathBuf>, GradeError> {
        let unique: HashSet<&String> = file_names.iter().collect();
        if unique.len() != file_names.len() {
            return Err(GradeError::DuplicateNames("chart files"));
        }
        GradeError::check_count("chart files", file_names, expected)?;

        std::fs::create_dir_all(dir)?;
        Ok(file_names.iter().map(|name| dir.join(name)).collect())
    }

    /// Write every chart into `dir`.
    ///
    /// `file_names` order: grades pie, tests pie, study aids, popularity,
    /// correlation (grades on x), correlation (tests on x). Files written
    /// before a failure are kept.
    pub fn export_charts(
        &self,
        dir: &Path,
        file_names: &[String],
        catalog: &BenefitCatalog,
    ) -> Result<(), GradeError> {
        let files = Self::batch_paths(dir, file_names, CHART_FILES_WITH_BENEFITS)?;
        let charts = &self.config.charts;

        self.export_grades_pie(&files[0], &charts.grades_pie_title)?;
        self.export_tests_pie(&files[1], &charts.tests_pie_title)?;
        self.export_benefits_chart(&files[2], catalog, &charts.benefits)?;
        self.export_popularity_chart(&files[3], &charts.popularity)?;
        self.export_correlation_charts(&files[4], &files[5], &charts.correlation)?;
        Ok(())
    }

    /// Same as [`Self::export_charts`] minus the study aid chart.
    pub fn export_charts_without_benefits(
        &self,
        dir: &Path,
        file_names: &[String],
    ) -> Result<(), GradeError> {
        let files = Self::batch_paths(dir, file_names, CHART_FILES_WITHOUT_BENEFITS)?;
        let charts = &self.config.charts;

        self.export_grades_pie(&files[0], &charts.grades_pie_title)?;
        self.export_tests_pie(&files[1], &charts.tests_pie_title)?;
        self.export_popularity_chart(&files[2], &charts.popularity)?;
        self.export_correlation_charts(&files[3], &files[4], &charts.correlation)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Table exports
    // ------------------------------------------------------------------

    fn export_table(
        path: &Path,
        build: impl FnOnce() -> Result<DataFrame, GradeError>,
    ) -> Result<DataFrame, GradeError> {
        ensure_absent(path)?;
        let table = build()?;
        SpreadsheetWriter::save(&table, path)?;
        info!(path = %path.display(), rows = table.height(), "table exported");
        Ok(table)
    }

    /// Write the student-grade view table.
    pub fn export_grades_table(&self, path: &Path) -> Result<DataFrame, GradeError> {
        Self::export_table(path, || self.grades_view(&self.labels()))
    }

    /// Write the test-grade view table.
    pub fn export_tests_table(&self, path: &Path) -> Result<DataFrame, GradeError> {
        Self::export_table(path, || self.tests_view(&self.labels()))
    }

    /// Write the index table.
    pub fn export_index_table(&self, path: &Path) -> Result<DataFrame, GradeError> {
        Self::export_table(path, || self.index_table(&self.labels()))
    }

    /// Write the grade view, test view and index table side by side into
    /// `dir/file_name`, creating `dir` if needed.
    ///
    /// When `original_name` is given the loaded dataset is written there first;
    /// it is not removed if the summary workbook then fails.
    pub fn export_conclusion(
        &self,
        dir: &Path,
        file_name: &str,
        original_name: Option<&str>,
    ) -> Result<Vec<DataFrame>, GradeError> {
        std::fs::create_dir_all(dir)?;

        if let Some(original_name) = original_name {
            let original = dir.join(original_name);
            ensure_absent(&original)?;
            SpreadsheetWriter::save(&self.data_table, &original)?;
            info!(path = %original.display(), "original table exported");
        }

        let file = dir.join(file_name);
        ensure_absent(&file)?;

        let mut labels = self.labels();
        if !self.name_column.is_empty() {
            labels.student_column = self.name_column.clone();
        }

        let tables = vec![
            self.grades_view(&labels)?,
            self.tests_view(&labels)?,
            self.index_table(&labels)?,
        ];
        let refs: Vec<&DataFrame> = tables.iter().collect();
        SpreadsheetWriter::save_side_by_side(&refs, &file)?;
        info!(path = %file.display(), "conclusion workbook exported");

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> GradeTableProcessor {
        let df = df!(
            "Name" => &["Anna", "Boris", "Clara"],
            "Q1" => &[1.0, 0.0, 4.0],
            "Q2" => &[2.0, 0.0, 4.0],
            "T1" => &[3.0, 0.0, 4.0],
            "T2" => &[4.0, 0.0, 4.0]
        )
        .unwrap();
        GradeTableProcessor::from_dataframe(
            df,
            &strings(&["Q1", "Q2"]),
            &strings(&["T1", "T2"]),
            "Name",
            ProcessorConfig::default(),
        )
        .unwrap()
    }

    fn f64_column(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    #[test]
    fn test_grades_table_sum() {
        let processor = sample();
        let table = processor.grades_table(&processor.labels()).unwrap();
        assert_eq!(f64_column(&table, "Sum"), vec![3.0, 0.0, 8.0]);
        assert_eq!(f64_column(&table, "Round 0.5"), vec![2.0, 0.0, 5.0]);
        assert_eq!(table.width(), 5);
    }

    #[test]
    fn test_grades_view_summary_rows() {
        let processor = sample();
        let view = processor.grades_view(&processor.labels()).unwrap();
        assert_eq!(view.height(), 7);

        let labels: Vec<String> = view
            .column("Students")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["Anna", "Boris", "Clara", "Max", "Sum", "Average", "Average 5"]
        );

        let sum = f64_column(&view, "Sum");
        // Max, Sum, Average, Average-in-scale of the Sum column
        assert_eq!(&sum[3..6], &[8.0, 11.0, 11.0 / 3.0]);
        assert!((sum[6] - 5.0 * (11.0 / 3.0) / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_derived_name_count() {
        let processor = sample();
        let mut labels = processor.labels();
        labels.derived_columns.pop();
        assert!(matches!(
            processor.grades_table(&labels),
            Err(GradeError::HeaderCount { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_index_table_layout() {
        let processor = sample();
        let index = processor.index_table(&processor.labels()).unwrap();

        let names: Vec<String> = index
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Students", "1", "2", "LSI"]);
        assert_eq!(index.height(), 4);

        // Anna: 3/1 and 4/2; Boris: all zero; Clara: 1 and 1
        assert_eq!(f64_column(&index, "1"), vec![3.0, 0.0, 1.0, 2.0]);
        assert_eq!(f64_column(&index, "LSI"), vec![2.5, 0.0, 1.0, 1.75]);
    }

    #[test]
    fn test_item_popularity() {
        let processor = sample();
        let popularity = processor.item_popularity().unwrap();
        // T1: mean 7/3, max 4
        assert!((popularity[0] - 5.0 * (7.0 / 3.0) / 4.0).abs() < 1e-9);
        assert_eq!(popularity.len(), 2);
    }

    #[test]
    fn test_missing_master_header() {
        let df = df!("Q1" => &[1.0], "T1" => &[2.0]).unwrap();
        let result = GradeTableProcessor::from_dataframe(
            df,
            &strings(&["Q1"]),
            &strings(&["T2"]),
            "",
            ProcessorConfig::default(),
        );
        assert!(matches!(
            result,
            Err(GradeError::SchemaValidation(
                crate::error::SchemaViolation::SchemaMismatch
            ))
        ));
    }
}

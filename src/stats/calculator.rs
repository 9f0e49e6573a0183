//! Statistics Calculator Module
//! Grade aggregation, scale normalization, custom rounding, test/grade index
//! tables and least-squares fitting.

use crate::data::DataProcessor;
use statrs::statistics::Statistics;

/// Default target grading scale (5-point).
pub const DEFAULT_TARGET_SCALE: f64 = 5.0;

/// Default fractional cutoff for [`StatsCalculator::custom_round`].
pub const DEFAULT_ROUND_THRESHOLD: f64 = 0.5;

/// Target scale and rounding rule used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeScale {
    pub target: f64,
    pub round_threshold: f64,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_SCALE,
            round_threshold: DEFAULT_ROUND_THRESHOLD,
        }
    }
}

/// Per-row derived values for a sub-table of grade columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub sum: Vec<f64>,
    pub average: Vec<f64>,
    pub round: Vec<f64>,
}

/// Column summary appended below a to-view table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub max: f64,
    pub sum: f64,
    pub average: f64,
    pub average_scaled: f64,
}

impl ColumnSummary {
    /// Values in row order: max, sum, average, average in target scale.
    pub fn to_array(self) -> [f64; 4] {
        [self.max, self.sum, self.average, self.average_scaled]
    }
}

/// Test-score / grade ratios with their zero-excluding averages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexTable {
    /// One vector per item pair, one entry per subject.
    pub ratios: Vec<Vec<f64>>,
    /// Row-wise average per subject (LSI).
    pub row_average: Vec<f64>,
    /// Column-wise average per item, followed by the average of `row_average` (LTI).
    pub column_average: Vec<f64>,
}

/// Straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Stateless grade statistics.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Round with a custom threshold: a fractional part at or above
    /// `threshold` rounds up, anything below truncates.
    pub fn custom_round(number: f64, threshold: f64) -> i64 {
        let whole = number.trunc();
        if number - whole >= threshold {
            whole as i64 + 1
        } else {
            whole as i64
        }
    }

    /// Mean of the non-zero entries; zero when every entry is zero.
    pub fn zero_excluding_average(values: &[f64]) -> f64 {
        let (sum, count) = values
            .iter()
            .filter(|v| **v != 0.0)
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));

        if count > 0 {
            sum / count as f64
        } else {
            0.0
        }
    }

    /// Largest value of a column, zero for an empty column.
    pub fn column_max(values: &[f64]) -> f64 {
        values.iter().copied().reduce(f64::max).unwrap_or(0.0)
    }

    /// Sum, normalized average and rounded grade per row.
    ///
    /// `columns` holds already cleaned values, one vector per column, all of
    /// the same length. Each column is divided by its own maximum, so every
    /// column must contain at least one non-zero value; a zero maximum yields
    /// non-finite averages.
    pub fn aggregate(columns: &[Vec<f64>], scale: &GradeScale) -> Aggregate {
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        let count = columns.len() as f64;

        let maxima: Vec<f64> = columns.iter().map(|c| Self::column_max(c)).collect();

        let mut sum = vec![0.0; rows];
        let mut average = vec![0.0; rows];

        for (column, max) in columns.iter().zip(&maxima) {
            for (row, value) in column.iter().enumerate() {
                sum[row] += value;
                average[row] += value / max * scale.target / count;
            }
        }

        let round = average
            .iter()
            .map(|v| Self::custom_round(*v, scale.round_threshold) as f64)
            .collect();

        Aggregate {
            sum,
            average,
            round,
        }
    }

    /// Max, sum, mean and mean-in-target-scale of a single column.
    ///
    /// The scaled mean is divided by the column's own maximum over the data rows.
    pub fn summarize(values: &[f64], target_scale: f64) -> ColumnSummary {
        let max = Self::column_max(values);
        let sum: f64 = values.iter().sum();
        let average = sum / values.len() as f64;

        ColumnSummary {
            max,
            sum,
            average,
            average_scaled: target_scale * average / max,
        }
    }

    /// Ratio table of paired test-score and grade columns.
    ///
    /// Inputs are cleaned before dividing and the ratios are cleaned again, so
    /// a zero grade yields a zero ratio instead of inf or NaN.
    pub fn index_table(grades: &[Vec<f64>], tests: &[Vec<f64>]) -> IndexTable {
        let clean = |v: f64| DataProcessor::clean_value(Some(v));

        let ratios: Vec<Vec<f64>> = grades
            .iter()
            .zip(tests)
            .map(|(grade, test)| {
                grade
                    .iter()
                    .zip(test)
                    .map(|(g, t)| clean(clean(*t) / clean(*g)))
                    .collect()
            })
            .collect();

        let rows = ratios.first().map(Vec::len).unwrap_or(0);
        let row_average: Vec<f64> = (0..rows)
            .map(|row| {
                let values: Vec<f64> = ratios.iter().map(|c| c[row]).collect();
                Self::zero_excluding_average(&values)
            })
            .collect();

        let column_average = ratios
            .iter()
            .chain(std::iter::once(&row_average))
            .map(|c| Self::zero_excluding_average(c))
            .collect();

        IndexTable {
            ratios,
            row_average,
            column_average,
        }
    }

    /// Ordinary least-squares line through `(x, y)`.
    ///
    /// With fewer than two points or no spread in `x` the line is flat at the
    /// mean of `y`.
    pub fn linear_fit(x: &[f64], y: &[f64]) -> LinearFit {
        let n = x.len().min(y.len());
        let (x, y) = (&x[..n], &y[..n]);

        let y_mean = if n == 0 { 0.0 } else { y.iter().mean() };
        if n < 2 {
            return LinearFit {
                slope: 0.0,
                intercept: y_mean,
            };
        }

        let x_var = x.iter().variance();
        if !(x_var.is_finite() && x_var > 0.0) {
            return LinearFit {
                slope: 0.0,
                intercept: y_mean,
            };
        }

        let slope = x.iter().covariance(y.iter()) / x_var;
        LinearFit {
            slope,
            intercept: y_mean - slope * x.iter().mean(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_custom_round() {
        assert_eq!(StatsCalculator::custom_round(2.4, 0.5), 2);
        assert_eq!(StatsCalculator::custom_round(2.5, 0.5), 3);
        assert_eq!(StatsCalculator::custom_round(2.49999, 0.5), 2);
        assert_eq!(StatsCalculator::custom_round(0.0, 0.5), 0);
        assert_eq!(StatsCalculator::custom_round(4.7, 0.8), 4);
    }

    #[test]
    fn test_zero_excluding_average() {
        assert_eq!(StatsCalculator::zero_excluding_average(&[0.0, 0.0, 4.0, 6.0]), 5.0);
        assert_eq!(StatsCalculator::zero_excluding_average(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(StatsCalculator::zero_excluding_average(&[]), 0.0);
    }

    #[test]
    fn test_aggregate_grade_subtable() {
        let columns = vec![vec![1.0, 0.0, 4.0], vec![2.0, 0.0, 4.0]];
        let agg = StatsCalculator::aggregate(&columns, &GradeScale::default());

        assert_eq!(agg.sum, vec![3.0, 0.0, 8.0]);
        // Row 0: 1/4*5/2 + 2/4*5/2 = 1.875
        assert!(approx(agg.average[0], 1.875));
        assert!(approx(agg.average[2], 5.0));
        assert_eq!(agg.round, vec![2.0, 0.0, 5.0]);
    }

    #[test]
    fn test_round_stays_within_scale() {
        let columns = vec![
            vec![3.0, 7.0, 10.0, 0.0, 5.5],
            vec![1.0, 1.0, 0.5, 2.0, 0.0],
            vec![9.0, 0.0, 4.0, 9.0, 8.9],
        ];
        let scale = GradeScale {
            target: 10.0,
            round_threshold: 0.3,
        };
        let agg = StatsCalculator::aggregate(&columns, &scale);

        for (row, r) in agg.round.iter().enumerate() {
            assert!(*r >= 0.0 && *r <= 10.0, "row {row} rounded to {r}");
            assert_eq!(r.fract(), 0.0);
            let expected_sum: f64 = columns.iter().map(|c| c[row]).sum();
            assert!(approx(agg.sum[row], expected_sum));
        }
    }

    #[test]
    fn test_summarize() {
        let summary = StatsCalculator::summarize(&[3.0, 0.0, 8.0], 5.0);
        assert_eq!(summary.max, 8.0);
        assert_eq!(summary.sum, 11.0);
        assert!(approx(summary.average, 11.0 / 3.0));
        assert!(approx(summary.average_scaled, 5.0 * (11.0 / 3.0) / 8.0));
    }

    #[test]
    fn test_index_table_recleans_division_by_zero() {
        let grades = vec![vec![2.0], vec![0.0]];
        let tests = vec![vec![4.0], vec![0.0]];
        let table = StatsCalculator::index_table(&grades, &tests);

        assert_eq!(table.ratios, vec![vec![2.0], vec![0.0]]);
        assert_eq!(table.row_average, vec![2.0]);
        assert_eq!(table.column_average, vec![2.0, 0.0, 2.0]);
    }

    #[test]
    fn test_index_table_nonzero_over_zero() {
        let grades = vec![vec![0.0, 4.0]];
        let tests = vec![vec![3.0, f64::INFINITY]];
        let table = StatsCalculator::index_table(&grades, &tests);

        assert_eq!(table.ratios, vec![vec![0.0, 0.0]]);
        assert!(table.ratios.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_linear_fit() {
        let fit = StatsCalculator::linear_fit(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!(approx(fit.slope, 2.0));
        assert!(approx(fit.intercept, 0.0));
        assert!(approx(fit.predict(4.0), 8.0));
    }

    #[test]
    fn test_linear_fit_degenerate() {
        let fit = StatsCalculator::linear_fit(&[2.0, 2.0], &[1.0, 3.0]);
        assert_eq!(fit.slope, 0.0);
        assert!(approx(fit.intercept, 2.0));

        let single = StatsCalculator::linear_fit(&[1.0], &[7.0]);
        assert_eq!(single.intercept, 7.0);
    }
}

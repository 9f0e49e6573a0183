//! Chart Plotter Module
//! Prepares the series drawn by the renderer from derived grade tables.

use crate::stats::{LinearFit, StatsCalculator};
use std::collections::BTreeMap;

/// Scatter points with their least-squares line.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSeries {
    pub points: Vec<(f64, f64)>,
    pub fit: LinearFit,
}

impl CorrelationSeries {
    /// Endpoints of the fitted line across the x range of the points.
    pub fn line_endpoints(&self) -> Option<[(f64, f64); 2]> {
        let (min, max) = Self::bounds(self.points.iter().map(|p| p.0))?;
        Some([
            (min, self.fit.predict(min)),
            (max, self.fit.predict(max)),
        ])
    }

    pub(crate) fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Builds chart series; no drawing happens here.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Count subjects per rounded grade, in ascending grade order.
    pub fn grade_distribution(rounded: &[f64]) -> Vec<(i64, usize)> {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for grade in rounded {
            *counts.entry(*grade as i64).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    /// Bars at positions 1..=n for the given per-item values.
    pub fn popularity(values: &[f64]) -> Vec<(usize, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (i + 1, *v))
            .collect()
    }

    /// Scatter of `x` against `y` with the fitted line of `y` on `x`.
    pub fn correlation(x: &[f64], y: &[f64]) -> CorrelationSeries {
        CorrelationSeries {
            points: x.iter().copied().zip(y.iter().copied()).collect(),
            fit: StatsCalculator::linear_fit(x, y),
        }
    }

    /// Tally catalog mentions in free-text answers.
    ///
    /// `terms[i]` is searched for as a substring of every answer and each hit
    /// counts toward `categories[i]`. Repeated terms are only matched once.
    pub fn benefit_tally(
        answers: &[String],
        categories: &[String],
        terms: &[String],
    ) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> =
            categories.iter().map(|c| (c.clone(), 0)).collect();

        let mut pairs: Vec<(&str, usize)> = Vec::with_capacity(terms.len());
        for (idx, term) in terms.iter().enumerate().take(categories.len()) {
            match pairs.iter_mut().find(|pair| pair.0 == term.as_str()) {
                Some(pair) => pair.1 = idx,
                None => pairs.push((term.as_str(), idx)),
            }
        }

        for answer in answers {
            for (term, idx) in &pairs {
                if answer.contains(*term) {
                    counts[*idx].1 += 1;
                }
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_grade_distribution_sorted() {
        let dist = ChartPlotter::grade_distribution(&[5.0, 3.0, 5.0, 0.0, 3.0, 5.0]);
        assert_eq!(dist, vec![(0, 1), (3, 2), (5, 3)]);
    }

    #[test]
    fn test_popularity_positions() {
        let bars = ChartPlotter::popularity(&[2.5, 4.0]);
        assert_eq!(bars, vec![(1, 2.5), (2, 4.0)]);
    }

    #[test]
    fn test_correlation_line() {
        let series = ChartPlotter::correlation(&[3.0, 1.0, 2.0], &[6.0, 2.0, 4.0]);
        let [start, end] = series.line_endpoints().unwrap();
        assert!((start.0 - 1.0).abs() < 1e-9 && (start.1 - 2.0).abs() < 1e-9);
        assert!((end.0 - 3.0).abs() < 1e-9 && (end.1 - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_benefit_tally() {
        let answers = strings(&[
            "Mostly workbooks and video lectures",
            "video lectures",
            "nothing",
        ]);
        let tally = ChartPlotter::benefit_tally(
            &answers,
            &strings(&["Workbooks", "Videos"]),
            &strings(&["workbooks", "video lectures"]),
        );
        assert_eq!(
            tally,
            vec![("Workbooks".to_string(), 1), ("Videos".to_string(), 2)]
        );
    }
}

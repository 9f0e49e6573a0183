//! Static Chart Renderer
//! Draws PNG charts with plotters' bitmap backend.
//!
//! Charts:
//! 1. Grade distribution pie with percentages and a legend
//! 2. Bar chart of per-item average scores
//! 3. Scatter plot with the least-squares line
//! 4. Bar chart of study aid mentions

use crate::charts::CorrelationSeries;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Nothing to draw for {0}")]
    NoData(&'static str),
}

fn render_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

const FONT: &str = "sans-serif";

// Pie slice colors
const CYAN: RGBColor = RGBColor(0, 191, 191);
const MOCCASIN: RGBColor = RGBColor(255, 228, 181);
const SIENNA: RGBColor = RGBColor(160, 82, 45);
const SILVER: RGBColor = RGBColor(192, 192, 192);
const GOLD: RGBColor = RGBColor(255, 215, 0);
const PIE_COLORS: [RGBColor; 5] = [CYAN, MOCCASIN, SIENNA, SILVER, GOLD];

const BAR_GREEN: RGBColor = RGBColor(0, 128, 0);
const BAR_BLUE: RGBColor = RGBColor(31, 119, 180);
const SALMON: RGBColor = RGBColor(250, 128, 114);

/// Default canvas size (matches a 6.4 x 4.8 inch figure at 100 dpi)
const CHART_SIZE: (u32, u32) = (640, 480);
const WIDE_CHART_SIZE: (u32, u32) = (1000, 500);

/// Y axis tick step of the study aid chart
pub const BENEFIT_TICK_STEP: usize = 4;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Pie chart of rounded grade counts, starting at 140 degrees.
    pub fn draw_grade_pie(
        path: &Path,
        title: &str,
        distribution: &[(i64, usize)],
    ) -> Result<(), ChartError> {
        if distribution.is_empty() {
            return Err(ChartError::NoData("grade distribution"));
        }

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let area = root.titled(title, (FONT, 22)).map_err(render_err)?;

        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.38;

        let sizes: Vec<f64> = distribution.iter().map(|(_, n)| *n as f64).collect();
        let labels: Vec<String> = distribution.iter().map(|(g, _)| g.to_string()).collect();
        let colors: Vec<RGBColor> = (0..distribution.len())
            .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(140.0);
        pie.label_style((FONT, 16).into_font().color(&BLACK));
        pie.percentages((FONT, 14).into_font().color(&BLACK));
        area.draw(&pie).map_err(render_err)?;

        // Legend in the upper right corner
        let legend_x = width as i32 - 90;
        for (i, (label, color)) in labels.iter().zip(&colors).enumerate() {
            let y = 10 + i as i32 * 22;
            area.draw(&Rectangle::new(
                [(legend_x, y), (legend_x + 16, y + 14)],
                color.filled(),
            ))
            .map_err(render_err)?;
            area.draw(&Text::new(
                label.clone(),
                (legend_x + 24, y),
                (FONT, 14).into_font(),
            ))
            .map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Vertical bars at positions 1..=n with a horizontal grid.
    pub fn draw_popularity_bars(
        path: &Path,
        labels: &[String],
        bars: &[(usize, f64)],
    ) -> Result<(), ChartError> {
        if bars.is_empty() {
            return Err(ChartError::NoData("task popularity"));
        }
        let (title, x_desc, y_desc) = Self::three_labels(labels)?;

        let finite_max = bars
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let y_max = if finite_max > 0.0 { finite_max * 1.1 } else { 1.0 };
        let x_max = bars.len() as f64 + 0.5;

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.5..x_max, 0.0..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|v| Self::integer_label(*v))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(bars.iter().filter(|(_, v)| v.is_finite()).map(|(x, v)| {
                let x = *x as f64;
                Rectangle::new([(x - 0.25, 0.0), (x + 0.25, *v)], BAR_GREEN.filled())
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Scatter of the series with its fitted line and a legend.
    pub fn draw_correlation(
        path: &Path,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        series: &CorrelationSeries,
    ) -> Result<(), ChartError> {
        let Some([start, end]) = series.line_endpoints() else {
            return Err(ChartError::NoData("correlation"));
        };

        let (x_lo, x_hi) = Self::padded(
            CorrelationSeries::bounds(series.points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0)),
        );
        let (y_lo, y_hi) = Self::padded(
            CorrelationSeries::bounds(
                series
                    .points
                    .iter()
                    .map(|p| p.1)
                    .chain([start.1, end.1]),
            )
            .unwrap_or((0.0, 1.0)),
        );

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                series
                    .points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 5, SALMON.filled())),
            )
            .map_err(render_err)?
            .label("Points")
            .legend(|(x, y)| Circle::new((x, y), 5, SALMON.filled()));

        chart
            .draw_series(LineSeries::new([start, end], &BLACK))
            .map_err(render_err)?
            .label("Line")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Bars per study aid category; y labels every [`BENEFIT_TICK_STEP`].
    pub fn draw_benefit_bars(
        path: &Path,
        labels: &[String],
        tally: &[(String, usize)],
    ) -> Result<(), ChartError> {
        if tally.is_empty() {
            return Err(ChartError::NoData("study aids"));
        }
        let (title, y_desc, x_desc) = Self::three_labels(labels)?;

        let max = tally.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let y_top = (max / BENEFIT_TICK_STEP + 1) * BENEFIT_TICK_STEP;
        let names: Vec<String> = tally.iter().map(|(name, _)| name.clone()).collect();

        let root = BitMapBackend::new(path, WIDE_CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5..tally.len() as f64 - 0.5, 0.0..y_top as f64)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(tally.len())
            .x_label_formatter(&|v| {
                let idx = v.round();
                if (v - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                names.get(idx as usize).cloned().unwrap_or_default()
            })
            .y_labels(y_top / BENEFIT_TICK_STEP + 1)
            .y_label_formatter(&|v| format!("{:.0}", v))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(tally.iter().enumerate().map(|(i, (_, n))| {
                let x = i as f64;
                Rectangle::new([(x - 0.25, 0.0), (x + 0.25, *n as f64)], BAR_BLUE.filled())
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    fn three_labels(labels: &[String]) -> Result<(&str, &str, &str), ChartError> {
        match labels {
            [a, b, c] => Ok((a.as_str(), b.as_str(), c.as_str())),
            _ => Err(ChartError::Render(format!(
                "expected 3 chart labels, got {}",
                labels.len()
            ))),
        }
    }

    fn integer_label(v: f64) -> String {
        if (v - v.round()).abs() < 1e-6 {
            format!("{:.0}", v)
        } else {
            String::new()
        }
    }

    /// Widen a range so single-valued data still has a visible span.
    fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
        let span = hi - lo;
        if span.abs() < f64::EPSILON || !span.is_finite() {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo - span * 0.05, hi + span * 0.05)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        assert_eq!(StaticChartRenderer::padded((2.0, 2.0)), (1.0, 3.0));
        let (lo, hi) = StaticChartRenderer::padded((0.0, 10.0));
        assert!(lo < 0.0 && hi > 10.0);
    }

    #[test]
    fn test_integer_label() {
        assert_eq!(StaticChartRenderer::integer_label(3.0), "3");
        assert_eq!(StaticChartRenderer::integer_label(2.5), "");
    }

    #[test]
    fn test_empty_pie_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.png");
        let result = StaticChartRenderer::draw_grade_pie(&path, "Grades", &[]);
        assert!(matches!(result, Err(ChartError::NoData(_))));
        assert!(!path.exists());
    }
}

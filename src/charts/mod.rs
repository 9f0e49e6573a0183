//! Charts module - series preparation and PNG rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, CorrelationSeries};
pub use renderer::{ChartError, StaticChartRenderer, BENEFIT_TICK_STEP};

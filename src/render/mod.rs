//! Chart rendering.
//!
//! The prepared series is handed to a [`ChartRenderer`] which returns encoded
//! image bytes. Nothing in `prep` depends on this module, so the data pipeline
//! can be tested without any drawing stack.

use chrono::NaiveDate;

use crate::domain::PreparedSeries;
use crate::error::AppError;

pub mod png;
pub mod svg;

pub use png::PngChartRenderer;
pub use svg::SvgChartRenderer;

/// Everything a renderer needs for one chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub prepared: &'a PreparedSeries,
    /// Date shown in the caption.
    pub generated: NaiveDate,
}

pub trait ChartRenderer {
    /// Extension of the files this renderer produces, without the dot.
    fn file_extension(&self) -> &'static str;

    fn render(&self, input: &ChartInput<'_>) -> Result<Vec<u8>, AppError>;
}

/// Annotation text for an anchor, e.g. `"Yesterday:"` / `"421.35 ppm"`.
pub fn anchor_label(heading: &str, ppm: f64) -> [String; 2] {
    [format!("{heading}:"), format!("{ppm:.2} ppm")]
}

//! PNG output: the plotters SVG chart rasterized with resvg.
//!
//! Text is shaped from system fonts at rasterization time. When a generic
//! family the chart asks for resolves to nothing installed, the first
//! available face stands in for it so the annotations are not dropped.

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::fontdb::{Database, Family, Query};
use resvg::usvg::{Options, Tree};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::render::{ChartInput, ChartRenderer, SvgChartRenderer};

#[derive(Debug, Clone, Copy, Default)]
pub struct PngChartRenderer {
    pub svg: SvgChartRenderer,
}

impl ChartRenderer for PngChartRenderer {
    fn file_extension(&self) -> &'static str {
        "png"
    }

    fn render(&self, input: &ChartInput<'_>) -> Result<Vec<u8>, AppError> {
        let svg = self.svg.render(input)?;
        rasterize(&svg)
    }
}

/// Rasterize an SVG document at its own pixel size and encode it as PNG.
pub fn rasterize(svg: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut options = Options::default();
    let fonts = options.fontdb_mut();
    fonts.load_system_fonts();
    ensure_generic_families(fonts);

    let tree = Tree::from_data(svg, &options).map_err(|e| AppError::Render(format!("Invalid chart SVG: {e}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| AppError::Render(format!("Cannot allocate {}x{} image", size.width(), size.height())))?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    let png = pixmap
        .encode_png()
        .map_err(|e| AppError::Render(format!("Failed to encode PNG: {e}")))?;
    debug!(width = size.width(), height = size.height(), bytes = png.len(), "Rasterized chart");
    Ok(png)
}

/// Point the generic families the chart uses at an installed face when the
/// defaults (Arial, Courier New) are absent.
fn ensure_generic_families(fonts: &mut Database) {
    let Some(fallback) = fonts
        .faces()
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
    else {
        warn!("No system fonts found; chart text will be missing");
        return;
    };
    for family in [Family::SansSerif, Family::Monospace] {
        let query = Query {
            families: &[family],
            ..Query::default()
        };
        if fonts.query(&query).is_some() {
            continue;
        }
        debug!(?family, fallback = %fallback, "Substituting font family");
        match family {
            Family::Monospace => fonts.set_monospace_family(fallback.clone()),
            _ => fonts.set_sans_serif_family(fallback.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::domain::{AnchorPoint, Anchors, DailyRecord, DisplayWindow, PreparedSeries, Series};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn prepared() -> PreparedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records: Vec<_> = (0..370)
            .map(|i| DailyRecord::new(start + Duration::days(i), 420.0 + i as f64 * 0.01, 419.5))
            .collect();
        let series = Series::from_sorted(records);
        let last = series.len() - 1;
        let anchors = Anchors {
            yesterday: AnchorPoint {
                index: last,
                record: series.records()[last],
            },
            year_ago: AnchorPoint {
                index: last - 365,
                record: series.records()[last - 365],
            },
        };
        PreparedSeries {
            monthly: Vec::new(),
            window: DisplayWindow {
                start,
                end: series.records()[last].date,
            },
            anchors,
            series,
        }
    }

    fn ihdr_size(png: &[u8]) -> (u32, u32) {
        let width = u32::from_be_bytes(png[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(png[20..24].try_into().unwrap());
        (width, height)
    }

    #[test]
    fn renders_png_at_chart_size() {
        let prepared = prepared();
        let input = ChartInput {
            prepared: &prepared,
            generated: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        };
        let renderer = PngChartRenderer::default();
        let png = renderer.render(&input).unwrap();

        assert_eq!(renderer.file_extension(), "png");
        assert!(png.starts_with(PNG_SIGNATURE), "not a PNG");
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(ihdr_size(&png), (1400, 1000));
    }

    #[test]
    fn custom_size_carries_through() {
        let prepared = prepared();
        let input = ChartInput {
            prepared: &prepared,
            generated: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        };
        let renderer = PngChartRenderer {
            svg: SvgChartRenderer {
                width: 700,
                height: 500,
            },
        };
        let png = renderer.render(&input).unwrap();
        assert_eq!(ihdr_size(&png), (700, 500));
    }

    #[test]
    fn malformed_svg_is_render_error() {
        let err = rasterize(b"<svg").unwrap_err();
        assert!(matches!(err, AppError::Render(ref msg) if msg.contains("Invalid chart SVG")));
    }
}

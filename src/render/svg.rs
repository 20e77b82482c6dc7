//! Plotters-powered SVG chart of the windowed CO2 series.
//!
//! Layout follows the daily chart: monthly means as open circles, the trend as
//! a thick line, and the two anchors highlighted with curved callouts.
//!
//! The SVG backend emits text as markup, so no font files are needed.

use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::domain::PreparedSeries;
use crate::error::AppError;
use crate::render::{ChartInput, ChartRenderer, anchor_label};

pub const TITLE: &str = "Carbon dioxide: current global average";
pub const SUBTITLE: &str = "Atmospheric CO\u{2082}, parts per million";

const MONTH_COLOR: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);
const TREND_COLOR: RGBColor = RGBColor(0xff, 0x99, 0x99);
const HIGHLIGHT_COLOR: RGBColor = RGBColor(0xff, 0xcc, 0x99);
const TEXT_COLOR: RGBColor = RGBColor(0x66, 0x66, 0x66);
const GRID_COLOR: RGBColor = RGBColor(0xf7, 0xf7, 0xf7);

/// Vertical padding around the data (ppm).
const Y_PADDING: f64 = 1.5;
const ARROW_STEPS: usize = 24;
const HEAD_LEN: f64 = 18.0;
const HEAD_ANGLE: f64 = 0.45;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 1000,
        }
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn file_extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, input: &ChartInput<'_>) -> Result<Vec<u8>, AppError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            draw_chart(&root, input).map_err(|e| AppError::Render(e.to_string()))?;
            root.present().map_err(|e| AppError::Render(e.to_string()))?;
        }
        debug!(bytes = svg.len(), "Rendered SVG chart");
        Ok(svg.into_bytes())
    }
}

fn draw_chart(root: &DrawingArea<SVGBackend<'_>, Shift>, input: &ChartInput<'_>) -> DrawResult {
    let prepared = input.prepared;
    let window = prepared.window;
    let anchors = prepared.anchors;

    root.fill(&WHITE)?;

    let (header, body) = root.split_vertically(140);
    header.draw(&Text::new(
        TITLE,
        (40, 25),
        ("sans-serif", 44).into_font().style(FontStyle::Bold).color(&BLACK),
    ))?;
    header.draw(&Text::new(
        SUBTITLE,
        (40, 85),
        ("sans-serif", 32).into_font().color(&BLACK),
    ))?;

    let body_height = body.dim_in_pixel().1 as i32;
    let (plot_area, footer) = body.split_vertically(body_height - 50);
    footer.draw(&Text::new(
        caption(input.generated),
        (40, 12),
        ("sans-serif", 18).into_font().style(FontStyle::Italic).color(&TEXT_COLOR),
    ))?;

    let x_of = |date: NaiveDate| (date - window.start).num_days() as f64;
    let x_max = x_of(window.end).max(1.0);
    let (y_min, y_max) = value_bounds(prepared);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(30)
        .set_label_area_size(LabelAreaPosition::Left, 90)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    let start = window.start;
    let fmt_x = move |v: &f64| {
        (start + Duration::days(v.round() as i64))
            .format("%b %Y")
            .to_string()
    };

    // Horizontal grid only; the x axis carries dates.
    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(GRID_COLOR.stroke_width(2))
        .light_line_style(&TRANSPARENT)
        .x_labels(6)
        .y_labels(8)
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style(("monospace", 20).into_font().color(&TEXT_COLOR))
        .axis_style(&GRID_COLOR)
        .draw()?;

    let records = prepared.series.records();
    chart.draw_series(LineSeries::new(
        records.iter().map(|r| (x_of(r.date), r.trend)),
        TREND_COLOR.stroke_width(5),
    ))?;

    chart.draw_series(
        prepared
            .monthly
            .iter()
            .map(|m| Circle::new((x_of(m.month_end), m.mean), 7, MONTH_COLOR.stroke_width(2))),
    )?;

    chart.draw_series(
        [anchors.year_ago, anchors.yesterday]
            .iter()
            .map(|a| Circle::new((x_of(a.record.date), a.record.smoothed), 9, HIGHLIGHT_COLOR.filled())),
    )?;

    let yesterday = chart.backend_coord(&(
        x_of(anchors.yesterday.record.date),
        anchors.yesterday.record.smoothed,
    ));
    let year_ago = chart.backend_coord(&(
        x_of(anchors.year_ago.record.date),
        anchors.year_ago.record.smoothed,
    ));

    // Yesterday: label below-left, arrow curving up to the point.
    draw_callout(
        root,
        (yesterday.0 - 190, yesterday.1 + 170),
        (yesterday.0, yesterday.1 + 14),
        0.2,
        (yesterday.0 - 420, yesterday.1 + 170),
        &anchor_label("Yesterday", anchors.yesterday.record.smoothed),
    )?;

    // Year ago: label further left, arrow approaching from above-left.
    draw_callout(
        root,
        (year_ago.0 - 230, year_ago.1 - 60),
        (year_ago.0 - 16, year_ago.1 - 8),
        -0.2,
        (year_ago.0 - 500, year_ago.1 - 70),
        &anchor_label("One year ago", anchors.year_ago.record.smoothed),
    )?;

    Ok(())
}

fn draw_callout(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    tail: (i32, i32),
    tip: (i32, i32),
    bend: f64,
    label_at: (i32, i32),
    lines: &[String; 2],
) -> DrawResult {
    let style = HIGHLIGHT_COLOR.stroke_width(3);
    let (path, barbs) = curved_arrow(tail, tip, bend);
    root.draw(&PathElement::new(path, style))?;
    for barb in barbs {
        root.draw(&PathElement::new(vec![tip, barb], style))?;
    }

    let font = ("sans-serif", 22)
        .into_font()
        .style(FontStyle::Italic)
        .color(&TEXT_COLOR);
    for (i, line) in lines.iter().enumerate() {
        root.draw(&Text::new(
            line.as_str(),
            (label_at.0, label_at.1 + i as i32 * 28),
            font.clone(),
        ))?;
    }
    Ok(())
}

/// Quadratic curve from `from` to `to`, bowed sideways by `bend` times the
/// chord length, plus the two barb endpoints of the arrow head at `to`.
fn curved_arrow(from: (i32, i32), to: (i32, i32), bend: f64) -> (Vec<(i32, i32)>, [(i32, i32); 2]) {
    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let (x1, y1) = (to.0 as f64, to.1 as f64);
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (cx, cy) = ((x0 + x1) / 2.0 - dy * bend, (y0 + y1) / 2.0 + dx * bend);

    let path = (0..=ARROW_STEPS)
        .map(|i| {
            let t = i as f64 / ARROW_STEPS as f64;
            let u = 1.0 - t;
            let x = u * u * x0 + 2.0 * u * t * cx + t * t * x1;
            let y = u * u * y0 + 2.0 * u * t * cy + t * t * y1;
            (x.round() as i32, y.round() as i32)
        })
        .collect();

    // The curve leaves the control point heading straight for `to`.
    let back = (cy - y1).atan2(cx - x1);
    let barb = |spread: f64| {
        let a = back + spread;
        (
            (x1 + HEAD_LEN * a.cos()).round() as i32,
            (y1 + HEAD_LEN * a.sin()).round() as i32,
        )
    };

    (path, [barb(HEAD_ANGLE), barb(-HEAD_ANGLE)])
}

fn value_bounds(prepared: &PreparedSeries) -> (f64, f64) {
    let values = prepared
        .series
        .records()
        .iter()
        .map(|r| r.trend)
        .chain(prepared.monthly.iter().map(|m| m.mean))
        .chain([
            prepared.anchors.yesterday.record.smoothed,
            prepared.anchors.year_ago.record.smoothed,
        ])
        .filter(|v| v.is_finite());

    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        return (0.0, 1.0);
    }
    (lo - Y_PADDING, hi + Y_PADDING)
}

fn caption(generated: NaiveDate) -> String {
    format!(
        "Source: NOAA/ESRL | Graphic: Tushar Khurana (credit: Clayton Aldern) | Generated: {}",
        generated.format("%B %d, %Y")
    )
}

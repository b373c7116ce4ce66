//! Chart widgets for yearly series.

use fuel_forecast::dashboard::{ForecastView, X_LABEL, Y_LABEL};
use fuel_forecast::YearSeries;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
};

/// One line of a chart with its own points.
#[derive(Debug, Clone)]
pub struct LineSeries {
    pub name: &'static str,
    pub points: Vec<(f64, f64)>,
    pub color: Color,
    pub marker: Marker,
}

impl LineSeries {
    pub fn new(name: &'static str, points: Vec<(f64, f64)>, color: Color) -> Self {
        Self {
            name,
            points,
            color,
            marker: Marker::Braille,
        }
    }

    fn dotted(mut self) -> Self {
        self.marker = Marker::Dot;
        self
    }
}

/// Points of `values` against `years`; NaN entries are skipped.
pub fn year_points(years: &[i64], values: &[f64]) -> Vec<(f64, f64)> {
    years
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_finite())
        .map(|(&y, &v)| (y as f64, v))
        .collect()
}

/// Axis bounds covering every point, padded so flat lines stay visible.
pub fn bounds(lines: &[LineSeries]) -> ([f64; 2], [f64; 2]) {
    let points = lines.iter().flat_map(|l| l.points.iter());
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !x_min.is_finite() {
        return ([0.0, 1.0], [0.0, 1.0]);
    }
    if x_max - x_min < 1.0 {
        x_max = x_min + 1.0;
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-3);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

fn axis_labels(lo: f64, hi: f64, precision: usize) -> Vec<String> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect()
}

/// Draw `lines` in one bordered chart.
pub fn draw_line_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: &[LineSeries],
    axis_titles: Option<(&str, &str)>,
) {
    let ([x_lo, x_hi], [y_lo, y_hi]) = bounds(lines);
    let datasets: Vec<Dataset> = lines
        .iter()
        .map(|line| {
            Dataset::default()
                .name(line.name)
                .marker(line.marker)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(line.color))
                .data(&line.points)
        })
        .collect();

    let mut x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([x_lo, x_hi])
        .labels(axis_labels(x_lo, x_hi, 0));
    let mut y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_lo, y_hi])
        .labels(axis_labels(y_lo, y_hi, 2));
    if let Some((x_title, y_title)) = axis_titles {
        x_axis = x_axis.title(x_title.to_string());
        y_axis = y_axis.title(y_title.to_string());
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(if lines.len() > 1 {
            Some(LegendPosition::TopRight)
        } else {
            None
        });

    frame.render_widget(chart, area);
}

/// The raw yearly series.
pub fn series_lines(series: &YearSeries) -> Vec<LineSeries> {
    vec![LineSeries::new(
        "Average",
        year_points(series.years(), series.values()),
        Color::Cyan,
    )]
}

/// History, forecast, both interval bounds and a marker at the last observed year.
pub fn forecast_lines(series: &YearSeries, view: &ForecastView) -> Vec<LineSeries> {
    let rows = view.table.rows();
    let last = view.last_observed_year as f64;
    let anchor = series.get(view.last_observed_year);

    // forecast and bounds start from the last observation so the lines join
    let with_anchor = |f: fn(&fuel_forecast::ForecastRow) -> f64| -> Vec<(f64, f64)> {
        anchor
            .map(|v| (last, v))
            .into_iter()
            .chain(rows.iter().map(|r| (r.year as f64, f(r))))
            .collect()
    };

    let mut lines = vec![
        LineSeries::new("Historical", year_points(series.years(), series.values()), Color::Cyan),
        LineSeries::new("Forecast", with_anchor(|r| r.forecast), Color::Yellow),
        LineSeries::new("Lower CI", with_anchor(|r| r.lower_ci), Color::DarkGray).dotted(),
        LineSeries::new("Upper CI", with_anchor(|r| r.upper_ci), Color::DarkGray).dotted(),
    ];

    let ([_, _], [y_lo, y_hi]) = bounds(&lines);
    lines.push(
        LineSeries::new("Last year", vec![(last, y_lo), (last, y_hi)], Color::Red).dotted(),
    );
    lines
}

/// Axis titles of the forecast chart
pub fn forecast_axes() -> Option<(&'static str, &'static str)> {
    Some((X_LABEL, Y_LABEL))
}

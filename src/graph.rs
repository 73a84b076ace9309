use chrono::{Duration, NaiveDate};
use plotters::prelude::*;

/// Configuration options for chart generation
///
/// Contains the customizable properties of a rendered line chart.
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    /// Creates a default configuration: 720x360 pixels with generic labels
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: "Date".to_string(),
            y_label: String::new(),
            width: 720,
            height: 360,
        }
    }
}

/// A named sequence of dated values drawn as one line.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

/// Returns true when no series has a single point to draw.
pub fn is_blank(series: &[Series]) -> bool {
    series.iter().all(|s| s.points.is_empty())
}

/// Creates a line chart over dates from one or more series
///
/// The X-axis counts days from the earliest point and is labelled with
/// calendar dates. A legend is drawn when there is more than one series.
///
/// # Arguments
/// * `series` - The lines to draw, each sorted by date
/// * `options` - Chart styling options
///
/// # Returns
/// * A Result containing the SVG markup or an error
///
/// # Errors
/// * Returns an error if every series is empty
/// * Returns an error if any value is infinite or NaN
/// * Returns an error if the backend fails to draw
pub fn create_line_chart(
    series: &[Series],
    options: &GraphOptions,
) -> Result<String, Box<dyn std::error::Error>> {
    let all_points = || series.iter().flat_map(|s| s.points.iter());

    if all_points().any(|(_, y)| !y.is_finite()) {
        return Err("Cannot plot non-finite values".into());
    }

    let first_day = all_points()
        .map(|(d, _)| *d)
        .min()
        .ok_or("No numeric values to plot")?;
    let last_day = all_points().map(|(d, _)| *d).max().unwrap_or(first_day);

    let span = (last_day - first_day).num_days() as f64;
    let x_range = if span > 0.0 { 0.0..span } else { -0.5..0.5 };

    let min_y = all_points().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let max_y = all_points().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max);
    let pad = if max_y > min_y { (max_y - min_y) * 0.05 } else { 1.0 };
    let y_range = (min_y - pad)..(max_y + pad);
    if !(y_range.start.is_finite() && y_range.end.is_finite()) {
        return Err("Value range too large to plot".into());
    }

    let to_x = |d: &NaiveDate| (*d - first_day).num_days() as f64;
    let date_label = |x: &f64| {
        (first_day + Duration::days(x.round() as i64))
            .format("%Y-%m-%d")
            .to_string()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_labels(6)
            .x_label_formatter(&date_label)
            .draw()?;

        for (i, line) in series.iter().enumerate() {
            let color = SERIES_COLORS[i % SERIES_COLORS.len()];
            chart
                .draw_series(LineSeries::new(
                    line.points.iter().map(|(d, y)| (to_x(d), *y)),
                    color.stroke_width(2),
                ))?
                .label(line.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
    }

    Ok(svg)
}

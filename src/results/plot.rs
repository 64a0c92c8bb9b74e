//! Renders one metric over the co-training iterations as a line chart,
//! one series per recommender.

use std::collections::BTreeMap;
use std::path::Path;

use plotters::prelude::*;

use crate::errors::{Error, Result};
use super::reader::{aggregate, EvaluationRow};


fn chart_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Chart(e.to_string())
}


/// Plot `metric` against the iteration number for every recommender in
/// `rows`, writing a PNG to `output`.
pub fn plot_metric(
    rows: &[EvaluationRow],
    metric: &str,
    output: &Path,
) -> Result<()>
{
    let mut series = BTreeMap::<String, Vec<(usize, f64)>>::new();
    for ((recommender, iteration), value) in aggregate(rows, metric)? {
        series.entry(recommender).or_default().push((iteration, value));
    }
    if series.is_empty() {
        return Err(Error::Chart(
            format!("no rows to plot for `{metric}`")
        ));
    }

    let x_max = series.values()
        .flat_map(|points| points.iter().map(|&(iteration, _)| iteration))
        .max()
        .unwrap_or(0);
    let values = series.values()
        .flat_map(|points| points.iter().map(|&(_, value)| value));
    let y_min = values.clone().fold(f64::INFINITY, f64::min);
    let y_max = values.fold(f64::NEG_INFINITY, f64::max);
    let pad = ((y_max - y_min) * 0.1).max(1e-3);

    let root = BitMapBackend::new(output, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(metric, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..x_max + 1, y_min - pad..y_max + pad)
        .map_err(chart_error)?;
    chart.configure_mesh()
        .x_desc("iteration")
        .y_desc(metric)
        .draw()
        .map_err(chart_error)?;

    for (ix, (name, points)) in series.iter().enumerate() {
        let color = Palette99::pick(ix).to_rgba();
        let style = color.stroke_width(2);
        chart.draw_series(LineSeries::new(points.iter().copied(), style))
            .map_err(chart_error)?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color)
            });
    }

    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    root.present().map_err(chart_error)?;
    Ok(())
}

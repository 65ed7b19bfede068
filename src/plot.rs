use std::path::Path;

use plotters::prelude::*;

use crate::{
    error::{Error, Result},
    types::Float,
};

/// Draw time series sampled every `dt` seconds into the PNG at `path`, one
/// line per `(label, samples)` pair.
pub fn plot(
    path: impl AsRef<Path>,
    caption: &str,
    series: &[(&str, Vec<Float>)],
    dt: Float,
) -> Result<()> {
    let plot_error = |e: &dyn std::fmt::Display| Error::Plot(e.to_string());

    let num_steps = series.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
    let final_time = (num_steps.max(2) - 1) as Float * dt;
    let (min_y, max_y) = y_range(series);

    let root = BitMapBackend::new(path.as_ref(), (640, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..final_time, min_y..max_y)
        .map_err(|e| plot_error(&e))?;
    chart
        .configure_mesh()
        .x_desc("time (s)")
        .draw()
        .map_err(|e| plot_error(&e))?;

    for (i, (label, samples)) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                samples.iter().enumerate().map(|(k, y)| (k as Float * dt, *y)),
                &color,
            ))
            .map_err(|e| plot_error(&e))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| plot_error(&e))?;

    root.present().map_err(|e| plot_error(&e))
}

/// Bounds of the y axis, widened when every sample is the same
fn y_range(series: &[(&str, Vec<Float>)]) -> (Float, Float) {
    let samples = || series.iter().flat_map(|(_, s)| s.iter().cloned());
    let min_y = samples().fold(Float::INFINITY, Float::min);
    let max_y = samples().fold(Float::NEG_INFINITY, Float::max);
    if !min_y.is_finite() || !max_y.is_finite() {
        return (-1., 1.);
    }
    if max_y - min_y < 1e-9 {
        return (min_y - 1., max_y + 1.);
    }
    (min_y, max_y)
}

#[cfg(test)]
mod plot_tests {
    use super::*;

    #[test]
    fn range_spans_every_series() {
        let series = [("x", vec![0.5, 2.]), ("z", vec![-1., 0.])];
        assert_eq!(y_range(&series), (-1., 2.));
    }

    #[test]
    fn flat_and_empty_series_get_a_window() {
        assert_eq!(y_range(&[("z", vec![0.3, 0.3])]), (0.3 - 1., 0.3 + 1.));
        assert_eq!(y_range(&[]), (-1., 1.));
    }
}

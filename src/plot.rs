//! Scatter plot rendering of raw cycle samples.
//!
//! The rest of the harness only depends on the `plot(series_a, series_b,
//! title, output_path)` contract; the plotters SVG backend behind it is an
//! implementation detail.

use std::path::Path;

use anyhow::{anyhow, Result};
use plotters::prelude::*;

/// Render a scatter plot correlating iteration index against the sign
/// (`series_a`) and verify (`series_b`) cycle counts of one mode.
pub fn plot(series_a: &[u64], series_b: &[u64], title: &str, output_path: &Path) -> Result<()> {
    let n = series_a.len().max(series_b.len()).max(1);
    let y_max = series_a
        .iter()
        .chain(series_b.iter())
        .copied()
        .max()
        .unwrap_or(1)
        .max(1);

    let draw = |e: &dyn std::fmt::Display| {
        anyhow!("failed to render {}: {}", output_path.display(), e)
    };

    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw(&e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..(y_max as f64 * 1.05))
        .map_err(|e| draw(&e))?;
    chart
        .configure_mesh()
        .x_desc("iteration")
        .y_desc("cycles")
        .draw()
        .map_err(|e| draw(&e))?;

    chart
        .draw_series(
            series_a
                .iter()
                .enumerate()
                .map(|(i, &y)| Circle::new((i as f64, y as f64), 3, RED.filled())),
        )
        .map_err(|e| draw(&e))?
        .label("sign")
        .legend(|(x, y)| Circle::new((x, y), 3, RED.filled()));
    chart
        .draw_series(
            series_b
                .iter()
                .enumerate()
                .map(|(i, &y)| Circle::new((i as f64, y as f64), 3, BLUE.filled())),
        )
        .map_err(|e| draw(&e))?
        .label("verify")
        .legend(|(x, y)| Circle::new((x, y), 3, BLUE.filled()));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|e| draw(&e))?;
    root.present().map_err(|e| draw(&e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_writes_svg_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain_cycles.svg");
        plot(&[10, 20, 30], &[5, 15, 25], "plain sign/verify cycles", &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn test_plot_handles_uneven_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uneven.svg");
        plot(&[10, 20], &[5], "uneven", &path).unwrap();
        assert!(path.exists());
    }
}

//! Segmentation scatter plot rendering using Plotters
//!
//! Charts carry no text so rendering works on hosts without a font stack.

use crate::error::Error;
use crate::segmentation::{SegmentPoint, FALLBACK_PERSONA};
use plotters::prelude::*;
use std::path::Path;

/// Persona colours, matching the dashboard palette
const PERSONA_COLORS: [(&str, RGBColor); 5] = [
    ("Wealth Builders", RGBColor(16, 185, 129)),
    ("Pre-Retirees", RGBColor(59, 130, 246)),
    ("Disengaged Youth", RGBColor(148, 163, 184)),
    ("High Value At Risk", RGBColor(239, 68, 68)),
    ("Stable Savers", RGBColor(245, 158, 11)),
];

/// Colour for a persona label; the fallback persona is drawn in black
pub fn persona_color(segment: &str) -> RGBColor {
    PERSONA_COLORS
        .iter()
        .find(|(label, _)| *label == segment)
        .map(|(_, color)| *color)
        .unwrap_or(BLACK)
}

/// Plot ranges covering every point with half a unit of padding
pub fn plot_bounds(points: &[SegmentPoint]) -> ((f64, f64), (f64, f64)) {
    if points.is_empty() {
        return ((-1.0, 1.0), (-1.0, 1.0));
    }
    let fold = |f: fn(&SegmentPoint) -> f64| {
        points.iter().map(f).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (x_min, x_max) = fold(|p| p.pca_x);
    let (y_min, y_max) = fold(|p| p.pca_y);
    ((x_min - 0.5, x_max + 0.5), (y_min - 0.5, y_max + 0.5))
}

/// Render the projected members as a PNG scatter plot coloured by persona
pub fn render_segmentation(points: &[SegmentPoint], output_path: &Path) -> crate::Result<()> {
    let render_err = |e: &dyn std::fmt::Display| Error::Render(e.to_string());
    let ((x_min, x_max), (y_min, y_max)) = plot_bounds(points);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| render_err(&e))?;

    // General Portfolio first so labelled personas stay visible on top
    let (fallback, labelled): (Vec<&SegmentPoint>, Vec<&SegmentPoint>) =
        points.iter().partition(|p| p.segment == FALLBACK_PERSONA);

    for point in fallback.into_iter().chain(labelled) {
        let color = persona_color(&point.segment);
        chart
            .draw_series(std::iter::once(Circle::new((point.pca_x, point.pca_y), 4, color.filled())))
            .map_err(|e| render_err(&e))?;
    }

    root.present().map_err(|e| render_err(&e))?;
    tracing::info!(path = %output_path.display(), points = points.len(), "segmentation plot saved");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn point(x: f64, y: f64, segment: &str) -> SegmentPoint {
        SegmentPoint {
            pca_x: x,
            pca_y: y,
            segment: segment.to_string(),
            super_balance: None,
            age: None,
            churn_probability: None,
            app_sessions_per_month: None,
        }
    }

    #[test]
    fn test_plot_bounds_pad_extremes() {
        let points = vec![point(-2.0, 1.0, "Stable Savers"), point(3.0, -1.0, "Pre-Retirees")];
        assert_eq!(plot_bounds(&points), ((-2.5, 3.5), (-1.5, 1.5)));
        assert_eq!(plot_bounds(&[]), ((-1.0, 1.0), (-1.0, 1.0)));
    }

    #[test]
    fn test_persona_color_fallback() {
        assert_eq!(persona_color("High Value At Risk"), RGBColor(239, 68, 68));
        assert_eq!(persona_color(FALLBACK_PERSONA), BLACK);
    }

    #[test]
    fn test_render_segmentation() {
        let points = vec![
            point(-1.0, 0.5, "Wealth Builders"),
            point(0.0, 0.0, FALLBACK_PERSONA),
            point(1.2, -0.7, "Stable Savers"),
        ];
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("segments.png");

        render_segmentation(&points, &output_path).unwrap();
        assert!(output_path.exists());
    }
}

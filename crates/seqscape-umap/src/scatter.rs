//! SVG scatter plot of a 2-D layout.
use anyhow::Result;
use ndarray::Array2;
use std::path::Path;
use svg::node::element::{Circle, Rectangle};
use svg::Document;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 600.0;
const MARGIN: f64 = 30.0;
const RADIUS: f64 = 3.0;

/// Renders `points` (an `n x 2` matrix) as an SVG scatter plot. `labels`
/// runs parallel to the rows; a prefix of each label is attached to its
/// point as a `data-id` attribute.
pub fn plot(points: &Array2<f32>, labels: &[String]) -> Document {
    let (min_x, max_x) = column_range(points, 0);
    let (min_y, max_y) = column_range(points, 1);
    let span_x = (max_x - min_x).max(f32::EPSILON) as f64;
    let span_y = (max_y - min_y).max(f32::EPSILON) as f64;

    let document = Document::new()
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .set("viewBox", (0.0, 0.0, WIDTH, HEIGHT))
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        );

    (0..points.nrows()).fold(document, |doc, i| {
        let cx = MARGIN + (points[[i, 0]] as f64 - min_x as f64) / span_x * (WIDTH - 2.0 * MARGIN);
        // SVG y grows downward
        let cy = HEIGHT
            - MARGIN
            - (points[[i, 1]] as f64 - min_y as f64) / span_y * (HEIGHT - 2.0 * MARGIN);
        let label = labels.get(i).map(|l| truncated(l)).unwrap_or_default();
        doc.add(
            Circle::new()
                .set("cx", cx)
                .set("cy", cy)
                .set("r", RADIUS)
                .set("fill", "steelblue")
                .set("fill-opacity", 0.8)
                .set("data-id", label),
        )
    })
}

/// Renders and writes the scatter plot to `path`.
pub fn save<P: AsRef<Path>>(path: P, points: &Array2<f32>, labels: &[String]) -> Result<()> {
    svg::save(path, &plot(points, labels))?;
    Ok(())
}

fn column_range(points: &Array2<f32>, col: usize) -> (f32, f32) {
    points
        .column(col)
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn truncated(label: &str) -> String {
    const MAX: usize = 40;
    match label.char_indices().nth(MAX) {
        None => label.to_string(),
        Some((idx, _)) => format!("{}...", &label[..idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_plot_contains_one_circle_per_point() {
        let points = array![[0.0f32, 0.0], [1.0, 1.0], [2.0, 0.5]];
        let labels = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
        let rendered = plot(&points, &labels).to_string();
        assert_eq!(rendered.matches("<circle").count(), 3);
        assert!(rendered.contains("data-id=\"AAA\""));
    }

    #[test]
    fn test_coincident_points_do_not_divide_by_zero() {
        let points = array![[1.0f32, 1.0], [1.0, 1.0]];
        let labels = vec!["A".to_string(), "B".to_string()];
        let rendered = plot(&points, &labels).to_string();
        assert!(!rendered.contains("NaN"));
    }

    #[test]
    fn test_save_writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.svg");
        let points = array![[0.0f32, 0.0], [5.0, 5.0]];
        let labels = vec!["X".to_string(), "Y".to_string()];
        save(&path, &points, &labels).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<svg"));
    }

    #[test]
    fn test_multibyte_labels_truncate_on_char_boundary() {
        let label = "あ".repeat(50);
        let points = array![[0.0f32, 0.0]];
        let rendered = plot(&points, &[label]).to_string();
        assert!(rendered.contains(&format!("{}...", "あ".repeat(40))));
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let long = "M".repeat(200);
        let points = array![[0.0f32, 0.0]];
        let rendered = plot(&points, &[long]).to_string();
        assert!(rendered.contains(&format!("{}...", "M".repeat(40))));
    }
}

//! Color gradients sampled by the paintbrush.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A color at a position along the gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position (0.0 to 1.0)
    pub position: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Piecewise linear gradient through sorted color stops.
///
/// Positions before the first stop take the first color, positions after the
/// last stop take the last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<GradientStop>", into = "Vec<GradientStop>")]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl From<Vec<GradientStop>> for Gradient {
    fn from(stops: Vec<GradientStop>) -> Self {
        Self::new(stops)
    }
}

impl From<Gradient> for Vec<GradientStop> {
    fn from(gradient: Gradient) -> Self {
        gradient.stops
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::two_color(Color::BLACK, Color::WHITE)
    }
}

impl Gradient {
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { stops }
    }

    /// Gradient from `start` at 0.0 to `end` at 1.0.
    pub fn two_color(start: Color, end: Color) -> Self {
        Self {
            stops: vec![GradientStop::new(0.0, start), GradientStop::new(1.0, end)],
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color at `t`, read right to left when `reverse` is set.
    pub fn sample(&self, t: f64, reverse: bool) -> Color {
        // NaN reads as the start of the gradient.
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) as f32 };
        let t = if reverse { 1.0 - t } else { t };

        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::TRANSPARENT,
        };
        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }

        // First stop strictly after t; the one before it starts the segment.
        let upper = self.stops.partition_point(|s| s.position <= t);
        let a = &self.stops[upper - 1];
        let b = &self.stops[upper];
        let span = b.position - a.position;
        if span <= f32::EPSILON {
            return b.color;
        }
        a.color.lerp(b.color, (t - a.position) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        a.to_array()
            .iter()
            .zip(b.to_array())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_two_color_midpoint() {
        let g = Gradient::two_color(Color::BLACK, Color::WHITE);
        let mid = g.sample(0.5, false);
        assert!(close(mid, Color::rgb(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_reverse() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let g = Gradient::two_color(red, blue);
        assert!(close(g.sample(0.0, true), blue));
        assert!(close(g.sample(1.0, true), red));
    }

    #[test]
    fn test_ends_are_clamped() {
        let g = Gradient::new(vec![
            GradientStop::new(0.25, Color::WHITE),
            GradientStop::new(0.75, Color::BLACK),
        ]);
        assert!(close(g.sample(0.0, false), Color::WHITE));
        assert!(close(g.sample(-3.0, false), Color::WHITE));
        assert!(close(g.sample(1.0, false), Color::BLACK));
    }

    #[test]
    fn test_nan_samples_first_stop() {
        let g = Gradient::new(vec![
            GradientStop::new(0.25, Color::WHITE),
            GradientStop::new(0.75, Color::BLACK),
        ]);
        assert!(close(g.sample(f64::NAN, false), Color::WHITE));
        assert!(close(g.sample(f64::NAN, true), Color::BLACK));
    }

    #[test]
    fn test_unsorted_stops_are_sorted() {
        let g = Gradient::new(vec![
            GradientStop::new(1.0, Color::WHITE),
            GradientStop::new(0.0, Color::BLACK),
            GradientStop::new(0.5, Color::rgb(1.0, 0.0, 0.0)),
        ]);
        assert!(close(g.sample(0.5, false), Color::rgb(1.0, 0.0, 0.0)));
        assert!(close(g.sample(0.25, false), Color::rgb(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_alpha_is_interpolated() {
        let g = Gradient::two_color(Color::WHITE, Color::WHITE.with_alpha(0.0));
        assert!((g.sample(0.25, false).a - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_empty_gradient_is_transparent() {
        let g = Gradient::new(Vec::new());
        assert_eq!(g.sample(0.5, false), Color::TRANSPARENT);
    }

    #[test]
    fn test_serde_sorts_stops() {
        let json = r#"[{"position":1.0,"color":{"r":1.0,"g":1.0,"b":1.0,"a":1.0}},
                       {"position":0.0,"color":{"r":0.0,"g":0.0,"b":0.0,"a":1.0}}]"#;
        let g: Gradient = serde_json::from_str(json).unwrap();
        assert_eq!(g.stops()[0].position, 0.0);
    }
}

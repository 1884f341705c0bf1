use serde::{Deserialize, Serialize};

/// One input sample of a stroke.
///
/// Positions are drawable-local. `pressure`, `velocity`, `direction` and
/// `wheel` are in 0.0 to 1.0, tilt is in -1.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
    pub xtilt: f64,
    pub ytilt: f64,
    pub velocity: f64,
    pub direction: f64,
    pub wheel: f64,
    /// Event time in milliseconds.
    pub time: u32,
}

impl Default for Coords {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            pressure: 1.0,
            xtilt: 0.0,
            ytilt: 0.0,
            velocity: 0.0,
            direction: 0.0,
            wheel: 0.5,
            time: 0,
        }
    }
}

impl Coords {
    /// Full-pressure sample at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pressure(self, pressure: f64) -> Self {
        Self { pressure, ..self }
    }

    /// Euclidean distance to another sample.
    pub fn distance(&self, other: &Coords) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

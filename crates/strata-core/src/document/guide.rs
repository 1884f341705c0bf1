//! Guides and sample points: geometric annotations that live on the canvas
//! but hold no pixels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuideId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SamplePointId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// A horizontal line; its position is a y coordinate.
    Horizontal,
    /// A vertical line; its position is an x coordinate.
    Vertical,
}

/// A horizontal or vertical snapping line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    pub id: GuideId,
    pub orientation: Orientation,
    pub position: i32,
}

/// A fixed point used as a color-picking reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub id: SamplePointId,
    pub x: i32,
    pub y: i32,
}

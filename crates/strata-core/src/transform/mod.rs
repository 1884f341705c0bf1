//! Geometric operations on whole images.
//!
//! # Coordinate System
//!
//! - Regions are in image pixels, origin at the top-left corner
//! - `x2`/`y2` are exclusive for sizes, inclusive for guide and sample point
//!   survival

mod crop;

pub use crop::{crop_image, CropOutcome};

//! Brush shapes.
//!
//! A brush is an 8-bit coverage mask, optionally paired with an RGBA pixmap
//! of the same size that supplies its own colors.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

/// Smootherstep: 6t^5 - 15t^4 + 10t^3, zero slope at both ends.
#[inline]
fn smootherstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    mask: GrayImage,
    pixmap: Option<RgbaImage>,
}

impl Brush {
    /// Circular brush.
    ///
    /// `hardness` (0.0 to 1.0) is the share of the radius painted at full
    /// coverage; the rest feathers out to the edge.
    pub fn round(diameter: u32, hardness: f32) -> Self {
        let d = diameter.max(1);
        let hardness = hardness.clamp(0.0, 1.0);
        let radius = d as f32 / 2.0;

        let mask = GrayImage::from_fn(d, d, |x, y| {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            let dist = (dx * dx + dy * dy).sqrt() / radius;

            let coverage = if dist <= hardness {
                1.0
            } else if dist >= 1.0 {
                0.0
            } else {
                smootherstep((1.0 - dist) / (1.0 - hardness))
            };
            Luma([(coverage * 255.0).round() as u8])
        });

        Self { mask, pixmap: None }
    }

    pub fn from_mask(mask: GrayImage) -> Self {
        Self { mask, pixmap: None }
    }

    /// Color brush; the mask is the pixmap's alpha.
    pub fn from_pixmap(pixmap: RgbaImage) -> Self {
        let mask = GrayImage::from_fn(pixmap.width(), pixmap.height(), |x, y| {
            Luma([pixmap.get_pixel(x, y)[3]])
        });
        Self {
            mask,
            pixmap: Some(pixmap),
        }
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    pub fn pixmap(&self) -> Option<&RgbaImage> {
        self.pixmap.as_ref()
    }

    pub fn has_pixmap(&self) -> bool {
        self.pixmap.is_some()
    }

    /// Copy whose larger side is `diameter`, aspect ratio kept.
    pub fn scaled(&self, diameter: u32) -> Self {
        let longest = self.width().max(self.height());
        let diameter = diameter.max(1);
        if longest == diameter {
            return self.clone();
        }
        let scale = diameter as f32 / longest as f32;
        let w = ((self.width() as f32 * scale).round() as u32).max(1);
        let h = ((self.height() as f32 * scale).round() as u32).max(1);

        Self {
            mask: imageops::resize(&self.mask, w, h, FilterType::Triangle),
            pixmap: self
                .pixmap
                .as_ref()
                .map(|p| imageops::resize(p, w, h, FilterType::Triangle)),
        }
    }
}

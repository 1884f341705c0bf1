use image::{Rgba, Rgba32FImage};

use crate::color::Color;
use crate::geometry::Rect;

/// Colored area of one dab, waiting to be pasted.
///
/// The buffer covers the part of the brush footprint that lies on the
/// drawable. `x`/`y` place it in drawable coordinates; `mask_origin` is where
/// the brush mask's top-left corner sits relative to the buffer (negative
/// when the footprint was clipped on the left or top).
#[derive(Debug, Clone, PartialEq)]
pub struct PaintBuffer {
    pixels: Rgba32FImage,
    x: i32,
    y: i32,
    mask_origin: (i32, i32),
}

impl PaintBuffer {
    /// Transparent buffer covering `area` (drawable coordinates).
    pub fn new(area: Rect, mask_origin: (i32, i32)) -> Self {
        let width = area.width().max(0) as u32;
        let height = area.height().max(0) as u32;
        Self {
            pixels: Rgba32FImage::new(width, height),
            x: area.x1,
            y: area.y1,
            mask_origin,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Area covered, in drawable coordinates.
    pub fn area(&self) -> Rect {
        Rect::from_origin_size(self.x, self.y, self.width(), self.height())
    }

    pub fn mask_origin(&self) -> (i32, i32) {
        self.mask_origin
    }

    pub fn pixels(&self) -> &Rgba32FImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut Rgba32FImage {
        &mut self.pixels
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Color) {
        let px = Rgba(color.to_array());
        for p in self.pixels.pixels_mut() {
            *p = px;
        }
    }

    pub fn color_at(&self, x: u32, y: u32) -> Color {
        Color::from_array(self.pixels.get_pixel(x, y).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let buffer = PaintBuffer::new(Rect::new(2, 3, 6, 5), (-1, 0));
        assert_eq!((buffer.width(), buffer.height()), (4, 2));
        assert_eq!((buffer.x(), buffer.y()), (2, 3));
        assert_eq!(buffer.color_at(0, 0), Color::TRANSPARENT);
        assert_eq!(buffer.area(), Rect::new(2, 3, 6, 5));
    }

    #[test]
    fn test_fill() {
        let mut buffer = PaintBuffer::new(Rect::new(0, 0, 3, 3), (0, 0));
        let red = Color::rgb(1.0, 0.0, 0.0);
        buffer.fill(red);
        assert_eq!(buffer.color_at(2, 2), red);
    }
}

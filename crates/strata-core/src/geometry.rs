//! Integer rectangle helpers shared by the crop and paint code.
//!
//! All coordinates are in pixels with the origin at the top-left corner.
//! Rectangles are half-open on the right and bottom edges: a rectangle with
//! `x1 == x2` is empty.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by two corners.
///
/// `(x1, y1)` is the top-left corner, `(x2, y2)` the bottom-right one. Nothing
/// forces `x2 >= x1`; a "backwards" rectangle simply has a negative width,
/// which callers treat as degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle from an origin and a size.
    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x.saturating_add(width as i32),
            y2: y.saturating_add(height as i32),
        }
    }

    /// Signed width; negative for backwards rectangles.
    #[inline]
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// Signed height; negative for backwards rectangles.
    #[inline]
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// True if either dimension is below one pixel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() < 1 || self.height() < 1
    }

    /// Clamp every edge independently into `[0, width] x [0, height]`.
    ///
    /// This is the canvas-intersection used when cropping layers: the result
    /// may be empty when the rectangle lies fully outside the canvas.
    pub fn clamp_to_canvas(&self, width: u32, height: u32) -> Rect {
        let w = width as i32;
        let h = height as i32;
        Rect {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        }
    }

    /// Intersection of two rectangles, or `None` when they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    /// Whether `x` lies in the closed horizontal span `[x1, x2]`.
    ///
    /// Guides and sample points may sit exactly on the far edge, so the
    /// right bound is inclusive here.
    #[inline]
    pub fn spans_x(&self, x: i32) -> bool {
        x >= self.x1 && x <= self.x2
    }

    /// Whether `y` lies in the closed vertical span `[y1, y2]`.
    #[inline]
    pub fn spans_y(&self, y: i32) -> bool {
        y >= self.y1 && y <= self.y2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        let r = Rect::new(10, 20, 60, 40);
        assert_eq!(r.width(), 50);
        assert_eq!(r.height(), 20);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_backwards_is_empty() {
        assert!(Rect::new(10, 10, 5, 20).is_empty());
        assert!(Rect::new(10, 10, 10, 20).is_empty());
    }

    #[test]
    fn test_clamp_to_canvas() {
        let r = Rect::from_origin_size(-10, -10, 20, 20);
        assert_eq!(r.clamp_to_canvas(50, 50), Rect::new(0, 0, 10, 10));

        let outside = Rect::from_origin_size(60, 60, 10, 10);
        assert!(outside.clamp_to_canvas(50, 50).is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 20, 20);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 5, 10, 10)));
        assert_eq!(a.intersect(&Rect::new(10, 0, 20, 10)), None);
    }

    #[test]
    fn test_closed_spans() {
        let r = Rect::new(10, 10, 60, 60);
        assert!(r.spans_x(10));
        assert!(r.spans_x(60));
        assert!(!r.spans_x(61));
        assert!(!r.spans_y(9));
    }
}

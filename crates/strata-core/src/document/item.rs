//! Items: the layers, channels, paths and selection mask an image owns.
//!
//! Every item kind shares the same geometric capabilities (size, offset,
//! resize, translate). The kinds only differ in what they store and in how
//! their offset behaves:
//!
//! - **Layers** carry RGBA pixels and may hang partly (or fully) off-canvas.
//! - **Channels** and the **selection mask** carry 8-bit coverage and always
//!   sit at the image origin.
//! - **Vectors** carry path anchors in image coordinates and also sit at the
//!   image origin; moving them moves the anchors.

use std::fmt;

use image::{imageops, GrayImage, ImageBuffer, Pixel, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::ImageError;
use crate::color::Color;
use crate::geometry::Rect;

/// Stable identifier of an item within its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Placeholder id carried by items that were not added to an image yet.
    pub const UNASSIGNED: ItemId = ItemId(0);
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Layer,
    Channel,
    Vectors,
    SelectionMask,
}

impl ItemKind {
    /// Kinds that always cover the whole canvas from the image origin.
    pub fn is_canvas_anchored(self) -> bool {
        !matches!(self, ItemKind::Layer)
    }
}

/// One path anchor, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What an item stores.
#[derive(Clone, PartialEq)]
pub enum ItemContent {
    /// Straight-alpha RGBA pixels (layers).
    Rgba(RgbaImage),
    /// 8-bit coverage (channels and the selection mask).
    Coverage(GrayImage),
    /// Path anchors (vectors).
    Path(Vec<Anchor>),
}

impl fmt::Debug for ItemContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pixel dumps are useless in logs; print the shape only.
        match self {
            ItemContent::Rgba(buf) => write!(f, "Rgba({}x{})", buf.width(), buf.height()),
            ItemContent::Coverage(buf) => {
                write!(f, "Coverage({}x{})", buf.width(), buf.height())
            }
            ItemContent::Path(anchors) => write!(f, "Path({} anchors)", anchors.len()),
        }
    }
}

/// A layer, channel, path or selection mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub(super) id: ItemId,
    kind: ItemKind,
    name: String,
    offset_x: i32,
    offset_y: i32,
    width: u32,
    height: u32,
    content: ItemContent,
}

impl Item {
    /// Transparent layer at `(x, y)`.
    pub fn layer(name: impl Into<String>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::layer_filled(name, x, y, width, height, Color::TRANSPARENT)
    }

    /// Layer at `(x, y)` filled with one color.
    pub fn layer_filled(
        name: impl Into<String>,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        fill: Color,
    ) -> Self {
        let pixels = RgbaImage::from_pixel(width, height, Rgba(fill.to_rgba8()));
        Self::layer_from_pixels(name, x, y, pixels)
    }

    /// Layer at `(x, y)` wrapping existing pixels.
    pub fn layer_from_pixels(name: impl Into<String>, x: i32, y: i32, pixels: RgbaImage) -> Self {
        Self {
            id: ItemId::UNASSIGNED,
            kind: ItemKind::Layer,
            name: name.into(),
            offset_x: x,
            offset_y: y,
            width: pixels.width(),
            height: pixels.height(),
            content: ItemContent::Rgba(pixels),
        }
    }

    /// Empty channel covering a `width x height` canvas.
    pub fn channel(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::coverage(ItemKind::Channel, name.into(), GrayImage::new(width, height))
    }

    /// Channel wrapping existing coverage values.
    pub fn channel_from_coverage(name: impl Into<String>, coverage: GrayImage) -> Self {
        Self::coverage(ItemKind::Channel, name.into(), coverage)
    }

    /// Empty selection mask for a `width x height` canvas.
    pub fn selection_mask(width: u32, height: u32) -> Self {
        Self::coverage(
            ItemKind::SelectionMask,
            "Selection Mask".to_string(),
            GrayImage::new(width, height),
        )
    }

    /// Path over a `width x height` canvas.
    pub fn vectors(name: impl Into<String>, width: u32, height: u32, anchors: Vec<Anchor>) -> Self {
        Self {
            id: ItemId::UNASSIGNED,
            kind: ItemKind::Vectors,
            name: name.into(),
            offset_x: 0,
            offset_y: 0,
            width,
            height,
            content: ItemContent::Path(anchors),
        }
    }

    fn coverage(kind: ItemKind, name: String, coverage: GrayImage) -> Self {
        Self {
            id: ItemId::UNASSIGNED,
            kind,
            name,
            offset_x: 0,
            offset_y: 0,
            width: coverage.width(),
            height: coverage.height(),
            content: ItemContent::Coverage(coverage),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Offset of the item's top-left corner relative to the image origin.
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Bounding box in image coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.offset_x, self.offset_y, self.width, self.height)
    }

    pub fn content(&self) -> &ItemContent {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut ItemContent {
        &mut self.content
    }

    /// Whether paint can land on this item.
    pub fn is_drawable(&self) -> bool {
        !matches!(self.content, ItemContent::Path(_))
    }

    /// Change the item's size.
    ///
    /// The old content is placed so that its top-left corner lands at
    /// `(offset_x, offset_y)` inside the new bounds; whatever falls outside is
    /// dropped, new area is transparent (or zero coverage). Layers move so that
    /// their content stays where it was on the canvas; canvas-anchored items
    /// stay at the origin.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        offset_x: i32,
        offset_y: i32,
    ) -> Result<(), ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidSize { width, height });
        }

        match &mut self.content {
            ItemContent::Rgba(pixels) => {
                *pixels = resized_buffer(pixels, width, height, offset_x, offset_y);
            }
            ItemContent::Coverage(coverage) => {
                *coverage = resized_buffer(coverage, width, height, offset_x, offset_y);
            }
            ItemContent::Path(anchors) => {
                for anchor in anchors.iter_mut() {
                    anchor.x += offset_x as f64;
                    anchor.y += offset_y as f64;
                }
            }
        }

        self.width = width;
        self.height = height;
        if self.kind.is_canvas_anchored() {
            self.offset_x = 0;
            self.offset_y = 0;
        } else {
            self.offset_x -= offset_x;
            self.offset_y -= offset_y;
        }
        Ok(())
    }

    /// Move the item by `(dx, dy)`.
    ///
    /// Layers change their offset. Paths move their anchors. Channels and the
    /// selection mask are pinned to the canvas and ignore translation.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        match (&mut self.content, self.kind) {
            (_, ItemKind::Layer) => {
                self.offset_x += dx;
                self.offset_y += dy;
            }
            (ItemContent::Path(anchors), _) => {
                for anchor in anchors.iter_mut() {
                    anchor.x += dx as f64;
                    anchor.y += dy as f64;
                }
            }
            _ => {}
        }
    }
}

/// Copy `old` into a fresh `width x height` buffer with its origin at
/// `(offset_x, offset_y)`.
fn resized_buffer<P>(
    old: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    offset_x: i32,
    offset_y: i32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let mut new = ImageBuffer::new(width, height);
    imageops::replace(&mut new, old, offset_x as i64, offset_y as i64);
    new
}

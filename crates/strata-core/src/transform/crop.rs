//! Cropping and canvas resizing of a layered image.
//!
//! Cropping changes the canvas to a rectangle given in the old canvas
//! coordinates and then brings every owned entity in line with it:
//!
//! - channels, paths and the selection mask always cover the full canvas, so
//!   they are resized to the new size with their content shifted by
//!   `(-x1, -y1)`;
//! - layers move by `(-x1, -y1)`; when cropping layers they are also cut to
//!   the new canvas, and layers left with nothing on it are removed;
//! - guides and sample points outside the region are removed, the others
//!   shifted.
//!
//! The whole operation is one undo group, and property notifications are
//! frozen until it is done.
//!
//! # Example
//!
//! ```ignore
//! let mut image = Image::new(100, 100)?;
//! let mut history = History::new();
//! crop_image(&mut image, &mut history, Rect::new(10, 10, 60, 60), true)?;
//! assert_eq!(image.width(), 50);
//! ```

use crate::document::{Image, ImageError, Orientation};
use crate::geometry::Rect;
use crate::undo::{UndoGroupKind, UndoLog, UndoRecord};

/// What [`crop_image`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    /// The image was cropped.
    Applied,
    /// The region was narrower or shorter than one pixel; nothing changed.
    Degenerate,
}

/// Crop (or canvas-resize) `image` to `region`.
///
/// `region` is given in the current canvas coordinates and may extend past
/// the canvas or lie entirely outside it. With `crop_layers` off, layers keep
/// their size and only move ("canvas size"); with it on they are clipped to
/// the new canvas.
///
/// # Errors
///
/// Only lookup errors from the document primitives, which would mean the
/// image changed under the operation.
pub fn crop_image(
    image: &mut Image,
    undo: &mut dyn UndoLog,
    region: Rect,
    crop_layers: bool,
) -> Result<CropOutcome, ImageError> {
    let Rect { x1, y1, .. } = region;
    let previous_width = image.width();
    let previous_height = image.height();

    if region.is_empty() {
        log::debug!("crop to {:?} ignored: degenerate region", region);
        return Ok(CropOutcome::Degenerate);
    }
    let width = region.width() as u32;
    let height = region.height() as u32;

    log::debug!(
        "crop {}x{} -> {:?} (crop_layers: {})",
        previous_width,
        previous_height,
        region,
        crop_layers
    );

    let mut image = image.freeze_notify();

    let (kind, label) = if crop_layers {
        (UndoGroupKind::ImageCrop, "Crop Image")
    } else {
        (UndoGroupKind::ImageResize, "Resize Image")
    };
    undo.group_start(kind, label);

    // The group must be closed whatever happens below.
    let result = crop_in_group(&mut image, undo, region, crop_layers, width, height);
    undo.group_end();
    result?;

    image.size_changed_detailed(-x1, -y1, previous_width, previous_height);
    log::debug!(
        "crop done: {}x{}, {} layers left",
        image.width(),
        image.height(),
        image.layers().len()
    );

    Ok(CropOutcome::Applied)
}

fn crop_in_group(
    image: &mut Image,
    undo: &mut dyn UndoLog,
    region: Rect,
    crop_layers: bool,
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    let Rect { x1, y1, .. } = region;

    undo.push(UndoRecord::ImageSize {
        previous_width: image.width(),
        previous_height: image.height(),
        x: x1,
        y: y1,
        width,
        height,
    });
    image.set_size(width, height)?;

    // Channels, paths and the selection mask follow the canvas exactly.
    for id in image.channel_ids() {
        image.resize_item(id, width, height, -x1, -y1, undo)?;
    }
    for id in image.vectors_ids() {
        image.resize_item(id, width, height, -x1, -y1, undo)?;
    }
    let mask = image.mask().id();
    image.resize_item(mask, width, height, -x1, -y1, undo)?;

    // Layers. Iterate a snapshot so removal doesn't disturb the walk.
    for id in image.layer_ids() {
        image.translate_item(id, -x1, -y1, undo)?;

        if !crop_layers {
            continue;
        }

        let bounds = image.item(id).ok_or(ImageError::UnknownItem(id))?.bounds();
        let clamped = bounds.clamp_to_canvas(width, height);

        if clamped.is_empty() {
            log::trace!("layer {} is off canvas after crop, removing", id);
            image.remove_layer(id, undo)?;
        } else {
            image.resize_item(
                id,
                clamped.width() as u32,
                clamped.height() as u32,
                -(clamped.x1 - bounds.x1),
                -(clamped.y1 - bounds.y1),
                undo,
            )?;
        }
    }

    // Guides: tested against the original coordinates.
    let guides: Vec<_> = image.guides().to_vec();
    for guide in guides {
        let (inside, offset) = match guide.orientation {
            Orientation::Horizontal => (region.spans_y(guide.position), y1),
            Orientation::Vertical => (region.spans_x(guide.position), x1),
        };

        if !inside {
            image.remove_guide(guide.id, undo)?;
            continue;
        }
        // Inside the region, so the shift stays within its extent.
        let position = guide.position - offset;
        if position != guide.position {
            image.move_guide(guide.id, position, undo)?;
        }
    }

    // Sample points: both axes must be inside.
    let points: Vec<_> = image.sample_points().to_vec();
    for point in points {
        if !(region.spans_x(point.x) && region.spans_y(point.y)) {
            image.remove_sample_point(point.id, undo)?;
            continue;
        }
        let new_x = point.x - x1;
        let new_y = point.y - y1;
        if new_x != point.x || new_y != point.y {
            image.move_sample_point(point.id, new_x, new_y, undo)?;
        }
    }

    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::document::Item;
    use crate::undo::NoUndo;
    use proptest::prelude::*;

    /// Strategy for regions in and around a 100x100 canvas.
    fn region_strategy() -> impl Strategy<Value = Rect> {
        (-50i32..150, -50i32..150, -50i32..150, -50i32..150)
            .prop_map(|(x1, y1, x2, y2)| Rect::new(x1, y1, x2, y2))
    }

    /// Strategy for layer boxes in and around a 100x100 canvas.
    fn layer_strategy() -> impl Strategy<Value = (i32, i32, u32, u32)> {
        (-50i32..150, -50i32..150, 1u32..80, 1u32..80)
    }

    proptest! {
        /// Property: degenerate regions change nothing.
        #[test]
        fn prop_degenerate_is_noop(
            region in region_strategy().prop_filter("degenerate", |r| r.is_empty()),
            (lx, ly, lw, lh) in layer_strategy(),
            guide in -50i32..150,
        ) {
            let mut image = Image::new(100, 100).unwrap();
            let layer = image.add_item(Item::layer("l", lx, ly, lw, lh)).unwrap();
            image.add_guide(Orientation::Horizontal, guide);
            image.add_sample_point(guide, guide);
            let before_layer = image.item(layer).unwrap().clone();

            let outcome = crop_image(&mut image, &mut NoUndo, region, true).unwrap();

            prop_assert_eq!(outcome, CropOutcome::Degenerate);
            prop_assert_eq!((image.width(), image.height()), (100, 100));
            prop_assert_eq!(image.item(layer).unwrap(), &before_layer);
            prop_assert_eq!(image.guides()[0].position, guide);
            prop_assert_eq!(image.sample_points().len(), 1);
        }

        /// Property: a guide survives iff it is inside the region, shifted by
        /// the region origin.
        #[test]
        fn prop_guides(
            region in region_strategy().prop_filter("non-empty", |r| !r.is_empty()),
            position in -50i32..150,
        ) {
            let mut image = Image::new(100, 100).unwrap();
            let h = image.add_guide(Orientation::Horizontal, position);
            let v = image.add_guide(Orientation::Vertical, position);

            crop_image(&mut image, &mut NoUndo, region, true).unwrap();

            let inside_y = position >= region.y1 && position <= region.y2;
            let inside_x = position >= region.x1 && position <= region.x2;
            prop_assert_eq!(image.guide(h).map(|g| g.position), inside_y.then(|| position - region.y1));
            prop_assert_eq!(image.guide(v).map(|g| g.position), inside_x.then(|| position - region.x1));
        }

        /// Property: without layer cropping, layer sizes never change and
        /// offsets move by the region origin.
        #[test]
        fn prop_resize_keeps_layer_size(
            region in region_strategy().prop_filter("non-empty", |r| !r.is_empty()),
            (lx, ly, lw, lh) in layer_strategy(),
        ) {
            let mut image = Image::new(100, 100).unwrap();
            let layer = image.add_item(Item::layer("l", lx, ly, lw, lh)).unwrap();

            crop_image(&mut image, &mut NoUndo, region, false).unwrap();

            let item = image.item(layer).unwrap();
            prop_assert_eq!((item.width(), item.height()), (lw, lh));
            prop_assert_eq!(item.offset(), (lx - region.x1, ly - region.y1));
        }

        /// Property: with layer cropping, a layer is removed iff its moved box
        /// misses the new canvas, and otherwise becomes exactly the clamped box.
        #[test]
        fn prop_crop_clamps_layers(
            region in region_strategy().prop_filter("non-empty", |r| !r.is_empty()),
            (lx, ly, lw, lh) in layer_strategy(),
        ) {
            let mut image = Image::new(100, 100).unwrap();
            let layer = image.add_item(Item::layer("l", lx, ly, lw, lh)).unwrap();

            crop_image(&mut image, &mut NoUndo, region, true).unwrap();

            let moved = Rect::from_origin_size(lx - region.x1, ly - region.y1, lw, lh);
            let expected = moved.clamp_to_canvas(region.width() as u32, region.height() as u32);
            match image.item(layer) {
                Some(item) => {
                    prop_assert!(!expected.is_empty());
                    prop_assert_eq!(item.bounds(), expected);
                }
                None => prop_assert!(expected.is_empty()),
            }
        }

        /// Property: the canvas always takes the region size.
        #[test]
        fn prop_canvas_takes_region_size(
            region in region_strategy().prop_filter("non-empty", |r| !r.is_empty()),
            crop_layers in any::<bool>(),
        ) {
            let mut image = Image::new(100, 100).unwrap();

            crop_image(&mut image, &mut NoUndo, region, crop_layers).unwrap();

            prop_assert_eq!(image.width() as i32, region.width());
            prop_assert_eq!(image.height() as i32, region.height());
            prop_assert_eq!(image.mask().width() as i32, region.width());
        }
    }
}

//! The layered document model.
//!
//! An [`Image`] owns everything drawn on or attached to its canvas: a stack of
//! layers, channels, paths, one selection mask, guides and sample points.
//! Children never outlive the image and are addressed by stable ids, so
//! callers can snapshot the ids they want to visit and mutate freely while
//! walking the snapshot.
//!
//! Mutating primitives that should be undoable take a `&mut dyn UndoLog` and
//! record what they changed before returning.

mod guide;
mod item;
mod notify;

pub use guide::{Guide, GuideId, Orientation, SamplePoint, SamplePointId};
pub use item::{Anchor, Item, ItemContent, ItemId, ItemKind};
pub use notify::{ImageEvent, ImageProperty, NotifyFreeze};

use thiserror::Error;

use crate::undo::{UndoLog, UndoRecord};
use notify::Notifier;

/// Errors from document lookups and primitive edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Images and items need at least one pixel in each direction.
    #[error("Invalid size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("No item with id {0}")]
    UnknownItem(ItemId),

    #[error("No guide with id {0:?}")]
    UnknownGuide(GuideId),

    #[error("No sample point with id {0:?}")]
    UnknownSamplePoint(SamplePointId),

    #[error("Item {0} is not a layer")]
    NotALayer(ItemId),

    /// An image has exactly one selection mask, created with it.
    #[error("The image already has a selection mask")]
    MaskExists,
}

/// A layered raster document.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    layers: Vec<Item>,
    channels: Vec<Item>,
    vectors: Vec<Item>,
    mask: Item,
    guides: Vec<Guide>,
    sample_points: Vec<SamplePoint>,
    next_id: u32,
    notifier: Notifier,
}

impl Image {
    /// Empty image of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidSize { width, height });
        }
        let mut mask = Item::selection_mask(width, height);
        mask.id = ItemId(1);
        Ok(Self {
            width,
            height,
            layers: Vec::new(),
            channels: Vec::new(),
            vectors: Vec::new(),
            mask,
            guides: Vec::new(),
            sample_points: Vec::new(),
            next_id: 2,
            notifier: Notifier::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set the canvas size without touching any item.
    ///
    /// Emits a property notification for each dimension that changed.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<(), ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidSize { width, height });
        }
        if width != self.width {
            self.width = width;
            self.notifier.notify(ImageProperty::Width);
        }
        if height != self.height {
            self.height = height;
            self.notifier.notify(ImageProperty::Height);
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Add a layer, channel or path on top of its stack.
    pub fn add_item(&mut self, mut item: Item) -> Result<ItemId, ImageError> {
        let stack = match item.kind() {
            ItemKind::Layer => &mut self.layers,
            ItemKind::Channel => &mut self.channels,
            ItemKind::Vectors => &mut self.vectors,
            ItemKind::SelectionMask => return Err(ImageError::MaskExists),
        };
        let id = ItemId(self.next_id);
        self.next_id += 1;
        item.id = id;
        stack.push(item);
        Ok(id)
    }

    /// Layers, bottom first.
    pub fn layers(&self) -> &[Item] {
        &self.layers
    }

    pub fn channels(&self) -> &[Item] {
        &self.channels
    }

    pub fn vectors(&self) -> &[Item] {
        &self.vectors
    }

    pub fn mask(&self) -> &Item {
        &self.mask
    }

    pub fn layer_ids(&self) -> Vec<ItemId> {
        self.layers.iter().map(Item::id).collect()
    }

    pub fn channel_ids(&self) -> Vec<ItemId> {
        self.channels.iter().map(Item::id).collect()
    }

    pub fn vectors_ids(&self) -> Vec<ItemId> {
        self.vectors.iter().map(Item::id).collect()
    }

    /// Look up any item, including the selection mask.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        if self.mask.id() == id {
            return Some(&self.mask);
        }
        self.layers
            .iter()
            .chain(&self.channels)
            .chain(&self.vectors)
            .find(|item| item.id() == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        if self.mask.id() == id {
            return Some(&mut self.mask);
        }
        self.layers
            .iter_mut()
            .chain(self.channels.iter_mut())
            .chain(self.vectors.iter_mut())
            .find(|item| item.id() == id)
    }

    fn item_mut_or_err(&mut self, id: ItemId) -> Result<&mut Item, ImageError> {
        self.item_mut(id).ok_or(ImageError::UnknownItem(id))
    }

    /// Undoable [`Item::resize`].
    pub fn resize_item(
        &mut self,
        id: ItemId,
        width: u32,
        height: u32,
        offset_x: i32,
        offset_y: i32,
        undo: &mut dyn UndoLog,
    ) -> Result<(), ImageError> {
        let item = self.item_mut_or_err(id)?;
        let previous = item.clone();
        item.resize(width, height, offset_x, offset_y)?;
        log::trace!(
            "resized {} to {}x{} (content offset {}, {})",
            id,
            width,
            height,
            offset_x,
            offset_y
        );
        undo.push(UndoRecord::ItemResized {
            previous: Box::new(previous),
        });
        Ok(())
    }

    /// Undoable [`Item::translate`].
    pub fn translate_item(
        &mut self,
        id: ItemId,
        dx: i32,
        dy: i32,
        undo: &mut dyn UndoLog,
    ) -> Result<(), ImageError> {
        self.item_mut_or_err(id)?.translate(dx, dy);
        undo.push(UndoRecord::ItemTranslated { item: id, dx, dy });
        Ok(())
    }

    /// Take a layer out of the stack. The removed layer is kept in the undo
    /// record so it can be restored.
    pub fn remove_layer(&mut self, id: ItemId, undo: &mut dyn UndoLog) -> Result<(), ImageError> {
        let index = match self.layers.iter().position(|l| l.id() == id) {
            Some(index) => index,
            None if self.item(id).is_some() => return Err(ImageError::NotALayer(id)),
            None => return Err(ImageError::UnknownItem(id)),
        };
        let layer = self.layers.remove(index);
        log::trace!("removed layer {} '{}'", id, layer.name());
        undo.push(UndoRecord::LayerRemoved {
            layer: Box::new(layer),
            index,
        });
        self.notifier.emit(ImageEvent::LayerRemoved(id));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Guides
    // ------------------------------------------------------------------

    pub fn add_guide(&mut self, orientation: Orientation, position: i32) -> GuideId {
        let id = GuideId(self.allocate_id());
        self.guides.push(Guide {
            id,
            orientation,
            position,
        });
        id
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn guide(&self, id: GuideId) -> Option<&Guide> {
        self.guides.iter().find(|g| g.id == id)
    }

    pub fn move_guide(
        &mut self,
        id: GuideId,
        position: i32,
        undo: &mut dyn UndoLog,
    ) -> Result<(), ImageError> {
        let guide = self
            .guides
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(ImageError::UnknownGuide(id))?;
        undo.push(UndoRecord::GuideMoved {
            guide: id,
            from: guide.position,
            to: position,
        });
        guide.position = position;
        self.notifier.emit(ImageEvent::GuideMoved(id));
        Ok(())
    }

    pub fn remove_guide(&mut self, id: GuideId, undo: &mut dyn UndoLog) -> Result<(), ImageError> {
        let index = self
            .guides
            .iter()
            .position(|g| g.id == id)
            .ok_or(ImageError::UnknownGuide(id))?;
        let guide = self.guides.remove(index);
        undo.push(UndoRecord::GuideRemoved { guide });
        self.notifier.emit(ImageEvent::GuideRemoved(id));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sample points
    // ------------------------------------------------------------------

    pub fn add_sample_point(&mut self, x: i32, y: i32) -> SamplePointId {
        let id = SamplePointId(self.allocate_id());
        self.sample_points.push(SamplePoint { id, x, y });
        id
    }

    pub fn sample_points(&self) -> &[SamplePoint] {
        &self.sample_points
    }

    pub fn sample_point(&self, id: SamplePointId) -> Option<&SamplePoint> {
        self.sample_points.iter().find(|p| p.id == id)
    }

    pub fn move_sample_point(
        &mut self,
        id: SamplePointId,
        x: i32,
        y: i32,
        undo: &mut dyn UndoLog,
    ) -> Result<(), ImageError> {
        let point = self
            .sample_points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ImageError::UnknownSamplePoint(id))?;
        undo.push(UndoRecord::SamplePointMoved {
            point: id,
            from: (point.x, point.y),
            to: (x, y),
        });
        point.x = x;
        point.y = y;
        self.notifier.emit(ImageEvent::SamplePointMoved(id));
        Ok(())
    }

    pub fn remove_sample_point(
        &mut self,
        id: SamplePointId,
        undo: &mut dyn UndoLog,
    ) -> Result<(), ImageError> {
        let index = self
            .sample_points
            .iter()
            .position(|p| p.id == id)
            .ok_or(ImageError::UnknownSamplePoint(id))?;
        let point = self.sample_points.remove(index);
        undo.push(UndoRecord::SamplePointRemoved { point });
        self.notifier.emit(ImageEvent::SamplePointRemoved(id));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Hold back property notifications until the returned guard drops.
    pub fn freeze_notify(&mut self) -> NotifyFreeze<'_> {
        NotifyFreeze::new(self)
    }

    pub fn is_notify_frozen(&self) -> bool {
        self.notifier.is_frozen()
    }

    /// Announce a canvas size change to views.
    pub fn size_changed_detailed(
        &mut self,
        offset_x: i32,
        offset_y: i32,
        previous_width: u32,
        previous_height: u32,
    ) {
        self.notifier.emit(ImageEvent::SizeChanged {
            offset_x,
            offset_y,
            previous_width,
            previous_height,
        });
    }

    /// Take every queued event, oldest first.
    pub fn take_events(&mut self) -> Vec<ImageEvent> {
        self.notifier.drain()
    }
}

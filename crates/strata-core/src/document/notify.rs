//! Change notifications and the freeze guard.
//!
//! The image queues [`ImageEvent`]s for whoever drives it (a view, the WASM
//! bindings) to drain. Structural events (a layer removed, a guide moved, the
//! canvas resized) are queued as they happen. Property notifications
//! (width, height) are different: while notifications are frozen they are
//! held back and coalesced, so a listener sees each changed property once,
//! after the whole operation.

use std::ops::{Deref, DerefMut};

use super::{GuideId, Image, ItemId, SamplePointId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageProperty {
    Width,
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEvent {
    /// A property changed value.
    PropertyChanged(ImageProperty),
    /// The canvas changed size. Content moved by `(offset_x, offset_y)`.
    SizeChanged {
        offset_x: i32,
        offset_y: i32,
        previous_width: u32,
        previous_height: u32,
    },
    LayerRemoved(ItemId),
    GuideRemoved(GuideId),
    GuideMoved(GuideId),
    SamplePointRemoved(SamplePointId),
    SamplePointMoved(SamplePointId),
}

#[derive(Debug, Clone, Default)]
pub(super) struct Notifier {
    freeze_count: u32,
    held: Vec<ImageProperty>,
    queue: Vec<ImageEvent>,
}

impl Notifier {
    pub(super) fn emit(&mut self, event: ImageEvent) {
        self.queue.push(event);
    }

    pub(super) fn notify(&mut self, property: ImageProperty) {
        if self.freeze_count == 0 {
            self.queue.push(ImageEvent::PropertyChanged(property));
        } else if !self.held.contains(&property) {
            self.held.push(property);
        }
    }

    pub(super) fn is_frozen(&self) -> bool {
        self.freeze_count > 0
    }

    fn freeze(&mut self) {
        self.freeze_count += 1;
    }

    fn thaw(&mut self) {
        debug_assert!(self.freeze_count > 0, "thaw without freeze");
        self.freeze_count = self.freeze_count.saturating_sub(1);
        if self.freeze_count == 0 {
            self.queue
                .extend(self.held.drain(..).map(ImageEvent::PropertyChanged));
        }
    }

    pub(super) fn drain(&mut self) -> Vec<ImageEvent> {
        std::mem::take(&mut self.queue)
    }
}

/// Scoped notification freeze.
///
/// Obtained from [`Image::freeze_notify`]. Derefs to the image, so the whole
/// frozen operation runs through the guard; dropping it thaws, on every exit
/// path. Guards nest.
pub struct NotifyFreeze<'a> {
    image: &'a mut Image,
}

impl<'a> NotifyFreeze<'a> {
    pub(super) fn new(image: &'a mut Image) -> Self {
        image.notifier.freeze();
        Self { image }
    }
}

impl Deref for NotifyFreeze<'_> {
    type Target = Image;

    fn deref(&self) -> &Image {
        &*self.image
    }
}

impl DerefMut for NotifyFreeze<'_> {
    fn deref_mut(&mut self) -> &mut Image {
        &mut *self.image
    }
}

impl Drop for NotifyFreeze<'_> {
    fn drop(&mut self) {
        self.image.notifier.thaw();
    }
}

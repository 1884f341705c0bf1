//! WASM bindings for the layered document and crop.

use strata_core::document::{Anchor, Image, Item, ItemContent, ItemId, Orientation};
use strata_core::undo::History;
use strata_core::{crop_image, CropOutcome, Rect};
use wasm_bindgen::prelude::*;

/// A layered document with its undo history.
///
/// # Example (TypeScript)
/// ```typescript
/// const doc = new JsDocument(800, 600);
/// const layer = doc.add_layer("Background", 0, 0, 800, 600, new Uint8Array());
/// doc.add_guide(true, 300);
///
/// // Crop layers to the region
/// doc.crop(100, 100, 500, 400, true);
/// console.log(doc.width, doc.height); // 400 300
/// ```
#[wasm_bindgen]
pub struct JsDocument {
    image: Image,
    history: History,
}

#[wasm_bindgen]
impl JsDocument {
    /// Create an empty document.
    ///
    /// # Errors
    /// Returns error if either dimension is zero.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<JsDocument, JsValue> {
        let image = Image::new(width, height).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(JsDocument {
            image,
            history: History::new(),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Add a layer on top of the stack.
    ///
    /// # Arguments
    /// * `x`, `y` - Layer offset in image coordinates
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order), or
    ///   empty for a transparent layer
    ///
    /// # Returns
    /// The new layer's id
    pub fn add_layer(
        &mut self,
        name: &str,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<u32, JsValue> {
        let item = if pixels.is_empty() {
            Item::layer(name, x, y, width, height)
        } else {
            let expected = width as usize * height as usize * 4;
            let buffer = image::RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
                JsValue::from_str(&format!("Expected {expected} bytes of RGBA pixel data"))
            })?;
            Item::layer_from_pixels(name, x, y, buffer)
        };
        self.add(item)
    }

    /// Add a canvas-sized channel with zero coverage.
    pub fn add_channel(&mut self, name: &str) -> Result<u32, JsValue> {
        self.add(Item::channel(name, self.image.width(), self.image.height()))
    }

    /// Add a path.
    ///
    /// # Arguments
    /// * `anchors` - Packed anchor coordinates `[x0, y0, x1, y1, ...]`
    pub fn add_vectors(&mut self, name: &str, anchors: &[f64]) -> Result<u32, JsValue> {
        let anchors = anchors
            .chunks_exact(2)
            .map(|xy| Anchor::new(xy[0], xy[1]))
            .collect();
        self.add(Item::vectors(
            name,
            self.image.width(),
            self.image.height(),
            anchors,
        ))
    }

    /// Add a guide; returns its id.
    pub fn add_guide(&mut self, horizontal: bool, position: i32) -> u32 {
        let orientation = if horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        self.image.add_guide(orientation, position).0
    }

    /// Add a sample point; returns its id.
    pub fn add_sample_point(&mut self, x: i32, y: i32) -> u32 {
        self.image.add_sample_point(x, y).0
    }

    /// Crop the canvas to `(x1, y1)-(x2, y2)`.
    ///
    /// With `crop_layers` false the canvas is resized and layers keep their
    /// size. Returns false when the region is degenerate and nothing changed.
    pub fn crop(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        crop_layers: bool,
    ) -> Result<bool, JsValue> {
        let outcome = crop_image(
            &mut self.image,
            &mut self.history,
            Rect::new(x1, y1, x2, y2),
            crop_layers,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.drain_events();
        Ok(outcome == CropOutcome::Applied)
    }

    /// Layer ids, bottom first.
    pub fn layer_ids(&self) -> Vec<u32> {
        self.image.layer_ids().into_iter().map(|id| id.0).collect()
    }

    pub fn channel_ids(&self) -> Vec<u32> {
        self.image.channel_ids().into_iter().map(|id| id.0).collect()
    }

    /// `[x, y, width, height]` of an item.
    pub fn item_bounds(&self, id: u32) -> Result<Vec<i32>, JsValue> {
        let item = self.item(id)?;
        let (x, y) = item.offset();
        Ok(vec![x, y, item.width() as i32, item.height() as i32])
    }

    /// Copy of an item's pixels: RGBA for layers, one byte per pixel for
    /// channels and the selection mask.
    pub fn item_pixels(&self, id: u32) -> Result<Vec<u8>, JsValue> {
        match self.item(id)?.content() {
            ItemContent::Rgba(pixels) => Ok(pixels.as_raw().clone()),
            ItemContent::Coverage(coverage) => Ok(coverage.as_raw().clone()),
            ItemContent::Path(_) => Err(JsValue::from_str("Paths have no pixels")),
        }
    }

    /// Path anchors packed as `[x0, y0, x1, y1, ...]`.
    pub fn vectors_anchors(&self, id: u32) -> Result<Vec<f64>, JsValue> {
        match self.item(id)?.content() {
            ItemContent::Path(anchors) => Ok(anchors.iter().flat_map(|a| [a.x, a.y]).collect()),
            _ => Err(JsValue::from_str("Not a path")),
        }
    }

    /// Guides as `{ id, orientation, position }` objects.
    pub fn guides(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.image.guides())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Sample points as `{ id, x, y }` objects.
    pub fn sample_points(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.image.sample_points())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn guide_count(&self) -> usize {
        self.image.guides().len()
    }

    pub fn sample_point_count(&self) -> usize {
        self.image.sample_points().len()
    }

    /// Labels of the recorded undo steps, oldest first.
    pub fn undo_labels(&self) -> Vec<String> {
        self.history.labels()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsDocument {
    fn add(&mut self, item: Item) -> Result<u32, JsValue> {
        self.image
            .add_item(item)
            .map(|id| id.0)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn item(&self, id: u32) -> Result<&Item, JsValue> {
        self.image
            .item(ItemId(id))
            .ok_or_else(|| JsValue::from_str(&format!("No item with id {id}")))
    }

    /// The image and its history, for painting.
    pub(crate) fn parts_mut(&mut self) -> (&mut Image, &mut History) {
        (&mut self.image, &mut self.history)
    }

    /// Nothing listens on this side of the boundary; log and drop.
    pub(crate) fn drain_events(&mut self) {
        for event in self.image.take_events() {
            log::trace!("document event: {event:?}");
        }
    }

    #[cfg(test)]
    pub(crate) fn image(&self) -> &Image {
        &self.image
    }
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_zero_size_rejected() {
        assert!(JsDocument::new(0, 10).is_err());
    }

    #[wasm_bindgen_test]
    fn test_wrong_pixel_length_rejected() {
        let mut doc = JsDocument::new(10, 10).unwrap();
        assert!(doc.add_layer("bad", 0, 0, 2, 2, vec![0; 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_guides_serialize() {
        let mut doc = JsDocument::new(10, 10).unwrap();
        doc.add_guide(true, 4);
        let guides = doc.guides().unwrap();
        assert!(js_sys::Array::is_array(&guides));
        assert_eq!(js_sys::Array::from(&guides).length(), 1);
    }

    #[wasm_bindgen_test]
    fn test_unknown_item() {
        let doc = JsDocument::new(10, 10).unwrap();
        assert!(doc.item_bounds(999).is_err());
    }
}

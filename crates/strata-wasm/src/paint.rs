//! Paintbrush WASM bindings.
//!
//! A `JsPaintbrush` keeps brush state between calls so a front end can feed
//! pointer events as they arrive: `begin` on pointer down, `stroke` with the
//! samples of each move event, `end` on pointer up.

use serde::Deserialize;
use strata_core::document::ItemId;
use strata_core::paint::{
    Brush, BrushCore, CanvasBrushCore, Coords, Dynamics, PaintContext, PaintOptions, PaintState,
    Paintbrush, StrokeOutcome,
};
use strata_core::Color;
use wasm_bindgen::prelude::*;

use crate::document::JsDocument;

/// Values per packed stroke sample: x, y, pressure.
const SAMPLE_STRIDE: usize = 3;

/// Brush configuration as sent from JavaScript. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BrushConfig {
    options: PaintOptions,
    context: PaintContext,
    dynamics: Dynamics,
}

/// Paintbrush tool for one document.
///
/// # Example (TypeScript)
/// ```typescript
/// const brush = new JsPaintbrush({
///   options: { brush_size: 12, application_mode: "constant" },
///   context: { foreground: { r: 0.1, g: 0.2, b: 0.8, a: 1 } },
///   dynamics: { opacity: { pressure: { points: [{ x: 0, y: 0 }, { x: 1, y: 1 }] } } },
/// });
///
/// brush.begin(doc, layerId, e.offsetX, e.offsetY, e.pressure);
/// brush.stroke(doc, new Float64Array([x1, y1, p1, x2, y2, p2]));
/// brush.end(doc);
/// ```
#[wasm_bindgen]
pub struct JsPaintbrush {
    core: CanvasBrushCore,
    options: PaintOptions,
    context: PaintContext,
    drawable: Option<ItemId>,
}

#[wasm_bindgen]
impl JsPaintbrush {
    /// Create a paintbrush.
    ///
    /// # Arguments
    /// * `config` - `{ options?, context?, dynamics? }`, or undefined for
    ///   defaults
    ///
    /// # Errors
    /// Returns error if the configuration cannot be deserialized
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsPaintbrush, JsValue> {
        let config: BrushConfig = if config.is_undefined() || config.is_null() {
            BrushConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid brush config: {}", e)))?
        };
        Ok(Self::from_config(config))
    }

    /// Replace the paint options (`PaintOptions` shape, partial allowed).
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        self.options = serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid paint options: {}", e)))?;
        Ok(())
    }

    /// Replace the dynamics (`Dynamics` shape, partial allowed).
    pub fn set_dynamics(&mut self, dynamics: JsValue) -> Result<(), JsValue> {
        let dynamics: Dynamics = serde_wasm_bindgen::from_value(dynamics)
            .map_err(|e| JsValue::from_str(&format!("Invalid dynamics: {}", e)))?;
        self.core.set_dynamics(dynamics);
        Ok(())
    }

    /// Set the paint color, components 0.0 to 1.0.
    pub fn set_foreground(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.context.foreground = Color::rgba(r, g, b, a);
    }

    /// Set the global paint opacity, 0.0 to 1.0.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.context.opacity = opacity;
    }

    /// Paint with a color brush.
    ///
    /// # Arguments
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    pub fn set_pixmap_brush(
        &mut self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<(), JsValue> {
        let pixmap = image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| JsValue::from_str("Pixmap size does not match its pixel data"))?;
        self.core.set_brush(Some(Brush::from_pixmap(pixmap)));
        Ok(())
    }

    /// Go back to the generated round brush.
    pub fn clear_brush(&mut self) {
        self.core.set_brush(None);
    }

    /// Start a stroke on `drawable` at the pointer-down position.
    pub fn begin(
        &mut self,
        doc: &mut JsDocument,
        drawable: u32,
        x: f64,
        y: f64,
        pressure: f64,
    ) -> Result<(), JsValue> {
        let drawable = ItemId(drawable);
        let coords = Coords::at(x, y).with_pressure(pressure);
        self.run(doc, drawable, &coords, PaintState::Init)?;
        self.drawable = Some(drawable);
        Ok(())
    }

    /// Paint packed `[x, y, pressure, ...]` samples.
    ///
    /// # Returns
    /// How many samples left paint on the drawable
    pub fn stroke(
        &mut self,
        doc: &mut JsDocument,
        samples: &js_sys::Float64Array,
    ) -> Result<u32, JsValue> {
        self.stroke_samples(doc, &samples.to_vec())
    }

    /// Finish the stroke and record it for undo.
    pub fn end(&mut self, doc: &mut JsDocument) -> Result<(), JsValue> {
        let Some(drawable) = self.drawable.take() else {
            return Ok(());
        };
        self.run(doc, drawable, &Coords::default(), PaintState::Finish)?;
        Ok(())
    }

    /// Whether a stroke is in progress.
    #[wasm_bindgen(getter)]
    pub fn painting(&self) -> bool {
        self.drawable.is_some()
    }

    /// Distance covered by the current stroke, in pixels.
    #[wasm_bindgen(getter)]
    pub fn stroke_length(&self) -> f64 {
        self.core.pixel_dist()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPaintbrush {
    fn from_config(config: BrushConfig) -> Self {
        Self {
            core: CanvasBrushCore::new().with_dynamics(config.dynamics),
            options: config.options,
            context: config.context,
            drawable: None,
        }
    }

    /// [`Self::stroke`] over an unpacked slice.
    pub(crate) fn stroke_samples(
        &mut self,
        doc: &mut JsDocument,
        samples: &[f64],
    ) -> Result<u32, JsValue> {
        let drawable = self
            .drawable
            .ok_or_else(|| JsValue::from_str("No stroke in progress; call begin() first"))?;

        let points = packed_coords(samples).ok_or_else(|| {
            JsValue::from_str(&format!(
                "Sample array length {} is not a multiple of {}",
                samples.len(),
                SAMPLE_STRIDE
            ))
        })?;

        let mut painted = 0;
        for coords in points {
            if self.run(doc, drawable, &coords, PaintState::Motion)? == Some(StrokeOutcome::Painted)
            {
                painted += 1;
            }
        }
        Ok(painted)
    }

    fn run(
        &mut self,
        doc: &mut JsDocument,
        drawable: ItemId,
        coords: &Coords,
        state: PaintState,
    ) -> Result<Option<StrokeOutcome>, JsValue> {
        let (image, history) = doc.parts_mut();
        Paintbrush::paint(
            &mut self.core,
            image,
            drawable,
            &self.options,
            &self.context,
            coords,
            state,
            history,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Unpack `[x, y, pressure, ...]`, or `None` if the last sample is cut short.
fn packed_coords(samples: &[f64]) -> Option<impl Iterator<Item = Coords> + '_> {
    if samples.len() % SAMPLE_STRIDE != 0 {
        return None;
    }
    Some(
        samples
            .chunks_exact(SAMPLE_STRIDE)
            .map(|s| Coords::at(s[0], s[1]).with_pressure(s[2])),
    )
}

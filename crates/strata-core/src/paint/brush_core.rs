//! The brush core: dab placement and pasting onto drawables.
//!
//! [`BrushCore`] is the seam between a paint tool and whatever owns brush
//! state. The paint tool decides *what color* a dab gets; the core decides
//! *where* it lands, what footprint it has and how it composites.
//! [`CanvasBrushCore`] is the in-memory implementation.
//!
//! # Application modes
//!
//! - **Incremental**: each dab composites onto the drawable as it is.
//! - **Constant**: dab coverage accumulates into a per-stroke canvas that is
//!   capped at the dab opacity, and the stroke is re-composited over the
//!   pixels as they were when the stroke began. Overlapping dabs of one
//!   stroke never build up past the stroke opacity.

use image::{ImageBuffer, Luma, RgbaImage};

use super::blend::{composite_coverage, composite_rgba, BlendMode};
use super::brush::Brush;
use super::buffer::PaintBuffer;
use super::coords::Coords;
use super::dynamics::{Dynamics, DynamicsOutputKind};
use super::options::{ApplicationMode, BrushMode, PaintOptions};
use crate::color::Color;
use crate::document::{Image, Item, ItemContent, ItemId};
use crate::geometry::Rect;
use crate::undo::UndoRecord;

/// How a colored buffer goes onto the drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PasteParams {
    /// Dab opacity (0.0 to 1.0).
    pub opacity: f64,
    /// Global context opacity (0.0 to 1.0).
    pub image_opacity: f64,
    pub paint_mode: BlendMode,
    pub brush_mode: BrushMode,
    /// 0.5 is neutral.
    pub force: f64,
    pub mode: ApplicationMode,
}

/// Brush state owner used by paint tools.
pub trait BrushCore {
    fn dynamics(&self) -> &Dynamics;

    /// Distance covered by the current stroke, in pixels.
    fn pixel_dist(&self) -> f64;

    /// Whether the current brush carries its own colors.
    fn has_pixmap(&self) -> bool;

    /// Buffer for one dab at `coords`, or `None` when the dab would not touch
    /// the drawable.
    fn get_paint_buffer(
        &mut self,
        drawable: &Item,
        options: &PaintOptions,
        coords: &Coords,
    ) -> Option<PaintBuffer>;

    /// Fill `buffer` from the brush pixmap.
    fn color_area_with_pixmap(
        &self,
        buffer: &mut PaintBuffer,
        coords: &Coords,
        brush_mode: BrushMode,
    );

    /// Composite a colored buffer onto the drawable.
    fn paste_canvas(
        &mut self,
        drawable: &mut Item,
        coords: &Coords,
        buffer: PaintBuffer,
        params: &PasteParams,
    );

    fn begin_stroke(&mut self, _image: &Image, _drawable: &Item, _coords: &Coords) {}

    /// Move the stroke on to the next sample.
    fn advance(&mut self, _coords: &Coords) {}

    /// Close the stroke, returning how to undo it if anything was painted.
    fn end_stroke(&mut self) -> Option<UndoRecord> {
        None
    }
}

type CoverageCanvas = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Per-stroke state.
#[derive(Debug, Clone)]
struct Stroke {
    drawable: ItemId,
    /// The drawable before the first dab.
    before: Item,
    /// Accumulated coverage for constant mode, drawable-sized.
    coverage: CoverageCanvas,
    painted: bool,
}

impl Stroke {
    fn new(drawable: &Item) -> Self {
        Self {
            drawable: drawable.id(),
            before: drawable.clone(),
            coverage: CoverageCanvas::new(drawable.width(), drawable.height()),
            painted: false,
        }
    }

    fn fits(&self, drawable: &Item) -> bool {
        self.drawable == drawable.id()
            && self.coverage.dimensions() == (drawable.width(), drawable.height())
    }
}

/// Coverage of one mask value after brush mode and force.
#[inline]
fn shape_coverage(mask: f32, mode: BrushMode, pressure: f64, force: f64) -> f32 {
    let m = match mode {
        BrushMode::Hard => return if mask >= 0.5 { 1.0 } else { 0.0 },
        BrushMode::Soft => mask,
        BrushMode::Pressure => mask * pressure.clamp(0.0, 1.0) as f32,
    };
    if m <= 0.0 {
        return 0.0;
    }
    let exponent = 2f32.powf(1.0 - 2.0 * force.clamp(0.0, 1.0) as f32);
    m.powf(exponent)
}

/// Bilinear pixmap lookup; outside the pixmap is transparent.
fn sample_pixmap(pixmap: &RgbaImage, fx: f64, fy: f64) -> [f32; 4] {
    let fetch = |x: i64, y: i64| -> [f32; 4] {
        if x < 0 || y < 0 || x >= i64::from(pixmap.width()) || y >= i64::from(pixmap.height()) {
            return [0.0; 4];
        }
        Color::from_rgba8(pixmap.get_pixel(x as u32, y as u32).0).to_array()
    };

    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let mut out = [0.0; 4];
    for i in 0..4 {
        let top = p00[i] + (p10[i] - p00[i]) * tx;
        let bottom = p01[i] + (p11[i] - p01[i]) * tx;
        out[i] = top + (bottom - top) * ty;
    }
    out
}

/// In-memory brush core painting onto document items.
#[derive(Debug, Clone, Default)]
pub struct CanvasBrushCore {
    /// `None` paints with a generated round brush sized by the options.
    brush: Option<Brush>,
    dynamics: Dynamics,
    pixel_dist: f64,
    last_coords: Option<Coords>,
    canvas_size: Option<(u32, u32)>,
    /// Brush as scaled for the current dab, and its sub-pixel placement.
    dab: Option<(Brush, f64, f64)>,
    stroke: Option<Stroke>,
}

impl CanvasBrushCore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_brush(mut self, brush: Brush) -> Self {
        self.brush = Some(brush);
        self
    }

    #[must_use]
    pub fn with_dynamics(mut self, dynamics: Dynamics) -> Self {
        self.dynamics = dynamics;
        self
    }

    pub fn brush(&self) -> Option<&Brush> {
        self.brush.as_ref()
    }

    pub fn set_brush(&mut self, brush: Option<Brush>) {
        self.brush = brush;
    }

    pub fn set_dynamics(&mut self, dynamics: Dynamics) {
        self.dynamics = dynamics;
    }

    /// True between the first dab (or `begin_stroke`) and `end_stroke`.
    pub fn in_stroke(&self) -> bool {
        self.stroke.is_some()
    }

    fn dab_brush(&self, diameter: u32, hardness: f64) -> Brush {
        match &self.brush {
            Some(brush) => brush.scaled(diameter),
            None => Brush::round(diameter, hardness as f32),
        }
    }
}

impl BrushCore for CanvasBrushCore {
    fn dynamics(&self) -> &Dynamics {
        &self.dynamics
    }

    fn pixel_dist(&self) -> f64 {
        self.pixel_dist
    }

    fn has_pixmap(&self) -> bool {
        self.brush.as_ref().is_some_and(Brush::has_pixmap)
    }

    fn get_paint_buffer(
        &mut self,
        drawable: &Item,
        options: &PaintOptions,
        coords: &Coords,
    ) -> Option<PaintBuffer> {
        let (width, height) = self
            .canvas_size
            .unwrap_or((drawable.width(), drawable.height()));
        let fade_point = options
            .fade
            .fade_point_for_size(width, height, self.pixel_dist);

        let size = options.brush_size
            * self
                .dynamics
                .linear_value(DynamicsOutputKind::Size, coords, options, fade_point);
        let diameter = size.round();
        if diameter.is_nan() || diameter < 1.0 {
            log::trace!("dab at ({:.1}, {:.1}) too small: {size:.2}", coords.x, coords.y);
            return None;
        }
        let hardness = (options.brush_hardness
            * self
                .dynamics
                .linear_value(DynamicsOutputKind::Hardness, coords, options, fade_point))
        .clamp(0.0, 1.0);

        // Nothing past the drawable's diagonal can land on it.
        let max_diameter = f64::from(drawable.width())
            .hypot(f64::from(drawable.height()))
            .ceil()
            .max(1.0);
        let dab = self.dab_brush(diameter.min(max_diameter) as u32, hardness);
        let origin_x = coords.x - f64::from(dab.width()) / 2.0;
        let origin_y = coords.y - f64::from(dab.height()) / 2.0;
        let left = origin_x.round() as i32;
        let top = origin_y.round() as i32;

        let footprint = Rect::from_origin_size(left, top, dab.width(), dab.height());
        let bounds = Rect::from_origin_size(0, 0, drawable.width(), drawable.height());
        let area = footprint.intersect(&bounds)?;

        self.dab = Some((dab, origin_x - f64::from(left), origin_y - f64::from(top)));
        Some(PaintBuffer::new(area, (left - area.x1, top - area.y1)))
    }

    fn color_area_with_pixmap(
        &self,
        buffer: &mut PaintBuffer,
        _coords: &Coords,
        brush_mode: BrushMode,
    ) {
        let Some((dab, sub_x, sub_y)) = &self.dab else {
            return;
        };
        let Some(pixmap) = dab.pixmap() else {
            return;
        };
        let (mask_x, mask_y) = buffer.mask_origin();

        for (x, y, px) in buffer.pixels_mut().enumerate_pixels_mut() {
            let bx = x as i32 - mask_x;
            let by = y as i32 - mask_y;
            let mut color = match brush_mode {
                // Hard edges snap to whole pixels.
                BrushMode::Hard => sample_pixmap(pixmap, f64::from(bx), f64::from(by)),
                _ => sample_pixmap(pixmap, f64::from(bx) - sub_x, f64::from(by) - sub_y),
            };
            // The mask carries coverage; the buffer only carries color.
            color[3] = 1.0;
            px.0 = color;
        }
    }

    fn paste_canvas(
        &mut self,
        drawable: &mut Item,
        coords: &Coords,
        buffer: PaintBuffer,
        params: &PasteParams,
    ) {
        let Some((dab, _, _)) = &self.dab else {
            return;
        };

        // A stroke stays on one drawable so its snapshot can undo it.
        if let Some(stroke) = self.stroke.as_ref().filter(|s| !s.fits(drawable)) {
            log::warn!(
                "dab on {} ignored: stroke in progress on {}",
                drawable.id(),
                stroke.drawable
            );
            return;
        }
        let stroke = self.stroke.get_or_insert_with(|| Stroke::new(drawable));

        let opacity = params.opacity.clamp(0.0, 1.0) as f32;
        let image_opacity = params.image_opacity.clamp(0.0, 1.0) as f32;
        let (mask_x, mask_y) = buffer.mask_origin();
        let mask = dab.mask();

        log::trace!(
            "paste {}x{} at ({}, {}) on {} ({:?}, opacity {:.3})",
            buffer.width(),
            buffer.height(),
            buffer.x(),
            buffer.y(),
            drawable.id(),
            params.mode,
            opacity
        );

        let before = stroke.before.content();
        let target = drawable.content_mut();

        for (x, y, px) in buffer.pixels().enumerate_pixels() {
            let bx = x as i32 - mask_x;
            let by = y as i32 - mask_y;
            if bx < 0 || by < 0 || bx as u32 >= mask.width() || by as u32 >= mask.height() {
                continue;
            }
            let raw = f32::from(mask.get_pixel(bx as u32, by as u32)[0]) / 255.0;
            let m = shape_coverage(raw, params.brush_mode, coords.pressure, params.force) * px[3];
            if m <= 0.0 {
                continue;
            }

            let dx = (buffer.x() + x as i32) as u32;
            let dy = (buffer.y() + y as i32) as u32;
            let src = Color::rgb(px[0], px[1], px[2]);

            let (coverage, from_before) = match params.mode {
                ApplicationMode::Incremental => (m * opacity, false),
                ApplicationMode::Constant => {
                    let acc = &mut stroke.coverage.get_pixel_mut(dx, dy)[0];
                    if *acc < opacity {
                        *acc += (opacity - *acc) * m;
                    }
                    (*acc, true)
                }
            };
            let coverage = coverage * image_opacity;

            match &mut *target {
                ItemContent::Rgba(pixels) => {
                    let base = match (from_before, before) {
                        (true, ItemContent::Rgba(b)) => *b.get_pixel(dx, dy),
                        _ => *pixels.get_pixel(dx, dy),
                    };
                    let dst = Color::from_rgba8(base.0).to_array();
                    let out = composite_rgba(
                        dst,
                        [src.r, src.g, src.b],
                        coverage,
                        params.paint_mode,
                    );
                    pixels.put_pixel(dx, dy, image::Rgba(Color::from_array(out).to_rgba8()));
                }
                ItemContent::Coverage(values) => {
                    let base = match (from_before, before) {
                        (true, ItemContent::Coverage(b)) => b.get_pixel(dx, dy)[0],
                        _ => values.get_pixel(dx, dy)[0],
                    };
                    let out = composite_coverage(
                        f32::from(base) / 255.0,
                        src.luminance(),
                        coverage,
                        params.paint_mode,
                    );
                    values.put_pixel(dx, dy, Luma([(out * 255.0).round() as u8]));
                }
                ItemContent::Path(_) => return,
            }
        }
        stroke.painted = true;
    }

    fn begin_stroke(&mut self, image: &Image, drawable: &Item, coords: &Coords) {
        log::debug!("stroke begin on {} at ({:.1}, {:.1})", drawable.id(), coords.x, coords.y);
        self.pixel_dist = 0.0;
        self.last_coords = Some(*coords);
        self.canvas_size = Some((image.width(), image.height()));
        self.stroke = Some(Stroke::new(drawable));
    }

    fn advance(&mut self, coords: &Coords) {
        if let Some(last) = &self.last_coords {
            self.pixel_dist += last.distance(coords);
        }
        self.last_coords = Some(*coords);
    }

    fn end_stroke(&mut self) -> Option<UndoRecord> {
        self.last_coords = None;
        self.canvas_size = None;
        self.dab = None;
        let stroke = self.stroke.take()?;
        log::debug!(
            "stroke end on {} after {:.1}px",
            stroke.drawable,
            self.pixel_dist
        );
        stroke.painted.then(|| UndoRecord::DrawableModified {
            previous: Box::new(stroke.before),
        })
    }
}

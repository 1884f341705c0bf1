//! The paintbrush tool.
//!
//! One call to [`Paintbrush::motion`] paints one stroke sample:
//!
//! 1. Evaluate the fade point and the `Opacity` dynamics. Zero opacity stops
//!    here, before any buffer is acquired.
//! 2. Ask the brush core for a paint buffer. No buffer, no paint.
//! 3. Color the buffer. A gradient color wins over a pixmap brush, which wins
//!    over the foreground color. Gradient and pixmap fills always paste
//!    incrementally so every dab shows its own color.
//! 4. Resolve the force and paste.

use thiserror::Error;

use super::brush_core::{BrushCore, PasteParams};
use super::coords::Coords;
use super::dynamics::DynamicsOutputKind;
use super::options::{gradient_color, ApplicationMode, PaintContext, PaintOptions};
use crate::document::{Image, ImageError, Item, ItemId};
use crate::undo::{UndoGroupKind, UndoLog};

/// Force used when neither dynamics nor options set one.
pub const DEFAULT_FORCE: f64 = 0.5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaintError {
    #[error("No drawable with id {0}")]
    UnknownDrawable(ItemId),

    #[error("Item {0} cannot be painted on")]
    NotPaintable(ItemId),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// What a motion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeOutcome {
    Painted,
    /// Opacity resolved to zero; nothing was touched.
    Transparent,
    /// The dab fell outside the drawable.
    NoPaintBuffer,
}

/// Where in a stroke a paint call happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintState {
    Init,
    Motion,
    Finish,
}

/// Stroke force: the `Force` dynamics when enabled, else a non-default
/// option value, else [`DEFAULT_FORCE`].
pub fn resolve_force(dynamics_enabled: bool, dynamics_force: f64, option_force: f64) -> f64 {
    if dynamics_enabled {
        dynamics_force
    } else if option_force != DEFAULT_FORCE {
        option_force
    } else {
        DEFAULT_FORCE
    }
}

/// The paintbrush: paints dabs colored by foreground, pixmap or gradient.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paintbrush;

impl Paintbrush {
    pub const UNDO_LABEL: &'static str = "Paintbrush";

    /// Dispatch one call of a stroke.
    ///
    /// `Init` and `Finish` bracket the stroke on the core; only `Motion`
    /// paints, at full opacity. `Finish` records the stroke as one undo group
    /// if anything was painted.
    #[allow(clippy::too_many_arguments)]
    pub fn paint<C: BrushCore + ?Sized>(
        core: &mut C,
        image: &mut Image,
        drawable: ItemId,
        options: &PaintOptions,
        context: &PaintContext,
        coords: &Coords,
        state: PaintState,
        undo: &mut dyn UndoLog,
    ) -> Result<Option<StrokeOutcome>, PaintError> {
        match state {
            PaintState::Init => {
                let item = paintable(image, drawable)?;
                core.begin_stroke(image, item, coords);
                Ok(None)
            }
            PaintState::Motion => {
                core.advance(coords);
                Self::motion(core, image, drawable, options, context, coords, 1.0).map(Some)
            }
            PaintState::Finish => {
                if let Some(record) = core.end_stroke() {
                    undo.group_start(UndoGroupKind::Paint, Self::UNDO_LABEL);
                    undo.push(record);
                    undo.group_end();
                }
                Ok(None)
            }
        }
    }

    /// Paint one stroke sample at `opacity`.
    pub fn motion<C: BrushCore + ?Sized>(
        core: &mut C,
        image: &mut Image,
        drawable: ItemId,
        options: &PaintOptions,
        context: &PaintContext,
        coords: &Coords,
        opacity: f64,
    ) -> Result<StrokeOutcome, PaintError> {
        paintable(image, drawable)?;

        let pixel_dist = core.pixel_dist();
        let fade_point = options.fade.fade_point(image, pixel_dist);

        let mut opacity = opacity
            * core
                .dynamics()
                .linear_value(DynamicsOutputKind::Opacity, coords, options, fade_point);
        if opacity == 0.0 {
            log::trace!("transparent dab at ({:.1}, {:.1})", coords.x, coords.y);
            return Ok(StrokeOutcome::Transparent);
        }

        let buffer = {
            let item = paintable(image, drawable)?;
            core.get_paint_buffer(item, options, coords)
        };
        let Some(mut buffer) = buffer else {
            return Ok(StrokeOutcome::NoPaintBuffer);
        };

        let mut mode = options.application_mode;
        let brush_mode = options.brush_mode();

        let dynamics = core.dynamics();
        let grad_point =
            dynamics.linear_value(DynamicsOutputKind::Color, coords, options, fade_point);
        let color_dynamics = dynamics.is_active(DynamicsOutputKind::Color, options);

        if let Some(color) = gradient_color(
            options,
            context,
            image,
            color_dynamics,
            grad_point,
            pixel_dist,
        ) {
            opacity *= f64::from(color.a);
            buffer.fill(color.with_alpha(1.0));
            mode = ApplicationMode::Incremental;
        } else if core.has_pixmap() {
            core.color_area_with_pixmap(&mut buffer, coords, brush_mode);
            mode = ApplicationMode::Incremental;
        } else {
            buffer.fill(context.foreground);
        }

        let dynamics = core.dynamics();
        let dyn_force =
            dynamics.linear_value(DynamicsOutputKind::Force, coords, options, fade_point);
        let force = resolve_force(
            dynamics.is_active(DynamicsOutputKind::Force, options),
            dyn_force,
            options.brush_force,
        );

        let params = PasteParams {
            opacity: opacity.min(1.0),
            image_opacity: context.opacity,
            paint_mode: context.paint_mode,
            brush_mode,
            force,
            mode,
        };

        let item = image
            .item_mut(drawable)
            .ok_or(PaintError::UnknownDrawable(drawable))?;
        core.paste_canvas(item, coords, buffer, &params);
        Ok(StrokeOutcome::Painted)
    }
}

/// The drawable `id`, if it can take paint.
fn paintable(image: &Image, id: ItemId) -> Result<&Item, PaintError> {
    let item = image.item(id).ok_or(PaintError::UnknownDrawable(id))?;
    if !item.is_drawable() {
        return Err(PaintError::NotPaintable(id));
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::curve::Curve;
    use crate::document::{Anchor, ItemContent};
    use crate::geometry::Rect;
    use crate::paint::brush::Brush;
    use crate::paint::buffer::PaintBuffer;
    use crate::paint::brush_core::CanvasBrushCore;
    use crate::paint::dynamics::{Dynamics, DynamicsInput, DynamicsOutput};
    use crate::paint::gradient::Gradient;
    use crate::paint::options::BrushMode;
    use crate::undo::{History, NoUndo, UndoRecord};
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    /// Records every call instead of painting.
    #[derive(Default)]
    struct MockCore {
        dynamics: Dynamics,
        pixmap: bool,
        no_buffer: bool,
        buffer_calls: usize,
        pixmap_calls: Cell<usize>,
        pasted: Vec<(PasteParams, Color)>,
    }

    impl BrushCore for MockCore {
        fn dynamics(&self) -> &Dynamics {
            &self.dynamics
        }

        fn pixel_dist(&self) -> f64 {
            0.0
        }

        fn has_pixmap(&self) -> bool {
            self.pixmap
        }

        fn get_paint_buffer(
            &mut self,
            _drawable: &Item,
            _options: &PaintOptions,
            _coords: &Coords,
        ) -> Option<PaintBuffer> {
            self.buffer_calls += 1;
            if self.no_buffer {
                return None;
            }
            Some(PaintBuffer::new(Rect::new(0, 0, 2, 2), (0, 0)))
        }

        fn color_area_with_pixmap(
            &self,
            buffer: &mut PaintBuffer,
            _coords: &Coords,
            _brush_mode: BrushMode,
        ) {
            self.pixmap_calls.set(self.pixmap_calls.get() + 1);
            buffer.fill(Color::rgb(0.0, 1.0, 0.0));
        }

        fn paste_canvas(
            &mut self,
            _drawable: &mut Item,
            _coords: &Coords,
            buffer: PaintBuffer,
            params: &PasteParams,
        ) {
            self.pasted.push((*params, buffer.color_at(0, 0)));
        }
    }

    fn setup() -> (Image, ItemId) {
        let mut image = Image::new(40, 40).unwrap();
        let layer = image
            .add_item(Item::layer_filled("bg", 0, 0, 40, 40, Color::WHITE))
            .unwrap();
        (image, layer)
    }

    fn gradient_context() -> PaintContext {
        PaintContext {
            gradient: Some(Gradient::two_color(
                Color::rgba(1.0, 0.0, 0.0, 0.5),
                Color::rgba(1.0, 0.0, 0.0, 0.5),
            )),
            ..PaintContext::default()
        }
    }

    fn color_dynamics() -> Dynamics {
        Dynamics {
            color: DynamicsOutput::default().with(DynamicsInput::Pressure, Curve::new()),
            ..Dynamics::default()
        }
    }

    // ========================================================================
    // resolve_force
    // ========================================================================

    #[test]
    fn test_resolve_force() {
        assert_eq!(resolve_force(false, 0.9, 0.5), 0.5);
        assert_eq!(resolve_force(false, 0.9, 0.8), 0.8);
        assert_eq!(resolve_force(true, 0.3, 0.8), 0.3);
        assert_eq!(resolve_force(true, 0.3, 0.5), 0.3);
    }

    // ========================================================================
    // Early exits
    // ========================================================================

    #[test]
    fn test_zero_opacity_acquires_no_buffer() {
        let (mut image, layer) = setup();
        let mut core = MockCore {
            dynamics: Dynamics::pressure_opacity(),
            ..MockCore::default()
        };
        let coords = Coords::at(5.0, 5.0).with_pressure(0.0);
        let outcome = Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &PaintOptions::default(),
            &PaintContext::default(),
            &coords,
            1.0,
        )
        .unwrap();
        assert_eq!(outcome, StrokeOutcome::Transparent);
        assert_eq!(core.buffer_calls, 0);
        assert!(core.pasted.is_empty());
    }

    #[test]
    fn test_zero_base_opacity_acquires_no_buffer() {
        let (mut image, layer) = setup();
        let mut core = MockCore::default();
        let outcome = Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &PaintOptions::default(),
            &PaintContext::default(),
            &Coords::at(5.0, 5.0),
            0.0,
        )
        .unwrap();
        assert_eq!(outcome, StrokeOutcome::Transparent);
        assert_eq!(core.buffer_calls, 0);
    }

    #[test]
    fn test_no_buffer_pastes_nothing() {
        let (mut image, layer) = setup();
        let mut core = MockCore {
            no_buffer: true,
            ..MockCore::default()
        };
        let outcome = Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &PaintOptions::default(),
            &PaintContext::default(),
            &Coords::at(5.0, 5.0),
            1.0,
        )
        .unwrap();
        assert_eq!(outcome, StrokeOutcome::NoPaintBuffer);
        assert_eq!(core.buffer_calls, 1);
        assert!(core.pasted.is_empty());
    }

    #[test]
    fn test_unknown_and_unpaintable_drawables() {
        let (mut image, _) = setup();
        let path = image
            .add_item(Item::vectors("path", 40, 40, vec![Anchor::new(1.0, 1.0)]))
            .unwrap();
        let mut core = MockCore::default();
        let options = PaintOptions::default();
        let context = PaintContext::default();
        let at = Coords::at(1.0, 1.0);

        let err = Paintbrush::motion(&mut core, &mut image, ItemId(99), &options, &context, &at, 1.0)
            .unwrap_err();
        assert_eq!(err, PaintError::UnknownDrawable(ItemId(99)));

        let err = Paintbrush::motion(&mut core, &mut image, path, &options, &context, &at, 1.0)
            .unwrap_err();
        assert_eq!(err, PaintError::NotPaintable(path));
        assert_eq!(core.buffer_calls, 0);
    }

    // ========================================================================
    // Fill priority
    // ========================================================================

    #[test]
    fn test_foreground_fill_keeps_application_mode() {
        let (mut image, layer) = setup();
        let mut core = MockCore::default();
        let context = PaintContext {
            foreground: Color::rgb(0.0, 0.0, 1.0),
            ..PaintContext::default()
        };
        Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &PaintOptions::default(),
            &context,
            &Coords::at(5.0, 5.0),
            1.0,
        )
        .unwrap();

        let (params, color) = core.pasted[0];
        assert_eq!(params.mode, ApplicationMode::Constant);
        assert_eq!(color, Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(params.force, DEFAULT_FORCE);
    }

    #[test]
    fn test_gradient_forces_incremental_and_scales_opacity() {
        let (mut image, layer) = setup();
        let mut core = MockCore {
            dynamics: color_dynamics(),
            pixmap: true,
            ..MockCore::default()
        };
        let mut options = PaintOptions::default();
        options.application_mode = ApplicationMode::Constant;

        Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &options,
            &gradient_context(),
            &Coords::at(5.0, 5.0),
            1.0,
        )
        .unwrap();

        let (params, color) = core.pasted[0];
        assert_eq!(params.mode, ApplicationMode::Incremental);
        assert!((params.opacity - 0.5).abs() < 1e-6);
        // Gradient wins over the pixmap, painted opaque.
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(core.pixmap_calls.get(), 0);
    }

    #[test]
    fn test_pixmap_forces_incremental() {
        let (mut image, layer) = setup();
        let mut core = MockCore {
            pixmap: true,
            ..MockCore::default()
        };
        Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &PaintOptions::default(),
            &PaintContext::default(),
            &Coords::at(5.0, 5.0),
            1.0,
        )
        .unwrap();

        let (params, color) = core.pasted[0];
        assert_eq!(params.mode, ApplicationMode::Incremental);
        assert_eq!(color, Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(core.pixmap_calls.get(), 1);
    }

    #[test]
    fn test_gradient_without_color_dynamics_is_ignored() {
        let (mut image, layer) = setup();
        let mut core = MockCore::default();
        Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &PaintOptions::default(),
            &gradient_context(),
            &Coords::at(5.0, 5.0),
            1.0,
        )
        .unwrap();
        let (params, color) = core.pasted[0];
        assert_eq!(params.mode, ApplicationMode::Constant);
        assert_eq!(color, Color::BLACK);
    }

    // ========================================================================
    // Paste parameters
    // ========================================================================

    #[test]
    fn test_opacity_capped_and_context_forwarded() {
        let (mut image, layer) = setup();
        let mut core = MockCore::default();
        let context = PaintContext {
            opacity: 0.3,
            paint_mode: crate::paint::blend::BlendMode::Multiply,
            ..PaintContext::default()
        };
        let mut options = PaintOptions::default();
        options.hard = true;
        options.brush_force = 0.9;

        Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &options,
            &context,
            &Coords::at(5.0, 5.0),
            2.5,
        )
        .unwrap();

        let (params, _) = core.pasted[0];
        assert_eq!(params.opacity, 1.0);
        assert_eq!(params.image_opacity, 0.3);
        assert_eq!(params.paint_mode, crate::paint::blend::BlendMode::Multiply);
        assert_eq!(params.brush_mode, BrushMode::Hard);
        assert_eq!(params.force, 0.9);
    }

    #[test]
    fn test_force_dynamics_win_over_option() {
        let (mut image, layer) = setup();
        let mut core = MockCore {
            dynamics: Dynamics {
                force: DynamicsOutput::default().with(DynamicsInput::Pressure, Curve::new()),
                ..Dynamics::default()
            },
            ..MockCore::default()
        };
        let mut options = PaintOptions::default();
        options.brush_force = 0.9;

        Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &options,
            &PaintContext::default(),
            &Coords::at(5.0, 5.0).with_pressure(0.25),
            1.0,
        )
        .unwrap();
        assert!((core.pasted[0].0.force - 0.25).abs() < 1e-6);
    }

    // ========================================================================
    // Full strokes on the canvas core
    // ========================================================================

    fn red_at(image: &Image, layer: ItemId, x: u32, y: u32) -> u8 {
        match image.item(layer).unwrap().content() {
            ItemContent::Rgba(p) => p.get_pixel(x, y)[0],
            _ => panic!("not a layer"),
        }
    }

    #[test]
    fn test_stroke_paints_and_records_undo() {
        let (mut image, layer) = setup();
        let mut core = CanvasBrushCore::new();
        let mut history = History::new();
        let options = PaintOptions {
            brush_size: 6.0,
            ..PaintOptions::default()
        };
        let context = PaintContext::default();

        let samples = [
            (PaintState::Init, Coords::at(10.0, 10.0)),
            (PaintState::Motion, Coords::at(10.0, 10.0)),
            (PaintState::Motion, Coords::at(14.0, 10.0)),
            (PaintState::Finish, Coords::at(14.0, 10.0)),
        ];
        for (state, coords) in samples {
            Paintbrush::paint(
                &mut core,
                &mut image,
                layer,
                &options,
                &context,
                &coords,
                state,
                &mut history,
            )
            .unwrap();
        }

        assert_eq!(red_at(&image, layer, 10, 10), 0);
        assert_eq!(red_at(&image, layer, 30, 30), 255);
        assert!((core.pixel_dist() - 4.0).abs() < 1e-9);

        assert_eq!(history.labels(), vec![Paintbrush::UNDO_LABEL.to_string()]);
        match &history.entries()[0].records()[0] {
            UndoRecord::DrawableModified { previous } => {
                assert_eq!(previous.id(), layer);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_stroke_does_not_jump_drawables() {
        let (mut image, first) = setup();
        let second = image
            .add_item(Item::layer_filled("b", 0, 0, 40, 40, Color::WHITE))
            .unwrap();
        let mut core = CanvasBrushCore::new();
        let mut history = History::new();
        let options = PaintOptions {
            brush_size: 6.0,
            ..PaintOptions::default()
        };
        let context = PaintContext::default();
        let at = Coords::at(10.0, 10.0);

        for state in [PaintState::Init, PaintState::Motion] {
            Paintbrush::paint(
                &mut core,
                &mut image,
                first,
                &options,
                &context,
                &at,
                state,
                &mut history,
            )
            .unwrap();
        }
        Paintbrush::motion(&mut core, &mut image, second, &options, &context, &at, 1.0).unwrap();
        Paintbrush::paint(
            &mut core,
            &mut image,
            first,
            &options,
            &context,
            &at,
            PaintState::Finish,
            &mut history,
        )
        .unwrap();

        assert_eq!(red_at(&image, first, 10, 10), 0);
        assert_eq!(red_at(&image, second, 10, 10), 255);
        let records = history.entries()[0].records();
        assert_eq!(records.len(), 1);
        match &records[0] {
            UndoRecord::DrawableModified { previous } => assert_eq!(previous.id(), first),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nan_pressure_with_color_dynamics() {
        let (mut image, layer) = setup();
        let mut core = CanvasBrushCore::new().with_dynamics(color_dynamics());
        let options = PaintOptions {
            brush_size: 6.0,
            ..PaintOptions::default()
        };
        let context = PaintContext {
            gradient: Some(Gradient::default()),
            ..PaintContext::default()
        };

        let outcome = Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &options,
            &context,
            &Coords::at(10.0, 10.0).with_pressure(f64::NAN),
            1.0,
        )
        .unwrap();

        // Reads as the start of the black-to-white gradient.
        assert_eq!(outcome, StrokeOutcome::Painted);
        assert_eq!(red_at(&image, layer, 10, 10), 0);
    }

    #[test]
    fn test_init_and_finish_do_not_paint() {
        let (mut image, layer) = setup();
        let mut core = MockCore::default();
        let options = PaintOptions::default();
        let context = PaintContext::default();
        for state in [PaintState::Init, PaintState::Finish] {
            let outcome = Paintbrush::paint(
                &mut core,
                &mut image,
                layer,
                &options,
                &context,
                &Coords::at(3.0, 3.0),
                state,
                &mut NoUndo,
            )
            .unwrap();
            assert_eq!(outcome, None);
        }
        assert_eq!(core.buffer_calls, 0);
    }

    #[test]
    fn test_pixmap_brush_on_canvas() {
        let (mut image, layer) = setup();
        let pixmap = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let mut core = CanvasBrushCore::new().with_brush(Brush::from_pixmap(pixmap));
        let options = PaintOptions {
            brush_size: 4.0,
            hard: true,
            ..PaintOptions::default()
        };
        let outcome = Paintbrush::motion(
            &mut core,
            &mut image,
            layer,
            &options,
            &PaintContext::default(),
            &Coords::at(20.0, 20.0),
            1.0,
        )
        .unwrap();
        assert_eq!(outcome, StrokeOutcome::Painted);
        match image.item(layer).unwrap().content() {
            ItemContent::Rgba(p) => assert_eq!(*p.get_pixel(20, 20), Rgba([0, 0, 255, 255])),
            _ => panic!("not a layer"),
        }
    }
}

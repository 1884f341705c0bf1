//! Painting: dynamics, brushes and the paintbrush tool.
//!
//! The flow of one dab:
//!
//! ```text
//! Coords ─► Dynamics (opacity, size, force, hardness, color)
//!        ─► BrushCore::get_paint_buffer ─► fill (gradient | pixmap | foreground)
//!        ─► BrushCore::paste_canvas ─► drawable
//! ```
//!
//! [`Paintbrush`] drives the flow; [`BrushCore`] owns brush state and does
//! placement and compositing. [`CanvasBrushCore`] paints onto document items
//! in memory.

mod blend;
mod brush;
mod brush_core;
mod buffer;
mod coords;
mod dynamics;
mod gradient;
mod options;
mod paintbrush;

pub use blend::{composite_coverage, composite_rgba, BlendMode};
pub use brush::Brush;
pub use brush_core::{BrushCore, CanvasBrushCore, PasteParams};
pub use buffer::PaintBuffer;
pub use coords::Coords;
pub use dynamics::{Dynamics, DynamicsInput, DynamicsOutput, DynamicsOutputKind};
pub use gradient::{Gradient, GradientStop};
pub use options::{
    gradient_color, ApplicationMode, BrushMode, FadeOptions, GradientOptions, LengthUnit,
    PaintContext, PaintOptions, RepeatMode,
};
pub use paintbrush::{
    resolve_force, PaintError, PaintState, Paintbrush, StrokeOutcome, DEFAULT_FORCE,
};

//! Strata Core - layered document and paint library
//!
//! This crate provides the document model of the Strata paint program and the
//! two operations that reshape or paint it:
//!
//! - [`crop_image`]: crop or resize the canvas together with its layers,
//!   channels, paths, selection mask, guides and sample points.
//! - [`Paintbrush`]: apply stroke samples to a drawable through the
//!   dynamics-driven paint pipeline.
//!
//! Undo is recorded, not executed: every mutation reports to an
//! [`UndoLog`](undo::UndoLog).

pub mod color;
pub mod curve;
pub mod document;
pub mod geometry;
pub mod paint;
pub mod transform;
pub mod undo;

pub use color::Color;
pub use curve::{Curve, CurvePoint};
pub use document::{Image, ImageError, Item, ItemId, ItemKind};
pub use geometry::Rect;
pub use paint::{
    BrushCore, CanvasBrushCore, Coords, Dynamics, PaintContext, PaintError, PaintOptions,
    Paintbrush, StrokeOutcome,
};
pub use transform::{crop_image, CropOutcome};
pub use undo::{History, NoUndo, UndoLog};

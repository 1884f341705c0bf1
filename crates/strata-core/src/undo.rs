//! Undo recording.
//!
//! Document mutations don't undo themselves. Instead every primitive
//! (resize, translate, remove, move) describes what it changed as an
//! [`UndoRecord`] and hands it to an [`UndoLog`]. Larger operations bracket
//! their records with [`UndoLog::group_start`] / [`UndoLog::group_end`] so the
//! user sees one step.
//!
//! Executing undo/redo is the log owner's business; this crate only records.

use crate::document::{Guide, GuideId, Item, ItemId, SamplePoint, SamplePointId};

/// The kind of user-visible action an undo group stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoGroupKind {
    /// Canvas and layers cropped to a region.
    ImageCrop,
    /// Canvas resized, layers keep their size.
    ImageResize,
    /// One paint stroke.
    Paint,
}

/// A single recorded change.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoRecord {
    /// Canvas size about to change to `width x height`, content moved by
    /// `(-x, -y)`.
    ImageSize {
        previous_width: u32,
        previous_height: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    /// An item was resized. `previous` is the item as it was before.
    ItemResized { previous: Box<Item> },
    /// An item moved by `(dx, dy)`.
    ItemTranslated { item: ItemId, dx: i32, dy: i32 },
    /// A layer was taken out of the stack at `index`.
    LayerRemoved { layer: Box<Item>, index: usize },
    /// Raster content of a drawable changed (one paint stroke).
    DrawableModified { previous: Box<Item> },
    GuideRemoved { guide: Guide },
    GuideMoved { guide: GuideId, from: i32, to: i32 },
    SamplePointRemoved { point: SamplePoint },
    SamplePointMoved {
        point: SamplePointId,
        from: (i32, i32),
        to: (i32, i32),
    },
}

/// Anything that can sink undo records.
pub trait UndoLog {
    /// Open a group. Groups may nest; nested groups belong to the outermost.
    fn group_start(&mut self, kind: UndoGroupKind, label: &str);
    /// Close the innermost open group.
    fn group_end(&mut self);
    /// Record one change.
    fn push(&mut self, record: UndoRecord);
}

impl<L: UndoLog + ?Sized> UndoLog for &mut L {
    fn group_start(&mut self, kind: UndoGroupKind, label: &str) {
        (**self).group_start(kind, label);
    }
    fn group_end(&mut self) {
        (**self).group_end();
    }
    fn push(&mut self, record: UndoRecord) {
        (**self).push(record);
    }
}

/// Discards everything. For callers that don't keep history.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUndo;

impl UndoLog for NoUndo {
    fn group_start(&mut self, _kind: UndoGroupKind, _label: &str) {}
    fn group_end(&mut self) {}
    fn push(&mut self, _record: UndoRecord) {}
}

/// One entry of the recorded history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// A record pushed outside of any group.
    Single(UndoRecord),
    /// A closed group of records.
    Group {
        kind: UndoGroupKind,
        label: String,
        records: Vec<UndoRecord>,
    },
}

impl HistoryEntry {
    /// User-visible label of this entry.
    pub fn label(&self) -> &str {
        match self {
            HistoryEntry::Single(_) => "",
            HistoryEntry::Group { label, .. } => label,
        }
    }

    /// The records of this entry, in push order.
    pub fn records(&self) -> &[UndoRecord] {
        match self {
            HistoryEntry::Single(record) => std::slice::from_ref(record),
            HistoryEntry::Group { records, .. } => records,
        }
    }
}

#[derive(Debug, Clone)]
struct OpenGroup {
    kind: UndoGroupKind,
    label: String,
    records: Vec<UndoRecord>,
}

/// In-memory undo log.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    open: Option<OpenGroup>,
    depth: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The newest closed entry.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// True while a group is open.
    pub fn in_group(&self) -> bool {
        self.depth > 0
    }

    /// Labels of all closed groups, oldest first.
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                HistoryEntry::Group { label, .. } => Some(label.clone()),
                HistoryEntry::Single(_) => None,
            })
            .collect()
    }
}

impl UndoLog for History {
    fn group_start(&mut self, kind: UndoGroupKind, label: &str) {
        self.depth += 1;
        if self.open.is_none() {
            log::trace!("undo group start: {label}");
            self.open = Some(OpenGroup {
                kind,
                label: label.to_string(),
                records: Vec::new(),
            });
        }
    }

    fn group_end(&mut self) {
        if self.depth == 0 {
            log::warn!("undo group end without a matching start");
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }
        if let Some(group) = self.open.take() {
            log::trace!(
                "undo group end: {} ({} records)",
                group.label,
                group.records.len()
            );
            self.entries.push(HistoryEntry::Group {
                kind: group.kind,
                label: group.label,
                records: group.records,
            });
        }
    }

    fn push(&mut self, record: UndoRecord) {
        match &mut self.open {
            Some(group) => group.records.push(record),
            None => self.entries.push(HistoryEntry::Single(record)),
        }
    }
}

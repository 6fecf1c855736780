use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use deck_logging::deck_debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Text,
    Style,
    Position,
}

/// One side of a change: the value before or after an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeData {
    Text { text: String },
    /// CSS property name to value; an empty value means "unset".
    Style { properties: BTreeMap<String, String> },
    /// Inline `left`/`top` in pixels, plus the CSS `position` they apply under.
    Position {
        left: f64,
        top: f64,
        position: Option<String>,
    },
}

impl ChangeData {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeData::Text { .. } => ChangeKind::Text,
            ChangeData::Style { .. } => ChangeKind::Style,
            ChangeData::Position { .. } => ChangeKind::Position,
        }
    }

    pub fn style(property: &str, value: impl Into<String>) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(property.to_string(), value.into());
        ChangeData::Style { properties }
    }
}

/// A before/after record for one element property; the unit of undo/redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub element_id: String,
    pub data: ChangeData,
    pub previous_data: ChangeData,
    pub timestamp: DateTime<Utc>,
}

impl Change {
    pub fn new(element_id: impl Into<String>, data: ChangeData, previous_data: ChangeData) -> Self {
        Self {
            element_id: element_id.into(),
            data,
            previous_data,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.data.kind()
    }
}

/// Linear history for one slide. `cursor` counts the applied changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlideHistory {
    changes: Vec<Change>,
    cursor: usize,
}

impl SlideHistory {
    pub fn push(&mut self, change: Change) {
        self.changes.truncate(self.cursor);
        self.changes.push(change);
        self.cursor = self.changes.len();
    }

    pub fn undo(&mut self) -> Option<&Change> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.changes.get(self.cursor)
    }

    pub fn redo(&mut self) -> Option<&Change> {
        let change = self.changes.get(self.cursor)?;
        self.cursor += 1;
        Some(change)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.changes.len()
    }

    /// Changes currently applied, oldest first.
    pub fn applied(&self) -> &[Change] {
        &self.changes[..self.cursor]
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Per-slide change logs. Pure bookkeeping: applying a change to the
/// render surface is the caller's job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeHistory {
    slides: HashMap<String, SlideHistory>,
}

impl ChangeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `change` and drops any redo tail beyond the cursor.
    pub fn track_change(&mut self, slide_id: &str, change: Change) {
        deck_debug!(
            "track {:?} change on {} for slide {}",
            change.kind(),
            change.element_id,
            slide_id
        );
        self.slides.entry(slide_id.to_string()).or_default().push(change);
    }

    /// Steps back one change. Returns the change whose `previous_data`
    /// should be applied, or `None` at the start of history.
    pub fn undo(&mut self, slide_id: &str) -> Option<Change> {
        self.slides.get_mut(slide_id)?.undo().cloned()
    }

    /// Steps forward one change. Returns the change whose `data` should be
    /// reapplied, or `None` at the end of history.
    pub fn redo(&mut self, slide_id: &str) -> Option<Change> {
        self.slides.get_mut(slide_id)?.redo().cloned()
    }

    pub fn can_undo(&self, slide_id: &str) -> bool {
        self.slides.get(slide_id).is_some_and(SlideHistory::can_undo)
    }

    pub fn can_redo(&self, slide_id: &str) -> bool {
        self.slides.get(slide_id).is_some_and(SlideHistory::can_redo)
    }

    pub fn slide(&self, slide_id: &str) -> Option<&SlideHistory> {
        self.slides.get(slide_id)
    }

    pub fn clear(&mut self, slide_id: &str) {
        self.slides.remove(slide_id);
    }
}

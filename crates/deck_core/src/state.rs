use std::collections::BTreeSet;

use deck_logging::{deck_debug, deck_warn};
use serde::{Deserialize, Serialize};

use crate::entry::{LogEntry, SlideEntry};
use crate::event::AgentEvent;
use crate::history::ChangeHistory;
use crate::parser::{
    is_log_duplicate, is_slide_duplicate, ParseResult, PresentationMetadata, StreamView,
    UpdateType,
};
use crate::view_model::{SessionViewModel, SlideProgressRow, TimelineRow};

/// What committing one parse result changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CommitOutcome {
    pub changed: bool,
    pub metadata_changed: bool,
    pub slide_ready: Option<u32>,
}

/// `(author, timestamp)` of an event that has been folded into a session.
pub type EventKey = (String, String);

/// Serializable part of a session: timeline, slides and metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub metadata: PresentationMetadata,
    pub logs: Vec<LogEntry>,
    pub slides: Vec<SlideEntry>,
    /// Events already folded, so a replay that overlaps the snapshot does
    /// not merge them twice.
    #[serde(default)]
    pub folded_events: BTreeSet<EventKey>,
}

/// Owner of the timeline, the slide aggregates and the per-slide edit history.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    logs: Vec<LogEntry>,
    slides: Vec<SlideEntry>,
    metadata: PresentationMetadata,
    folded_events: BTreeSet<EventKey>,
    history: ChangeHistory,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn slides(&self) -> &[SlideEntry] {
        &self.slides
    }

    pub fn metadata(&self) -> &PresentationMetadata {
        &self.metadata
    }

    pub fn history(&self) -> &ChangeHistory {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut ChangeHistory {
        &mut self.history
    }

    pub fn stream_view(&self) -> StreamView<'_> {
        StreamView {
            logs: &self.logs,
            slides: &self.slides,
        }
    }

    pub fn slide(&self, slide_number: u32) -> Option<&SlideEntry> {
        self.slides.iter().find(|s| s.slide_number == slide_number)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            metadata: self.metadata.clone(),
            logs: self.logs.clone(),
            slides: self.slides.clone(),
            folded_events: self.folded_events.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: SessionSnapshot) {
        self.metadata = snapshot.metadata;
        self.logs = snapshot.logs;
        self.slides = snapshot.slides;
        self.folded_events = snapshot.folded_events;
        // Snapshots without the key set still know the events that created entries.
        let created = self
            .logs
            .iter()
            .map(|entry| (&entry.author, &entry.timestamp))
            .chain(self.slides.iter().map(|slide| (&slide.author, &slide.timestamp)))
            .filter(|(_, timestamp)| !timestamp.is_empty())
            .map(|(author, timestamp)| (author.clone(), timestamp.clone()))
            .collect::<Vec<_>>();
        self.folded_events.extend(created);
        self.mark_dirty();
    }

    /// Remembers `event` as folded. Returns `false` when an event with the
    /// same author and non-empty timestamp was folded before.
    pub(crate) fn record_event(&mut self, event: &AgentEvent) -> bool {
        if event.timestamp.is_empty() {
            return true;
        }
        self.folded_events
            .insert((event.author.clone(), event.timestamp.clone()))
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn view(&self) -> SessionViewModel {
        let mut slides: Vec<SlideProgressRow> =
            self.slides.iter().map(SlideProgressRow::from_entry).collect();
        slides.sort_by_key(|row| row.slide_number);
        let completed_slides = slides.iter().filter(|row| row.is_complete).count();

        SessionViewModel {
            title: self.metadata.title.clone(),
            total_slides: self.metadata.total_slides,
            timeline: self.logs.iter().map(TimelineRow::from_entry).collect(),
            slides,
            completed_slides,
            dirty: self.dirty,
        }
    }

    /// Folds a parser instruction into the collections, skipping duplicates.
    pub(crate) fn commit(&mut self, result: ParseResult) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();
        match result {
            ParseResult::Log(entry) => {
                outcome.changed = self.insert_log(entry);
            }
            ParseResult::LogWithMetadata { entry, metadata } => {
                outcome.changed = self.insert_log(entry);
                outcome.metadata_changed = self.merge_metadata(metadata);
                outcome.changed |= outcome.metadata_changed;
            }
            ParseResult::BrowserWorker {
                update_type: UpdateType::Create,
                log_entry,
                ..
            } => {
                outcome.changed = self.insert_log(log_entry);
            }
            ParseResult::BrowserWorker {
                update_type: UpdateType::Update,
                log_index,
                log_entry,
                ..
            } => {
                let target = log_index
                    .filter(|&i| self.logs.get(i).is_some_and(|e| e.id == log_entry.id))
                    .or_else(|| self.logs.iter().position(|e| e.id == log_entry.id));
                match target {
                    Some(index) => {
                        self.logs[index] = log_entry;
                        outcome.changed = true;
                    }
                    None => {
                        deck_warn!(
                            "browser worker update for {} has no target; appending",
                            log_entry.author
                        );
                        outcome.changed = self.insert_log(log_entry);
                    }
                }
            }
            ParseResult::Slide {
                update_type,
                slide_index,
                slide_entry,
            } => {
                let slide_number = slide_entry.slide_number;
                let is_complete = slide_entry.is_complete;
                let target = match update_type {
                    UpdateType::Create => None,
                    UpdateType::Update => slide_index
                        .filter(|&i| {
                            self.slides
                                .get(i)
                                .is_some_and(|s| s.slide_number == slide_number)
                        })
                        .or_else(|| {
                            self.slides
                                .iter()
                                .position(|s| s.slide_number == slide_number)
                        }),
                };
                let was_complete = target.is_some_and(|i| self.slides[i].is_complete);
                match target {
                    Some(index) => {
                        self.slides[index] = slide_entry;
                        outcome.changed = true;
                    }
                    None if is_slide_duplicate(&self.slides, &slide_entry) => {}
                    None => {
                        self.slides.push(slide_entry);
                        outcome.changed = true;
                    }
                }
                if outcome.changed && is_complete && !was_complete {
                    outcome.slide_ready = Some(slide_number);
                }
            }
        }
        if outcome.changed {
            self.mark_dirty();
        }
        outcome
    }

    fn insert_log(&mut self, entry: LogEntry) -> bool {
        if is_log_duplicate(&self.logs, &entry) {
            deck_debug!(
                "skipping duplicate log from {} at {:?}",
                entry.author,
                entry.timestamp
            );
            return false;
        }
        self.logs.push(entry);
        true
    }

    fn merge_metadata(&mut self, incoming: PresentationMetadata) -> bool {
        let mut changed = false;
        if incoming.total_slides.is_some() && incoming.total_slides != self.metadata.total_slides {
            self.metadata.total_slides = incoming.total_slides;
            changed = true;
        }
        if incoming.title.is_some() && incoming.title != self.metadata.title {
            self.metadata.title = incoming.title;
            changed = true;
        }
        changed
    }
}

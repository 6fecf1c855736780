use crate::classify::MessageType;
use crate::entry::{EntryId, LogEntry, Phase, SlideEntry};

/// Longest headline shown for a timeline row, in characters.
pub const HEADLINE_LIMIT: usize = 120;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionViewModel {
    pub title: Option<String>,
    pub total_slides: Option<u32>,
    pub timeline: Vec<TimelineRow>,
    pub slides: Vec<SlideProgressRow>,
    pub completed_slides: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub id: EntryId,
    pub author: String,
    pub message_type: MessageType,
    pub phase: Phase,
    pub headline: String,
    pub link_count: usize,
    pub is_complete: bool,
}

impl TimelineRow {
    pub(crate) fn from_entry(entry: &LogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            author: entry.author.clone(),
            message_type: entry.message_type,
            phase: entry.phase,
            headline: headline(entry),
            link_count: entry.payload.links.len(),
            is_complete: entry.is_complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideProgressRow {
    pub slide_number: u32,
    pub has_thinking: bool,
    pub has_html: bool,
    pub is_complete: bool,
}

impl SlideProgressRow {
    pub(crate) fn from_entry(entry: &SlideEntry) -> Self {
        Self {
            slide_number: entry.slide_number,
            has_thinking: entry.thinking.is_some(),
            has_html: entry.html_content.is_some(),
            is_complete: entry.is_complete,
        }
    }
}

fn headline(entry: &LogEntry) -> String {
    let payload = &entry.payload;
    let raw = payload
        .summary
        .clone()
        .or_else(|| payload.content.clone())
        .or_else(|| payload.text.clone())
        .or_else(|| (!payload.keywords.is_empty()).then(|| payload.keywords.join(", ")))
        .or_else(|| {
            payload
                .links
                .last()
                .map(|link| format!("researching {}", link.domain))
        })
        .unwrap_or_default();
    let single_line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= HEADLINE_LIMIT {
        single_line
    } else {
        let truncated: String = single_line.chars().take(HEADLINE_LIMIT).collect();
        format!("{truncated}…")
    }
}

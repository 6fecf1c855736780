//! Normalizes raw agent events into timeline entries and slide aggregates.
//!
//! The parser is stateless: it reads a snapshot of the current logs and
//! slides and returns an instruction describing what the caller should
//! insert or replace. Events for the same worker or slide must be applied
//! in arrival order; events for different authors are independent.

use chrono::Utc;
use deck_logging::{deck_debug, deck_trace};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::classify::{classify, derive_flags, MessageType};
use crate::entry::{EntryId, LogEntry, LogPayload, Phase, SlideEntry, SourceLink};
use crate::event::{value_as_u32, AgentEvent};

const SLIDE_GENERATOR_MARKER: &str = "enhanced_slide_generator_";

/// Read-only view of the collections the parser merges into.
#[derive(Debug, Clone, Copy)]
pub struct StreamView<'a> {
    pub logs: &'a [LogEntry],
    pub slides: &'a [SlideEntry],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    Create,
    Update,
}

/// Session-level fields announced by `presentation_spec_extractor_agent`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresentationMetadata {
    pub total_slides: Option<u32>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    /// A new entry to append.
    Log(LogEntry),
    /// A new entry plus metadata the caller applies to the session.
    LogWithMetadata {
        entry: LogEntry,
        metadata: PresentationMetadata,
    },
    BrowserWorker {
        update_type: UpdateType,
        /// Index into the snapshot's logs; `None` for `Create`.
        log_index: Option<usize>,
        log_entry: LogEntry,
        /// Whether the incoming event carried a summary.
        is_complete: bool,
    },
    Slide {
        update_type: UpdateType,
        /// Index into the snapshot's slides; `None` for `Create`.
        slide_index: Option<usize>,
        slide_entry: SlideEntry,
    },
}

/// Routes one event by author and produces the merge instruction for it.
pub fn parse_agent_output(event: &AgentEvent, view: StreamView<'_>) -> ParseResult {
    let message_type = classify(&event.author);
    deck_trace!(
        "parsing event author={:?} type={}",
        event.author,
        message_type.as_str()
    );

    match message_type {
        MessageType::BrowserWorker => parse_browser_worker(event, view.logs),
        MessageType::SpecExtractor => ParseResult::LogWithMetadata {
            entry: new_log_entry(event, message_type),
            metadata: presentation_metadata(event),
        },
        MessageType::Unknown => match slide_number_from_author(&event.author) {
            Some(slide_number) => parse_slide(event, slide_number, view.slides),
            None => ParseResult::Log(unknown_log_entry(event)),
        },
        MessageType::User
        | MessageType::KeywordResearch
        | MessageType::Planning
        | MessageType::SlideGeneration => ParseResult::Log(new_log_entry(event, message_type)),
    }
}

/// Slide number from an author containing `enhanced_slide_generator_<n>`.
pub fn slide_number_from_author(author: &str) -> Option<u32> {
    let start = author.find(SLIDE_GENERATOR_MARKER)? + SLIDE_GENERATOR_MARKER.len();
    let digits: String = author[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// True when `entry` is already present, by id or by author + timestamp.
pub fn is_log_duplicate(logs: &[LogEntry], entry: &LogEntry) -> bool {
    logs.iter().any(|existing| {
        existing.id == entry.id
            || (!entry.timestamp.is_empty()
                && existing.author == entry.author
                && existing.timestamp == entry.timestamp)
    })
}

/// True when `entry` is already present, by id or by author + timestamp.
pub fn is_slide_duplicate(slides: &[SlideEntry], entry: &SlideEntry) -> bool {
    slides.iter().any(|existing| {
        existing.id == entry.id
            || (!entry.timestamp.is_empty()
                && existing.author == entry.author
                && existing.timestamp == entry.timestamp)
    })
}

fn parse_browser_worker(event: &AgentEvent, logs: &[LogEntry]) -> ParseResult {
    let incoming = derive_flags(event);
    let existing = logs.iter().position(|entry| {
        entry.message_type == MessageType::BrowserWorker
            && (entry.author == event.author
                || (incoming.worker_number.is_some()
                    && entry.worker_number() == incoming.worker_number))
    });

    match existing {
        None => {
            let mut entry = new_log_entry(event, MessageType::BrowserWorker);
            entry.payload.links.extend(link_from_event(event));
            entry.refresh_flags();
            entry.is_complete = entry.payload.summary.is_some();
            deck_debug!(
                "browser worker {:?} created (links={}, complete={})",
                entry.worker_number(),
                entry.payload.links.len(),
                entry.is_complete
            );
            ParseResult::BrowserWorker {
                update_type: UpdateType::Create,
                log_index: None,
                log_entry: entry,
                is_complete: incoming.has_summary,
            }
        }
        Some(index) => {
            let mut entry = logs[index].clone();
            entry.payload.links.extend(links_from_array(event));
            entry.payload.links.extend(link_from_event(event));
            if let Some(summary) = event.text_field("summary") {
                entry.payload.summary = Some(summary);
            }
            if entry.flags.worker_number.is_none() {
                entry.flags.worker_number = incoming.worker_number;
            }
            entry.refresh_flags();
            entry.is_complete = entry.payload.summary.is_some();
            entry.last_updated = Some(Utc::now());
            deck_debug!(
                "browser worker {:?} updated at index {} (links={}, complete={})",
                entry.worker_number(),
                index,
                entry.payload.links.len(),
                entry.is_complete
            );
            ParseResult::BrowserWorker {
                update_type: UpdateType::Update,
                log_index: Some(index),
                log_entry: entry,
                is_complete: incoming.has_summary,
            }
        }
    }
}

fn parse_slide(event: &AgentEvent, slide_number: u32, slides: &[SlideEntry]) -> ParseResult {
    let thinking = supplied_text(event, &["thinking"]);
    let html_content = supplied_text(event, &["html_content", "htmlContent"]);

    match slides.iter().position(|s| s.slide_number == slide_number) {
        None => {
            let mut slide = SlideEntry {
                id: EntryId::generate(),
                slide_number,
                author: event.author.clone(),
                thinking,
                html_content,
                timestamp: event.timestamp.clone(),
                last_updated: Utc::now(),
                is_complete: false,
            };
            slide.recompute_complete();
            deck_debug!("slide {} created (complete={})", slide_number, slide.is_complete);
            ParseResult::Slide {
                update_type: UpdateType::Create,
                slide_index: None,
                slide_entry: slide,
            }
        }
        Some(index) => {
            let mut slide = slides[index].clone();
            if thinking.is_some() {
                slide.thinking = thinking;
            }
            if html_content.is_some() {
                slide.html_content = html_content;
            }
            slide.last_updated = Utc::now();
            slide.recompute_complete();
            deck_debug!(
                "slide {} updated at index {} (complete={})",
                slide_number,
                index,
                slide.is_complete
            );
            ParseResult::Slide {
                update_type: UpdateType::Update,
                slide_index: Some(index),
                slide_entry: slide,
            }
        }
    }
}

fn new_log_entry(event: &AgentEvent, message_type: MessageType) -> LogEntry {
    let mut entry = LogEntry {
        id: EntryId::generate(),
        author: event.author.clone(),
        message_type,
        timestamp: event.timestamp.clone(),
        phase: Phase::for_message_type(message_type),
        payload: payload_from_event(event),
        flags: derive_flags(event),
        is_complete: false,
        last_updated: None,
    };
    entry.refresh_flags();
    entry.is_complete = entry.payload.summary.is_some();
    entry
}

/// Unrecognised authors keep the entire raw event under `data`.
fn unknown_log_entry(event: &AgentEvent) -> LogEntry {
    let mut entry = LogEntry {
        id: EntryId::generate(),
        author: event.author.clone(),
        message_type: MessageType::Unknown,
        timestamp: event.timestamp.clone(),
        phase: Phase::Unknown,
        payload: LogPayload {
            data: Some(event.to_value()),
            ..LogPayload::default()
        },
        flags: derive_flags(event),
        is_complete: false,
        last_updated: None,
    };
    entry.flags.has_data = true;
    entry
}

fn payload_from_event(event: &AgentEvent) -> LogPayload {
    LogPayload {
        content: event
            .first_str(&["content", "message"])
            .map(ToOwned::to_owned),
        keywords: event.string_list("keywords"),
        links: links_from_array(event),
        summary: event.text_field("summary"),
        data: event.field("data").cloned(),
        text: event.str_field("text").map(ToOwned::to_owned),
        color_theme: event.first_field(&["colorTheme", "color_theme"]).cloned(),
        tags: event.string_list("tags"),
    }
}

fn presentation_metadata(event: &AgentEvent) -> PresentationMetadata {
    let data = event.field("data").and_then(Value::as_object);
    let from_data = |keys: &[&str]| {
        data.and_then(|object| keys.iter().find_map(|key| object.get(*key)))
    };

    const SLIDE_KEYS: [&str; 3] = ["total_slides", "totalSlides", "slide_count"];
    const TITLE_KEYS: [&str; 2] = ["title", "presentation_title"];

    let total_slides = event
        .u32_field(&SLIDE_KEYS)
        .or_else(|| from_data(&SLIDE_KEYS).and_then(value_as_u32));
    let title = event
        .first_str(&TITLE_KEYS)
        .or_else(|| from_data(&TITLE_KEYS).and_then(Value::as_str))
        .map(ToOwned::to_owned);

    PresentationMetadata {
        total_slides,
        title,
    }
}

/// The single `domain` + `url` pair a browser worker reports per event.
fn link_from_event(event: &AgentEvent) -> Option<SourceLink> {
    let url = event.str_field("url")?;
    let domain = match event.str_field("domain") {
        Some(domain) => domain.to_string(),
        None => Url::parse(url).ok()?.host_str()?.to_string(),
    };
    Some(SourceLink {
        domain,
        url: url.to_string(),
    })
}

fn links_from_array(event: &AgentEvent) -> Vec<SourceLink> {
    let Some(items) = event.field("links").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(SourceLink {
                domain: Url::parse(url)
                    .ok()
                    .and_then(|u| u.host_str().map(ToOwned::to_owned))
                    .unwrap_or_default(),
                url: url.clone(),
            }),
            Value::Object(object) => {
                let url = object.get("url").and_then(Value::as_str)?;
                let domain = object
                    .get("domain")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned)
                    .or_else(|| {
                        Url::parse(url)
                            .ok()
                            .and_then(|u| u.host_str().map(ToOwned::to_owned))
                    })
                    .unwrap_or_default();
                Some(SourceLink {
                    domain,
                    url: url.to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

/// A text field counts as supplied only when it is a non-empty string.
fn supplied_text(event: &AgentEvent, keys: &[&str]) -> Option<String> {
    event
        .first_str(keys)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::slide_number_from_author;

    #[test]
    fn slide_number_needs_digits_after_marker() {
        assert_eq!(slide_number_from_author("enhanced_slide_generator_12"), Some(12));
        assert_eq!(
            slide_number_from_author("agent.enhanced_slide_generator_4_v2"),
            Some(4)
        );
        assert_eq!(slide_number_from_author("enhanced_slide_generator_"), None);
        assert_eq!(slide_number_from_author("slide_generator_3"), None);
    }
}

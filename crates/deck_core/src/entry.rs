use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::classify::{EventFlags, MessageType};

/// Opaque identifier of a timeline entry; unique per creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Research,
    Generation,
    Unknown,
}

impl Phase {
    pub fn for_message_type(message_type: MessageType) -> Self {
        match message_type {
            MessageType::User | MessageType::SpecExtractor | MessageType::Planning => {
                Phase::Planning
            }
            MessageType::KeywordResearch | MessageType::BrowserWorker => Phase::Research,
            MessageType::SlideGeneration => Phase::Generation,
            MessageType::Unknown => Phase::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Planning => "planning",
            Phase::Research => "research",
            Phase::Generation => "generation",
            Phase::Unknown => "unknown",
        }
    }
}

/// A research source found by a browser worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub domain: String,
    pub url: String,
}

/// Variant-specific content of a log entry. Which fields are populated
/// depends on the producing agent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogPayload {
    pub content: Option<String>,
    pub keywords: Vec<String>,
    pub links: Vec<SourceLink>,
    pub summary: Option<String>,
    pub data: Option<Value>,
    pub text: Option<String>,
    pub color_theme: Option<Value>,
    pub tags: Vec<String>,
}

/// One normalized timeline item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub author: String,
    pub message_type: MessageType,
    pub timestamp: String,
    pub phase: Phase,
    pub payload: LogPayload,
    pub flags: EventFlags,
    /// Set once a summary has been merged; only browser workers ever clear it.
    pub is_complete: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl LogEntry {
    pub fn worker_number(&self) -> Option<u32> {
        self.flags.worker_number
    }

    /// Recomputes the link/summary/keyword/data flags from the payload.
    pub(crate) fn refresh_flags(&mut self) {
        self.flags.has_links = !self.payload.links.is_empty();
        self.flags.has_summary = self.payload.summary.is_some();
        self.flags.has_keywords = !self.payload.keywords.is_empty();
        self.flags.has_data = self.payload.data.is_some();
    }
}

/// Aggregate of everything a slide generator has produced for one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideEntry {
    pub id: EntryId,
    pub slide_number: u32,
    pub author: String,
    pub thinking: Option<String>,
    pub html_content: Option<String>,
    pub timestamp: String,
    pub last_updated: DateTime<Utc>,
    pub is_complete: bool,
}

impl SlideEntry {
    pub(crate) fn recompute_complete(&mut self) {
        self.is_complete = self.thinking.is_some() && self.html_content.is_some();
    }
}

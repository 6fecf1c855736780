use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{value_as_u32, AgentEvent};

const BROWSER_WORKER_PREFIX: &str = "browser_worker_";

/// Semantic kind of an agent message, derived from its author tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    User,
    SpecExtractor,
    KeywordResearch,
    BrowserWorker,
    Planning,
    SlideGeneration,
    Unknown,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::User => "user",
            MessageType::SpecExtractor => "spec_extractor",
            MessageType::KeywordResearch => "keyword_research",
            MessageType::BrowserWorker => "browser_worker",
            MessageType::Planning => "planning",
            MessageType::SlideGeneration => "slide_generation",
            MessageType::Unknown => "unknown",
        }
    }
}

/// Maps an author tag to its message type. Total: anything unrecognised is `Unknown`.
pub fn classify(author: &str) -> MessageType {
    match author {
        "user" => MessageType::User,
        "presentation_spec_extractor_agent" => MessageType::SpecExtractor,
        "KeywordResearchAgent" => MessageType::KeywordResearch,
        a if a.starts_with(BROWSER_WORKER_PREFIX) => MessageType::BrowserWorker,
        "lightweight_planning_agent" => MessageType::Planning,
        "LightweightSlideGeneration" => MessageType::SlideGeneration,
        _ => MessageType::Unknown,
    }
}

/// Derived booleans and the worker number carried alongside every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventFlags {
    pub has_links: bool,
    pub has_summary: bool,
    pub has_keywords: bool,
    pub has_data: bool,
    pub worker_number: Option<u32>,
}

/// Numeric suffix of a `browser_worker_<n>` author.
pub fn worker_number_from_author(author: &str) -> Option<u32> {
    author
        .strip_prefix(BROWSER_WORKER_PREFIX)
        .and_then(|suffix| suffix.parse().ok())
}

pub fn derive_flags(event: &AgentEvent) -> EventFlags {
    let message_type = classify(&event.author);
    let explicit_worker = event.u32_field(&["workerNumber", "worker_number"]);
    let worker_number = explicit_worker.or_else(|| {
        if message_type == MessageType::BrowserWorker {
            worker_number_from_author(&event.author)
        } else {
            None
        }
    });

    EventFlags {
        has_links: event.array_len("links") > 0,
        has_summary: event.field("summary").is_some(),
        has_keywords: event.array_len("keywords") > 0,
        has_data: event.field("data").is_some(),
        worker_number,
    }
}

/// Returns a copy of `event` with `messageType` and the derived flags written
/// into its fields. Idempotent: the derived fields are recomputed from the
/// source fields, never from a previous enrichment.
pub fn enrich(event: &AgentEvent) -> AgentEvent {
    let message_type = classify(&event.author);
    let flags = derive_flags(event);
    let mut enriched = event.clone();
    let fields = &mut enriched.fields;
    fields.insert("messageType".into(), Value::from(message_type.as_str()));
    fields.insert("hasLinks".into(), Value::Bool(flags.has_links));
    fields.insert("hasSummary".into(), Value::Bool(flags.has_summary));
    fields.insert("hasKeywords".into(), Value::Bool(flags.has_keywords));
    fields.insert("hasData".into(), Value::Bool(flags.has_data));
    fields.insert(
        "workerNumber".into(),
        flags.worker_number.map_or(Value::Null, Value::from),
    );
    enriched
}

/// Reads the worker number back from an enriched event.
pub fn enriched_worker_number(event: &AgentEvent) -> Option<u32> {
    event.field("workerNumber").and_then(value_as_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_win_over_unknown() {
        assert_eq!(classify("user"), MessageType::User);
        assert_eq!(classify("User"), MessageType::Unknown);
        assert_eq!(classify(""), MessageType::Unknown);
        assert_eq!(classify("browser_worker_"), MessageType::BrowserWorker);
        assert_eq!(
            classify("enhanced_slide_generator_2"),
            MessageType::Unknown
        );
    }

    #[test]
    fn malformed_worker_suffix_has_no_number() {
        assert_eq!(worker_number_from_author("browser_worker_x1"), None);
        assert_eq!(worker_number_from_author("browser_worker_07"), Some(7));
    }
}

use deck_core::{classify, derive_flags, enrich, enriched_worker_number, AgentEvent, MessageType};
use serde_json::json;

#[test]
fn known_authors_map_to_their_types() {
    let cases = [
        ("user", MessageType::User),
        ("presentation_spec_extractor_agent", MessageType::SpecExtractor),
        ("KeywordResearchAgent", MessageType::KeywordResearch),
        ("browser_worker_1", MessageType::BrowserWorker),
        ("lightweight_planning_agent", MessageType::Planning),
        ("LightweightSlideGeneration", MessageType::SlideGeneration),
        ("mystery_agent", MessageType::Unknown),
        ("", MessageType::Unknown),
    ];
    for (author, expected) in cases {
        assert_eq!(classify(author), expected, "author {author:?}");
    }
}

#[test]
fn browser_worker_numbers_come_from_the_suffix() {
    for n in [0_u32, 1, 7, 42, 1234] {
        let author = format!("browser_worker_{n}");
        assert_eq!(classify(&author), MessageType::BrowserWorker);

        let event = AgentEvent::new(author, "2024-01-01T00:00:00Z");
        assert_eq!(derive_flags(&event).worker_number, Some(n));
        assert_eq!(enriched_worker_number(&enrich(&event)), Some(n));
    }
}

#[test]
fn explicit_worker_number_wins_over_suffix() {
    let event = AgentEvent::new("browser_worker_3", "t").with("worker_number", 9);
    assert_eq!(derive_flags(&event).worker_number, Some(9));
}

#[test]
fn worker_number_is_null_for_other_authors() {
    let event = AgentEvent::new("KeywordResearchAgent", "t");
    let enriched = enrich(&event);
    assert_eq!(enriched.fields["workerNumber"], json!(null));
}

#[test]
fn enrich_sets_derived_flags() {
    let event = AgentEvent::new("browser_worker_2", "t")
        .with("links", json!([{ "domain": "a.com", "url": "https://a.com" }]))
        .with("summary", "done")
        .with("keywords", json!([]))
        .with("data", json!(null));
    let enriched = enrich(&event);

    assert_eq!(enriched.fields["messageType"], json!("browser_worker"));
    assert_eq!(enriched.fields["hasLinks"], json!(true));
    assert_eq!(enriched.fields["hasSummary"], json!(true));
    assert_eq!(enriched.fields["hasKeywords"], json!(false));
    assert_eq!(enriched.fields["hasData"], json!(false));
    assert_eq!(enriched.fields["workerNumber"], json!(2));
}

#[test]
fn enrich_is_idempotent() {
    let events = [
        AgentEvent::new("browser_worker_5", "t").with("url", "https://x.org"),
        AgentEvent::new("user", "t").with("content", "make me a deck"),
        AgentEvent::new("KeywordResearchAgent", "t").with("keywords", json!(["rust", "ffi"])),
        AgentEvent::new("mystery_agent", "t").with("data", json!({ "k": 1 })),
    ];
    for event in events {
        let once = enrich(&event);
        let twice = enrich(&once);
        assert_eq!(once, twice);
        assert_eq!(derive_flags(&once), derive_flags(&event));
    }
}

#[test]
fn events_deserialize_from_loose_json() {
    let event: AgentEvent =
        serde_json::from_value(json!({ "author": 12, "extra": [1, 2] })).unwrap();
    assert_eq!(event.author, "12");
    assert_eq!(event.timestamp, "");
    assert_eq!(event.fields["extra"], json!([1, 2]));

    let scalar: AgentEvent = serde_json::from_value(json!("just text")).unwrap();
    assert_eq!(classify(&scalar.author), MessageType::Unknown);
    assert_eq!(scalar.fields["value"], json!("just text"));
}

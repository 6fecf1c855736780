use std::sync::Once;

use deck_core::{
    update, AgentEvent, Change, ChangeData, Effect, Msg, PresentationMetadata, SessionSnapshot,
    SessionState,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(deck_logging::initialize_for_tests);
}

fn feed(state: SessionState, events: Vec<AgentEvent>) -> (SessionState, Vec<Effect>) {
    let mut all = Vec::new();
    let mut state = state;
    for event in events {
        let (next, effects) = update(state, Msg::AgentEvent(event));
        state = next;
        all.extend(effects);
    }
    (state, all)
}

fn position_change(element: &str, from: (f64, f64), to: (f64, f64)) -> Change {
    Change::new(
        element,
        ChangeData::Position {
            left: to.0,
            top: to.1,
            position: Some("absolute".into()),
        },
        ChangeData::Position {
            left: from.0,
            top: from.1,
            position: Some("absolute".into()),
        },
    )
}

#[test]
fn noop_leaves_state_untouched() {
    let state = SessionState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn stream_builds_timeline_and_slides() {
    init_logging();
    let (mut state, effects) = feed(
        SessionState::new(),
        vec![
            AgentEvent::new("user", "t0").with("content", "A deck about ownership"),
            AgentEvent::new("presentation_spec_extractor_agent", "t1")
                .with("total_slides", 2)
                .with("title", "Ownership"),
            AgentEvent::new("browser_worker_1", "t2")
                .with("domain", "doc.rust-lang.org")
                .with("url", "https://doc.rust-lang.org/book/"),
            AgentEvent::new("browser_worker_1", "t3").with("summary", "The book explains moves."),
            AgentEvent::new("enhanced_slide_generator_2", "t4").with("html_content", "<h1>B</h1>"),
            AgentEvent::new("enhanced_slide_generator_1", "t5").with("thinking", "intro"),
            AgentEvent::new("enhanced_slide_generator_1", "t6").with("html_content", "<h1>A</h1>"),
        ],
    );

    assert_eq!(
        effects,
        vec![
            Effect::MetadataChanged(PresentationMetadata {
                total_slides: Some(2),
                title: Some("Ownership".into()),
            }),
            Effect::SlideReady { slide_number: 1 },
        ]
    );

    let view = state.view();
    assert_eq!(view.title.as_deref(), Some("Ownership"));
    assert_eq!(view.total_slides, Some(2));
    assert_eq!(view.timeline.len(), 3);
    assert_eq!(view.timeline[2].headline, "The book explains moves.");
    assert_eq!(view.timeline[2].link_count, 1);
    assert!(view.timeline[2].is_complete);
    let numbers: Vec<_> = view.slides.iter().map(|s| s.slide_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(view.completed_slides, 1);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn replayed_events_are_not_duplicated() {
    init_logging();
    let event = AgentEvent::new("user", "2024-05-01T10:00:00Z").with("content", "hello");
    let (mut state, _) = feed(SessionState::new(), vec![event.clone()]);
    assert!(state.consume_dirty());

    let (mut state, effects) = feed(state, vec![event]);
    assert_eq!(state.logs().len(), 1);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

fn worker_stream() -> Vec<AgentEvent> {
    let visit = |timestamp: &str, host: &str| {
        AgentEvent::new("browser_worker_1", timestamp)
            .with("url", format!("https://{host}/page"))
            .with("domain", host)
    };
    vec![visit("t1", "a.com"), visit("t2", "b.com"), visit("t2", "b.com")]
}

fn link_domains(state: &SessionState) -> Vec<String> {
    state.logs()[0]
        .payload
        .links
        .iter()
        .map(|link| link.domain.clone())
        .collect()
}

#[test]
fn repeated_worker_events_merge_once() {
    init_logging();
    let (state, _) = feed(SessionState::new(), worker_stream());
    assert_eq!(state.logs().len(), 1);
    assert_eq!(link_domains(&state), vec!["a.com", "b.com"]);
}

#[test]
fn resumed_session_skips_events_it_already_folded() {
    init_logging();
    let (first, _) = feed(SessionState::new(), worker_stream());
    let json = serde_json::to_string(&first.snapshot()).unwrap();
    let snapshot: SessionSnapshot = serde_json::from_str(&json).unwrap();

    let (resumed, _) = update(SessionState::new(), Msg::RestoreSnapshot(snapshot));
    let (mut again, effects) = feed(resumed, worker_stream());
    assert!(effects.is_empty());
    assert_eq!(link_domains(&again), vec!["a.com", "b.com"]);

    // A new visit from the same worker still merges.
    let next = AgentEvent::new("browser_worker_1", "t3")
        .with("url", "https://c.com/page")
        .with("domain", "c.com");
    again.consume_dirty();
    let (mut again, _) = feed(again, vec![next]);
    assert_eq!(link_domains(&again), vec!["a.com", "b.com", "c.com"]);
    assert!(again.consume_dirty());
}

#[test]
fn unknown_events_still_land_in_the_timeline() {
    init_logging();
    let (state, _) = feed(
        SessionState::new(),
        vec![AgentEvent::new("mystery_agent", "t").with("anything", json!({ "deep": true }))],
    );
    assert_eq!(state.logs().len(), 1);
    assert_eq!(
        state.logs()[0].payload.data.as_ref().unwrap()["anything"],
        json!({ "deep": true })
    );
}

#[test]
fn undo_and_redo_emit_changes_to_apply() {
    init_logging();
    let change = position_change("0.1", (10.0, 10.0), (40.0, 16.0));
    let (state, effects) = update(
        SessionState::new(),
        Msg::change_tracked("slide-1", change.clone()),
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::Undo {
            slide_id: "slide-1".into(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ApplyChange {
            slide_id: "slide-1".into(),
            element_id: "0.1".into(),
            data: change.previous_data.clone(),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::Undo {
            slide_id: "slide-1".into(),
        },
    );
    assert!(effects.is_empty());

    let (_state, effects) = update(
        state,
        Msg::Redo {
            slide_id: "slide-1".into(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ApplyChange {
            slide_id: "slide-1".into(),
            element_id: "0.1".into(),
            data: change.data,
        }]
    );
}

#[test]
fn snapshot_restores_into_fresh_session() {
    init_logging();
    let (state, _) = feed(
        SessionState::new(),
        vec![
            AgentEvent::new("lightweight_planning_agent", "t")
                .with("content", "plan")
                .with("colorTheme", json!({ "primary": "#123456" })),
            AgentEvent::new("enhanced_slide_generator_1", "t").with("thinking", "x"),
        ],
    );
    let snapshot = state.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored_snapshot = serde_json::from_str(&json).unwrap();

    let (restored, _) = update(SessionState::new(), Msg::RestoreSnapshot(restored_snapshot));
    assert_eq!(restored.logs(), state.logs());
    assert_eq!(restored.slides(), state.slides());
    assert_eq!(
        restored.logs()[0].payload.color_theme,
        Some(json!({ "primary": "#123456" }))
    );
}

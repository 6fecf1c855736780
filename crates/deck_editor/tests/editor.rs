use std::sync::Once;

use deck_core::{update, ChangeData, Effect, Msg, SessionState};
use deck_editor::{
    alignment_guides, EditorOptions, ElementPath, GridOverlay, Guide, GuideKind, GuideOrientation,
    HtmlSurface, KeyEvent, LayerOp, PointerEvent, RenderSurface, Size, SlideEditor,
};
use pretty_assertions::assert_eq;

const SLIDE: &str = r#"<html><body>
<div style="position: absolute; left: 100px; top: 96px; width: 100px; height: 50px">A</div>
<div style="position: absolute; left: 102px; top: 300px; width: 100px; height: 50px">B</div>
<p style="width: 60px; height: 20px">Caption <em>here</em></p>
<div style="position: absolute; left: 350px; top: 500px; width: 100px; height: 20px">Footer</div>
</body></html>"#;

const SLIDE_ID: &str = "slide-1";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(deck_logging::initialize_for_tests);
}

fn editor() -> SlideEditor<HtmlSurface> {
    init_logging();
    let surface = HtmlSurface::load(SLIDE, Size::new(800.0, 600.0)).unwrap();
    SlideEditor::new(surface, SLIDE_ID, EditorOptions::default())
}

fn path(s: &str) -> ElementPath {
    s.parse().unwrap()
}

fn style(editor: &SlideEditor<HtmlSurface>, at: &str, property: &str) -> Option<String> {
    let surface = editor.surface();
    let id = surface.resolve(&path(at)).unwrap();
    surface.inline_style(id, property)
}

/// Runs a message through `update` and applies whatever it asks of the surface.
fn dispatch(
    state: SessionState,
    msg: Msg,
    editor: &mut SlideEditor<HtmlSurface>,
) -> (SessionState, Vec<Effect>) {
    let (state, effects) = update(state, msg);
    for effect in &effects {
        if let Effect::ApplyChange {
            element_id, data, ..
        } = effect
        {
            assert!(editor.apply(element_id, data));
        }
    }
    (state, effects)
}

#[test]
fn drag_undo_redo_round_trip() {
    let mut editor = editor();
    assert!(editor.select(&path("body.0")));

    assert!(editor.pointer_down(PointerEvent::new(1, 0.0, 0.0)));
    assert!(editor.pointer_move(PointerEvent::new(1, 30.0, 0.0)));
    editor.animation_frame();
    let change = editor.pointer_up(PointerEvent::new(1, 30.0, 0.0)).unwrap();
    assert_eq!(style(&editor, "body.0", "left").as_deref(), Some("128px"));

    let state = SessionState::new();
    let (state, _) = dispatch(state, Msg::change_tracked(SLIDE_ID, change), &mut editor);
    assert!(state.history().can_undo(SLIDE_ID));

    let (state, effects) = dispatch(
        state,
        Msg::Undo {
            slide_id: SLIDE_ID.into(),
        },
        &mut editor,
    );
    assert_eq!(
        effects,
        vec![Effect::ApplyChange {
            slide_id: SLIDE_ID.into(),
            element_id: "body.0".into(),
            data: ChangeData::Position {
                left: 100.0,
                top: 96.0,
                position: Some("absolute".into()),
            },
        }]
    );
    assert_eq!(style(&editor, "body.0", "left").as_deref(), Some("100px"));

    let (state, _) = dispatch(
        state,
        Msg::Redo {
            slide_id: SLIDE_ID.into(),
        },
        &mut editor,
    );
    assert_eq!(style(&editor, "body.0", "left").as_deref(), Some("128px"));
    assert!(!state.history().can_redo(SLIDE_ID));
}

#[test]
fn undoing_a_first_nudge_restores_static_flow() {
    let mut editor = editor();
    editor.select(&path("body.2"));
    let change = editor.key(&KeyEvent::new("ArrowDown")).unwrap();
    assert_eq!(style(&editor, "body.2", "position").as_deref(), Some("relative"));

    let (state, _) = dispatch(
        SessionState::new(),
        Msg::change_tracked(SLIDE_ID, change),
        &mut editor,
    );
    dispatch(
        state,
        Msg::Undo {
            slide_id: SLIDE_ID.into(),
        },
        &mut editor,
    );
    for property in ["position", "left", "top"] {
        assert_eq!(style(&editor, "body.2", property), None, "{property}");
    }
}

#[test]
fn layer_and_text_changes_undo_cleanly() {
    let mut editor = editor();
    editor.select(&path("body.1"));
    let layer = editor.layer(LayerOp::BringToFront).unwrap();
    assert_eq!(style(&editor, "body.1", "z-index").as_deref(), Some("1"));
    let text = editor.edit_text(&path("body.2"), "New caption").unwrap();
    assert_eq!(
        text.previous_data,
        ChangeData::Text {
            text: "Caption here".into()
        }
    );

    let undo = Msg::Undo {
        slide_id: SLIDE_ID.into(),
    };
    let (state, _) = dispatch(SessionState::new(), Msg::change_tracked(SLIDE_ID, layer), &mut editor);
    let (state, _) = dispatch(state, Msg::change_tracked(SLIDE_ID, text), &mut editor);
    let (state, _) = dispatch(state, undo.clone(), &mut editor);
    let surface = editor.surface();
    let caption = surface.resolve(&path("body.2")).unwrap();
    assert_eq!(surface.text(caption).as_deref(), Some("Caption here"));

    let (state, _) = dispatch(state, undo.clone(), &mut editor);
    assert_eq!(style(&editor, "body.1", "z-index"), None);
    let (_, effects) = dispatch(state, undo, &mut editor);
    assert!(effects.is_empty());
}

#[test]
fn escape_abandons_the_drag() {
    let mut editor = editor();
    editor.select(&path("body.0"));
    editor.pointer_down(PointerEvent::new(1, 0.0, 0.0));
    editor.pointer_move(PointerEvent::new(1, 40.0, 40.0));
    editor.animation_frame();
    assert!(style(&editor, "body.0", "transform").is_some());

    // Arrow keys do nothing mid-drag.
    assert!(editor.key(&KeyEvent::new("ArrowLeft")).is_none());
    assert!(editor.key(&KeyEvent::new("Escape")).is_none());
    assert!(!editor.is_dragging());
    assert_eq!(style(&editor, "body.0", "transform"), None);
    assert_eq!(style(&editor, "body.0", "left").as_deref(), Some("100px"));
    assert!(editor.pointer_up(PointerEvent::new(1, 40.0, 40.0)).is_none());
}

#[test]
fn apply_rejects_unknown_elements() {
    let mut editor = editor();
    let data = ChangeData::style("color", "red");
    assert!(!editor.apply("body.9", &data));
    assert!(!editor.apply("body.first", &data));
    assert!(editor.apply("body.3", &data));
    assert_eq!(style(&editor, "body.3", "color").as_deref(), Some("red"));
}

#[test]
fn guides_mark_sibling_alignment() {
    let editor = editor();
    let surface = editor.surface();
    let a = surface.resolve(&path("body.0")).unwrap();

    let guides = alignment_guides(surface, a, 4.0);
    let vertical = |position, kind| Guide {
        orientation: GuideOrientation::Vertical,
        position,
        kind,
    };
    assert_eq!(
        guides,
        vec![
            vertical(102.0, GuideKind::Edge),
            vertical(152.0, GuideKind::Center),
            vertical(202.0, GuideKind::Edge),
        ]
    );
    assert!(alignment_guides(surface, a, 1.0).is_empty());
}

#[test]
fn guides_mark_slide_centre() {
    let mut editor = editor();
    editor.select(&path("body.3"));
    assert_eq!(
        editor.guides(),
        vec![Guide {
            orientation: GuideOrientation::Vertical,
            position: 400.0,
            kind: GuideKind::Center,
        }]
    );
    let svg = editor.guides_svg().unwrap();
    assert!(svg.contains(r#"<line x1="400" y1="0" x2="400" y2="600""#));
    assert!(svg.contains("stroke-dasharray"));
}

#[test]
fn grid_overlay_matches_slide_size() {
    let editor = editor();
    let svg = editor.grid_svg().unwrap();
    assert_eq!(
        svg,
        GridOverlay::new(8.0).render_svg(Size::new(800.0, 600.0))
    );
    assert!(svg.contains(r#"width="800" height="600""#));

    let unloaded = SlideEditor::new(
        HtmlSurface::unloaded(Size::new(800.0, 600.0)),
        SLIDE_ID,
        EditorOptions::default(),
    );
    assert!(unloaded.grid_svg().is_none());
}

#[test]
fn selection_needs_a_loaded_element() {
    init_logging();
    let mut unloaded = SlideEditor::new(
        HtmlSurface::unloaded(Size::new(800.0, 600.0)),
        SLIDE_ID,
        EditorOptions::default(),
    );
    assert!(!unloaded.select(&path("body.0")));
    assert!(unloaded.selected().is_none());

    let mut editor = editor();
    assert!(!editor.select(&path("body.7")));
    assert!(editor.select(&path("body.2")));
    assert_eq!(editor.selected(), Some(&path("body.2")));
    // Replacing an ancestor's text detaches the selection.
    editor.select(&path("body.2.0"));
    editor.edit_text(&path("body.2"), "Plain");
    assert!(editor.selected().is_none());
}

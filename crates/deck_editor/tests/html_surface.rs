use std::sync::Once;

use deck_core::{update, AgentEvent, Msg, SessionState};
use deck_editor::{
    element_offset, ElementPath, HtmlSurface, PathParseError, Point, Rect, RenderSurface, Size,
    SurfaceError,
};
use pretty_assertions::assert_eq;

const SLIDE: &str = r#"<!DOCTYPE html><html><head><title>Slide</title><style>p { color: red; }</style></head><body>
<h1 style="position: absolute; left: 40px; top: 24px; width: 300px; height: 60px; transform: translate(10px, 5px)">Title</h1>
<p width="200" height="30">Static <b>text</b></p>
<!-- not editable -->
<img src="a.png" alt="x &quot;y&quot;">
</body></html>"#;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(deck_logging::initialize_for_tests);
}

fn surface() -> HtmlSurface {
    init_logging();
    HtmlSurface::load(SLIDE, Size::new(960.0, 540.0)).unwrap()
}

fn path(s: &str) -> ElementPath {
    s.parse().unwrap()
}

#[test]
fn paths_parse_and_print() {
    assert_eq!(path("body.0.2"), ElementPath::from_indices(vec![0, 2]));
    assert_eq!(path("0.2"), ElementPath::from_indices(vec![0, 2]));
    assert!(path("body").is_body());
    assert_eq!(path("1.0").to_string(), "body.1.0");
    assert_eq!("".parse::<ElementPath>(), Err(PathParseError::Empty));
    assert!(matches!(
        "body.x".parse::<ElementPath>(),
        Err(PathParseError::InvalidSegment { .. })
    ));
}

#[test]
fn elements_are_indexed_by_path() {
    let surface = surface();
    assert!(surface.is_ready());
    // body, h1, p, b, img
    assert_eq!(surface.element_count(), 5);

    let h1 = surface.resolve(&path("body.0")).unwrap();
    let p = surface.resolve(&path("body.1")).unwrap();
    let b = surface.resolve(&path("body.1.0")).unwrap();
    assert_eq!(surface.tag(h1), Some("h1"));
    assert_eq!(surface.tag(b), Some("b"));
    assert_eq!(surface.tag(surface.resolve(&path("body.2")).unwrap()), Some("img"));
    assert_eq!(surface.path_of(b), Some(path("body.1.0")));
    assert_eq!(surface.parent(b), Some(p));
    assert_eq!(surface.siblings(h1).len(), 2);
    assert_eq!(surface.text(p).as_deref(), Some("Static text"));
    assert!(surface.resolve(&path("body.3")).is_none());
}

#[test]
fn layout_follows_inline_geometry() {
    let surface = surface();
    let h1 = surface.resolve(&path("body.0")).unwrap();
    let p = surface.resolve(&path("body.1")).unwrap();

    assert_eq!(surface.bounding_rect(h1), Some(Rect::new(50.0, 29.0, 300.0, 60.0)));
    assert_eq!(surface.bounding_rect(p), Some(Rect::new(0.0, 0.0, 200.0, 30.0)));
    assert_eq!(surface.body_rect(), Some(Rect::new(0.0, 0.0, 960.0, 540.0)));

    assert_eq!(surface.computed_style(p, "position").as_deref(), Some("static"));
    assert_eq!(surface.computed_style(p, "z-index").as_deref(), Some("auto"));
    assert_eq!(surface.computed_style(p, "width").as_deref(), Some("200px"));
    assert_eq!(surface.computed_style(h1, "left").as_deref(), Some("40px"));
    assert_eq!(surface.inline_style(p, "left"), None);
}

#[test]
fn scrolling_shifts_the_body_with_its_content() {
    let mut surface = surface();
    let h1 = surface.resolve(&path("body.0")).unwrap();
    let b = surface.resolve(&path("body.1.0")).unwrap();
    surface.set_scroll(Point::new(0.0, 20.0));

    assert_eq!(surface.bounding_rect(h1), Some(Rect::new(50.0, 9.0, 300.0, 60.0)));
    assert_eq!(surface.body_rect(), Some(Rect::new(0.0, -20.0, 960.0, 540.0)));
    // Offsets are content distances, whatever the scroll.
    assert_eq!(element_offset(&surface, h1), Some(Point::new(50.0, 29.0)));
    assert_eq!(element_offset(&surface, b), Some(Point::ZERO));
}

#[test]
fn in_flow_children_stretch_the_body() {
    init_logging();
    let surface = HtmlSurface::load(
        r#"<body><p style="width: 1200px; height: 900px"></p><div style="position: absolute; width: 5000px; height: 10px"></div></body>"#,
        Size::new(960.0, 540.0),
    )
    .unwrap();
    assert_eq!(surface.body_rect(), Some(Rect::new(0.0, 0.0, 1200.0, 900.0)));
    assert_eq!(surface.client_size(), Some(Size::new(960.0, 540.0)));
}

#[test]
fn serialization_keeps_edits_and_head() {
    let mut surface = surface();
    let h1 = surface.resolve(&path("body.0")).unwrap();
    surface.set_style(h1, "left", "48px");
    surface.remove_style(h1, "transform");

    let html = surface.to_html();
    assert!(html.starts_with("<!DOCTYPE html><html><head>"));
    assert!(html.contains("<title>Slide</title>"));
    assert!(html.contains("p { color: red; }"));
    assert!(html.contains(
        r#"<h1 style="position: absolute; top: 24px; width: 300px; height: 60px; left: 48px">Title</h1>"#
    ));
    assert!(html.contains(r#"<p height="30" width="200">Static <b>text</b></p>"#));
    assert!(html.contains(r#"<img alt="x &quot;y&quot;" src="a.png">"#));
    assert!(!html.contains("</img>"));
    assert!(!html.contains("not editable"));
}

#[test]
fn untouched_data_uris_survive_serialization() {
    init_logging();
    let surface = HtmlSurface::load(
        r#"<body><div style="background-image: url('data:image/png;base64,AAAA'); width: 10px"></div></body>"#,
        Size::new(960.0, 540.0),
    )
    .unwrap();
    assert!(surface.to_html().contains(
        r#"<div style="background-image: url('data:image/png;base64,AAAA'); width: 10px"></div>"#
    ));
}

#[test]
fn set_text_replaces_children() {
    let mut surface = surface();
    let p = surface.resolve(&path("body.1")).unwrap();
    surface.set_text(p, "a < b & c");

    assert_eq!(surface.text(p).as_deref(), Some("a < b & c"));
    assert!(surface.resolve(&path("body.1.0")).is_none());
    assert_eq!(surface.resolve(&path("body.1")), Some(p));
    assert!(surface.body_html().contains("<p height=\"30\" width=\"200\">a &lt; b &amp; c</p>"));
}

#[test]
fn unloaded_surface_answers_nothing() {
    init_logging();
    let mut surface = HtmlSurface::unloaded(Size::new(960.0, 540.0));
    assert!(!surface.is_ready());
    assert!(surface.resolve(&ElementPath::body()).is_none());
    assert!(surface.body_rect().is_none());
    assert!(surface.client_size().is_none());
    assert_eq!(surface.to_html(), "<!DOCTYPE html><html><head></head><body></body></html>");

    let loaded = HtmlSurface::load(SLIDE, Size::new(960.0, 540.0)).unwrap();
    let h1 = loaded.resolve(&path("body.0")).unwrap();
    // Mutations stay no-ops until content loads.
    surface.set_style(h1, "left", "1px");
    assert!(surface.inline_style(h1, "left").is_none());
}

#[test]
fn empty_markup_is_rejected() {
    init_logging();
    assert_eq!(
        HtmlSurface::load("  \n", Size::new(10.0, 10.0)),
        Err(SurfaceError::EmptyMarkup)
    );
}

#[test]
fn slides_load_once_their_markup_arrives() {
    init_logging();
    let (state, _) = update(
        SessionState::new(),
        Msg::AgentEvent(
            AgentEvent::new("enhanced_slide_generator_2", "t1").with("thinking", "Lay out the title"),
        ),
    );
    let slide = state.slide(2).unwrap();
    assert_eq!(
        HtmlSurface::from_slide(slide, Size::new(960.0, 540.0)),
        Err(SurfaceError::NoContent(2))
    );

    let (state, _) = update(
        state,
        Msg::AgentEvent(AgentEvent::new("enhanced_slide_generator_2", "t2").with("html_content", SLIDE)),
    );
    let surface = HtmlSurface::from_slide(state.slide(2).unwrap(), Size::new(960.0, 540.0)).unwrap();
    assert_eq!(surface.element_count(), 5);
}

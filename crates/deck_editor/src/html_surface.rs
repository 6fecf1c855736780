use std::collections::HashMap;

use deck_core::SlideEntry;
use deck_logging::{deck_debug, deck_trace};
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::css::{translate_offset, StyleDeclarations};
use crate::geometry::{format_px, parse_px, Point, Rect, Size};
use crate::surface::{ElementId, ElementPath, RenderSurface};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("slide markup is empty")]
    EmptyMarkup,
    #[error("slide {0} has no html content yet")]
    NoContent(u32),
}

#[derive(Debug, Clone, PartialEq)]
enum NodeChild {
    Element(ElementId),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct SurfaceNode {
    tag: String,
    attrs: Vec<(String, String)>,
    style: StyleDeclarations,
    parent: Option<ElementId>,
    children: Vec<NodeChild>,
    path: ElementPath,
}

impl SurfaceNode {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Render surface over generated slide markup, without a browser.
///
/// The body subtree is parsed once into an arena; every element gets an
/// opaque [`ElementId`] and its [`ElementPath`] is indexed, so lookups never
/// re-walk the tree. Layout is deliberately simple: each element's offset
/// parent is its DOM parent, `static` elements sit at the parent's origin,
/// positioned elements are offset by inline `left`/`top`, sizes come from
/// inline `width`/`height` (or the matching attributes), and `translate*`
/// transforms shift the reported rectangle the way a browser would.
/// Scrolling moves every rectangle, the body's included, by `-scroll`.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlSurface {
    nodes: Vec<SurfaceNode>,
    index: HashMap<ElementPath, ElementId>,
    head_html: String,
    ready: bool,
    client: Size,
    scroll: Point,
    captures: HashMap<ElementId, i32>,
}

impl HtmlSurface {
    /// A surface whose content document has not loaded yet.
    pub fn unloaded(client: Size) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            head_html: String::new(),
            ready: false,
            client,
            scroll: Point::ZERO,
            captures: HashMap::new(),
        }
    }

    pub fn load(html: &str, client: Size) -> Result<Self, SurfaceError> {
        if html.trim().is_empty() {
            return Err(SurfaceError::EmptyMarkup);
        }
        let document = Html::parse_document(html);
        let head_html = Selector::parse("head")
            .ok()
            .and_then(|sel| document.select(&sel).next().map(|head| head.inner_html()))
            .unwrap_or_default();
        let body = Selector::parse("body")
            .ok()
            .and_then(|sel| document.select(&sel).next())
            .ok_or(SurfaceError::EmptyMarkup)?;

        let mut surface = Self::unloaded(client);
        surface.head_html = head_html;
        surface.insert_element(body, None, ElementPath::body());
        surface.ready = true;
        deck_debug!(
            "loaded slide surface with {} elements ({}x{})",
            surface.nodes.len(),
            client.width,
            client.height
        );
        Ok(surface)
    }

    /// Loads the markup of a generated slide.
    pub fn from_slide(slide: &SlideEntry, client: Size) -> Result<Self, SurfaceError> {
        let html = slide
            .html_content
            .as_deref()
            .ok_or(SurfaceError::NoContent(slide.slide_number))?;
        Self::load(html, client)
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    pub fn set_client_size(&mut self, client: Size) {
        self.client = client;
    }

    /// Pointer currently capturing `id`, if any.
    pub fn pointer_capture(&self, id: ElementId) -> Option<i32> {
        self.captures.get(&id).copied()
    }

    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.node(id).map(|node| node.tag.as_str())
    }

    /// Inner markup of the body, with all inline edits applied.
    pub fn body_html(&self) -> String {
        let mut out = String::new();
        if let Some(body) = self.nodes.first() {
            self.write_children(body, &mut out);
        }
        out
    }

    /// Full document markup, with all inline edits applied.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html><html><head>");
        out.push_str(&self.head_html);
        out.push_str("</head>");
        match self.nodes.first() {
            Some(body) => self.write_element(body, &mut out),
            None => out.push_str("<body></body>"),
        }
        out.push_str("</html>");
        out
    }

    fn insert_element(
        &mut self,
        element: ElementRef<'_>,
        parent: Option<ElementId>,
        path: ElementPath,
    ) -> ElementId {
        let id = ElementId(self.nodes.len());
        let value = element.value();
        let mut style = StyleDeclarations::default();
        let mut attrs = Vec::new();
        for (name, val) in value.attrs() {
            if name.eq_ignore_ascii_case("style") {
                style = StyleDeclarations::parse(val);
            } else {
                attrs.push((name.to_string(), val.to_string()));
            }
        }
        // The parser's attribute order is not guaranteed; keep output stable.
        attrs.sort();
        self.nodes.push(SurfaceNode {
            tag: value.name().to_ascii_lowercase(),
            attrs,
            style,
            parent,
            children: Vec::new(),
            path: path.clone(),
        });
        self.index.insert(path.clone(), id);

        let mut element_index = 0;
        for child in element.children() {
            if let Some(node_child) = self.visit_child(child, id, &path, &mut element_index) {
                self.nodes[id.0].children.push(node_child);
            }
        }
        id
    }

    fn visit_child(
        &mut self,
        child: NodeRef<'_, Node>,
        parent: ElementId,
        parent_path: &ElementPath,
        element_index: &mut usize,
    ) -> Option<NodeChild> {
        match child.value() {
            Node::Text(text) => {
                let content: &str = text;
                Some(NodeChild::Text(content.to_string()))
            }
            Node::Element(_) => {
                let element = ElementRef::wrap(child)?;
                let path = parent_path.child(*element_index);
                *element_index += 1;
                Some(NodeChild::Element(self.insert_element(
                    element,
                    Some(parent),
                    path,
                )))
            }
            // comments and processing instructions are not editable
            _ => None,
        }
    }

    fn node(&self, id: ElementId) -> Option<&SurfaceNode> {
        if !self.ready {
            return None;
        }
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut SurfaceNode> {
        if !self.ready {
            return None;
        }
        self.nodes.get_mut(id.0)
    }

    fn position_of(node: &SurfaceNode) -> &str {
        node.style.get("position").unwrap_or("static")
    }

    fn size_of(&self, id: ElementId) -> Size {
        if id.0 == 0 {
            return self.client;
        }
        let Some(node) = self.node(id) else {
            return Size::default();
        };
        let length = |name: &str| {
            node.style
                .get(name)
                .and_then(parse_px)
                .or_else(|| node.attr(name).and_then(parse_px))
                .unwrap_or(0.0)
        };
        Size::new(length("width"), length("height"))
    }

    /// Top-left corner in content coordinates, before scroll.
    fn content_origin(&self, id: ElementId) -> Point {
        let Some(node) = self.node(id) else {
            return Point::ZERO;
        };
        let Some(parent) = node.parent else {
            return Point::ZERO;
        };
        let mut origin = self.content_origin(parent);
        if Self::position_of(node) != "static" {
            origin.x += node.style.get("left").and_then(parse_px).unwrap_or(0.0);
            origin.y += node.style.get("top").and_then(parse_px).unwrap_or(0.0);
        }
        if let Some(transform) = node.style.get("transform") {
            origin = origin + translate_offset(transform);
        }
        origin
    }

    /// The body box: the client area, grown to hold its in-flow children.
    /// Positioned children do not stretch it.
    fn document_extent(&self) -> Size {
        let mut extent = self.client;
        let Some(body) = self.nodes.first() else {
            return extent;
        };
        for child in &body.children {
            let NodeChild::Element(id) = child else {
                continue;
            };
            let in_flow = self
                .nodes
                .get(id.0)
                .is_some_and(|node| Self::position_of(node) == "static");
            if in_flow {
                let size = self.size_of(*id);
                extent.width = extent.width.max(size.width);
                extent.height = extent.height.max(size.height);
            }
        }
        extent
    }

    fn text_of(&self, node: &SurfaceNode, out: &mut String) {
        for child in &node.children {
            match child {
                NodeChild::Text(text) => out.push_str(text),
                NodeChild::Element(id) => {
                    if let Some(child_node) = self.nodes.get(id.0) {
                        self.text_of(child_node, out);
                    }
                }
            }
        }
    }

    fn write_element(&self, node: &SurfaceNode, out: &mut String) {
        out.push('<');
        out.push_str(&node.tag);
        for (name, value) in &node.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        if !node.style.is_empty() {
            out.push_str(" style=\"");
            out.push_str(&escape_attr(&node.style.to_css()));
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&node.tag.as_str()) {
            return;
        }
        self.write_children(node, out);
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }

    fn write_children(&self, node: &SurfaceNode, out: &mut String) {
        let raw = RAW_TEXT_ELEMENTS.contains(&node.tag.as_str());
        for child in &node.children {
            match child {
                NodeChild::Text(text) if raw => out.push_str(text),
                NodeChild::Text(text) => out.push_str(&escape_text(text)),
                NodeChild::Element(id) => {
                    if let Some(child_node) = self.nodes.get(id.0) {
                        self.write_element(child_node, out);
                    }
                }
            }
        }
    }
}

impl RenderSurface for HtmlSurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn resolve(&self, path: &ElementPath) -> Option<ElementId> {
        if !self.ready {
            return None;
        }
        self.index.get(path).copied()
    }

    fn path_of(&self, id: ElementId) -> Option<ElementPath> {
        self.node(id).map(|node| node.path.clone())
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).and_then(|node| node.parent)
    }

    fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.node(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| match child {
                        NodeChild::Element(child_id) => Some(*child_id),
                        NodeChild::Text(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn bounding_rect(&self, id: ElementId) -> Option<Rect> {
        self.node(id)?;
        if id.0 == 0 {
            return self.body_rect();
        }
        let origin = self.content_origin(id) - self.scroll;
        let size = self.size_of(id);
        Some(Rect::new(origin.x, origin.y, size.width, size.height))
    }

    fn body_rect(&self) -> Option<Rect> {
        if !self.ready {
            return None;
        }
        let extent = self.document_extent();
        Some(Rect::new(-self.scroll.x, -self.scroll.y, extent.width, extent.height))
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn client_size(&self) -> Option<Size> {
        self.ready.then_some(self.client)
    }

    fn computed_style(&self, id: ElementId, property: &str) -> Option<String> {
        let node = self.node(id)?;
        if let Some(value) = node.style.get(property) {
            return Some(value.to_string());
        }
        let default = match property.to_ascii_lowercase().as_str() {
            "position" => "static".to_string(),
            "z-index" | "left" | "top" | "right" | "bottom" => "auto".to_string(),
            "transform" => "none".to_string(),
            "width" => format_px(self.size_of(id).width),
            "height" => format_px(self.size_of(id).height),
            _ => return None,
        };
        Some(default)
    }

    fn inline_style(&self, id: ElementId, property: &str) -> Option<String> {
        self.node(id)?.style.get(property).map(ToOwned::to_owned)
    }

    fn set_style(&mut self, id: ElementId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(id) {
            deck_trace!("style {} {}: {}", node.path, property, value);
            node.style.set(property, value);
        }
    }

    fn remove_style(&mut self, id: ElementId, property: &str) {
        if let Some(node) = self.node_mut(id) {
            deck_trace!("style {} {} removed", node.path, property);
            node.style.remove(property);
        }
    }

    fn text(&self, id: ElementId) -> Option<String> {
        let node = self.node(id)?;
        let mut out = String::new();
        self.text_of(node, &mut out);
        Some(out)
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(node) = self.node_mut(id) {
            // Detached descendants stay in the arena but are no longer reachable.
            node.children = vec![NodeChild::Text(text.to_string())];
            let prefix = node.path.clone();
            self.index
                .retain(|path, _| !(path.indices().starts_with(prefix.indices()) && *path != prefix));
        }
    }

    fn set_pointer_capture(&mut self, id: ElementId, pointer_id: i32) {
        if self.node(id).is_some() {
            self.captures.insert(id, pointer_id);
        }
    }

    fn release_pointer_capture(&mut self, id: ElementId, pointer_id: i32) {
        if self.captures.get(&id) == Some(&pointer_id) {
            self.captures.remove(&id);
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

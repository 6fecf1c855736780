use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::geometry::{Point, Rect, Size};

/// Opaque handle to an element, assigned when the surface loads markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

/// Stable descriptor of an element: child-element indices from the body.
///
/// Written as `body` for the body itself and `body.0.2` (or just `0.2`)
/// for the third element child of the body's first element child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    pub fn body() -> Self {
        Self::default()
    }

    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn is_body(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("body")?;
        for index in &self.0 {
            write!(f, ".{index}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("empty element path")]
    Empty,
    #[error("invalid path segment {segment:?} in {path:?}")]
    InvalidSegment { path: String, segment: String },
}

impl FromStr for ElementPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PathParseError::Empty);
        }
        let rest = match trimmed.strip_prefix("body") {
            Some(rest) => rest.strip_prefix('.').unwrap_or(rest),
            None => trimmed,
        };
        if rest.is_empty() {
            return Ok(Self::body());
        }
        rest.split('.')
            .map(|segment| {
                segment
                    .parse::<usize>()
                    .map_err(|_| PathParseError::InvalidSegment {
                        path: trimmed.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// The document a slide is rendered into, seen through the handful of
/// capabilities the editing controllers need.
///
/// Every accessor returns `None` (and every mutator is a no-op) when the
/// surface has no content document yet or the handle is stale.
pub trait RenderSurface {
    /// Whether a content document is available.
    fn is_ready(&self) -> bool;

    fn resolve(&self, path: &ElementPath) -> Option<ElementId>;

    fn path_of(&self, id: ElementId) -> Option<ElementPath>;

    fn parent(&self, id: ElementId) -> Option<ElementId>;

    /// Element children in document order.
    fn children(&self, id: ElementId) -> Vec<ElementId>;

    /// Bounding rectangle, including any transform, relative to the viewport.
    fn bounding_rect(&self, id: ElementId) -> Option<Rect>;

    /// Bounding rectangle of the content body.
    fn body_rect(&self) -> Option<Rect>;

    fn scroll_offset(&self) -> Point;

    /// `clientWidth`/`clientHeight` of the content viewport.
    fn client_size(&self) -> Option<Size>;

    /// Resolved value of a CSS property (inline value or the default).
    fn computed_style(&self, id: ElementId, property: &str) -> Option<String>;

    fn inline_style(&self, id: ElementId, property: &str) -> Option<String>;

    fn set_style(&mut self, id: ElementId, property: &str, value: &str);

    fn remove_style(&mut self, id: ElementId, property: &str);

    fn text(&self, id: ElementId) -> Option<String>;

    fn set_text(&mut self, id: ElementId, text: &str);

    fn set_pointer_capture(&mut self, id: ElementId, pointer_id: i32);

    fn release_pointer_capture(&mut self, id: ElementId, pointer_id: i32);

    /// Element siblings sharing `id`'s parent, excluding `id` itself.
    fn siblings(&self, id: ElementId) -> Vec<ElementId> {
        self.parent(id)
            .map(|parent| {
                self.children(parent)
                    .into_iter()
                    .filter(|&child| child != id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sets or clears a property depending on whether `value` is empty.
    fn write_style(&mut self, id: ElementId, property: &str, value: &str) {
        if value.is_empty() {
            self.remove_style(id, property);
        } else {
            self.set_style(id, property, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_with_or_without_body_prefix() {
        assert_eq!("body".parse(), Ok(ElementPath::body()));
        assert_eq!("body.0.2".parse(), Ok(ElementPath::from_indices(vec![0, 2])));
        assert_eq!("1.3".parse(), Ok(ElementPath::from_indices(vec![1, 3])));
        assert_eq!(ElementPath::from_indices(vec![4, 0]).to_string(), "body.4.0");
        assert!(matches!(
            "body.x".parse::<ElementPath>(),
            Err(PathParseError::InvalidSegment { .. })
        ));
        assert_eq!("  ".parse::<ElementPath>(), Err(PathParseError::Empty));
    }
}

//! Coordinate math shared by the controllers and overlays.
//!
//! Everything is expressed in the render surface's own coordinate space:
//! rectangles, the content body's included, are reported relative to the
//! visible viewport and are therefore already shifted by scroll. Offsets
//! between two rectangles are scroll-free content distances.

use serde::{Deserialize, Serialize};

use crate::surface::{ElementId, ElementPath, RenderSurface};

/// Grid used when no other size is configured.
pub const DEFAULT_GRID_SIZE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn translate(&self, delta: Point) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }
}

/// Outer page dimensions used when the surface has no content document yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

/// The coordinate frame all position math is done against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParentBounds {
    pub rect: Rect,
    pub width: f64,
    pub height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl ParentBounds {
    pub fn scroll(&self) -> Point {
        Point::new(self.scroll_left, self.scroll_top)
    }
}

/// Allowed translation range per axis: `min.x..=max.x`, `min.y..=max.y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaRange {
    pub min: Point,
    pub max: Point,
}

impl DeltaRange {
    pub const UNBOUNDED: DeltaRange = DeltaRange {
        min: Point {
            x: f64::NEG_INFINITY,
            y: f64::NEG_INFINITY,
        },
        max: Point {
            x: f64::INFINITY,
            y: f64::INFINITY,
        },
    };

    /// Range that keeps `rect` inside `bounds`. Each edge is limited on its
    /// own, so an element touching one side can still move away from it.
    /// When the element is larger than the bounds the leading edge wins.
    pub fn within(rect: &Rect, bounds: &ParentBounds) -> Self {
        let area = Rect::new(bounds.rect.x, bounds.rect.y, bounds.width, bounds.height);
        DeltaRange {
            min: Point::new(area.x - rect.x, area.y - rect.y),
            max: Point::new(area.right() - rect.right(), area.bottom() - rect.bottom()),
        }
    }

    pub fn clamp(&self, delta: Point) -> Point {
        Point::new(
            clamp_axis(delta.x, self.min.x, self.max.x),
            clamp_axis(delta.y, self.min.y, self.max.y),
        )
    }
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// `round(value / grid) * grid`; a non-positive grid leaves the value alone.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snaps `base + delta` to the grid and returns the resulting delta, nudging
/// by whole grid steps when rounding would leave `min..=max`. Falls back to
/// the unsnapped clamped delta when no grid line fits.
pub fn snap_delta_within(base: f64, delta: f64, grid_size: f64, min: f64, max: f64) -> f64 {
    let clamped = clamp_axis(delta, min, max);
    let mut snapped = snap_to_grid(base + clamped, grid_size) - base;
    if grid_size > 0.0 {
        if snapped > max {
            snapped -= grid_size * ((snapped - max) / grid_size).ceil();
        }
        if snapped < min {
            snapped += grid_size * ((min - snapped) / grid_size).ceil();
        }
    }
    if snapped < min || snapped > max {
        clamped
    } else {
        snapped
    }
}

/// Looks an element up on the surface. `None` when the surface has no
/// document yet or nothing lives at `path`.
pub fn resolve_element<S: RenderSurface + ?Sized>(
    surface: &S,
    path: &ElementPath,
) -> Option<ElementId> {
    if !surface.is_ready() {
        return None;
    }
    surface.resolve(path)
}

/// Bounds of the surface's content body with its scroll offsets, or the
/// outer viewport when the surface is not ready.
pub fn parent_bounds<S: RenderSurface + ?Sized>(surface: &S, fallback: &Viewport) -> ParentBounds {
    match surface.body_rect() {
        Some(rect) if surface.is_ready() => {
            let scroll = surface.scroll_offset();
            ParentBounds {
                rect,
                width: rect.width,
                height: rect.height,
                scroll_left: scroll.x,
                scroll_top: scroll.y,
            }
        }
        _ => ParentBounds {
            rect: Rect::new(0.0, 0.0, fallback.width, fallback.height),
            width: fallback.width,
            height: fallback.height,
            scroll_left: fallback.scroll_left,
            scroll_top: fallback.scroll_top,
        },
    }
}

/// Position of an element relative to its parent's box, in content space.
/// Both rectangles carry the same scroll shift, so it cancels out.
pub fn element_offset<S: RenderSurface + ?Sized>(surface: &S, id: ElementId) -> Option<Point> {
    let rect = surface.bounding_rect(id)?;
    let parent_rect = surface
        .parent(id)
        .and_then(|parent| surface.bounding_rect(parent))
        .or_else(|| surface.body_rect())?;
    Some(rect.origin() - parent_rect.origin())
}

/// Parses a CSS pixel length (`"12px"`, `"12"`, `"-3.5px"`); anything else is `None`.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Formats a pixel length the way inline styles are written back.
pub fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

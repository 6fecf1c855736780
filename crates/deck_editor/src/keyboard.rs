use deck_core::{Change, ChangeData};
use deck_logging::deck_debug;

use crate::geometry::{
    element_offset, format_px, parent_bounds, parse_px, snap_delta_within, DeltaRange, Point,
    Viewport, DEFAULT_GRID_SIZE,
};
use crate::surface::{ElementId, ElementPath, RenderSurface};

const SHIFT_MULTIPLIER: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(ArrowKey::Up),
            "ArrowDown" => Some(ArrowKey::Down),
            "ArrowLeft" => Some(ArrowKey::Left),
            "ArrowRight" => Some(ArrowKey::Right),
            _ => None,
        }
    }

    fn direction(self) -> Point {
        match self {
            ArrowKey::Up => Point::new(0.0, -1.0),
            ArrowKey::Down => Point::new(0.0, 1.0),
            ArrowKey::Left => Point::new(-1.0, 0.0),
            ArrowKey::Right => Point::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    /// Focus is inside an input, textarea or contenteditable region.
    pub in_text_control: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn in_text_control(mut self) -> Self {
        self.in_text_control = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NudgeOptions {
    pub grid_size: f64,
    pub constrain_to_slide: bool,
    pub viewport: Viewport,
}

impl Default for NudgeOptions {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            constrain_to_slide: true,
            viewport: Viewport::default(),
        }
    }
}

/// Moves the active element with the arrow keys: 1px per press, 10px with
/// Shift; with Ctrl/Cmd the resulting position snaps to the grid instead.
#[derive(Debug, Clone)]
pub struct KeyboardNudgeController {
    element: ElementId,
    path: ElementPath,
    options: NudgeOptions,
    enabled: bool,
}

impl KeyboardNudgeController {
    pub fn bind<S: RenderSurface + ?Sized>(
        surface: &S,
        path: &ElementPath,
        options: NudgeOptions,
    ) -> Option<Self> {
        let element = crate::geometry::resolve_element(surface, path)?;
        Some(Self {
            element,
            path: path.clone(),
            options,
            enabled: true,
        })
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handles one keydown. Returns the position change when the element moved.
    pub fn handle_key<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        event: &KeyEvent,
    ) -> Option<Change> {
        if !self.enabled || event.in_text_control {
            return None;
        }
        let arrow = ArrowKey::from_key(&event.key)?;
        let rect = surface.bounding_rect(self.element)?;

        let original_position = surface
            .computed_style(self.element, "position")
            .unwrap_or_else(|| "static".to_string());
        let was_static = original_position == "static";
        let (start_left, start_top) = if was_static {
            (0.0, 0.0)
        } else {
            let offset = element_offset(&*surface, self.element).unwrap_or(Point::ZERO);
            let computed = |property: &str| {
                surface
                    .computed_style(self.element, property)
                    .and_then(|value| parse_px(&value))
            };
            (
                computed("left").unwrap_or(offset.x),
                computed("top").unwrap_or(offset.y),
            )
        };

        let step = if event.shift { SHIFT_MULTIPLIER } else { 1.0 };
        let direction = arrow.direction();
        let raw = Point::new(direction.x * step, direction.y * step);
        let range = if self.options.constrain_to_slide {
            DeltaRange::within(&rect, &parent_bounds(&*surface, &self.options.viewport))
        } else {
            DeltaRange::UNBOUNDED
        };

        let snap = event.ctrl || event.meta;
        let grid = self.options.grid_size;
        let axis = |base: f64, delta: f64, min: f64, max: f64| {
            if snap {
                // A snap that would not move along the pressed direction steps
                // to the next grid line instead.
                match snap_delta_within(base, delta, grid, min, max) {
                    d if d * delta.signum() > 0.0 => d,
                    _ => snap_delta_within(base, delta.signum() * grid, grid, min, max),
                }
            } else {
                delta.min(max).max(min)
            }
        };
        // Snapping can move an axis the arrow did not point along; only the
        // pressed axis is touched.
        let dx = if raw.x != 0.0 {
            axis(start_left, raw.x, range.min.x, range.max.x)
        } else {
            0.0
        };
        let dy = if raw.y != 0.0 {
            axis(start_top, raw.y, range.min.y, range.max.y)
        } else {
            0.0
        };
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        let left = start_left + dx;
        let top = start_top + dy;
        let position = if was_static {
            surface.set_style(self.element, "position", "relative");
            "relative".to_string()
        } else {
            original_position.clone()
        };
        surface.set_style(self.element, "left", &format_px(left));
        surface.set_style(self.element, "top", &format_px(top));
        deck_debug!("nudge {} {:?} -> ({}, {})", self.path, arrow, left, top);

        Some(Change::new(
            self.path.to_string(),
            ChangeData::Position {
                left,
                top,
                position: Some(position),
            },
            ChangeData::Position {
                left: start_left,
                top: start_top,
                position: Some(original_position),
            },
        ))
    }
}

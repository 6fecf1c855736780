//! Pointer-driven element dragging.
//!
//! `Idle -> Dragging -> Idle`. While dragging, only a CSS translation is
//! previewed (composed after the element's own transform, at most once per
//! animation frame); `left`/`top` are written once, on release.

use deck_core::{Change, ChangeData};
use deck_logging::{deck_debug, deck_trace, next_frame};

use crate::css::compose_translate;
use crate::geometry::{
    element_offset, parent_bounds, parse_px, snap_delta_within, DeltaRange, Point, Rect,
    Viewport, DEFAULT_GRID_SIZE,
};
use crate::surface::{ElementId, ElementPath, RenderSurface};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOptions {
    pub grid_size: f64,
    /// Keep the element's rectangle inside the slide body.
    pub constrain_to_slide: bool,
    /// Outer page used as bounds when the surface is not ready.
    pub viewport: Viewport,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            constrain_to_slide: true,
            viewport: Viewport::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: i32,
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(pointer_id: i32, client_x: f64, client_y: f64) -> Self {
        Self {
            pointer_id,
            client_x,
            client_y,
        }
    }

    fn position(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }
}

/// Everything captured at pointer-down for one gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub pointer_id: i32,
    pub start_pointer: Point,
    pub start_left: f64,
    pub start_top: f64,
    pub width: f64,
    pub height: f64,
    pub was_static: bool,
    pub original_position: String,
    /// Inline transform present before the drag, if any.
    pub base_transform: Option<String>,
    pub start_rect: Rect,
    pub range: DeltaRange,
    pub delta: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragPhase {
    Idle,
    Dragging(DragState),
}

/// Drag controller bound to one element.
#[derive(Debug, Clone)]
pub struct DragController {
    element: ElementId,
    path: ElementPath,
    options: DragOptions,
    phase: DragPhase,
    /// Latest delta waiting for the next animation frame.
    pending_frame: Option<Point>,
}

impl DragController {
    /// Binds to the element at `path`. `None` when the surface is not ready
    /// or the path does not resolve, in which case there is nothing to tear down.
    pub fn bind<S: RenderSurface + ?Sized>(
        surface: &S,
        path: &ElementPath,
        options: DragOptions,
    ) -> Option<Self> {
        let element = crate::geometry::resolve_element(surface, path)?;
        Some(Self {
            element,
            path: path.clone(),
            options,
            phase: DragPhase::Idle,
            pending_frame: None,
        })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn set_options(&mut self, options: DragOptions) {
        self.options = options;
    }

    /// Starts a gesture. Returns `false` when a drag is already in progress
    /// or the element is gone.
    pub fn pointer_down<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        event: PointerEvent,
    ) -> bool {
        if self.is_dragging() {
            deck_debug!(
                "ignoring pointer {} down on {}: drag already active",
                event.pointer_id,
                self.path
            );
            return false;
        }
        let Some(rect) = surface.bounding_rect(self.element) else {
            return false;
        };

        let original_position = surface
            .computed_style(self.element, "position")
            .unwrap_or_else(|| "static".to_string());
        let was_static = original_position == "static";
        let offset = element_offset(&*surface, self.element).unwrap_or(Point::ZERO);
        let computed = |property: &str| {
            surface
                .computed_style(self.element, property)
                .and_then(|value| parse_px(&value))
        };
        let start_left = computed("left").unwrap_or(offset.x);
        let start_top = computed("top").unwrap_or(offset.y);
        let base_transform = surface
            .inline_style(self.element, "transform")
            .filter(|t| !t.trim().is_empty() && t.trim() != "none");

        let range = if self.options.constrain_to_slide {
            let bounds = parent_bounds(&*surface, &self.options.viewport);
            DeltaRange::within(&rect, &bounds)
        } else {
            DeltaRange::UNBOUNDED
        };

        surface.set_pointer_capture(self.element, event.pointer_id);
        deck_debug!(
            "drag start {} at ({}, {}) static={}",
            self.path,
            start_left,
            start_top,
            was_static
        );
        self.phase = DragPhase::Dragging(DragState {
            pointer_id: event.pointer_id,
            start_pointer: event.position(),
            start_left,
            start_top,
            width: rect.width,
            height: rect.height,
            was_static,
            original_position,
            base_transform,
            start_rect: rect,
            range,
            delta: Point::ZERO,
        });
        self.pending_frame = None;
        true
    }

    /// Records the pointer's new position. Returns `true` when the caller
    /// has to schedule an animation frame; a frame already pending simply
    /// picks up the newer delta.
    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        let DragPhase::Dragging(state) = &mut self.phase else {
            return false;
        };
        if event.pointer_id != state.pointer_id {
            return false;
        }
        let delta = state.range.clamp(event.position() - state.start_pointer);
        state.delta = delta;
        self.pending_frame.replace(delta).is_none()
    }

    /// Applies the pending preview translation, if any.
    pub fn animation_frame<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        let Some(delta) = self.pending_frame.take() else {
            return;
        };
        let DragPhase::Dragging(state) = &self.phase else {
            return;
        };
        let frame = next_frame();
        let transform = compose_translate(state.base_transform.as_deref(), delta);
        deck_trace!("frame {} preview {} -> {}", frame, self.path, transform);
        surface.set_style(self.element, "transform", &transform);
    }

    /// Ends the gesture and commits the snapped position. Returns the
    /// position change to record, or `None` when nothing was dragging.
    pub fn pointer_up<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        event: PointerEvent,
    ) -> Option<Change> {
        let DragPhase::Dragging(state) = &self.phase else {
            return None;
        };
        if event.pointer_id != state.pointer_id {
            return None;
        }
        let delta = state.range.clamp(event.position() - state.start_pointer);
        let DragPhase::Dragging(state) = std::mem::replace(&mut self.phase, DragPhase::Idle)
        else {
            return None;
        };
        self.pending_frame = None;

        let grid = self.options.grid_size;
        let range = state.range;
        let (base_x, base_y) = if state.was_static {
            (0.0, 0.0)
        } else {
            (state.start_left, state.start_top)
        };
        let dx = snap_delta_within(base_x, delta.x, grid, range.min.x, range.max.x);
        let dy = snap_delta_within(base_y, delta.y, grid, range.min.y, range.max.y);
        let left = base_x + dx;
        let top = base_y + dy;

        let position = if state.was_static {
            surface.set_style(self.element, "position", "relative");
            "relative".to_string()
        } else {
            state.original_position.clone()
        };
        surface.set_style(self.element, "left", &crate::geometry::format_px(left));
        surface.set_style(self.element, "top", &crate::geometry::format_px(top));
        match &state.base_transform {
            Some(base) => surface.set_style(self.element, "transform", base),
            None => surface.remove_style(self.element, "transform"),
        }
        surface.release_pointer_capture(self.element, state.pointer_id);

        deck_debug!("drag commit {} -> ({}, {})", self.path, left, top);
        let previous = if state.was_static {
            ChangeData::Position {
                left: 0.0,
                top: 0.0,
                position: Some(state.original_position),
            }
        } else {
            ChangeData::Position {
                left: state.start_left,
                top: state.start_top,
                position: Some(state.original_position),
            }
        };
        Some(Change::new(
            self.path.to_string(),
            ChangeData::Position {
                left,
                top,
                position: Some(position),
            },
            previous,
        ))
    }

    /// Abandons the gesture without committing: the preview translation is
    /// removed and the original transform restored.
    pub fn cancel<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let DragPhase::Dragging(state) = std::mem::replace(&mut self.phase, DragPhase::Idle)
        else {
            return false;
        };
        self.pending_frame = None;
        match &state.base_transform {
            Some(base) => surface.set_style(self.element, "transform", base),
            None => surface.remove_style(self.element, "transform"),
        }
        surface.release_pointer_capture(self.element, state.pointer_id);
        deck_debug!("drag cancelled on {}", self.path);
        true
    }

    /// Releases everything the controller holds on the surface.
    pub fn teardown<S: RenderSurface + ?Sized>(mut self, surface: &mut S) {
        self.cancel(surface);
    }
}

//! One slide open for direct manipulation.
//!
//! [`SlideEditor`] owns the render surface and routes pointer, keyboard,
//! layer and text input to the controllers bound to the selected element.
//! Every committed edit comes back as a [`Change`] for the session history;
//! undo/redo results are fed back through [`SlideEditor::apply`].

use deck_core::{Change, ChangeData};
use deck_logging::{deck_debug, deck_warn};
use serde::{Deserialize, Serialize};

use crate::drag::{DragController, DragOptions, PointerEvent};
use crate::geometry::{format_px, Viewport, DEFAULT_GRID_SIZE};
use crate::keyboard::{KeyEvent, KeyboardNudgeController, NudgeOptions};
use crate::layers::{reorder, LayerOp};
use crate::overlay::{
    alignment_guides, render_guides_svg, GridOverlay, Guide, DEFAULT_GUIDE_THRESHOLD,
};
use crate::surface::{ElementPath, RenderSurface};
use crate::text::edit_text;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    pub grid_size: f64,
    pub constrain_to_slide: bool,
    pub guide_threshold: f64,
    pub viewport: Viewport,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            constrain_to_slide: true,
            guide_threshold: DEFAULT_GUIDE_THRESHOLD,
            viewport: Viewport::default(),
        }
    }
}

impl EditorOptions {
    fn drag(&self) -> DragOptions {
        DragOptions {
            grid_size: self.grid_size,
            constrain_to_slide: self.constrain_to_slide,
            viewport: self.viewport,
        }
    }

    fn nudge(&self) -> NudgeOptions {
        NudgeOptions {
            grid_size: self.grid_size,
            constrain_to_slide: self.constrain_to_slide,
            viewport: self.viewport,
        }
    }
}

#[derive(Debug)]
struct Selection {
    path: ElementPath,
    drag: DragController,
    keyboard: KeyboardNudgeController,
}

pub struct SlideEditor<S: RenderSurface> {
    surface: S,
    slide_id: String,
    options: EditorOptions,
    selection: Option<Selection>,
}

impl<S: RenderSurface> SlideEditor<S> {
    pub fn new(surface: S, slide_id: impl Into<String>, options: EditorOptions) -> Self {
        Self {
            surface,
            slide_id: slide_id.into(),
            options,
            selection: None,
        }
    }

    pub fn slide_id(&self) -> &str {
        &self.slide_id
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(mut self) -> S {
        self.deselect();
        self.surface
    }

    pub fn selected(&self) -> Option<&ElementPath> {
        self.selection.as_ref().map(|selection| &selection.path)
    }

    pub fn is_dragging(&self) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|selection| selection.drag.is_dragging())
    }

    /// Binds the controllers to the element at `path`. Returns `false` (and
    /// keeps nothing selected) when the surface is not ready or the path
    /// does not resolve.
    pub fn select(&mut self, path: &ElementPath) -> bool {
        if self.selected() == Some(path) {
            return true;
        }
        self.deselect();
        let drag = DragController::bind(&self.surface, path, self.options.drag());
        let keyboard = KeyboardNudgeController::bind(&self.surface, path, self.options.nudge());
        match (drag, keyboard) {
            (Some(drag), Some(keyboard)) => {
                deck_debug!("selected {} on slide {}", path, self.slide_id);
                self.selection = Some(Selection {
                    path: path.clone(),
                    drag,
                    keyboard,
                });
                true
            }
            _ => {
                deck_debug!("cannot select {} on slide {}", path, self.slide_id);
                false
            }
        }
    }

    pub fn deselect(&mut self) {
        if let Some(selection) = self.selection.take() {
            selection.drag.teardown(&mut self.surface);
        }
    }

    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        match self.selection.as_mut() {
            Some(selection) => selection.drag.pointer_down(&mut self.surface, event),
            None => false,
        }
    }

    /// Returns `true` when an animation frame should be scheduled.
    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        self.selection
            .as_mut()
            .is_some_and(|selection| selection.drag.pointer_move(event))
    }

    pub fn animation_frame(&mut self) {
        if let Some(selection) = self.selection.as_mut() {
            selection.drag.animation_frame(&mut self.surface);
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> Option<Change> {
        let selection = self.selection.as_mut()?;
        selection.drag.pointer_up(&mut self.surface, event)
    }

    /// Keyboard input for the selected element. `Escape` abandons an active
    /// drag; arrow keys nudge when no drag is in progress.
    pub fn key(&mut self, event: &KeyEvent) -> Option<Change> {
        let selection = self.selection.as_mut()?;
        if event.key == "Escape" {
            selection.drag.cancel(&mut self.surface);
            return None;
        }
        if selection.drag.is_dragging() {
            return None;
        }
        selection.keyboard.handle_key(&mut self.surface, event)
    }

    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        if let Some(selection) = self.selection.as_mut() {
            selection.keyboard.set_enabled(enabled);
        }
    }

    pub fn layer(&mut self, op: LayerOp) -> Option<Change> {
        let selection = self.selection.as_ref()?;
        let element = selection.drag.element();
        reorder(&mut self.surface, element, op)
    }

    pub fn edit_text(&mut self, path: &ElementPath, text: &str) -> Option<Change> {
        let element = self.surface.resolve(path)?;
        let change = edit_text(&mut self.surface, element, text);
        if change.is_some() {
            self.revalidate_selection();
        }
        change
    }

    /// Writes recorded change data back onto the surface, as undo/redo do.
    /// Returns `false` when the element no longer resolves.
    pub fn apply(&mut self, element_id: &str, data: &ChangeData) -> bool {
        let Ok(path) = element_id.parse::<ElementPath>() else {
            deck_warn!("cannot apply change to malformed element id {:?}", element_id);
            return false;
        };
        let Some(element) = self.surface.resolve(&path) else {
            deck_warn!("cannot apply change: {} is gone from slide {}", path, self.slide_id);
            return false;
        };
        if let Some(selection) = self.selection.as_mut() {
            selection.drag.cancel(&mut self.surface);
        }

        match data {
            ChangeData::Position {
                left,
                top,
                position,
            } => match position.as_deref() {
                Some("static") => {
                    for property in ["position", "left", "top"] {
                        self.surface.remove_style(element, property);
                    }
                }
                other => {
                    if let Some(position) = other {
                        self.surface.set_style(element, "position", position);
                    }
                    self.surface.set_style(element, "left", &format_px(*left));
                    self.surface.set_style(element, "top", &format_px(*top));
                }
            },
            ChangeData::Style { properties } => {
                for (property, value) in properties {
                    self.surface.write_style(element, property, value);
                }
            }
            ChangeData::Text { text } => {
                self.surface.set_text(element, text);
                self.revalidate_selection();
            }
        }
        deck_debug!("applied {:?} change to {}", data.kind(), path);
        true
    }

    /// The grid overlay sized to the slide body; `None` before content loads.
    pub fn grid_svg(&self) -> Option<String> {
        let size = self.surface.client_size()?;
        Some(GridOverlay::new(self.options.grid_size).render_svg(size))
    }

    /// Alignment guides for the selected element.
    pub fn guides(&self) -> Vec<Guide> {
        match self.selection.as_ref() {
            Some(selection) => alignment_guides(
                &self.surface,
                selection.drag.element(),
                self.options.guide_threshold,
            ),
            None => Vec::new(),
        }
    }

    pub fn guides_svg(&self) -> Option<String> {
        let size = self.surface.client_size()?;
        Some(render_guides_svg(size, &self.guides()))
    }

    // A text replacement can detach the selected element.
    fn revalidate_selection(&mut self) {
        let stale = self.selection.as_ref().is_some_and(|selection| {
            self.surface.resolve(&selection.path) != Some(selection.drag.element())
        });
        if stale {
            self.selection = None;
        }
    }
}

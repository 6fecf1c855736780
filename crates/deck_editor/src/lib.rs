//! Direct manipulation of generated slides: geometry, the render-surface
//! adapter, drag/keyboard/layer/text controllers and overlays.
pub mod css;
pub mod decode;
pub mod drag;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod html_surface;
pub mod keyboard;
pub mod layers;
pub mod overlay;
pub mod surface;
pub mod text;

pub use decode::{decode_slide, DecodeError, DecodedSlide};
pub use drag::{DragController, DragOptions, DragPhase, DragState, PointerEvent};
pub use editor::{EditorOptions, SlideEditor};
pub use export::{ensure_output_dir, slide_filename, write_atomic, PersistError};
pub use geometry::{
    element_offset, parent_bounds, parse_px, snap_delta_within, snap_to_grid, DeltaRange,
    ParentBounds, Point, Rect, Size, Viewport, DEFAULT_GRID_SIZE,
};
pub use html_surface::{HtmlSurface, SurfaceError};
pub use keyboard::{ArrowKey, KeyEvent, KeyboardNudgeController, NudgeOptions};
pub use layers::{reorder, target_z_index, z_index, LayerOp};
pub use overlay::{
    alignment_guides, render_guides_svg, GridOverlay, Guide, GuideKind, GuideOrientation,
    DEFAULT_GUIDE_THRESHOLD,
};
pub use surface::{ElementId, ElementPath, PathParseError, RenderSurface};
pub use text::edit_text;

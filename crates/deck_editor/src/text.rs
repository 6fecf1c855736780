use deck_core::{Change, ChangeData};
use deck_logging::deck_debug;

use crate::surface::{ElementId, RenderSurface};

/// Replaces an element's text content. Returns the text change, or `None`
/// when the element is gone or the text is unchanged.
pub fn edit_text<S: RenderSurface + ?Sized>(
    surface: &mut S,
    id: ElementId,
    text: &str,
) -> Option<Change> {
    let path = surface.path_of(id)?;
    let previous = surface.text(id)?;
    if previous == text {
        return None;
    }
    surface.set_text(id, text);
    deck_debug!("text edit on {} ({} -> {} chars)", path, previous.len(), text.len());
    Some(Change::new(
        path.to_string(),
        ChangeData::Text {
            text: text.to_string(),
        },
        ChangeData::Text { text: previous },
    ))
}

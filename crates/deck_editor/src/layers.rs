use deck_core::{Change, ChangeData};
use deck_logging::deck_debug;

use crate::surface::{ElementId, RenderSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOp {
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
}

impl LayerOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerOp::BringForward => "forward",
            LayerOp::SendBackward => "backward",
            LayerOp::BringToFront => "front",
            LayerOp::SendToBack => "back",
        }
    }
}

/// Resolved z-index of an element; anything non-numeric (`auto`) counts as 0.
pub fn z_index<S: RenderSurface + ?Sized>(surface: &S, id: ElementId) -> i64 {
    surface
        .computed_style(id, "z-index")
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// New z-index for `op` given the element's current value and its siblings'.
///
/// Forward/backward step just past the nearest sibling in that direction.
/// Front/back go one past the highest/lowest sibling, except that an element
/// already strictly above every sibling keeps its value for front, and one
/// already strictly below keeps it for back. Results never drop below 0.
pub fn target_z_index(op: LayerOp, current: i64, siblings: &[i64]) -> i64 {
    match op {
        LayerOp::BringForward => siblings
            .iter()
            .copied()
            .filter(|&z| z > current)
            .min()
            .map_or(current + 1, |z| z + 1),
        LayerOp::SendBackward => siblings
            .iter()
            .copied()
            .filter(|&z| z < current)
            .max()
            .map_or(current - 1, |z| z - 1)
            .max(0),
        // Already above (or below) every sibling: nothing to do.
        LayerOp::BringToFront => match siblings.iter().copied().max() {
            Some(top) if top >= current => top + 1,
            _ => current,
        },
        LayerOp::SendToBack => match siblings.iter().copied().min() {
            Some(bottom) if bottom <= current => (bottom - 1).max(0),
            _ => current,
        },
    }
}

/// Reorders `id` among the children of its parent. Returns the style
/// change, or `None` when the z-index did not change.
pub fn reorder<S: RenderSurface + ?Sized>(
    surface: &mut S,
    id: ElementId,
    op: LayerOp,
) -> Option<Change> {
    let path = surface.path_of(id)?;
    let current = z_index(&*surface, id);
    let siblings: Vec<i64> = surface
        .siblings(id)
        .into_iter()
        .map(|sibling| z_index(&*surface, sibling))
        .collect();
    let target = target_z_index(op, current, &siblings);
    if target == current {
        return None;
    }
    // An empty previous value means z-index was not set inline.
    let previous = surface.inline_style(id, "z-index").unwrap_or_default();
    surface.set_style(id, "z-index", &target.to_string());
    deck_debug!("layer {} on {}: z {} -> {}", op.as_str(), path, current, target);

    Some(Change::new(
        path.to_string(),
        ChangeData::style("z-index", target.to_string()),
        ChangeData::style("z-index", previous),
    ))
}

//! Line-based edit scripts.
//!
//! ```text
//! # comments and blank lines are ignored
//! drag body.0 40 -12
//! nudge body.1 right shift
//! front body.2
//! text body.0.1 Quarterly results
//! undo
//! redo
//! ```

use deck_core::{update, Effect, Msg, SessionState};
use deck_editor::{
    ElementPath, HtmlSurface, KeyEvent, LayerOp, PathParseError, PointerEvent, RenderSurface,
    SlideEditor,
};
use deck_logging::{deck_debug, deck_info, deck_warn};
use thiserror::Error;

/// Pointer id used for scripted drags.
const SCRIPT_POINTER: i32 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: `{command}` needs {argument}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        argument: &'static str,
    },
    #[error("line {line}: {value:?} is not a number")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: {source}")]
    InvalidPath {
        line: usize,
        source: PathParseError,
    },
    #[error("line {line}: {value:?} is not one of up, down, left, right")]
    InvalidDirection { line: usize, value: String },
    #[error("line {line}: unknown modifier {value:?}")]
    UnknownModifier { line: usize, value: String },
    #[error("line {line}: nothing at {path} on this slide")]
    Unresolved { line: usize, path: ElementPath },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    Drag {
        path: ElementPath,
        dx: f64,
        dy: f64,
    },
    Nudge {
        path: ElementPath,
        key: &'static str,
        shift: bool,
        ctrl: bool,
    },
    Layer {
        path: ElementPath,
        op: LayerOp,
    },
    Text {
        path: ElementPath,
        text: String,
    },
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: EditCommand,
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(parse_line(index + 1, trimmed))
            }
        })
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<ScriptLine, ScriptError> {
    let (name, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let rest = rest.trim_start();
    let mut args = rest.split_whitespace();

    let command = match name {
        "drag" => {
            let path = path_arg(line, "drag", args.next())?;
            let dx = number_arg(line, "drag", "dx", args.next())?;
            let dy = number_arg(line, "drag", "dy", args.next())?;
            EditCommand::Drag { path, dx, dy }
        }
        "nudge" => {
            let path = path_arg(line, "nudge", args.next())?;
            let direction = args.next().ok_or(ScriptError::MissingArgument {
                line,
                command: "nudge",
                argument: "a direction",
            })?;
            let key = match direction {
                "up" => "ArrowUp",
                "down" => "ArrowDown",
                "left" => "ArrowLeft",
                "right" => "ArrowRight",
                other => {
                    return Err(ScriptError::InvalidDirection {
                        line,
                        value: other.to_string(),
                    })
                }
            };
            let (mut shift, mut ctrl) = (false, false);
            for modifier in args {
                match modifier {
                    "shift" => shift = true,
                    "ctrl" | "cmd" => ctrl = true,
                    other => {
                        return Err(ScriptError::UnknownModifier {
                            line,
                            value: other.to_string(),
                        })
                    }
                }
            }
            EditCommand::Nudge {
                path,
                key,
                shift,
                ctrl,
            }
        }
        "front" | "back" | "forward" | "backward" => {
            let (command, op) = match name {
                "front" => ("front", LayerOp::BringToFront),
                "back" => ("back", LayerOp::SendToBack),
                "forward" => ("forward", LayerOp::BringForward),
                _ => ("backward", LayerOp::SendBackward),
            };
            EditCommand::Layer {
                path: path_arg(line, command, args.next())?,
                op,
            }
        }
        "text" => {
            let (path, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            EditCommand::Text {
                path: path_arg(line, "text", Some(path).filter(|p| !p.is_empty()))?,
                text: text.trim_start().to_string(),
            }
        }
        "undo" => EditCommand::Undo,
        "redo" => EditCommand::Redo,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };
    Ok(ScriptLine { line, command })
}

fn path_arg(
    line: usize,
    command: &'static str,
    value: Option<&str>,
) -> Result<ElementPath, ScriptError> {
    let value = value.ok_or(ScriptError::MissingArgument {
        line,
        command,
        argument: "an element path",
    })?;
    value
        .parse()
        .map_err(|source| ScriptError::InvalidPath { line, source })
}

fn number_arg(
    line: usize,
    command: &'static str,
    argument: &'static str,
    value: Option<&str>,
) -> Result<f64, ScriptError> {
    let value = value.ok_or(ScriptError::MissingArgument {
        line,
        command,
        argument,
    })?;
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ScriptError::InvalidNumber {
            line,
            value: value.to_string(),
        })
}

/// What running a script did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptReport {
    /// Commands that produced a change.
    pub changes: usize,
    /// Commands that left the slide as it was.
    pub unchanged: usize,
    pub undone: usize,
    pub redone: usize,
}

/// Runs `script` against the editor, recording every change in the
/// session's history and applying undo/redo effects back onto the slide.
pub fn run_script(
    editor: &mut SlideEditor<HtmlSurface>,
    mut state: SessionState,
    script: &[ScriptLine],
) -> Result<(SessionState, ScriptReport), ScriptError> {
    let slide_id = editor.slide_id().to_string();
    let mut report = ScriptReport::default();

    for ScriptLine { line, command } in script {
        let line = *line;
        let change = match command {
            EditCommand::Drag { path, dx, dy } => {
                select(editor, line, path)?;
                editor.pointer_down(PointerEvent::new(SCRIPT_POINTER, 0.0, 0.0));
                if editor.pointer_move(PointerEvent::new(SCRIPT_POINTER, *dx, *dy)) {
                    editor.animation_frame();
                }
                editor.pointer_up(PointerEvent::new(SCRIPT_POINTER, *dx, *dy))
            }
            EditCommand::Nudge {
                path,
                key,
                shift,
                ctrl,
            } => {
                select(editor, line, path)?;
                let mut event = KeyEvent::new(*key);
                event.shift = *shift;
                event.ctrl = *ctrl;
                editor.key(&event)
            }
            EditCommand::Layer { path, op } => {
                select(editor, line, path)?;
                editor.layer(*op)
            }
            EditCommand::Text { path, text } => {
                if editor.surface().resolve(path).is_none() {
                    return Err(ScriptError::Unresolved {
                        line,
                        path: path.clone(),
                    });
                }
                editor.edit_text(path, text)
            }
            EditCommand::Undo | EditCommand::Redo => {
                let undo = matches!(command, EditCommand::Undo);
                let msg = if undo {
                    Msg::Undo {
                        slide_id: slide_id.clone(),
                    }
                } else {
                    Msg::Redo {
                        slide_id: slide_id.clone(),
                    }
                };
                let (next, effects) = update(state, msg);
                state = next;
                if effects.is_empty() {
                    deck_info!("line {}: nothing to {}", line, if undo { "undo" } else { "redo" });
                    report.unchanged += 1;
                } else {
                    apply_effects(editor, &effects);
                    if undo {
                        report.undone += 1;
                    } else {
                        report.redone += 1;
                    }
                }
                continue;
            }
        };

        match change {
            Some(change) => {
                deck_debug!("line {}: {:?} change on {}", line, change.kind(), change.element_id);
                let (next, _) = update(state, Msg::change_tracked(slide_id.clone(), change));
                state = next;
                report.changes += 1;
            }
            None => {
                deck_info!("line {}: no change", line);
                report.unchanged += 1;
            }
        }
    }
    Ok((state, report))
}

fn select(
    editor: &mut SlideEditor<HtmlSurface>,
    line: usize,
    path: &ElementPath,
) -> Result<(), ScriptError> {
    if editor.select(path) {
        Ok(())
    } else {
        Err(ScriptError::Unresolved {
            line,
            path: path.clone(),
        })
    }
}

fn apply_effects(editor: &mut SlideEditor<HtmlSurface>, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::ApplyChange {
                slide_id,
                element_id,
                data,
            } if slide_id == editor.slide_id() => {
                if !editor.apply(element_id, data) {
                    deck_warn!("could not reapply change to {}", element_id);
                }
            }
            other => deck_debug!("ignoring effect {:?}", other),
        }
    }
}

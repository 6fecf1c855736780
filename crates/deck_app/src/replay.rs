use std::fmt::Write as _;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use deck_core::{update, AgentEvent, Effect, Msg, SessionSnapshot, SessionState, SessionViewModel};
use deck_editor::{slide_filename, write_atomic, PersistError};
use deck_logging::{deck_debug, deck_info, deck_warn};

#[derive(Debug, Clone, Default)]
pub struct ReplayOutcome {
    pub state: SessionState,
    pub effects: Vec<Effect>,
    /// Lines folded into the session.
    pub events: usize,
    /// Lines that were not valid JSON.
    pub skipped: usize,
}

/// Folds a JSONL agent stream into `state`, one event per line. Blank lines
/// are ignored; malformed lines are logged and skipped.
pub fn replay<R: BufRead>(reader: R, state: SessionState) -> io::Result<ReplayOutcome> {
    let mut outcome = ReplayOutcome {
        state,
        ..ReplayOutcome::default()
    };
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: AgentEvent = match serde_json::from_str(trimmed) {
            Ok(event) => event,
            Err(err) => {
                deck_warn!("skipping line {}: {}", index + 1, err);
                outcome.skipped += 1;
                continue;
            }
        };
        let (next, effects) = update(std::mem::take(&mut outcome.state), Msg::from(event));
        outcome.state = next;
        outcome.effects.extend(effects);
        outcome.events += 1;
    }
    deck_info!(
        "replayed {} events ({} skipped) into {} log entries and {} slides",
        outcome.events,
        outcome.skipped,
        outcome.state.logs().len(),
        outcome.state.slides().len()
    );
    Ok(outcome)
}

/// Seeds a session from a previously written snapshot.
pub fn resume(snapshot: SessionSnapshot) -> SessionState {
    let (state, _) = update(SessionState::new(), Msg::RestoreSnapshot(snapshot));
    state
}

pub fn render_timeline(view: &SessionViewModel) -> String {
    let mut out = String::new();
    let title = view.title.as_deref().unwrap_or("Untitled presentation");
    let _ = match view.total_slides {
        Some(total) => writeln!(out, "{title} ({}/{total} slides ready)", view.completed_slides),
        None => writeln!(out, "{title} ({} slides ready)", view.completed_slides),
    };
    for row in &view.timeline {
        let marker = if row.is_complete { '*' } else { ' ' };
        let _ = write!(
            out,
            "{marker} [{:<10}] {:<36} {}",
            row.phase.as_str(),
            row.author,
            row.headline
        );
        if row.link_count > 0 {
            let _ = write!(out, " ({} links)", row.link_count);
        }
        out.push('\n');
    }
    for slide in &view.slides {
        let status = match (slide.has_thinking, slide.has_html) {
            (true, true) => "ready",
            (false, true) => "markup only",
            (true, false) => "thinking",
            (false, false) => "pending",
        };
        let _ = writeln!(out, "  slide {:>2}: {status}", slide.slide_number);
    }
    out
}

pub fn write_snapshot(path: &Path, state: &SessionState) -> Result<PathBuf, PersistError> {
    let json = serde_json::to_string_pretty(&state.snapshot())
        .map_err(|err| PersistError::Io(err.into()))?;
    write_atomic(path, &json)
}

/// Writes the markup of every complete slide into `dir`.
pub fn export_slides(dir: &Path, state: &SessionState) -> Result<Vec<PathBuf>, PersistError> {
    let mut written = Vec::new();
    for slide in state.slides().iter().filter(|slide| slide.is_complete) {
        let Some(html) = slide.html_content.as_deref() else {
            continue;
        };
        let path = dir.join(slide_filename(slide.slide_number, html));
        deck_debug!("exporting slide {} to {:?}", slide.slide_number, path);
        written.push(write_atomic(&path, html)?);
    }
    Ok(written)
}

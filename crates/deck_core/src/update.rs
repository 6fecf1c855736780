use deck_logging::{deck_debug, deck_info};

use crate::parser::parse_agent_output;
use crate::{AgentEvent, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::AgentEvent(event) => fold_event(&mut state, event),
        Msg::RestoreSnapshot(snapshot) => {
            state.restore(snapshot);
            Vec::new()
        }
        Msg::ChangeTracked { slide_id, change } => {
            state.history_mut().track_change(&slide_id, change);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Undo { slide_id } => match state.history_mut().undo(&slide_id) {
            Some(change) => {
                state.mark_dirty();
                vec![Effect::ApplyChange {
                    slide_id,
                    element_id: change.element_id,
                    data: change.previous_data,
                }]
            }
            None => {
                deck_debug!("nothing to undo on slide {}", slide_id);
                Vec::new()
            }
        },
        Msg::Redo { slide_id } => match state.history_mut().redo(&slide_id) {
            Some(change) => {
                state.mark_dirty();
                vec![Effect::ApplyChange {
                    slide_id,
                    element_id: change.element_id,
                    data: change.data,
                }]
            }
            None => {
                deck_debug!("nothing to redo on slide {}", slide_id);
                Vec::new()
            }
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn fold_event(state: &mut SessionState, event: AgentEvent) -> Vec<Effect> {
    if !state.record_event(&event) {
        deck_debug!(
            "skipping already folded event from {} at {:?}",
            event.author,
            event.timestamp
        );
        return Vec::new();
    }
    let result = parse_agent_output(&event, state.stream_view());
    let outcome = state.commit(result);
    let mut effects = Vec::new();
    if outcome.metadata_changed {
        deck_info!(
            "presentation metadata now title={:?} slides={:?}",
            state.metadata().title,
            state.metadata().total_slides
        );
        effects.push(Effect::MetadataChanged(state.metadata().clone()));
    }
    if let Some(slide_number) = outcome.slide_ready {
        deck_info!("slide {} is ready", slide_number);
        effects.push(Effect::SlideReady { slide_number });
    }
    effects
}

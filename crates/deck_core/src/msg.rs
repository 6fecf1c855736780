use crate::event::AgentEvent;
use crate::history::Change;
use crate::state::SessionSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// One event arrived from the agent stream.
    AgentEvent(AgentEvent),
    /// Restore logs and slides from a previously saved snapshot.
    RestoreSnapshot(SessionSnapshot),
    /// An editor controller changed an element on a slide.
    ChangeTracked { slide_id: String, change: Change },
    /// User asked to undo the last change on a slide.
    Undo { slide_id: String },
    /// User asked to redo the next change on a slide.
    Redo { slide_id: String },
    /// Fallback for placeholder wiring.
    NoOp,
}

impl From<AgentEvent> for Msg {
    fn from(event: AgentEvent) -> Self {
        Msg::AgentEvent(event)
    }
}

impl Msg {
    pub fn change_tracked(slide_id: impl Into<String>, change: Change) -> Self {
        Msg::ChangeTracked {
            slide_id: slide_id.into(),
            change,
        }
    }
}

//! Deck core: agent-stream aggregation, session state machine and edit history.
mod classify;
mod effect;
mod entry;
mod event;
mod history;
mod msg;
mod parser;
mod state;
mod update;
mod view_model;

pub use classify::{
    classify, derive_flags, enrich, enriched_worker_number, worker_number_from_author,
    EventFlags, MessageType,
};
pub use effect::Effect;
pub use entry::{EntryId, LogEntry, LogPayload, Phase, SlideEntry, SourceLink};
pub use event::AgentEvent;
pub use history::{Change, ChangeData, ChangeHistory, ChangeKind, SlideHistory};
pub use msg::Msg;
pub use parser::{
    is_log_duplicate, is_slide_duplicate, parse_agent_output, slide_number_from_author,
    ParseResult, PresentationMetadata, StreamView, UpdateType,
};
pub use state::{EventKey, SessionSnapshot, SessionState};
pub use update::update;
pub use view_model::{SessionViewModel, SlideProgressRow, TimelineRow, HEADLINE_LIMIT};

mod event_kind;
mod reader;
mod record;

pub use event_kind::EventKind;
pub use reader::{open_events, EventReader, PROGRESS_LOG_INTERVAL};
pub use record::Event;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// the closed set of event types understood by the pipeline. serialized
/// names match the `type` attribute used in MATSim event files.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    #[serde(rename = "personMoney")]
    PersonMoney,
    #[serde(rename = "entered link")]
    LinkEnter,
    #[serde(rename = "left link")]
    LinkLeave,
    #[serde(rename = "unknown")]
    Unknown,
}

impl EventKind {
    /// maps the raw `type` attribute of an event to its kind
    pub fn from_type_attribute(value: &str) -> EventKind {
        match value {
            "personMoney" => EventKind::PersonMoney,
            "entered link" => EventKind::LinkEnter,
            "left link" => EventKind::LinkLeave,
            _ => EventKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PersonMoney => "personMoney",
            EventKind::LinkEnter => "entered link",
            EventKind::LinkLeave => "left link",
            EventKind::Unknown => "unknown",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

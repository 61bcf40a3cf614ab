use uom::si::f64::Time;

use super::EventKind;

/// one decoded simulation event. each kind carries a fixed, typed set of
/// fields; anything outside of the modeled kinds is kept as [`Event::Unknown`]
/// so it can be counted without being aggregated.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// money transferred to (positive) or from (negative) an agent
    PersonMoney {
        time: Time,
        person: String,
        amount: f64,
        purpose: Option<String>,
        transaction_partner: Option<String>,
    },
    LinkEnter {
        time: Time,
        link: String,
        vehicle: String,
    },
    LinkLeave {
        time: Time,
        link: String,
        vehicle: String,
    },
    Unknown {
        time: Time,
        kind: String,
    },
}

impl Event {
    pub fn time(&self) -> Time {
        match self {
            Event::PersonMoney { time, .. } => *time,
            Event::LinkEnter { time, .. } => *time,
            Event::LinkLeave { time, .. } => *time,
            Event::Unknown { time, .. } => *time,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::PersonMoney { .. } => EventKind::PersonMoney,
            Event::LinkEnter { .. } => EventKind::LinkEnter,
            Event::LinkLeave { .. } => EventKind::LinkLeave,
            Event::Unknown { .. } => EventKind::Unknown,
        }
    }

    /// the agent or link this event is about, if the kind has one
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Event::PersonMoney { person, .. } => Some(person),
            Event::LinkEnter { link, .. } => Some(link),
            Event::LinkLeave { link, .. } => Some(link),
            Event::Unknown { .. } => None,
        }
    }

    /// signed monetary amount, only present on monetary events
    pub fn amount(&self) -> Option<f64> {
        match self {
            Event::PersonMoney { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}

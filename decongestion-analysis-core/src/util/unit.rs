use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uom::si::f64::Time;

/// unit used to declare time bin widths, domains and labels. all
/// conversions pass through [`uom`] so seconds and minutes are never mixed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    #[default]
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn to_uom(&self, value: f64) -> Time {
        match self {
            TimeUnit::Seconds => Time::new::<uom::si::time::second>(value),
            TimeUnit::Minutes => Time::new::<uom::si::time::minute>(value),
            TimeUnit::Hours => Time::new::<uom::si::time::hour>(value),
        }
    }

    pub fn from_uom(&self, time: Time) -> f64 {
        match self {
            TimeUnit::Seconds => time.get::<uom::si::time::second>(),
            TimeUnit::Minutes => time.get::<uom::si::time::minute>(),
            TimeUnit::Hours => time.get::<uom::si::time::hour>(),
        }
    }

    /// column name used for time bin labels in this unit
    pub fn label_column(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "second",
            TimeUnit::Minutes => "minute",
            TimeUnit::Hours => "hour",
        }
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_round_trip_through_seconds() {
        let t = TimeUnit::Minutes.to_uom(125.0);
        assert_eq!(t.get::<uom::si::time::second>(), 7500.0);
        assert_eq!(TimeUnit::Minutes.from_uom(t), 125.0);
        assert_eq!(TimeUnit::Hours.from_uom(TimeUnit::Minutes.to_uom(90.0)), 1.5);
    }
}

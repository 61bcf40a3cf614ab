use serde::{Deserialize, Serialize};
use uom::si::f64::Time;

use super::TimeBin;
use crate::{event::EventKind, util::unit::TimeUnit, AnalysisError};

/// what to do with an event whose timestamp is outside of the time bin domain
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutOfDomainPolicy {
    /// fail the scenario with [`AnalysisError::OutOfDomainTimestamp`]
    #[default]
    Strict,
    /// put the event into the nearest valid bin and count it
    Clamp,
}

/// configures the fixed-width time bins used to aggregate events.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimeBinConfig {
    /// width W of each bin, in `time_unit`
    pub bin_width: f64,
    /// total simulated duration D covered by the bins, in `time_unit`
    pub domain: f64,
    /// unit of `bin_width` and `domain`
    #[serde(default)]
    pub time_unit: TimeUnit,
    /// unit used to write bin labels. defaults to `time_unit`.
    #[serde(default)]
    pub label_unit: Option<TimeUnit>,
    /// event type whose amounts are aggregated
    #[serde(default = "default_event_type")]
    pub event_type: EventKind,
    #[serde(default)]
    pub out_of_domain: OutOfDomainPolicy,
}

fn default_event_type() -> EventKind {
    EventKind::PersonMoney
}

impl Default for TimeBinConfig {
    /// hourly bins over 56 hours (3360 minutes) of personMoney events
    fn default() -> Self {
        TimeBinConfig {
            bin_width: 60.0,
            domain: 3360.0,
            time_unit: TimeUnit::Minutes,
            label_unit: None,
            event_type: default_event_type(),
            out_of_domain: OutOfDomainPolicy::default(),
        }
    }
}

impl TimeBinConfig {
    pub fn width(&self) -> Time {
        self.time_unit.to_uom(self.bin_width)
    }

    pub fn domain_length(&self) -> Time {
        self.time_unit.to_uom(self.domain)
    }

    pub fn label_unit(&self) -> TimeUnit {
        self.label_unit.unwrap_or(self.time_unit)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.bin_width.is_finite() && self.bin_width > 0.0) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "time bin width must be a positive number, found {}",
                self.bin_width
            )));
        }
        if !(self.domain.is_finite() && self.domain >= self.bin_width) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "time bin domain {} must be at least one bin width ({})",
                self.domain, self.bin_width
            )));
        }
        if self.event_type == EventKind::Unknown {
            return Err(AnalysisError::InvalidConfiguration(String::from(
                "cannot aggregate events of unknown type",
            )));
        }
        Ok(())
    }

    /// enumerates the bins [k·W, (k+1)·W) covering [0, D). when D is not a
    /// multiple of W, the last bin ends at D.
    pub fn build_bins(&self) -> Result<Vec<TimeBin>, AnalysisError> {
        self.validate()?;
        let width = self.width();
        let domain = self.domain_length();
        let count = (self.domain / self.bin_width).ceil() as usize;
        let bins = (0..count)
            .map(|index| {
                let start = width * index as f64;
                let end = width * (index + 1) as f64;
                TimeBin {
                    index,
                    start,
                    end: if end > domain { domain } else { end },
                }
            })
            .collect();
        Ok(bins)
    }
}

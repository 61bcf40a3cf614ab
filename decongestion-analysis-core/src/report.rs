use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// number of warnings written to the log per issue type before
/// further occurrences are only counted.
pub const MAX_LOGGED_WARNINGS: u64 = 10;

/// counts of per-record problems that were recovered from locally while
/// building one scenario's metrics.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RecordIssues {
    /// events or rows that failed to parse and were skipped
    pub skipped_malformed: u64,
    /// events with a type outside of the closed event model
    pub unknown_events: u64,
    /// events outside of the time bin domain that were clamped into it
    pub out_of_domain_clamped: u64,
    /// entities without a counterpart in the reference table
    pub missing_join_keys: u64,
    /// links where the delay formula did not produce a finite number
    pub non_finite_delays: u64,
    /// monetary events with a positive amount, netted against collected tolls
    pub refunds: u64,
}

impl RecordIssues {
    pub fn malformed(&mut self, error: &AnalysisError) {
        count_and_warn(&mut self.skipped_malformed, || {
            format!("skipping record: {error}")
        });
    }

    pub fn unknown_event(&mut self, kind: &str) {
        self.unknown_events += 1;
        if self.unknown_events == 1 {
            log::debug!("ignoring events of unmodeled type, first seen: '{kind}'");
        }
    }

    pub fn clamped(&mut self, error: &AnalysisError) {
        count_and_warn(&mut self.out_of_domain_clamped, || {
            format!("clamping into nearest time bin: {error}")
        });
    }

    pub fn missing_join_key(&mut self, key: &str) {
        count_and_warn(&mut self.missing_join_keys, || {
            let error = AnalysisError::MissingJoinKey {
                key: key.to_string(),
            };
            format!("{error}, reference-derived fields left empty")
        });
    }

    pub fn non_finite_delay(&mut self, key: &str) {
        count_and_warn(&mut self.non_finite_delays, || {
            format!("delay for link '{key}' is not finite (zero speed?), left empty")
        });
    }

    pub fn refund(&mut self, amount: f64) {
        count_and_warn(&mut self.refunds, || {
            format!("monetary event with positive amount {amount} is subtracted from collected tolls")
        });
    }

    /// adds the counts of another set of issues to this one.
    pub fn merge(&mut self, other: &RecordIssues) {
        self.skipped_malformed += other.skipped_malformed;
        self.unknown_events += other.unknown_events;
        self.out_of_domain_clamped += other.out_of_domain_clamped;
        self.missing_join_keys += other.missing_join_keys;
        self.non_finite_delays += other.non_finite_delays;
        self.refunds += other.refunds;
    }

    pub fn is_empty(&self) -> bool {
        self == &RecordIssues::default()
    }
}

fn count_and_warn<F>(counter: &mut u64, message: F)
where
    F: FnOnce() -> String,
{
    *counter += 1;
    if *counter <= MAX_LOGGED_WARNINGS {
        log::warn!("{}", message());
    }
    if *counter == MAX_LOGGED_WARNINGS {
        log::warn!("further warnings of this kind are counted but not logged");
    }
}

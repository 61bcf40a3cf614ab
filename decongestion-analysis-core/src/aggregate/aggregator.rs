use uom::si::f64::Time;

use super::{OutOfDomainPolicy, TimeBin, TimeBinConfig, TimeBinSnapshot, TimeBinValue};
use crate::{
    event::{Event, EventKind},
    report::RecordIssues,
    util::unit::TimeUnit,
    AnalysisError,
};

/// sums the amounts of selected events into fixed-width time bins.
///
/// amounts are negated before they are added: a payment made by an agent
/// (negative amount) is recorded as positive collected revenue. the bins are
/// enumerated once at construction and never change afterwards, so every
/// aggregator built from the same [`TimeBinConfig`] produces the same bins.
///
/// the aggregator is a single writer (`&mut self`); scenarios processed
/// concurrently each own their own instance.
#[derive(Debug)]
pub struct TimeBinAggregator {
    bins: Vec<TimeBin>,
    totals: Vec<f64>,
    width: Time,
    domain: Time,
    label_unit: TimeUnit,
    selector: EventKind,
    policy: OutOfDomainPolicy,
    issues: RecordIssues,
    contributing: u64,
    ignored: u64,
}

impl TimeBinAggregator {
    pub fn new(config: &TimeBinConfig) -> Result<TimeBinAggregator, AnalysisError> {
        let bins = config.build_bins()?;
        let totals = vec![0.0; bins.len()];
        Ok(TimeBinAggregator {
            bins,
            totals,
            width: config.width(),
            domain: config.domain_length(),
            label_unit: config.label_unit(),
            selector: config.event_type,
            policy: config.out_of_domain,
            issues: RecordIssues::default(),
            contributing: 0,
            ignored: 0,
        })
    }

    /// index of the bin containing this time, `floor(t / W)`.
    pub fn bin_index(&self, time: Time) -> Result<usize, AnalysisError> {
        let t = time.get::<uom::si::time::second>();
        let d = self.domain.get::<uom::si::time::second>();
        if !t.is_finite() || t < 0.0 || t >= d {
            return Err(AnalysisError::OutOfDomainTimestamp {
                time_seconds: t,
                domain_seconds: d,
            });
        }
        let w = self.width.get::<uom::si::time::second>();
        let index = (t / w).floor() as usize;
        Ok(index.min(self.bins.len() - 1))
    }

    /// adds one event. events of other kinds, or without an amount, are
    /// ignored.
    pub fn accumulate(&mut self, event: &Event) -> Result<(), AnalysisError> {
        if event.kind() != self.selector {
            self.ignored += 1;
            return Ok(());
        }
        let amount = match event.amount() {
            Some(amount) => amount,
            None => {
                self.ignored += 1;
                return Ok(());
            }
        };
        let index = match self.bin_index(event.time()) {
            Ok(index) => index,
            Err(error) => match self.policy {
                OutOfDomainPolicy::Strict => return Err(error),
                OutOfDomainPolicy::Clamp => {
                    self.issues.clamped(&error);
                    self.clamp_index(event.time())
                }
            },
        };
        if amount > 0.0 {
            self.issues.refund(amount);
        }
        self.totals[index] -= amount;
        self.contributing += 1;
        Ok(())
    }

    pub fn bins(&self) -> &[TimeBin] {
        &self.bins
    }

    pub fn issues(&self) -> &RecordIssues {
        &self.issues
    }

    /// number of events that were added into a bin
    pub fn contributing_events(&self) -> u64 {
        self.contributing
    }

    /// number of events skipped because of their kind or a missing amount
    pub fn ignored_events(&self) -> u64 {
        self.ignored
    }

    /// per-bin totals in bin order
    pub fn snapshot(&self) -> TimeBinSnapshot {
        let bins = self
            .bins
            .iter()
            .zip(self.totals.iter())
            .map(|(bin, value)| TimeBinValue {
                label: bin.label(self.label_unit),
                start: self.label_unit.from_uom(bin.start),
                value: *value,
            })
            .collect();
        TimeBinSnapshot {
            label_unit: self.label_unit,
            bins,
        }
    }

    fn clamp_index(&self, time: Time) -> usize {
        let t = time.get::<uom::si::time::second>();
        if t.is_nan() || t < 0.0 {
            0
        } else {
            self.bins.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(minute: f64, amount: f64) -> Event {
        Event::PersonMoney {
            time: TimeUnit::Minutes.to_uom(minute),
            person: String::from("p"),
            amount,
            purpose: None,
            transaction_partner: None,
        }
    }

    fn seconds(s: f64) -> Time {
        Time::new::<uom::si::time::second>(s)
    }

    #[test]
    fn test_bin_index_is_floor_of_time_over_width() {
        let agg = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        for t in [0.0, 59.0, 3599.999, 3600.0, 7500.0, 86399.0, 201599.0] {
            let expected = (t / 3600.0_f64).floor() as usize;
            assert_eq!(agg.bin_index(seconds(t)).unwrap(), expected, "t = {t}");
        }
    }

    #[test]
    fn test_boundary_belongs_to_next_bin() {
        let agg = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        assert_eq!(agg.bin_index(seconds(7200.0)).unwrap(), 2);
        assert_eq!(agg.bin_index(seconds(7199.0)).unwrap(), 1);
    }

    #[test]
    fn test_collected_toll_lands_in_bin_120() {
        let mut agg = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        agg.accumulate(&money(125.0, -5.0)).unwrap();
        let snapshot = agg.snapshot();
        assert_eq!(snapshot.bins.len(), 56);
        assert_eq!(snapshot.bins[2].label, "120");
        assert_eq!(snapshot.get("120"), Some(5.0));
        assert_eq!(snapshot.get("60"), Some(0.0));
    }

    #[test]
    fn test_sum_of_bins_equals_sum_of_amounts() {
        let mut agg = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        let events = [
            money(0.0, -1.25),
            money(59.9, -2.0),
            money(60.0, -3.5),
            money(600.0, -0.75),
            money(3359.0, -10.0),
            money(600.0, 1.0),
        ];
        for e in events.iter() {
            agg.accumulate(e).unwrap();
        }
        let expected: f64 = events.iter().filter_map(|e| e.amount()).map(|a| -a).sum();
        let snapshot = agg.snapshot();
        assert!((snapshot.total() - expected).abs() < 1e-9);
        assert_eq!(agg.contributing_events(), 6);
        assert_eq!(agg.issues().refunds, 1);
    }

    #[test]
    fn test_order_does_not_change_result() {
        let events = vec![money(1.0, -1.0), money(2.0, -2.0), money(70.0, -4.0)];
        let mut forward = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        let mut backward = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        events.iter().for_each(|e| forward.accumulate(e).unwrap());
        events.iter().rev().for_each(|e| backward.accumulate(e).unwrap());
        assert_eq!(forward.snapshot(), backward.snapshot());
    }

    #[test]
    fn test_other_events_are_ignored() {
        let mut agg = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        let enter = Event::LinkEnter {
            time: seconds(10.0),
            link: String::from("1"),
            vehicle: String::from("v"),
        };
        let unknown = Event::Unknown {
            time: seconds(10.0),
            kind: String::from("actend"),
        };
        agg.accumulate(&enter).unwrap();
        agg.accumulate(&unknown).unwrap();
        assert_eq!(agg.ignored_events(), 2);
        assert_eq!(agg.snapshot().total(), 0.0);
    }

    #[test]
    fn test_upper_boundary_is_out_of_domain() {
        let mut agg = TimeBinAggregator::new(&TimeBinConfig::default()).unwrap();
        let result = agg.accumulate(&money(3360.0, -1.0));
        assert!(matches!(
            result,
            Err(AnalysisError::OutOfDomainTimestamp { .. })
        ));
        assert_eq!(agg.snapshot().total(), 0.0);
    }

    #[test]
    fn test_clamp_policy() {
        let config = TimeBinConfig {
            out_of_domain: OutOfDomainPolicy::Clamp,
            ..Default::default()
        };
        let mut agg = TimeBinAggregator::new(&config).unwrap();
        agg.accumulate(&money(4000.0, -1.0)).unwrap();
        agg.accumulate(&money(-5.0, -2.0)).unwrap();
        let snapshot = agg.snapshot();
        assert_eq!(snapshot.get("3300"), Some(1.0));
        assert_eq!(snapshot.get("0"), Some(2.0));
        assert_eq!(agg.issues().out_of_domain_clamped, 2);
        assert_eq!(snapshot.bins.len(), 56);
    }
}

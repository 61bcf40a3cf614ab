use crate::{
    aggregate::{TimeBinAggregator, TimeBinSnapshot},
    event::Event,
    table::MetricTable,
    AnalysisError,
};

pub const TOLL_COLUMN: &str = "collected_toll";

/// feeds a stream of events into the aggregator. the first error, from the
/// stream or from an out-of-domain timestamp in strict mode, stops the pass.
pub fn aggregate_events<I>(events: I, aggregator: &mut TimeBinAggregator) -> Result<(), AnalysisError>
where
    I: IntoIterator<Item = Result<Event, AnalysisError>>,
{
    for event in events {
        aggregator.accumulate(&event?)?;
    }
    log::debug!(
        "aggregated {} events, ignored {}",
        aggregator.contributing_events(),
        aggregator.ignored_events()
    );
    Ok(())
}

/// collected tolls per time bin, keyed by the bin label
pub fn tolls_table(scenario: &str, snapshot: &TimeBinSnapshot) -> Result<MetricTable, AnalysisError> {
    snapshot.to_metric_table(scenario, TOLL_COLUMN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::{OutOfDomainPolicy, TimeBinConfig},
        event::EventReader,
        table::ComparisonTable,
    };
    use std::io::Cursor;

    fn collect(scenario: &str, xml: &str) -> MetricTable {
        let config = TimeBinConfig::default();
        let mut aggregator = TimeBinAggregator::new(&config).unwrap();
        let reader = EventReader::new(Cursor::new(xml.as_bytes()), scenario, false);
        aggregate_events(reader, &mut aggregator).unwrap();
        tolls_table(scenario, &aggregator.snapshot()).unwrap()
    }

    #[test]
    fn test_toll_collected_in_one_scenario_only() {
        let decongestion = collect(
            "decongestion",
            r#"<events><event time="7500.0" type="personMoney" person="p1" amount="-5.0" purpose="toll"/></events>"#,
        );
        let roadpricing = collect("roadpricing", "<events></events>");
        let joined = ComparisonTable::new("minute")
            .join(&decongestion)
            .unwrap()
            .join(&roadpricing)
            .unwrap();
        assert_eq!(joined.len(), 56);
        assert_eq!(joined.value("120", "decongestion", TOLL_COLUMN), Some(5.0));
        assert_eq!(joined.value("120", "roadpricing", TOLL_COLUMN), Some(0.0));
        assert_eq!(joined.sum("decongestion", TOLL_COLUMN), Some(5.0));
    }

    #[test]
    fn test_out_of_domain_stops_strict_pass() {
        let config = TimeBinConfig::default();
        let mut aggregator = TimeBinAggregator::new(&config).unwrap();
        let xml = r#"<events><event time="201600.0" type="personMoney" person="p1" amount="-1.0"/></events>"#;
        let reader = EventReader::new(Cursor::new(xml.as_bytes()), "late", false);
        let result = aggregate_events(reader, &mut aggregator);
        assert!(matches!(
            result,
            Err(AnalysisError::OutOfDomainTimestamp { .. })
        ));
    }

    const NEGATIVE_TOLL: &str =
        r#"<events><event time="-60.0" type="personMoney" person="p1" amount="-5.0"/></events>"#;

    #[test]
    fn test_negative_time_fails_strict_pass() {
        let config = TimeBinConfig::default();
        let mut aggregator = TimeBinAggregator::new(&config).unwrap();
        let reader = EventReader::new(Cursor::new(NEGATIVE_TOLL.as_bytes()), "early", false);
        let result = aggregate_events(reader, &mut aggregator);
        assert!(matches!(
            result,
            Err(AnalysisError::OutOfDomainTimestamp { .. })
        ));
    }

    #[test]
    fn test_negative_time_clamped_into_first_bin() {
        let config = TimeBinConfig {
            out_of_domain: OutOfDomainPolicy::Clamp,
            ..Default::default()
        };
        let mut aggregator = TimeBinAggregator::new(&config).unwrap();
        let reader = EventReader::new(Cursor::new(NEGATIVE_TOLL.as_bytes()), "early", false);
        aggregate_events(reader, &mut aggregator).unwrap();
        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.get("0"), Some(5.0));
        assert_eq!(aggregator.issues().out_of_domain_clamped, 1);
    }
}

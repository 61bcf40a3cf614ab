use uom::si::{
    f64::{Length, Time, Velocity},
    length::kilometer,
    time::hour,
    velocity::meter_per_second,
};

use super::{LinkTrafficRecord, LINK_KEY_COLUMN};
use crate::{reference::LinkReference, report::RecordIssues, table::MetricTable, AnalysisError};

pub const TOTAL_DELAY_COLUMN: &str = "total_delay";

pub const DELAY_COLUMNS: [&str; 7] = [
    "avg_speed",
    "congestion_index",
    "speed_performance_index",
    "simulated_traffic_volume",
    "vol_freight",
    "vol_car",
    TOTAL_DELAY_COLUMN,
];

/// total delay of all vehicles on a link in vehicle-hours:
/// `(L / v_free - L / v_observed) * volume`.
///
/// returns None when the result is not a finite number, for example when
/// the observed speed is zero.
pub fn link_total_delay(
    lane_length: Length,
    freespeed: Velocity,
    observed_speed: Velocity,
    volume: f64,
) -> Option<f64> {
    let free_flow_time: Time = lane_length / freespeed;
    let observed_time: Time = lane_length / observed_speed;
    let delay: Time = (free_flow_time - observed_time) * volume;
    Some(delay.get::<hour>()).filter(|d| d.is_finite())
}

/// per-link traffic attributes of one scenario with the total delay added.
///
/// free-flow speed always comes from the reference. the lane length comes
/// from the traffic record when present, otherwise from the reference link's
/// length times its lanes. links the reference does not know keep their row
/// with an empty delay.
pub fn delay_table(
    scenario: &str,
    records: &[LinkTrafficRecord],
    reference: &LinkReference,
    issues: &mut RecordIssues,
) -> Result<MetricTable, AnalysisError> {
    let mut table = MetricTable::new(scenario, LINK_KEY_COLUMN, DELAY_COLUMNS);
    for record in records.iter() {
        let total_delay = match reference.get(&record.link_id) {
            None => {
                issues.missing_join_key(&record.link_id);
                None
            }
            Some(link) => match (record.avg_speed, record.simulated_traffic_volume) {
                (Some(avg_speed), Some(volume)) => {
                    let lane_length = record
                        .lane_km
                        .map(Length::new::<kilometer>)
                        .unwrap_or_else(|| link.lane_length());
                    let observed = Velocity::new::<meter_per_second>(avg_speed);
                    let delay = link_total_delay(lane_length, link.freespeed, observed, volume);
                    if delay.is_none() {
                        issues.non_finite_delay(&record.link_id);
                    }
                    delay
                }
                _ => None,
            },
        };
        table.insert(
            &record.link_id,
            vec![
                record.avg_speed,
                record.congestion_index,
                record.speed_performance_index,
                record.simulated_traffic_volume,
                record.vol_freight,
                record.vol_car,
                total_delay,
            ],
        )?;
    }
    Ok(table)
}

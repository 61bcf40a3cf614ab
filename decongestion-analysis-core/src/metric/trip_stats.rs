use std::{fmt::Display, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    report::RecordIssues,
    table::MetricTable,
    util::fs::{self, header_lookup, parse_cell, require_column},
    AnalysisError,
};

pub const MODE_KEY_COLUMN: &str = "mode";
const INFO_COLUMN: &str = "Info";
pub const TRIP_STAT_COLUMN: &str = "value";

/// a row of the population trip statistics table
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TripStatistic {
    TotalTimeTraveled,
    AvgDistancePerTrip,
    AvgSpeed,
}

impl TripStatistic {
    pub const ALL: [TripStatistic; 3] = [
        TripStatistic::TotalTimeTraveled,
        TripStatistic::AvgDistancePerTrip,
        TripStatistic::AvgSpeed,
    ];

    /// value of the `Info` column identifying this statistic
    pub fn label(&self) -> &'static str {
        match self {
            TripStatistic::TotalTimeTraveled => "Total time traveled [h]",
            TripStatistic::AvgDistancePerTrip => "Avg. distance per trip [km]",
            TripStatistic::AvgSpeed => "Avg. speed [km/h]",
        }
    }

    /// file name stem of the comparison written for this statistic
    pub fn output_name(&self) -> &'static str {
        match self {
            TripStatistic::TotalTimeTraveled => "trips_duration",
            TripStatistic::AvgDistancePerTrip => "trips_avg_dist",
            TripStatistic::AvgSpeed => "trips_avg_speed",
        }
    }
}

impl Display for TripStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub fn load_trip_stats(
    path: &Path,
    scenario: &str,
    statistic: TripStatistic,
    modes: &[String],
    issues: &mut RecordIssues,
) -> Result<MetricTable, AnalysisError> {
    let reader = fs::open_buffered(path)?;
    read_trip_stats(
        reader,
        &path.to_string_lossy(),
        scenario,
        statistic,
        modes,
        issues,
    )
}

/// selects the row of `statistic` and melts the requested mode columns into
/// one row per mode, keyed by `mode`. unreadable rows are skipped and counted;
/// if the statistic is then not found, the last of them is returned.
pub fn read_trip_stats<R: Read>(
    reader: R,
    source_name: &str,
    scenario: &str,
    statistic: TripStatistic,
    modes: &[String],
    issues: &mut RecordIssues,
) -> Result<MetricTable, AnalysisError> {
    let mut csv_reader = fs::csv_reader(reader, b',');
    let lookup = header_lookup(&mut csv_reader, source_name)?;
    let info_idx = require_column(&lookup, INFO_COLUMN, source_name)?;
    let mode_columns = modes
        .iter()
        .map(|mode| require_column(&lookup, mode, source_name).map(|idx| (mode, idx)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut skipped = None;
    for record in csv_reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let error = AnalysisError::MalformedRecord {
                    source_name: source_name.to_string(),
                    position: e.position().map(|p| p.line()).unwrap_or_default(),
                    message: e.to_string(),
                };
                issues.malformed(&error);
                skipped = Some(error);
                continue;
            }
        };
        if record.get(info_idx).map(str::trim) != Some(statistic.label()) {
            continue;
        }
        let mut table = MetricTable::new(scenario, MODE_KEY_COLUMN, [TRIP_STAT_COLUMN]);
        for (mode, idx) in mode_columns.iter() {
            let value = parse_cell(&record, *idx).map_err(|message| {
                AnalysisError::MalformedRecord {
                    source_name: source_name.to_string(),
                    position: fs::record_line(&record),
                    message: format!("'{statistic}' for mode '{mode}': {message}"),
                }
            })?;
            table.insert(mode, vec![value])?;
        }
        return Ok(table);
    }

    // the statistic may have been on an unreadable row
    Err(skipped.unwrap_or_else(|| AnalysisError::MissingEntry {
        source_name: source_name.to_string(),
        entry: statistic.label().to_string(),
    }))
}

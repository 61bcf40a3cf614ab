use std::{io::Read, path::Path};

use itertools::Itertools;

use crate::{
    report::RecordIssues,
    table::MetricTable,
    util::fs::{self, header_lookup, parse_cell, require_column},
    AnalysisError,
};

pub const EMISSIONS_KEY_COLUMN: &str = "linkId";
pub const POLLUTANT_KEY_COLUMN: &str = "pollutant";
pub const TOTAL_EMISSIONS_COLUMN: &str = "amount";

pub fn load_link_emissions(
    path: &Path,
    scenario: &str,
    issues: &mut RecordIssues,
) -> Result<MetricTable, AnalysisError> {
    let reader = fs::open_buffered(path)?;
    read_link_emissions(reader, &path.to_string_lossy(), scenario, issues)
}

/// reads a `;`-separated per-link emissions table: a `linkId` column followed
/// by one column per pollutant. rows with unreadable values are skipped.
pub fn read_link_emissions<R: Read>(
    reader: R,
    source_name: &str,
    scenario: &str,
    issues: &mut RecordIssues,
) -> Result<MetricTable, AnalysisError> {
    let mut csv_reader = fs::csv_reader(reader, b';');
    let lookup = header_lookup(&mut csv_reader, source_name)?;
    let key_idx = require_column(&lookup, EMISSIONS_KEY_COLUMN, source_name)?;
    let pollutants = lookup
        .iter()
        .filter(|(_, idx)| **idx != key_idx)
        .map(|(name, idx)| (name.clone(), *idx))
        .sorted_by_key(|(_, idx)| *idx)
        .collect::<Vec<_>>();

    let mut table = MetricTable::new(
        scenario,
        EMISSIONS_KEY_COLUMN,
        pollutants.iter().map(|(name, _)| name.clone()),
    );
    for record in csv_reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                issues.malformed(&AnalysisError::MalformedRecord {
                    source_name: source_name.to_string(),
                    position: e.position().map(|p| p.line()).unwrap_or_default(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        let key = record.get(key_idx).map(str::trim).unwrap_or_default();
        let values = pollutants
            .iter()
            .map(|(name, idx)| {
                parse_cell(&record, *idx).map_err(|m| format!("pollutant '{name}': {m}"))
            })
            .collect::<Result<Vec<_>, _>>();
        match values {
            Ok(values) if !key.is_empty() => table.insert(key, values)?,
            Ok(_) => issues.malformed(&AnalysisError::MalformedRecord {
                source_name: source_name.to_string(),
                position: fs::record_line(&record),
                message: String::from("row has no link id"),
            }),
            Err(message) => issues.malformed(&AnalysisError::MalformedRecord {
                source_name: source_name.to_string(),
                position: fs::record_line(&record),
                message,
            }),
        }
    }
    Ok(table)
}

/// sums each pollutant over the links of a scenario, optionally over the
/// first `link_limit` links only. one row per pollutant.
pub fn total_emissions(
    link_emissions: &MetricTable,
    link_limit: Option<usize>,
) -> Result<MetricTable, AnalysisError> {
    let links = match link_limit {
        Some(limit) => link_emissions.head(limit),
        None => link_emissions.clone(),
    };
    let mut totals = MetricTable::new(
        links.scenario(),
        POLLUTANT_KEY_COLUMN,
        [TOTAL_EMISSIONS_COLUMN],
    );
    for pollutant in links.columns().iter() {
        totals.insert(pollutant, vec![links.sum(pollutant)])?;
    }
    Ok(totals)
}

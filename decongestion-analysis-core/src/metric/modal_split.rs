use std::{io::Read, path::Path};

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use super::MODE_KEY_COLUMN;
use crate::{
    report::RecordIssues,
    table::MetricTable,
    util::fs::{self, header_lookup, parse_cell, require_column},
    AnalysisError,
};

pub const SHARE_COLUMN: &str = "share";
const ITERATION_COLUMN: &str = "Iteration";

/// mode shares of the last iteration of a scenario run
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ModalSplit {
    pub scenario: String,
    pub iteration: u64,
    pub shares: IndexMap<String, Option<f64>>,
}

impl ModalSplit {
    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.shares.keys().map(String::as_str)
    }

    pub fn share(&self, mode: &str) -> Option<f64> {
        self.shares.get(mode).copied().flatten()
    }

    /// one row per mode, keyed by `mode`
    pub fn to_metric_table(&self) -> Result<MetricTable, AnalysisError> {
        let mut table = MetricTable::new(&self.scenario, MODE_KEY_COLUMN, [SHARE_COLUMN]);
        for (mode, share) in self.shares.iter() {
            table.insert(mode, vec![*share])?;
        }
        Ok(table)
    }
}

pub fn load_modal_split(
    path: &Path,
    scenario: &str,
    issues: &mut RecordIssues,
) -> Result<ModalSplit, AnalysisError> {
    let reader = fs::open_buffered(path)?;
    read_modal_split(reader, &path.to_string_lossy(), scenario, issues)
}

/// reads a tab-separated `modestats.txt` and keeps the last iteration.
/// unreadable rows before it are skipped and counted; an unreadable last row
/// is an error.
pub fn read_modal_split<R: Read>(
    reader: R,
    source_name: &str,
    scenario: &str,
    issues: &mut RecordIssues,
) -> Result<ModalSplit, AnalysisError> {
    let mut csv_reader = fs::csv_reader(reader, b'\t');
    let lookup = header_lookup(&mut csv_reader, source_name)?;
    let iteration_idx = require_column(&lookup, ITERATION_COLUMN, source_name)?;
    let mode_columns = lookup
        .iter()
        .filter(|(name, _)| name.as_str() != ITERATION_COLUMN)
        .map(|(name, idx)| (name.clone(), *idx))
        .sorted_by_key(|(_, idx)| *idx)
        .collect::<Vec<_>>();

    let mut last = None;
    let mut pending: Option<AnalysisError> = None;
    for record in csv_reader.records() {
        match record {
            Ok(record) => {
                if let Some(error) = pending.take() {
                    issues.malformed(&error);
                }
                last = Some(record);
            }
            Err(e) => {
                let error = AnalysisError::MalformedRecord {
                    source_name: source_name.to_string(),
                    position: e.position().map(|p| p.line()).unwrap_or_default(),
                    message: e.to_string(),
                };
                if let Some(previous) = pending.replace(error) {
                    issues.malformed(&previous);
                }
            }
        }
    }
    if let Some(error) = pending {
        return Err(error);
    }
    let record = last.ok_or_else(|| AnalysisError::MissingEntry {
        source_name: source_name.to_string(),
        entry: String::from("any iteration"),
    })?;

    let malformed = |message: String| AnalysisError::MalformedRecord {
        source_name: source_name.to_string(),
        position: fs::record_line(&record),
        message,
    };
    let iteration = record
        .get(iteration_idx)
        .map(str::trim)
        .unwrap_or_default()
        .parse::<u64>()
        .map_err(|e| malformed(format!("invalid iteration: {e}")))?;
    let shares = mode_columns
        .into_iter()
        .map(|(mode, idx)| {
            parse_cell(&record, idx)
                .map(|share| (mode.clone(), share))
                .map_err(|m| malformed(format!("share of '{mode}': {m}")))
        })
        .collect::<Result<IndexMap<_, _>, _>>()?;

    log::debug!("{scenario}: modal split of iteration {iteration} read from {source_name}");
    Ok(ModalSplit {
        scenario: scenario.to_string(),
        iteration,
        shares,
    })
}

//! one module per metric family. each operation builds every scenario's
//! metrics, joins them and writes its comparison outputs.
pub mod delays;
pub mod emissions;
pub mod modal_split;
pub mod tolls;
pub mod traffic_volume;
pub mod trips;

use decongestion_analysis_core::table::{ComparisonTable, MetricTable};
use itertools::Itertools;

use crate::app::{AppError, ScenarioRun};

/// joins successful runs on `key_column`, recording failed ones as missing.
/// fails only when no scenario could be built at all.
fn join_runs(
    key_column: &str,
    runs: Vec<ScenarioRun<MetricTable>>,
    operation: &str,
) -> Result<ComparisonTable, AppError> {
    let comparison =
        ComparisonTable::join_all(key_column, runs.into_iter().map(ScenarioRun::into_outcome));
    if comparison.scenarios().next().is_none() {
        let reasons = comparison
            .missing_scenarios()
            .iter()
            .map(|m| &m.reason)
            .join("; ");
        return Err(AppError::OperationsFailed(format!(
            "{operation}: no scenario could be built: {reasons}"
        )));
    }
    Ok(comparison)
}

/// column name of a per-scenario value, e.g. `simulated_traffic_volume_dc`
fn suffixed(column: &str, suffix: &str) -> String {
    format!("{column}_{suffix}")
}

use std::path::PathBuf;

use decongestion_analysis_core::{
    table::{ComparisonTable, MissingScenario},
    RecordIssues,
};
use indexmap::IndexMap;
use serde::Serialize;

use crate::app::ScenarioRun;

/// summarizes one invocation of the analysis, written as `run_summary.json`.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    /// date and time the run finished
    pub created: String,
    pub command: String,
    pub configuration_file: String,
    pub basecase: String,
    pub scenarios: Vec<String>,
    pub operations: Vec<OperationReport>,
    /// operations that could not produce their outputs
    pub failed_operations: IndexMap<String, String>,
}

/// what one operation wrote and how each scenario fared
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "snake_case")]
pub struct OperationReport {
    pub operation: String,
    pub outputs: Vec<PathBuf>,
    pub scenarios: IndexMap<String, ScenarioReport>,
    pub missing_scenarios: Vec<MissingScenario>,
}

#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioReport {
    pub succeeded: bool,
    pub errors: Vec<String>,
    pub issues: RecordIssues,
}

impl RunSummary {
    pub fn new(command: &str, configuration_file: &str, basecase: &str, scenarios: &[String]) -> Self {
        RunSummary {
            created: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
            configuration_file: configuration_file.to_string(),
            basecase: basecase.to_string(),
            scenarios: scenarios.to_vec(),
            operations: vec![],
            failed_operations: IndexMap::new(),
        }
    }
}

impl OperationReport {
    pub fn new(operation: &str) -> Self {
        OperationReport {
            operation: operation.to_string(),
            outputs: vec![],
            scenarios: IndexMap::new(),
            missing_scenarios: vec![],
        }
    }

    /// adds the outcome of a batch of scenario runs. a scenario run more
    /// than once by the same operation accumulates its issues and errors.
    pub fn record_runs<T>(&mut self, runs: &[ScenarioRun<T>]) {
        for run in runs.iter() {
            let first = !self.scenarios.contains_key(&run.scenario);
            let report = self.scenarios.entry(run.scenario.clone()).or_default();
            report.succeeded = (first || report.succeeded) && run.result.is_ok();
            if let Err(e) = &run.result {
                report.errors.push(e.to_string());
            }
            report.issues.merge(&run.issues);
        }
    }

    pub fn record_missing(&mut self, comparison: &ComparisonTable) {
        for missing in comparison.missing_scenarios().iter() {
            if !self.missing_scenarios.contains(missing) {
                self.missing_scenarios.push(missing.clone());
            }
        }
    }

    pub fn record_output(&mut self, written: Option<PathBuf>) {
        if let Some(path) = written {
            log::info!("wrote {}", path.to_string_lossy());
            self.outputs.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decongestion_analysis_core::AnalysisError;

    #[test]
    fn test_repeated_runs_accumulate() {
        let mut report = OperationReport::new("trips");
        let ok = vec![ScenarioRun {
            scenario: String::from("basecase"),
            result: Ok(()),
            issues: RecordIssues {
                skipped_malformed: 1,
                ..Default::default()
            },
        }];
        let failed = vec![ScenarioRun::<()> {
            scenario: String::from("basecase"),
            result: Err(AnalysisError::InternalError(String::from("boom"))),
            issues: RecordIssues {
                skipped_malformed: 2,
                ..Default::default()
            },
        }];
        report.record_runs(&ok);
        assert!(report.scenarios["basecase"].succeeded);
        report.record_runs(&failed);
        report.record_runs(&ok);
        let basecase = &report.scenarios["basecase"];
        assert!(!basecase.succeeded);
        assert_eq!(basecase.errors, vec!["boom"]);
        assert_eq!(basecase.issues.skipped_malformed, 4);
    }
}

use decongestion_analysis_core::{config::ScenarioConfig, AnalysisError, RecordIssues};
use rayon::prelude::*;

/// the outcome of building one scenario's metrics
#[derive(Debug)]
pub struct ScenarioRun<T> {
    pub scenario: String,
    pub result: Result<T, AnalysisError>,
    pub issues: RecordIssues,
}

impl<T> ScenarioRun<T> {
    /// the scenario name paired with its result, as consumed by
    /// [`decongestion_analysis_core::table::ComparisonTable::join_all`]
    pub fn into_outcome(self) -> (String, Result<T, AnalysisError>) {
        (self.scenario, self.result)
    }

    pub fn map<U, F>(self, op: F) -> ScenarioRun<U>
    where
        F: FnOnce(T) -> Result<U, AnalysisError>,
    {
        let scenario = self.scenario;
        let result = self
            .result
            .and_then(op)
            .map_err(|e| e.in_scenario(&scenario));
        ScenarioRun {
            scenario,
            result,
            issues: self.issues,
        }
    }
}

/// runs `op` for every scenario in parallel. each scenario owns its inputs
/// and its issue counters; results come back in configured order. a failing
/// scenario does not stop the others.
pub fn run_scenarios<T, F>(scenarios: &[ScenarioConfig], op: F) -> Vec<ScenarioRun<T>>
where
    T: Send,
    F: Fn(usize, &ScenarioConfig, &mut RecordIssues) -> Result<T, AnalysisError> + Sync,
{
    scenarios
        .par_iter()
        .enumerate()
        .map(|(position, scenario)| {
            let mut issues = RecordIssues::default();
            let result = op(position, scenario, &mut issues).map_err(|e| e.in_scenario(&scenario.name));
            match &result {
                Ok(_) if issues.is_empty() => log::info!("{}: done", scenario.name),
                Ok(_) => log::warn!("{}: done with recovered issues {:?}", scenario.name, issues),
                Err(e) => log::error!("{e}"),
            }
            ScenarioRun {
                scenario: scenario.name.clone(),
                result,
                issues,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(name: &str) -> ScenarioConfig {
        ScenarioConfig {
            name: name.to_string(),
            suffix: None,
            root: String::from("."),
            run_id: None,
            files: None,
        }
    }

    #[test]
    fn test_failure_is_isolated_and_order_kept() {
        let scenarios = vec![scenario("basecase"), scenario("decongestion"), scenario("roadpricing")];
        let runs = run_scenarios(&scenarios, |position, s, issues| {
            if s.name == "decongestion" {
                issues.refund(1.0);
                Err(AnalysisError::InternalError(String::from("boom")))
            } else {
                Ok(position)
            }
        });
        let names = runs.iter().map(|r| r.scenario.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["basecase", "decongestion", "roadpricing"]);
        assert_eq!(runs[2].result.as_ref().ok(), Some(&2));
        assert!(matches!(
            runs[1].result,
            Err(AnalysisError::Scenario { .. })
        ));
        assert_eq!(runs[1].issues.refunds, 1);
    }
}

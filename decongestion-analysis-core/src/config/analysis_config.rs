use std::{collections::HashSet, path::PathBuf};

use serde::{Deserialize, Serialize};

use super::{EmissionsConfig, EventSourceConfig, FileTemplates, OutputConfig, ScenarioConfig, TripStatsConfig};
use crate::{aggregate::TimeBinConfig, AnalysisError};

/// configuration of a multi-scenario comparison run.
///
/// the first configured scenario decides the row order of every comparison
/// table; the basecase is the denominator of every relative metric.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
    /// MATSim network file or CSV link table shared by all scenarios
    pub network_file: PathBuf,
    #[serde(default = "default_basecase")]
    pub basecase: String,
    pub scenarios: Vec<ScenarioConfig>,
    #[serde(default)]
    pub files: FileTemplates,
    #[serde(default)]
    pub events: EventSourceConfig,
    #[serde(default)]
    pub tolls: TimeBinConfig,
    #[serde(default)]
    pub trips: TripStatsConfig,
    #[serde(default)]
    pub emissions: EmissionsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

fn default_basecase() -> String {
    String::from("basecase")
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.scenarios.is_empty() {
            return Err(AnalysisError::InvalidConfiguration(String::from(
                "at least one scenario must be configured",
            )));
        }
        let mut names = HashSet::new();
        let mut suffixes = HashSet::new();
        for scenario in self.scenarios.iter() {
            if scenario.name.trim().is_empty() {
                return Err(AnalysisError::InvalidConfiguration(String::from(
                    "scenario names cannot be empty",
                )));
            }
            if !names.insert(scenario.name.as_str()) {
                return Err(AnalysisError::InvalidConfiguration(format!(
                    "scenario '{}' is configured more than once",
                    scenario.name
                )));
            }
            if !suffixes.insert(scenario.suffix()) {
                return Err(AnalysisError::InvalidConfiguration(format!(
                    "suffix '{}' of scenario '{}' is already used by another scenario",
                    scenario.suffix(),
                    scenario.name
                )));
            }
        }
        if !names.contains(self.basecase.as_str()) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "basecase '{}' is not one of the configured scenarios [{}]",
                self.basecase,
                self.scenario_names().join(", ")
            )));
        }
        if self.emissions.link_limit == Some(0) {
            return Err(AnalysisError::InvalidConfiguration(String::from(
                "emissions link_limit must be positive",
            )));
        }
        if self.trips.modes.is_empty() {
            return Err(AnalysisError::InvalidConfiguration(String::from(
                "at least one trip mode must be configured",
            )));
        }
        self.tolls.validate()
    }

    pub fn scenario(&self, name: &str) -> Result<&ScenarioConfig, AnalysisError> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AnalysisError::UnknownScenario(name.to_string()))
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn basecase_config(&self) -> Result<&ScenarioConfig, AnalysisError> {
        self.scenario(&self.basecase)
    }

    /// keeps only the named scenarios, preserving configured order. the
    /// basecase is always kept since every comparison is relative to it.
    pub fn retain_scenarios(&mut self, names: &[String]) -> Result<(), AnalysisError> {
        for name in names.iter() {
            self.scenario(name)?;
        }
        let basecase = self.basecase.clone();
        self.scenarios
            .retain(|s| s.name == basecase || names.contains(&s.name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(name: &str, suffix: &str) -> ScenarioConfig {
        ScenarioConfig {
            name: name.to_string(),
            suffix: Some(suffix.to_string()),
            root: format!("/runs/{name}"),
            run_id: None,
            files: None,
        }
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            output_directory: default_output_directory(),
            network_file: PathBuf::from("network.xml.gz"),
            basecase: default_basecase(),
            scenarios: vec![
                scenario("basecase", "bc"),
                scenario("decongestion", "dc"),
                scenario("roadpricing", "rp"),
            ],
            files: FileTemplates::default(),
            events: EventSourceConfig::default(),
            tolls: TimeBinConfig::default(),
            trips: TripStatsConfig::default(),
            emissions: EmissionsConfig::default(),
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_unknown_basecase() {
        let mut c = config();
        c.basecase = String::from("withVehicleTypes");
        assert!(matches!(
            c.validate(),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_duplicate_suffix() {
        let mut c = config();
        c.scenarios.push(scenario("other", "dc"));
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_duplicate_name() {
        let mut c = config();
        c.scenarios.push(scenario("basecase", "bc2"));
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_invalid_bins() {
        let mut c = config();
        c.tolls.bin_width = 0.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_retain_keeps_basecase() {
        let mut c = config();
        c.retain_scenarios(&[String::from("roadpricing")]).unwrap();
        assert_eq!(c.scenario_names(), vec!["basecase", "roadpricing"]);
        assert!(c.retain_scenarios(&[String::from("nope")]).is_err());
    }
}

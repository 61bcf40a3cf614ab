use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{FileTemplates, InputFile};

/// where one scenario's simulation outputs live and how it is named in
/// the comparison outputs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    /// scenario name, used as column header in comparison tables
    pub name: String,
    /// short suffix appended to per-scenario column names, e.g. `bc`.
    /// defaults to the name.
    #[serde(default)]
    pub suffix: Option<String>,
    /// simulation output directory
    pub root: String,
    /// MATSim run id prefixing output file names. defaults to the name.
    #[serde(default)]
    pub run_id: Option<String>,
    /// per-scenario overrides of the shared file templates
    #[serde(default)]
    pub files: Option<FileTemplates>,
}

impl ScenarioConfig {
    pub fn suffix(&self) -> &str {
        self.suffix.as_deref().unwrap_or(&self.name)
    }

    pub fn run_id(&self) -> &str {
        self.run_id.as_deref().unwrap_or(&self.name)
    }

    /// the path of an input file of this scenario. scenario templates take
    /// precedence over the shared templates, which take precedence over
    /// the defaults.
    pub fn resolve(&self, file: InputFile, shared: &FileTemplates) -> PathBuf {
        let template = self
            .files
            .as_ref()
            .and_then(|f| f.get(file))
            .or_else(|| shared.get(file))
            .unwrap_or_else(|| file.default_template());
        let root = self.root.trim_end_matches(|c: char| c == '/' || c == '\\');
        let path = template
            .replace("{root}", root)
            .replace("{run_id}", self.run_id())
            .replace("{name}", &self.name);
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioConfig {
        ScenarioConfig {
            name: String::from("decongestion"),
            suffix: Some(String::from("dc")),
            root: String::from("/runs/berlin-v6.0-1pct/"),
            run_id: Some(String::from("withDecongestion")),
            files: None,
        }
    }

    #[test]
    fn test_resolve_default_templates() {
        let s = scenario();
        let shared = FileTemplates::default();
        assert_eq!(
            s.resolve(InputFile::Events, &shared),
            PathBuf::from("/runs/berlin-v6.0-1pct/withDecongestion.output_events.xml.gz")
        );
        assert_eq!(
            s.resolve(InputFile::Emissions, &shared),
            PathBuf::from(
                "/runs/berlin-v6.0-1pct/analysis/emissions/withDecongestion.emissionsPerLink.csv"
            )
        );
    }

    #[test]
    fn test_scenario_template_wins() {
        let mut s = scenario();
        let shared = FileTemplates {
            events: Some(String::from("{root}/shared/{name}.xml")),
            ..Default::default()
        };
        assert_eq!(
            s.resolve(InputFile::Events, &shared),
            PathBuf::from("/runs/berlin-v6.0-1pct/shared/decongestion.xml")
        );
        s.files = Some(FileTemplates {
            events: Some(String::from("{root}/own.xml")),
            ..Default::default()
        });
        assert_eq!(
            s.resolve(InputFile::Events, &shared),
            PathBuf::from("/runs/berlin-v6.0-1pct/own.xml")
        );
    }

    #[test]
    fn test_suffix_and_run_id_default_to_name() {
        let s = ScenarioConfig {
            name: String::from("basecase"),
            suffix: None,
            root: String::from("out"),
            run_id: None,
            files: None,
        };
        assert_eq!(s.suffix(), "basecase");
        assert_eq!(s.run_id(), "basecase");
    }
}

use std::path::PathBuf;

#[derive(thiserror::Error, Clone, Debug)]
pub enum AnalysisError {
    #[error("failure opening '{path}': {message}")]
    SourceUnavailable { path: PathBuf, message: String },
    #[error("malformed record in {source_name} at {position}: {message}")]
    MalformedRecord {
        source_name: String,
        position: u64,
        message: String,
    },
    #[error("{source_name} is unreadable at {position}: {message}")]
    CorruptSource {
        source_name: String,
        position: u64,
        message: String,
    },
    #[error("timestamp {time_seconds}s is outside of the time bin domain [0, {domain_seconds}s)")]
    OutOfDomainTimestamp {
        time_seconds: f64,
        domain_seconds: f64,
    },
    #[error("entity '{key}' has no counterpart in the reference table")]
    MissingJoinKey { key: String },
    #[error("schema mismatch in {context}: expected '{expected}', found '{found}'")]
    SchemaMismatch {
        context: String,
        expected: String,
        found: String,
    },
    #[error("column '{column}' missing from {source_name}")]
    MissingColumn { source_name: String, column: String },
    #[error("'{entry}' not found in {source_name}")]
    MissingEntry { source_name: String, entry: String },
    #[error("duplicate key '{key}' in table for scenario '{scenario}'")]
    DuplicateKey { scenario: String, key: String },
    #[error("scenario '{0}' already joined into comparison table")]
    DuplicateScenario(String),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("failure loading reference table from '{path}': {message}")]
    ReferenceLoad { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("scenario '{scenario}': {source}")]
    Scenario {
        scenario: String,
        #[source]
        source: Box<AnalysisError>,
    },
    #[error("{0}")]
    InternalError(String),
}

impl AnalysisError {
    /// attaches the scenario name to an error raised while building that scenario.
    /// errors that already carry a scenario are returned unchanged.
    pub fn in_scenario(self, scenario: &str) -> AnalysisError {
        match self {
            AnalysisError::Scenario { .. } => self,
            other => AnalysisError::Scenario {
                scenario: scenario.to_string(),
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_keeps_kind_and_scenario() {
        let error = AnalysisError::SourceUnavailable {
            path: PathBuf::from("roadpricing/emissions.csv"),
            message: String::from("no such file"),
        }
        .in_scenario("roadpricing");
        let cloned = error.clone();
        match cloned {
            AnalysisError::Scenario { scenario, source } => {
                assert_eq!(scenario, "roadpricing");
                assert!(matches!(*source, AnalysisError::SourceUnavailable { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(error.to_string(), error.clone().to_string());
    }
}

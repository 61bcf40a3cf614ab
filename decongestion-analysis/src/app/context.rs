use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use config::{Config, File};
use decongestion_analysis_core::{
    config::{AnalysisConfig, InputFile, ScenarioConfig},
    reference::LinkReference,
};

use crate::{app::AppError, util};

/// the validated configuration of a run plus the link reference table,
/// loaded at most once and shared by every operation and scenario.
pub struct AnalysisContext {
    pub config: AnalysisConfig,
    reference: OnceLock<Arc<LinkReference>>,
}

impl AnalysisContext {
    pub fn new(config: AnalysisConfig) -> Result<AnalysisContext, AppError> {
        config.validate()?;
        Ok(AnalysisContext {
            config,
            reference: OnceLock::new(),
        })
    }

    /// reads a TOML configuration file.
    pub fn read_config(configuration_file: &str) -> Result<AnalysisConfig, AppError> {
        let filepath = Path::new(configuration_file);
        let config = Config::builder()
            .add_source(File::from(filepath))
            .build()
            .map_err(|e| {
                let msg = format!("file '{configuration_file}' produced error: {e}");
                AppError::InvalidUserInput(msg)
            })?;
        config.try_deserialize::<AnalysisConfig>().map_err(|e| {
            let msg = format!("error reading analysis configuration in '{configuration_file}': {e}");
            AppError::InvalidUserInput(msg)
        })
    }

    pub fn scenarios(&self) -> &[ScenarioConfig] {
        &self.config.scenarios
    }

    pub fn basecase(&self) -> &str {
        &self.config.basecase
    }

    pub fn input_path(&self, scenario: &ScenarioConfig, file: InputFile) -> PathBuf {
        scenario.resolve(file, &self.config.files)
    }

    pub fn output_directory(&self) -> &Path {
        &self.config.output_directory
    }

    pub fn overwrite(&self) -> bool {
        self.config.output.overwrite
    }

    pub fn prepare_output_directory(&self) -> Result<(), AppError> {
        util::fs::create_dirs(self.output_directory())
    }

    /// the link reference table, read from the configured network file on
    /// first use.
    pub fn reference(&self) -> Result<Arc<LinkReference>, AppError> {
        if let Some(reference) = self.reference.get() {
            return Ok(reference.clone());
        }
        let loaded = LinkReference::from_path(&self.config.network_file)?;
        log::info!(
            "loaded {} reference links from {}",
            loaded.len(),
            self.config.network_file.to_string_lossy()
        );
        Ok(self.reference.get_or_init(|| Arc::new(loaded)).clone())
    }

    /// suffix of a scenario, falling back to its name when it is not configured
    pub fn suffix<'a>(&'a self, scenario: &'a str) -> &'a str {
        self.config
            .scenario(scenario)
            .map(|s| s.suffix())
            .unwrap_or(scenario)
    }
}

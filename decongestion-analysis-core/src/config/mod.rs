mod analysis_config;
mod file_templates;
mod scenario_config;
mod section_config;

pub use analysis_config::AnalysisConfig;
pub use file_templates::{FileTemplates, InputFile};
pub use scenario_config::ScenarioConfig;
pub use section_config::{EmissionsConfig, EventSourceConfig, OutputConfig, TripStatsConfig};

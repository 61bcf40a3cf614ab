mod analysis_app;
mod context;
mod error;
pub mod operation;
mod runner;
mod summary;

pub use analysis_app::{run_operations, AnalysisApp, AnalysisOperation};
pub use context::AnalysisContext;
pub use error::AppError;
pub use runner::{run_scenarios, ScenarioRun};
pub use summary::{OperationReport, RunSummary, ScenarioReport};

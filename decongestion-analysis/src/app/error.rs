use std::path::PathBuf;

use decongestion_analysis_core::AnalysisError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error("Error writing to '{path}': {message}")]
    WriteError { path: PathBuf, message: String },
    #[error("Error writing to csv: {0}")]
    CsvWriteError(String),
    #[error("Operations failed: {0}")]
    OperationsFailed(String),
}

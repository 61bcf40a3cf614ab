pub mod aggregate;
pub mod config;
pub mod error;
pub mod event;
pub mod metric;
pub mod reference;
pub mod report;
pub mod table;
pub mod util;

pub use error::AnalysisError;
pub use report::RecordIssues;

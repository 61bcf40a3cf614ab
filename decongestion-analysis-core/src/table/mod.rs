mod comparison;
mod delta;
mod metric_table;

pub use comparison::{ComparisonTable, MissingScenario};
pub use delta::{Delta, DeltaCell, DeltaTable, UndefinedReason};
pub use metric_table::MetricTable;

use serde::Serialize;

use crate::{table::MetricTable, util::unit::TimeUnit, AnalysisError};

/// value accumulated in one time bin
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TimeBinValue {
    pub label: String,
    /// lower bound of the bin in the label unit
    pub start: f64,
    pub value: f64,
}

/// the per-bin totals of a [`super::TimeBinAggregator`], in bin order.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TimeBinSnapshot {
    pub label_unit: TimeUnit,
    pub bins: Vec<TimeBinValue>,
}

impl TimeBinSnapshot {
    pub fn total(&self) -> f64 {
        self.bins.iter().map(|b| b.value).sum()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.bins.iter().find(|b| b.label == label).map(|b| b.value)
    }

    pub fn values(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.value).collect()
    }

    /// one row per bin keyed by the bin label; the key column is named
    /// after the label unit ("minute", "hour", ...).
    pub fn to_metric_table(&self, scenario: &str, column: &str) -> Result<MetricTable, AnalysisError> {
        let mut table = MetricTable::new(scenario, self.label_unit.label_column(), [column]);
        for bin in self.bins.iter() {
            table.insert(&bin.label, vec![Some(bin.value)])?;
        }
        Ok(table)
    }
}

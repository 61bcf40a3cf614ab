use indexmap::IndexMap;

use crate::AnalysisError;

/// one scenario's metrics, keyed by entity (link id, mode, pollutant or
/// time bin label). rows keep their insertion order and every row holds one
/// optional value per column; `None` is an absent value, never zero.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricTable {
    scenario: String,
    key_column: String,
    columns: Vec<String>,
    rows: IndexMap<String, Vec<Option<f64>>>,
}

impl MetricTable {
    pub fn new<I, S>(scenario: &str, key_column: &str, columns: I) -> MetricTable
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MetricTable {
            scenario: scenario.to_string(),
            key_column: key_column.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: IndexMap::new(),
        }
    }

    /// adds a row. keys must be unique and the row must have one value per column.
    pub fn insert(&mut self, key: &str, values: Vec<Option<f64>>) -> Result<(), AnalysisError> {
        if values.len() != self.columns.len() {
            return Err(AnalysisError::SchemaMismatch {
                context: format!("row '{key}' of scenario '{}'", self.scenario),
                expected: format!("{} values", self.columns.len()),
                found: format!("{} values", values.len()),
            });
        }
        if self.rows.contains_key(key) {
            return Err(AnalysisError::DuplicateKey {
                scenario: self.scenario.clone(),
                key: key.to_string(),
            });
        }
        self.rows.insert(key.to_string(), values);
        Ok(())
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[Option<f64>]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    pub fn value(&self, key: &str, column: &str) -> Option<f64> {
        let index = self.column_index(column)?;
        self.rows.get(key).and_then(|row| row[index])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// sum of the present values of a column over all rows
    pub fn sum(&self, column: &str) -> Option<f64> {
        let index = self.column_index(column)?;
        Some(self.rows.values().filter_map(|row| row[index]).sum())
    }

    /// a copy of this table holding only the first `n` rows
    pub fn head(&self, n: usize) -> MetricTable {
        MetricTable {
            scenario: self.scenario.clone(),
            key_column: self.key_column.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .take(n)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

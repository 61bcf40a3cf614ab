use indexmap::IndexMap;
use serde::Serialize;

use super::MetricTable;
use crate::AnalysisError;

/// a scenario whose metrics could not be built and is therefore absent from
/// a [`ComparisonTable`].
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MissingScenario {
    pub scenario: String,
    pub reason: String,
}

/// outer join of several scenarios' [`MetricTable`]s on a shared key.
///
/// rows follow the first joined scenario's order; keys only found in later
/// scenarios are appended in the order they are first seen. a key missing
/// from a scenario leaves that scenario's values absent for the row.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonTable {
    key_column: String,
    /// joined scenarios with their column names, in join order
    scenarios: IndexMap<String, Vec<String>>,
    /// per key, the values of each scenario by scenario position. rows
    /// may be shorter than the number of scenarios.
    rows: IndexMap<String, Vec<Option<Vec<Option<f64>>>>>,
    missing: Vec<MissingScenario>,
}

impl ComparisonTable {
    /// an empty table that will only accept scenarios keyed by `key_column`
    pub fn new(key_column: &str) -> ComparisonTable {
        ComparisonTable {
            key_column: key_column.to_string(),
            scenarios: IndexMap::new(),
            rows: IndexMap::new(),
            missing: vec![],
        }
    }

    /// joins the outcome of each scenario, in order. failed scenarios and
    /// tables that cannot be joined are recorded as missing instead of
    /// failing the whole comparison.
    pub fn join_all<I>(key_column: &str, outcomes: I) -> ComparisonTable
    where
        I: IntoIterator<Item = (String, Result<MetricTable, AnalysisError>)>,
    {
        let mut result = ComparisonTable::new(key_column);
        for (scenario, outcome) in outcomes {
            result = match outcome {
                Ok(table) => match result.check_joinable(&table) {
                    Ok(()) => result.join_unchecked(&table),
                    Err(e) => result.with_missing(&scenario, &e.to_string()),
                },
                Err(e) => result.with_missing(&scenario, &e.to_string()),
            };
        }
        for missing in result.missing.iter() {
            log::warn!(
                "comparison on '{}' is missing scenario '{}': {}",
                key_column,
                missing.scenario,
                missing.reason
            );
        }
        result
    }

    /// outer-joins one more scenario, returning the combined table.
    pub fn join(self, table: &MetricTable) -> Result<ComparisonTable, AnalysisError> {
        self.check_joinable(table)?;
        Ok(self.join_unchecked(table))
    }

    /// records a scenario that could not contribute to this table.
    pub fn with_missing(mut self, scenario: &str, reason: &str) -> ComparisonTable {
        self.missing.push(MissingScenario {
            scenario: scenario.to_string(),
            reason: reason.to_string(),
        });
        self
    }

    fn check_joinable(&self, table: &MetricTable) -> Result<(), AnalysisError> {
        if table.key_column() != self.key_column {
            return Err(AnalysisError::SchemaMismatch {
                context: format!("join key of scenario '{}'", table.scenario()),
                expected: self.key_column.clone(),
                found: table.key_column().to_string(),
            });
        }
        if self.scenarios.contains_key(table.scenario()) {
            return Err(AnalysisError::DuplicateScenario(table.scenario().to_string()));
        }
        Ok(())
    }

    fn join_unchecked(mut self, table: &MetricTable) -> ComparisonTable {
        let position = self.scenarios.len();
        self.scenarios
            .insert(table.scenario().to_string(), table.columns().to_vec());
        for (key, values) in table.iter() {
            let row = self.rows.entry(key.to_string()).or_default();
            if row.len() <= position {
                row.resize(position + 1, None);
            }
            row[position] = Some(values.to_vec());
        }
        self
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn has_scenario(&self, scenario: &str) -> bool {
        self.scenarios.contains_key(scenario)
    }

    pub fn columns(&self, scenario: &str) -> Option<&[String]> {
        self.scenarios.get(scenario).map(Vec::as_slice)
    }

    pub fn missing_scenarios(&self) -> &[MissingScenario] {
        &self.missing
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// the values a scenario holds for a key, or None when the key does
    /// not exist in that scenario.
    pub fn scenario_values(&self, key: &str, scenario: &str) -> Option<&[Option<f64>]> {
        let position = self.scenarios.get_index_of(scenario)?;
        self.rows
            .get(key)
            .and_then(|row| row.get(position))
            .and_then(|values| values.as_deref())
    }

    pub fn value(&self, key: &str, scenario: &str, column: &str) -> Option<f64> {
        let index = self.scenarios.get(scenario)?.iter().position(|c| c == column)?;
        self.scenario_values(key, scenario)
            .and_then(|values| values[index])
    }

    /// sum of the present values of one scenario's column
    pub fn sum(&self, scenario: &str, column: &str) -> Option<f64> {
        let position = self.scenarios.get_index_of(scenario)?;
        let index = self.scenarios[position].iter().position(|c| c == column)?;
        let total = self
            .rows
            .values()
            .filter_map(|row| row.get(position).and_then(|v| v.as_ref()))
            .filter_map(|values| values[index])
            .sum();
        Some(total)
    }

    /// extracts one scenario back out of the comparison as its own table,
    /// holding exactly the rows and values that scenario contributed.
    pub fn scenario_table(&self, scenario: &str) -> Result<MetricTable, AnalysisError> {
        let columns = self
            .scenarios
            .get(scenario)
            .ok_or_else(|| AnalysisError::UnknownScenario(scenario.to_string()))?;
        let mut table = MetricTable::new(scenario, &self.key_column, columns.iter().cloned());
        for key in self.rows.keys() {
            if let Some(values) = self.scenario_values(key, scenario) {
                table.insert(key, values.to_vec())?;
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn volume_table(scenario: &str, rows: &[(&str, f64)]) -> MetricTable {
        let mut t = MetricTable::new(scenario, "link_id", ["simulated_traffic_volume"]);
        for (k, v) in rows {
            t.insert(k, vec![Some(*v)]).unwrap();
        }
        t
    }

    fn three_scenarios() -> Vec<MetricTable> {
        vec![
            volume_table("basecase", &[("1", 100.0), ("2", 200.0), ("3", 50.0)]),
            volume_table("decongestion", &[("2", 180.0), ("1", 90.0)]),
            volume_table("roadpricing", &[("4", 10.0), ("1", 95.0)]),
        ]
    }

    fn join_in_order(tables: &[&MetricTable]) -> ComparisonTable {
        tables
            .iter()
            .fold(ComparisonTable::new("link_id"), |acc, t| acc.join(t).unwrap())
    }

    #[test]
    fn test_outer_join_keeps_first_order_and_appends() {
        let tables = three_scenarios();
        let joined = join_in_order(&tables.iter().collect_vec());
        assert_eq!(joined.keys().collect_vec(), vec!["1", "2", "3", "4"]);
        assert_eq!(joined.value("4", "roadpricing", "simulated_traffic_volume"), Some(10.0));
        assert_eq!(joined.value("4", "basecase", "simulated_traffic_volume"), None);
        assert_eq!(joined.value("4", "decongestion", "simulated_traffic_volume"), None);
        assert_eq!(joined.value("3", "decongestion", "simulated_traffic_volume"), None);
        assert!(joined.scenario_values("3", "roadpricing").is_none());
    }

    #[test]
    fn test_join_is_commutative_in_content() {
        let tables = three_scenarios();
        let forward = join_in_order(&[&tables[0], &tables[1], &tables[2]]);
        let backward = join_in_order(&[&tables[2], &tables[1], &tables[0]]);
        let shuffled = join_in_order(&[&tables[1], &tables[2], &tables[0]]);
        for other in [&backward, &shuffled] {
            assert_eq!(
                forward.keys().sorted().collect_vec(),
                other.keys().sorted().collect_vec()
            );
            for key in forward.keys() {
                for scenario in ["basecase", "decongestion", "roadpricing"] {
                    assert_eq!(
                        forward.scenario_values(key, scenario),
                        other.scenario_values(key, scenario)
                    );
                }
            }
        }
    }

    #[test]
    fn test_scenario_round_trip_is_exact() {
        let tables = three_scenarios();
        let joined = join_in_order(&tables.iter().collect_vec());
        for original in tables.iter() {
            let extracted = joined.scenario_table(original.scenario()).unwrap();
            assert_eq!(extracted.len(), original.len());
            for (key, values) in original.iter() {
                assert_eq!(extracted.get(key), Some(values));
            }
        }
    }

    #[test]
    fn test_mismatched_key_column_is_rejected() {
        let modes = MetricTable::new("basecase", "mode", ["value"]);
        let result = ComparisonTable::new("link_id").join(&modes);
        assert!(matches!(result, Err(AnalysisError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_same_scenario_cannot_join_twice() {
        let t = volume_table("basecase", &[("1", 1.0)]);
        let result = ComparisonTable::new("link_id").join(&t).unwrap().join(&t);
        assert!(matches!(result, Err(AnalysisError::DuplicateScenario(_))));
    }

    #[test]
    fn test_join_all_reports_failed_scenarios() {
        let tables = three_scenarios();
        let outcomes = vec![
            (String::from("basecase"), Ok(tables[0].clone())),
            (
                String::from("decongestion"),
                Err(AnalysisError::SourceUnavailable {
                    path: "missing.csv".into(),
                    message: String::from("No such file or directory"),
                }),
            ),
            (String::from("roadpricing"), Ok(tables[2].clone())),
        ];
        let joined = ComparisonTable::join_all("link_id", outcomes);
        assert_eq!(joined.scenarios().collect_vec(), vec!["basecase", "roadpricing"]);
        assert_eq!(joined.missing_scenarios().len(), 1);
        assert_eq!(joined.missing_scenarios()[0].scenario, "decongestion");
        assert!(joined.missing_scenarios()[0].reason.contains("missing.csv"));
        assert_eq!(joined.len(), 4);
    }

    #[test]
    fn test_sum_per_scenario() {
        let tables = three_scenarios();
        let joined = join_in_order(&tables.iter().collect_vec());
        assert_eq!(joined.sum("basecase", "simulated_traffic_volume"), Some(350.0));
        assert_eq!(joined.sum("roadpricing", "simulated_traffic_volume"), Some(105.0));
        assert_eq!(joined.sum("nope", "simulated_traffic_volume"), None);
    }
}

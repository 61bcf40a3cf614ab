use std::fmt::Display;

use indexmap::IndexMap;
use serde::Serialize;

use super::ComparisonTable;
use crate::AnalysisError;

/// why a delta has no numeric value
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// the basecase has no value for this key
    MissingBasecase,
    /// the basecase value is zero, so a ratio cannot be taken
    ZeroBasecase,
    /// the compared scenario has no value for this key
    MissingValue,
    /// the arithmetic produced an infinite or NaN result
    NonFinite,
}

/// a difference against the basecase. never stores NaN or infinity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Delta {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Delta {
    /// wraps a computed number, mapping non-finite results to `Undefined`.
    pub fn checked(value: f64) -> Delta {
        if value.is_finite() {
            Delta::Defined(value)
        } else {
            Delta::Undefined(UndefinedReason::NonFinite)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Delta::Defined(v) => Some(*v),
            Delta::Undefined(_) => None,
        }
    }

    /// the absolute value of the delta
    pub fn magnitude(&self) -> Delta {
        match self {
            Delta::Defined(v) => Delta::Defined(v.abs()),
            Delta::Undefined(reason) => Delta::Undefined(*reason),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Delta::Defined(_))
    }
}

impl Display for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delta::Defined(v) => write!(f, "{v}"),
            Delta::Undefined(_) => write!(f, "NaN"),
        }
    }
}

/// absolute and relative difference of one scenario value against the basecase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeltaCell {
    pub absolute: Delta,
    pub relative: Delta,
}

impl DeltaCell {
    /// the basecase compared against itself
    pub fn identity() -> DeltaCell {
        DeltaCell {
            absolute: Delta::Defined(0.0),
            relative: Delta::Defined(0.0),
        }
    }

    pub fn between(value: Option<f64>, basecase: Option<f64>) -> DeltaCell {
        match (value, basecase) {
            (_, None) => DeltaCell {
                absolute: Delta::Undefined(UndefinedReason::MissingBasecase),
                relative: Delta::Undefined(UndefinedReason::MissingBasecase),
            },
            (None, Some(_)) => DeltaCell {
                absolute: Delta::Undefined(UndefinedReason::MissingValue),
                relative: Delta::Undefined(UndefinedReason::MissingValue),
            },
            (Some(v), Some(b)) => {
                let absolute = Delta::checked(v - b);
                let relative = if b == 0.0 {
                    Delta::Undefined(UndefinedReason::ZeroBasecase)
                } else {
                    Delta::checked(v / b - 1.0)
                };
                DeltaCell { absolute, relative }
            }
        }
    }
}

/// per key and scenario, the delta of one column against the basecase.
/// rows follow the key order of the comparison table they were computed from.
#[derive(Clone, Debug)]
pub struct DeltaTable {
    basecase: String,
    column: String,
    scenarios: Vec<String>,
    rows: IndexMap<String, Vec<DeltaCell>>,
}

impl DeltaTable {
    pub fn compute(
        comparison: &ComparisonTable,
        basecase: &str,
        column: &str,
    ) -> Result<DeltaTable, AnalysisError> {
        if !comparison.has_scenario(basecase) {
            return Err(AnalysisError::UnknownScenario(basecase.to_string()));
        }
        let scenarios = comparison.scenarios().map(String::from).collect::<Vec<_>>();
        let rows = comparison
            .keys()
            .map(|key| {
                let base = comparison.value(key, basecase, column);
                let cells = scenarios
                    .iter()
                    .map(|scenario| {
                        if scenario == basecase {
                            DeltaCell::identity()
                        } else {
                            DeltaCell::between(comparison.value(key, scenario, column), base)
                        }
                    })
                    .collect::<Vec<_>>();
                (key.to_string(), cells)
            })
            .collect::<IndexMap<_, _>>();

        let undefined = rows
            .values()
            .flatten()
            .filter(|cell| !cell.absolute.is_defined())
            .count();
        if undefined > 0 {
            log::debug!("{undefined} '{column}' deltas against '{basecase}' are undefined");
        }

        Ok(DeltaTable {
            basecase: basecase.to_string(),
            column: column.to_string(),
            scenarios,
            rows,
        })
    }

    pub fn basecase(&self) -> &str {
        &self.basecase
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// all compared scenarios, the basecase included, in join order
    pub fn scenarios(&self) -> &[String] {
        &self.scenarios
    }

    pub fn get(&self, key: &str, scenario: &str) -> Option<&DeltaCell> {
        let position = self.scenarios.iter().position(|s| s == scenario)?;
        self.rows.get(key).and_then(|cells| cells.get(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DeltaCell])> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MetricTable;

    const COLUMN: &str = "simulated_traffic_volume";

    fn comparison(rows: &[(&str, &str, Option<f64>)]) -> ComparisonTable {
        let mut tables: IndexMap<&str, MetricTable> = IndexMap::new();
        for (scenario, key, value) in rows {
            tables
                .entry(*scenario)
                .or_insert_with(|| MetricTable::new(scenario, "link_id", [COLUMN]))
                .insert(key, vec![*value])
                .unwrap();
        }
        tables
            .values()
            .fold(ComparisonTable::new("link_id"), |acc, t| acc.join(t).unwrap())
    }

    #[test]
    fn test_relative_reduction() {
        let table = comparison(&[("basecase", "1", Some(100.0)), ("decongestion", "1", Some(80.0))]);
        let deltas = DeltaTable::compute(&table, "basecase", COLUMN).unwrap();
        let cell = deltas.get("1", "decongestion").unwrap();
        assert_eq!(cell.absolute, Delta::Defined(-20.0));
        let relative = cell.relative.value().unwrap();
        assert!((relative - -0.20).abs() < 1e-12);
        assert_eq!(cell.absolute.magnitude(), Delta::Defined(20.0));
    }

    #[test]
    fn test_basecase_is_identity() {
        let table = comparison(&[
            ("basecase", "1", Some(100.0)),
            ("basecase", "2", Some(0.0)),
            ("basecase", "3", None),
            ("roadpricing", "1", Some(1.0)),
        ]);
        let deltas = DeltaTable::compute(&table, "basecase", COLUMN).unwrap();
        for key in ["1", "2", "3"] {
            assert_eq!(deltas.get(key, "basecase"), Some(&DeltaCell::identity()));
        }
    }

    #[test]
    fn test_zero_basecase_is_undefined_ratio() {
        let table = comparison(&[("basecase", "1", Some(0.0)), ("roadpricing", "1", Some(5.0))]);
        let deltas = DeltaTable::compute(&table, "basecase", COLUMN).unwrap();
        let cell = deltas.get("1", "roadpricing").unwrap();
        assert_eq!(cell.absolute, Delta::Defined(5.0));
        assert_eq!(
            cell.relative,
            Delta::Undefined(UndefinedReason::ZeroBasecase)
        );
        assert_eq!(cell.relative.to_string(), "NaN");
    }

    #[test]
    fn test_link_only_in_one_scenario() {
        let table = comparison(&[
            ("basecase", "1", Some(10.0)),
            ("decongestion", "1", Some(12.0)),
            ("roadpricing", "1", Some(9.0)),
            ("roadpricing", "99", Some(4.0)),
        ]);
        let deltas = DeltaTable::compute(&table, "basecase", COLUMN).unwrap();
        assert_eq!(table.value("99", "basecase", COLUMN), None);
        assert_eq!(table.value("99", "decongestion", COLUMN), None);
        let cell = deltas.get("99", "roadpricing").unwrap();
        assert_eq!(
            cell.absolute,
            Delta::Undefined(UndefinedReason::MissingBasecase)
        );
        let cell = deltas.get("1", "decongestion").unwrap();
        assert_eq!(cell.absolute, Delta::Defined(2.0));
    }

    #[test]
    fn test_missing_scenario_value() {
        let cell = DeltaCell::between(None, Some(3.0));
        assert_eq!(cell.absolute, Delta::Undefined(UndefinedReason::MissingValue));
    }

    #[test]
    fn test_unknown_basecase_is_an_error() {
        let table = comparison(&[("basecase", "1", Some(1.0))]);
        let result = DeltaTable::compute(&table, "nope", COLUMN);
        assert!(matches!(result, Err(AnalysisError::UnknownScenario(_))));
    }

    #[test]
    fn test_non_finite_is_undefined() {
        assert_eq!(
            Delta::checked(f64::INFINITY),
            Delta::Undefined(UndefinedReason::NonFinite)
        );
        let cell = DeltaCell::between(Some(f64::MAX), Some(-f64::MAX));
        assert_eq!(cell.absolute, Delta::Undefined(UndefinedReason::NonFinite));
    }
}

use decongestion_analysis_core::table::{
    ComparisonTable, Delta, DeltaCell, DeltaTable, UndefinedReason,
};
use serde_json::Value;

/// absent values are written as empty cells
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// undefined deltas are written as `NaN`
pub fn format_delta(delta: &Delta) -> String {
    delta.to_string()
}

pub fn json_value(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

pub fn json_delta(delta: &Delta) -> Value {
    json_value(delta.value())
}

/// the delta cell of a key and scenario. when the basecase could not be
/// built at all there is no delta table and every cell is undefined.
pub fn delta_cell(deltas: Option<&DeltaTable>, key: &str, scenario: &str) -> DeltaCell {
    let undefined = DeltaCell {
        absolute: Delta::Undefined(UndefinedReason::MissingBasecase),
        relative: Delta::Undefined(UndefinedReason::MissingBasecase),
    };
    deltas
        .and_then(|d| d.get(key, scenario))
        .copied()
        .unwrap_or(undefined)
}

/// computes deltas against the basecase, or None with a warning when the
/// basecase is missing from the comparison.
pub fn deltas_against(
    comparison: &ComparisonTable,
    basecase: &str,
    column: &str,
) -> Option<DeltaTable> {
    match DeltaTable::compute(comparison, basecase, column) {
        Ok(deltas) => Some(deltas),
        Err(e) => {
            log::warn!("'{column}' deltas are undefined: {e}");
            None
        }
    }
}

/// long format comparison rows: the key followed by one value per scenario
pub fn comparison_rows(comparison: &ComparisonTable, column: &str) -> Vec<Vec<String>> {
    let scenarios = comparison.scenarios().collect::<Vec<_>>();
    comparison
        .keys()
        .map(|key| {
            let mut row = vec![key.to_string()];
            row.extend(
                scenarios
                    .iter()
                    .map(|s| format_value(comparison.value(key, s, column))),
            );
            row
        })
        .collect()
}

pub fn comparison_header(comparison: &ComparisonTable) -> Vec<String> {
    let mut header = vec![comparison.key_column().to_string()];
    header.extend(comparison.scenarios().map(String::from));
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use decongestion_analysis_core::table::MetricTable;

    #[test]
    fn test_comparison_rows_leave_absent_cells_empty() {
        let mut bc = MetricTable::new("basecase", "mode", ["value"]);
        bc.insert("car", vec![Some(1.5)]).unwrap();
        let mut rp = MetricTable::new("roadpricing", "mode", ["value"]);
        rp.insert("ride", vec![Some(2.0)]).unwrap();
        let comparison = ComparisonTable::new("mode")
            .join(&bc)
            .unwrap()
            .join(&rp)
            .unwrap();
        assert_eq!(comparison_header(&comparison), vec!["mode", "basecase", "roadpricing"]);
        assert_eq!(
            comparison_rows(&comparison, "value"),
            vec![vec!["car", "1.5", ""], vec!["ride", "", "2"]]
        );
    }

    #[test]
    fn test_missing_basecase_cells_are_undefined() {
        let cell = delta_cell(None, "1", "roadpricing");
        assert_eq!(format_delta(&cell.absolute), "NaN");
        assert_eq!(json_delta(&cell.relative), Value::Null);
    }
}

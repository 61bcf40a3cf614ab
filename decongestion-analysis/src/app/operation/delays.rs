use decongestion_analysis_core::{
    config::InputFile,
    metric::{
        delay_table, load_link_traffic, DELAY_COLUMNS, LINK_KEY_COLUMN, TOTAL_DELAY_COLUMN,
    },
    reference::LinkReference,
    table::{ComparisonTable, Delta, DeltaTable},
};
use geo_types::Geometry;
use geojson::JsonObject;
use serde_json::Value;
use wkt::ToWkt;

use super::{join_runs, suffixed};
use crate::{
    app::{run_scenarios, AnalysisContext, AppError, OperationReport},
    util::{
        fs::write_rows,
        geojson_ops::{feature, write_feature_collection},
        table_ops::{delta_cell, deltas_against, format_delta, format_value, json_delta, json_value},
    },
};

/// computes the total delay per link for every scenario and writes it with
/// the link geometry, as a table and as GeoJSON.
pub fn run(ctx: &AnalysisContext) -> Result<OperationReport, AppError> {
    let mut report = OperationReport::new("delays");
    let reference = ctx.reference()?;
    let runs = run_scenarios(ctx.scenarios(), |_, scenario, issues| {
        let path = ctx.input_path(scenario, InputFile::TrafficStats);
        let records = load_link_traffic(&path, issues)?;
        delay_table(&scenario.name, &records, &reference, issues)
    });
    report.record_runs(&runs);
    let comparison = join_runs(LINK_KEY_COLUMN, runs, "delays")?;
    report.record_missing(&comparison);
    let deltas = deltas_against(&comparison, ctx.basecase(), TOTAL_DELAY_COLUMN);
    let columns = DelayColumns::new(ctx, &comparison);

    // network links first, in network order, then links only the
    // scenarios know about
    let link_ids = reference
        .iter()
        .map(|link| link.link_id.as_str())
        .chain(comparison.keys().filter(|k| !reference.contains(k)))
        .collect::<Vec<_>>();

    let mut header = vec![LINK_KEY_COLUMN.to_string(), String::from("geometry")];
    header.extend(columns.names());
    let rows = link_ids
        .iter()
        .map(|link_id| {
            let geometry = reference
                .get(link_id)
                .map(|link| link.geometry.to_wkt().to_string())
                .unwrap_or_default();
            let mut row = vec![link_id.to_string(), geometry];
            row.extend(
                columns
                    .values(&comparison, deltas.as_ref(), link_id)
                    .into_iter()
                    .map(|v| match v {
                        DelayValue::Value(v) => format_value(v),
                        DelayValue::Delta(d) => format_delta(&d),
                    }),
            );
            row
        })
        .collect::<Vec<_>>();
    let written = write_rows(
        rows,
        &header,
        "link_delays.csv",
        ctx.output_directory(),
        ctx.overwrite(),
        "write link_delays.csv",
    )?;
    report.record_output(written);

    let written = write_feature_collection(
        delay_features(&reference, &columns, &comparison, deltas.as_ref()),
        "link_delays.geojson",
        ctx.output_directory(),
        ctx.overwrite(),
    )?;
    report.record_output(written);
    Ok(report)
}

enum DelayValue {
    Value(Option<f64>),
    Delta(Delta),
}

/// the per-scenario and per-delta output columns of the delay tables
struct DelayColumns<'a> {
    /// (scenario, suffix) for every joined scenario
    scenarios: Vec<(&'a str, &'a str)>,
    /// (scenario, suffix) for every scenario other than the basecase
    compared: Vec<(&'a str, &'a str)>,
}

impl<'a> DelayColumns<'a> {
    fn new(ctx: &'a AnalysisContext, comparison: &'a ComparisonTable) -> Self {
        let scenarios = comparison
            .scenarios()
            .map(|s| (s, ctx.suffix(s)))
            .collect::<Vec<_>>();
        let compared = scenarios
            .iter()
            .filter(|(s, _)| *s != ctx.basecase())
            .copied()
            .collect();
        DelayColumns { scenarios, compared }
    }

    fn names(&self) -> Vec<String> {
        let mut names = vec![];
        for (_, suffix) in self.scenarios.iter() {
            names.extend(DELAY_COLUMNS.iter().map(|c| suffixed(c, suffix)));
        }
        for (_, suffix) in self.compared.iter() {
            names.push(suffixed(&format!("{TOTAL_DELAY_COLUMN}_diff"), suffix));
            names.push(suffixed(&format!("{TOTAL_DELAY_COLUMN}_rel"), suffix));
        }
        names
    }

    fn values(
        &self,
        comparison: &ComparisonTable,
        deltas: Option<&DeltaTable>,
        link_id: &str,
    ) -> Vec<DelayValue> {
        let mut values = vec![];
        for (scenario, _) in self.scenarios.iter() {
            values.extend(
                DELAY_COLUMNS
                    .iter()
                    .map(|c| DelayValue::Value(comparison.value(link_id, scenario, c))),
            );
        }
        for (scenario, _) in self.compared.iter() {
            let cell = delta_cell(deltas, link_id, scenario);
            values.push(DelayValue::Delta(cell.absolute));
            values.push(DelayValue::Delta(cell.relative));
        }
        values
    }
}

fn delay_features(
    reference: &LinkReference,
    columns: &DelayColumns,
    comparison: &ComparisonTable,
    deltas: Option<&DeltaTable>,
) -> Vec<geojson::Feature> {
    let names = columns.names();
    reference
        .iter()
        .map(|link| {
            let mut properties = JsonObject::new();
            properties.insert(
                LINK_KEY_COLUMN.to_string(),
                Value::String(link.link_id.clone()),
            );
            let values = columns.values(comparison, deltas, &link.link_id);
            for (name, value) in names.iter().zip(values) {
                let json = match value {
                    DelayValue::Value(v) => json_value(v),
                    DelayValue::Delta(d) => json_delta(&d),
                };
                properties.insert(name.clone(), json);
            }
            feature(&Geometry::LineString(link.geometry.clone()), properties)
        })
        .collect()
}

use decongestion_analysis_core::{
    config::InputFile,
    metric::{
        load_link_emissions, total_emissions, EMISSIONS_KEY_COLUMN, POLLUTANT_KEY_COLUMN,
        TOTAL_EMISSIONS_COLUMN,
    },
    table::{ComparisonTable, MetricTable},
    AnalysisError,
};
use geo_types::Geometry;
use geojson::JsonObject;
use serde_json::Value;

use super::{join_runs, suffixed};
use crate::{
    app::{run_scenarios, AnalysisContext, AppError, OperationReport, ScenarioRun},
    util::{
        fs::write_rows,
        geojson_ops::{feature, write_feature_collection},
        table_ops::{comparison_header, comparison_rows, json_value},
    },
};

/// compares total emissions per pollutant and exports per-link emissions of
/// every scenario on the link centroids.
pub fn run(ctx: &AnalysisContext) -> Result<OperationReport, AppError> {
    let mut report = OperationReport::new("emissions");
    let reference = ctx.reference()?;
    let settings = &ctx.config.emissions;
    let runs = run_scenarios(ctx.scenarios(), |_, scenario, issues| {
        let path = ctx.input_path(scenario, InputFile::Emissions);
        load_link_emissions(&path, &scenario.name, issues)
    });
    report.record_runs(&runs);

    let totals = ComparisonTable::join_all(
        POLLUTANT_KEY_COLUMN,
        scenario_totals(&runs, settings.link_limit),
    );
    report.record_missing(&totals);
    let header = comparison_header(&totals);
    let rows = comparison_rows(&totals, TOTAL_EMISSIONS_COLUMN);
    let written = write_rows(
        rows.clone(),
        &header,
        "total_emissions.csv",
        ctx.output_directory(),
        ctx.overwrite(),
        "write total_emissions.csv",
    )?;
    report.record_output(written);

    for pollutant in settings.highlight.iter() {
        let highlighted = rows
            .iter()
            .filter(|row| row.first() == Some(pollutant))
            .cloned()
            .collect::<Vec<_>>();
        if highlighted.is_empty() {
            log::warn!("highlighted pollutant '{pollutant}' not found in any scenario");
        }
        let filename = format!("total_emissions_{}.csv", pollutant_slug(pollutant));
        let written = write_rows(
            highlighted,
            &header,
            &filename,
            ctx.output_directory(),
            ctx.overwrite(),
            &format!("write {filename}"),
        )?;
        report.record_output(written);
    }

    let links = join_runs(EMISSIONS_KEY_COLUMN, runs, "emissions")?;
    let unmatched = links.keys().filter(|k| !reference.contains(k)).count();
    if unmatched > 0 {
        log::warn!("{unmatched} links with emissions are not part of the network and are not exported");
    }
    let scenarios = links.scenarios().collect::<Vec<_>>();
    let features = reference
        .iter()
        .filter_map(|link| link.centroid().map(|c| (link, c)))
        .map(|(link, centroid)| {
            let mut properties = JsonObject::new();
            properties.insert(
                EMISSIONS_KEY_COLUMN.to_string(),
                Value::String(link.link_id.clone()),
            );
            for scenario in scenarios.iter() {
                let suffix = ctx.suffix(scenario);
                for pollutant in links.columns(scenario).unwrap_or_default() {
                    let value = links.value(&link.link_id, scenario, pollutant);
                    properties.insert(suffixed(pollutant, suffix), json_value(value));
                }
            }
            feature(&Geometry::Point(centroid), properties)
        })
        .collect::<Vec<_>>();
    let written = write_feature_collection(
        features,
        "link_centroids_with_emissions.geojson",
        ctx.output_directory(),
        ctx.overwrite(),
    )?;
    report.record_output(written);
    Ok(report)
}

/// per-pollutant totals of each run. failed runs keep their original error.
fn scenario_totals(
    runs: &[ScenarioRun<MetricTable>],
    link_limit: Option<usize>,
) -> Vec<(String, Result<MetricTable, AnalysisError>)> {
    runs.iter()
        .map(|run| {
            let result = run
                .result
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|links| total_emissions(links, link_limit));
            (run.scenario.clone(), result)
        })
        .collect()
}

/// short file name form of a pollutant column, e.g. `NOx [g]` to `NOx`
fn pollutant_slug(pollutant: &str) -> String {
    let name = pollutant.split('[').next().unwrap_or(pollutant).trim();
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use decongestion_analysis_core::RecordIssues;
    use std::path::PathBuf;

    #[test]
    fn test_failed_run_keeps_error_kind() {
        let mut links = MetricTable::new("basecase", EMISSIONS_KEY_COLUMN, ["NOx [g]"]);
        links.insert("l1", vec![Some(2.0)]).unwrap();
        links.insert("l2", vec![Some(3.0)]).unwrap();
        let missing = AnalysisError::SourceUnavailable {
            path: PathBuf::from("roadpricing/emissions.csv"),
            message: String::from("no such file"),
        }
        .in_scenario("roadpricing");
        let runs = vec![
            ScenarioRun {
                scenario: String::from("basecase"),
                result: Ok(links),
                issues: RecordIssues::default(),
            },
            ScenarioRun {
                scenario: String::from("roadpricing"),
                result: Err(missing),
                issues: RecordIssues::default(),
            },
        ];
        let totals = scenario_totals(&runs, None);
        assert_eq!(totals.len(), 2);
        let basecase = totals[0].1.as_ref().unwrap();
        assert_eq!(basecase.value("NOx [g]", TOTAL_EMISSIONS_COLUMN), Some(5.0));
        match &totals[1].1 {
            Err(AnalysisError::Scenario { scenario, source }) => {
                assert_eq!(scenario, "roadpricing");
                assert!(matches!(
                    source.as_ref(),
                    AnalysisError::SourceUnavailable { .. }
                ));
            }
            other => panic!("unexpected totals {other:?}"),
        }
    }

    #[test]
    fn test_pollutant_slug() {
        assert_eq!(pollutant_slug("NOx [g]"), "NOx");
        assert_eq!(pollutant_slug("CO2_TOTAL [g]"), "CO2_TOTAL");
        assert_eq!(pollutant_slug("PM2.5"), "PM2_5");
    }
}

use decongestion_analysis_core::{
    aggregate::TimeBinAggregator,
    config::InputFile,
    event::open_events,
    metric::{aggregate_events, tolls_table, TOLL_COLUMN},
    util::unit::TimeUnit,
};
use kdam::tqdm;
use serde::Serialize;

use super::join_runs;
use crate::{
    app::{run_scenarios, AnalysisContext, AppError, OperationReport},
    util::{
        fs::{serialize_into_csv, write_rows},
        table_ops::format_value,
    },
};

#[derive(Serialize)]
struct TollTotal {
    scenario: String,
    amount: Option<f64>,
}

/// aggregates monetary events of every scenario into time bins and writes
/// the collected tolls per bin and per scenario.
pub fn run(ctx: &AnalysisContext) -> Result<OperationReport, AppError> {
    let mut report = OperationReport::new("tolls");
    let bins = &ctx.config.tolls;
    let strict = ctx.config.events.strict;
    let runs = run_scenarios(ctx.scenarios(), |position, scenario, issues| {
        let path = ctx.input_path(scenario, InputFile::Events);
        let mut aggregator = TimeBinAggregator::new(bins)?;
        let mut reader = open_events(&path, strict)?;
        let events = tqdm!(
            reader.by_ref(),
            desc = format!("{} events", scenario.name),
            position = position as u16
        );
        let outcome = aggregate_events(events, &mut aggregator);
        eprintln!();
        issues.merge(reader.issues());
        issues.merge(aggregator.issues());
        outcome?;
        log::info!(
            "{}: {} of {} events collected into {} bins",
            scenario.name,
            aggregator.contributing_events(),
            reader.events_read(),
            aggregator.bins().len()
        );
        tolls_table(&scenario.name, &aggregator.snapshot())
    });
    report.record_runs(&runs);

    let label_unit = bins.label_unit();
    let comparison = join_runs(label_unit.label_column(), runs, "tolls")?;
    report.record_missing(&comparison);
    let scenarios = comparison.scenarios().collect::<Vec<_>>();
    let with_hours = label_unit != TimeUnit::Hours;

    let mut header = vec![label_unit.label_column().to_string()];
    if with_hours {
        header.push(TimeUnit::Hours.label_column().to_string());
    }
    header.extend(scenarios.iter().map(|s| s.to_string()));
    let rows = comparison
        .keys()
        .map(|label| {
            let mut row = vec![label.to_string()];
            if with_hours {
                let hours = label
                    .parse::<f64>()
                    .ok()
                    .map(|start| TimeUnit::Hours.from_uom(label_unit.to_uom(start)));
                row.push(format_value(hours));
            }
            row.extend(
                scenarios
                    .iter()
                    .map(|s| format_value(comparison.value(label, s, TOLL_COLUMN))),
            );
            row
        })
        .collect::<Vec<_>>();
    let written = write_rows(
        rows,
        &header,
        "collected_tolls.csv",
        ctx.output_directory(),
        ctx.overwrite(),
        "write collected_tolls.csv",
    )?;
    report.record_output(written);

    let totals = scenarios
        .iter()
        .map(|s| TollTotal {
            scenario: s.to_string(),
            amount: comparison.sum(s, TOLL_COLUMN),
        })
        .collect::<Vec<_>>();
    let written = serialize_into_csv(
        totals,
        "collected_tolls_total.csv",
        ctx.output_directory(),
        ctx.overwrite(),
        "write collected_tolls_total.csv",
    )?;
    report.record_output(written);
    Ok(report)
}

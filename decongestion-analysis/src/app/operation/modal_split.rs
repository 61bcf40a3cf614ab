use decongestion_analysis_core::{
    config::InputFile,
    metric::{load_modal_split, ModalSplit, MODE_KEY_COLUMN, SHARE_COLUMN},
};
use indexmap::IndexSet;

use super::join_runs;
use crate::{
    app::{run_scenarios, AnalysisContext, AppError, OperationReport},
    util::{
        fs::write_rows,
        table_ops::{delta_cell, deltas_against, format_delta, format_value},
    },
};

/// writes the last-iteration modal split of each scenario and the change
/// of each mode's share against the basecase.
pub fn run(ctx: &AnalysisContext) -> Result<OperationReport, AppError> {
    let mut report = OperationReport::new("modal_split");
    let runs = run_scenarios(ctx.scenarios(), |_, scenario, issues| {
        let path = ctx.input_path(scenario, InputFile::ModeStats);
        load_modal_split(&path, &scenario.name, issues)
    });
    report.record_runs(&runs);

    // one row per scenario
    let splits = runs
        .iter()
        .filter_map(|run| run.result.as_ref().ok())
        .collect::<Vec<&ModalSplit>>();
    let modes = splits
        .iter()
        .flat_map(|s| s.modes())
        .map(String::from)
        .collect::<IndexSet<_>>();
    let mut header = vec![String::from("scenario")];
    header.extend(modes.iter().cloned());
    let rows = splits
        .iter()
        .map(|split| {
            let mut row = vec![split.scenario.clone()];
            row.extend(modes.iter().map(|m| format_value(split.share(m))));
            row
        })
        .collect::<Vec<_>>();
    let written = write_rows(
        rows,
        &header,
        "modal_splits.csv",
        ctx.output_directory(),
        ctx.overwrite(),
        "write modal_splits.csv",
    )?;
    report.record_output(written);

    // one row per mode, with the change in share against the basecase
    let runs = runs
        .into_iter()
        .map(|run| run.map(|split| split.to_metric_table()))
        .collect::<Vec<_>>();
    let comparison = join_runs(MODE_KEY_COLUMN, runs, "modal_split")?;
    report.record_missing(&comparison);
    let deltas = deltas_against(&comparison, ctx.basecase(), SHARE_COLUMN);
    let scenarios = comparison.scenarios().collect::<Vec<_>>();

    let mut header = vec![MODE_KEY_COLUMN.to_string()];
    header.extend(scenarios.iter().map(|s| s.to_string()));
    header.extend(scenarios.iter().map(|s| format!("{s}_rel")));
    let rows = comparison
        .keys()
        .map(|mode| {
            let mut row = vec![mode.to_string()];
            row.extend(
                scenarios
                    .iter()
                    .map(|s| format_value(comparison.value(mode, s, SHARE_COLUMN))),
            );
            row.extend(
                scenarios
                    .iter()
                    .map(|s| format_delta(&delta_cell(deltas.as_ref(), mode, s).absolute)),
            );
            row
        })
        .collect::<Vec<_>>();
    let written = write_rows(
        rows,
        &header,
        "modal_splits_relative.csv",
        ctx.output_directory(),
        ctx.overwrite(),
        "write modal_splits_relative.csv",
    )?;
    report.record_output(written);
    Ok(report)
}

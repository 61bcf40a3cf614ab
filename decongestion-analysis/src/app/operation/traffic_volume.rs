use decongestion_analysis_core::{
    config::InputFile,
    metric::{load_link_traffic, volume_table, LINK_KEY_COLUMN, VOLUME_COLUMN},
};

use super::{join_runs, suffixed};
use crate::{
    app::{run_scenarios, AnalysisContext, AppError, OperationReport},
    util::{
        fs::write_rows,
        table_ops::{delta_cell, deltas_against, format_delta, format_value},
    },
};

/// compares the simulated daily traffic volume per link against the basecase
pub fn run(ctx: &AnalysisContext) -> Result<OperationReport, AppError> {
    let mut report = OperationReport::new("traffic_volume");
    let runs = run_scenarios(ctx.scenarios(), |_, scenario, issues| {
        let path = ctx.input_path(scenario, InputFile::TrafficStats);
        let records = load_link_traffic(&path, issues)?;
        volume_table(&scenario.name, &records)
    });
    report.record_runs(&runs);
    let comparison = join_runs(LINK_KEY_COLUMN, runs, "traffic_volume")?;
    report.record_missing(&comparison);
    let deltas = deltas_against(&comparison, ctx.basecase(), VOLUME_COLUMN);

    let scenarios = comparison.scenarios().collect::<Vec<_>>();
    let compared = scenarios
        .iter()
        .filter(|s| **s != ctx.basecase())
        .copied()
        .collect::<Vec<_>>();

    let mut header = vec![LINK_KEY_COLUMN.to_string()];
    header.extend(
        scenarios
            .iter()
            .map(|s| suffixed(VOLUME_COLUMN, ctx.suffix(s))),
    );
    for scenario in compared.iter() {
        let suffix = ctx.suffix(scenario);
        header.push(suffixed(&format!("{VOLUME_COLUMN}_diff"), suffix));
        header.push(suffixed(&format!("{VOLUME_COLUMN}_diff_abs"), suffix));
        header.push(suffixed(&format!("{VOLUME_COLUMN}_rel"), suffix));
    }

    let rows = comparison
        .keys()
        .map(|link_id| {
            let mut row = vec![link_id.to_string()];
            row.extend(
                scenarios
                    .iter()
                    .map(|s| format_value(comparison.value(link_id, s, VOLUME_COLUMN))),
            );
            for scenario in compared.iter() {
                let cell = delta_cell(deltas.as_ref(), link_id, scenario);
                row.push(format_delta(&cell.absolute));
                row.push(format_delta(&cell.absolute.magnitude()));
                row.push(format_delta(&cell.relative));
            }
            row
        })
        .collect::<Vec<_>>();
    let written = write_rows(
        rows,
        &header,
        "traffic_volume_comparison.csv",
        ctx.output_directory(),
        ctx.overwrite(),
        "write traffic_volume_comparison.csv",
    )?;
    report.record_output(written);
    Ok(report)
}

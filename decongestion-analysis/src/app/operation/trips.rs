use decongestion_analysis_core::{
    config::InputFile,
    metric::{load_trip_stats, MODE_KEY_COLUMN, TRIP_STAT_COLUMN},
};

use super::join_runs;
use crate::{
    app::{run_scenarios, AnalysisContext, AppError, OperationReport},
    util::{
        fs::write_rows,
        table_ops::{comparison_header, comparison_rows},
    },
};

/// compares the configured trip statistics per mode, one file per statistic.
pub fn run(ctx: &AnalysisContext) -> Result<OperationReport, AppError> {
    let mut report = OperationReport::new("trips");
    let trips = &ctx.config.trips;
    for statistic in trips.statistics.iter() {
        log::info!("comparing '{statistic}'");
        let runs = run_scenarios(ctx.scenarios(), |_, scenario, issues| {
            let path = ctx.input_path(scenario, InputFile::TripStats);
            load_trip_stats(&path, &scenario.name, *statistic, &trips.modes, issues)
        });
        report.record_runs(&runs);
        let comparison = join_runs(MODE_KEY_COLUMN, runs, "trips")?;
        report.record_missing(&comparison);

        let filename = format!("{}.csv", statistic.output_name());
        let written = write_rows(
            comparison_rows(&comparison, TRIP_STAT_COLUMN),
            &comparison_header(&comparison),
            &filename,
            ctx.output_directory(),
            ctx.overwrite(),
            &format!("write {filename}"),
        )?;
        report.record_output(written);
    }
    Ok(report)
}

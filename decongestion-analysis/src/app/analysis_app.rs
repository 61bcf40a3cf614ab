use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    app::{operation, AnalysisContext, AppError, OperationReport, RunSummary},
    util,
};

/// Command line tool comparing the outputs of MATSim basecase and congestion
/// pricing scenario runs
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct AnalysisApp {
    /// TOML file listing the scenarios to compare and the analysis settings
    #[arg(short, long, global = true, default_value = "decongestion-analysis.toml")]
    pub configuration_file: String,

    /// location on disk to write output files. overrides the configured
    /// output directory.
    #[arg(short, long, global = true)]
    pub output_directory: Option<String>,

    /// only compare these scenarios (comma-separated). the basecase is always
    /// included.
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub scenario: Vec<String>,

    #[command(subcommand)]
    pub op: AnalysisOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Subcommand)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOperation {
    /// compare travel time, trip distance and speed per mode
    Trips,
    /// compare the modal split of the last iteration
    ModalSplit,
    /// aggregate collected tolls from the event files into time bins
    Tolls,
    /// compare total emissions and export per-link emissions
    Emissions,
    /// compare simulated daily traffic volume per link
    TrafficVolume,
    /// compute the total delay per link
    Delays,
    /// run every analysis
    All,
}

impl AnalysisOperation {
    pub const EACH: [AnalysisOperation; 6] = [
        AnalysisOperation::Trips,
        AnalysisOperation::ModalSplit,
        AnalysisOperation::Tolls,
        AnalysisOperation::Emissions,
        AnalysisOperation::TrafficVolume,
        AnalysisOperation::Delays,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisOperation::Trips => "trips",
            AnalysisOperation::ModalSplit => "modal_split",
            AnalysisOperation::Tolls => "tolls",
            AnalysisOperation::Emissions => "emissions",
            AnalysisOperation::TrafficVolume => "traffic_volume",
            AnalysisOperation::Delays => "delays",
            AnalysisOperation::All => "all",
        }
    }

    /// the single operations this operation stands for
    pub fn expand(&self) -> Vec<AnalysisOperation> {
        match self {
            AnalysisOperation::All => AnalysisOperation::EACH.to_vec(),
            other => vec![*other],
        }
    }

    pub fn run(&self, ctx: &AnalysisContext) -> Result<OperationReport, AppError> {
        match self {
            AnalysisOperation::Trips => operation::trips::run(ctx),
            AnalysisOperation::ModalSplit => operation::modal_split::run(ctx),
            AnalysisOperation::Tolls => operation::tolls::run(ctx),
            AnalysisOperation::Emissions => operation::emissions::run(ctx),
            AnalysisOperation::TrafficVolume => operation::traffic_volume::run(ctx),
            AnalysisOperation::Delays => operation::delays::run(ctx),
            AnalysisOperation::All => Err(AppError::InvalidUserInput(String::from(
                "'all' must be expanded into single operations",
            ))),
        }
    }
}

impl AnalysisApp {
    pub fn run(&self) -> Result<(), AppError> {
        log::info!("starting analysis at {}", chrono::Local::now().to_rfc3339());
        let mut config = AnalysisContext::read_config(&self.configuration_file)?;
        if let Some(output_directory) = &self.output_directory {
            config.output_directory = PathBuf::from(output_directory);
        }
        if !self.scenario.is_empty() {
            config.retain_scenarios(&self.scenario)?;
        }
        let ctx = AnalysisContext::new(config)?;
        ctx.prepare_output_directory()?;
        let summary = run_operations(&ctx, self.op, &self.configuration_file)?;
        if summary.failed_operations.is_empty() {
            Ok(())
        } else {
            let failed = summary
                .failed_operations
                .iter()
                .map(|(op, msg)| format!("{op} ({msg})"))
                .join(", ");
            Err(AppError::OperationsFailed(failed))
        }
    }
}

/// runs an operation, or each operation of `all` in turn, and writes the run
/// summary. a failing operation does not prevent the following ones.
pub fn run_operations(
    ctx: &AnalysisContext,
    op: AnalysisOperation,
    configuration_file: &str,
) -> Result<RunSummary, AppError> {
    let scenarios = ctx
        .scenarios()
        .iter()
        .map(|s| s.name.clone())
        .collect::<Vec<_>>();
    let mut summary = RunSummary::new(op.name(), configuration_file, ctx.basecase(), &scenarios);
    let mut failed = IndexMap::new();
    for single in op.expand() {
        log::info!("running {}", single.name());
        match single.run(ctx) {
            Ok(report) => summary.operations.push(report),
            Err(e) => {
                log::error!("{} failed: {e}", single.name());
                failed.insert(single.name().to_string(), e.to_string());
            }
        }
    }
    summary.failed_operations = failed;
    util::fs::write_json(
        &summary,
        "run_summary.json",
        ctx.output_directory(),
        ctx.overwrite(),
    )?;
    Ok(summary)
}

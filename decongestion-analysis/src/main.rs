use clap::Parser;
use decongestion_analysis::app::{AnalysisApp, AppError};

fn main() -> Result<(), AppError> {
    env_logger::init();
    let args = AnalysisApp::parse();
    args.run()
}

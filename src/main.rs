use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use udhaar_flow::application::flow::FlowController;
use udhaar_flow::config::FlowConfig;
use udhaar_flow::infrastructure::in_memory::RecordingDisbursements;
use udhaar_flow::infrastructure::simulated::simulated_services;
use udhaar_flow::interfaces::csv::event_reader::{EventReader, ScriptStep};
use udhaar_flow::interfaces::csv::summary_writer::{SessionSummary, SummaryWriter};
use udhaar_flow::logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scripted session CSV file (`event,value` rows)
    script: PathBuf,

    /// JSON file overriding timings and wizard schemas
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = match cli.config {
        Some(path) => FlowConfig::from_path(path).into_diagnostic()?,
        None => FlowConfig::default(),
    };

    let disbursements = RecordingDisbursements::new();
    let services = simulated_services(&config.timings, Arc::new(disbursements.clone()));
    let mut controller = FlowController::new(config, services);
    controller.start();

    // Replay the script
    let file = File::open(cli.script).into_diagnostic()?;
    let reader = EventReader::new(file);
    for (row, step) in reader.steps().enumerate() {
        match step {
            Ok(ScriptStep::Wait(duration)) => controller.run_for(duration).await,
            Ok(ScriptStep::User(event)) => {
                if let Err(e) = controller.dispatch(event) {
                    warn!(row = row + 1, error = %e, "event rejected");
                }
            }
            Err(e) => {
                warn!(row = row + 1, error = %e, "unreadable script row");
            }
        }
    }

    info!(disbursements = disbursements.count(), "replay finished");

    let stdout = io::stdout();
    let mut writer = SummaryWriter::new(stdout.lock());
    writer
        .write_summary(&SessionSummary::from(controller.session()))
        .into_diagnostic()?;

    Ok(())
}

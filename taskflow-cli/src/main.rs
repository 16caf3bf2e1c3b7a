use std::process::ExitCode;

use clap::Parser;
use taskflow_cli::{execute, init_tracing, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_filter = init_tracing();

    // Config path: CLI flag > TASKFLOW_CONFIG > default candidates
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("TASKFLOW_CONFIG").ok());
    let config = taskflow_core::config::load_config_file(config_path.as_deref())?;

    log_filter.apply_config_level(config.log_level);

    let report = execute(&cli.command, &config).await?;
    print!("{}", report.text);

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

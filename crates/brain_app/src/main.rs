use std::process::ExitCode;

use brain_app::{
    app::{run, AppConfig},
    cli::Cli,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let config = AppConfig::from_env()
        .unwrap_or_default()
        .with_data_path(cli.data_path.clone());
    if let Err(err) = run(config, cli) {
        tracing::error!(error = %err, "command failed");
        eprintln!("brain: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

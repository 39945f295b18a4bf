use apiforge::cli::{run_cli, Cli};
use apiforge::telemetry::init_logging_with_config;
use apiforge::AppConfig;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    // Flushes buffered log lines on drop when async logging is on.
    let _guard = init_logging_with_config(&config.logging)?;
    tracing::debug!(?config, "configuration loaded");

    run_cli(cli, &config)
}

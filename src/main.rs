use brrtmux::cli::{run_cli, Cli};
use brrtmux::logging::{init_logging_with_config, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    log_config.log_level.clone_from(&cli.log_level);
    if std::env::var("BRRTMUX_LOG_FORMAT").is_err() {
        log_config.format = brrtmux::logging::LogFormat::Pretty;
    }
    init_logging_with_config(&log_config)?;

    // unlocked handle: `watch` prints from the watcher thread too
    run_cli(&cli, &mut std::io::stdout())
}

use anyhow::{Context, Result};
use bc3_processor::cli::Args;
use bc3_processor::config::Bc3Config;
use bc3_processor::processor::Bc3Processor;
use bc3_processor::report::print_summary;
use clap::Parser;
use std::process;
use tracing::debug;

fn main() {
    let args = Args::parse();

    match setup_logging(&args).and_then(|()| run(&args)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Bc3Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = args.apply_to(config);

    let processor = Bc3Processor::new(args.input.clone())
        .context("Failed to open input")?
        .with_config(config);

    let stats = processor
        .process()
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    if !args.quiet {
        print_summary(&stats);
    }
    Ok(())
}

/// Set up structured logging on stderr
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bc3_processor={}", log_level)));

    let initialized = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    initialized.context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_logging_setup_is_an_error() {
        let args = Args::parse_from(["bc3_processor", "-q", "obra.bc3"]);
        assert!(setup_logging(&args).is_ok());

        let error = setup_logging(&args).unwrap_err();
        assert!(error.to_string().contains("Failed to initialize logging"));
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use mintboy::config::{Config, LoggerSpec, SinkSpec};
use mintboy::logging::Level;
use mintboy::log_info;
use std::path::PathBuf;

/// Logger the front-end writes its own messages to
const MAIN_LOGGER: &str = "mintboy";

#[derive(Parser, Debug, PartialEq)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at DEBUG instead of INFO
    #[arg(long)]
    debug: bool,

    /// JSON5 file describing the loggers to create
    #[arg(long, value_name = "FILE")]
    log_config: Option<PathBuf>,

    /// Print the effective log configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Also log the startup lines through this logger
    #[arg(long, value_name = "NAME", hide = true)]
    echo_logger: Option<String>,

    /// Path to the ROM image
    #[arg(required_unless_present = "dump_config")]
    rom: Option<PathBuf>,
}

fn main_logger(debug: bool) -> LoggerSpec {
    LoggerSpec {
        name: MAIN_LOGGER.to_string(),
        sink: SinkSpec::Stdout,
        level: Some(if debug { Level::Debug } else { Level::Info }),
        colors: Some(true),
        flush: Some(true),
        line_prefix: Some("[LOG STDOUT]".to_string()),
        ..Default::default()
    }
}

/// Configuration from `--log-config` (if any), always including the main logger
fn effective_config(args: &Args) -> Result<Config> {
    let mut config = match &args.log_config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading log configuration {}", path.display()))?,
        None => Config::default(),
    };
    if !config.loggers.iter().any(|logger| logger.name == MAIN_LOGGER) {
        config.loggers.push(main_logger(args.debug));
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = effective_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_json5());
        return Ok(());
    }

    let registry = config.build().context("creating loggers")?;

    if let Some(rom) = &args.rom {
        log_info!(registry, MAIN_LOGGER, "ROM: {}", rom.display());
    }
    log_info!(registry, MAIN_LOGGER, "Debug: {}", args.debug);
    if let Some(path) = &args.log_config {
        log_info!(registry, MAIN_LOGGER, "Log config: {}", path.display());
    }
    // An unknown name exits here with status 1 after flushing every logger
    if let Some(name) = &args.echo_logger {
        log_info!(registry, name.as_str(), "Debug: {}", args.debug);
    }

    registry.delete_loggers();
    Ok(())
}

//! EnderaLib configuration tool
//!
//! Runs the library's configuration pipeline outside of a server, so an
//! operator can see how a configuration file would be loaded or repaired.

use anyhow::Result;
use clap::Parser;
use enderalib::cli::{Cli, Command, LoadArgs, OutputFormat};
use enderalib::config::{ConfigManager, ConfigSchema, LibConfig, annotate, encode_document};
use enderalib::logging::Logger;
use std::fs::OpenOptions;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn run_load(args: &LoadArgs) -> Result<()> {
    let data_dir = args.resolve_data_dir();
    let manager = ConfigManager::in_data_dir(&data_dir, &args.file, LibConfig::default())
        .with_logger(Logger::new().with_name("enderalib"));

    let loaded = manager.load()?;
    info!(path = %manager.path().display(), outcome = %loaded.outcome, "configuration loaded");

    match args.format {
        OutputFormat::Yaml => {
            let text = encode_document(&loaded.config)?;
            print!("{}", annotate(&text, LibConfig::FIELDS));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&loaded.config)?);
        }
    }
    eprintln!("{}: {}", manager.path().display(), loaded.outcome);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(message) = cli.validate() {
        anyhow::bail!(message);
    }
    init_logging(&cli)?;

    match cli.command {
        Command::Version => {
            println!("enderalib version {}", env!("CARGO_PKG_VERSION"));
        }
        Command::Load(ref args) => run_load(args)?,
        Command::Defaults => {
            let text = encode_document(&LibConfig::default())?;
            print!("{}", annotate(&text, LibConfig::FIELDS));
        }
    }
    Ok(())
}

//! CLI command definitions for enderalib
//!
//! Thin front end over the configuration pipeline, useful for checking what
//! a plugin would do with a configuration file without starting a server.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for printed documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Commented YAML, as written to disk
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// EnderaLib configuration tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename.
    /// `load` and `defaults` print the document to stdout and refuse 1/stdout.
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// True when log records would go to stdout.
    pub fn logs_to_stdout(&self) -> bool {
        matches!(self.log.as_str(), "1" | "stdout")
    }

    /// Reject flag combinations that would interleave log records with a
    /// printed document.
    pub fn validate(&self) -> Result<(), String> {
        let prints_document = matches!(self.command, Command::Load(_) | Command::Defaults);
        if prints_document && self.logs_to_stdout() {
            return Err(format!(
                "--log {} would mix log output into the printed document; use 2/stderr or a file",
                self.log
            ));
        }
        Ok(())
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the library version
    Version,

    /// Load (creating or repairing as needed) the library configuration
    Load(LoadArgs),

    /// Print the commented default configuration
    Defaults,
}

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Data directory (default: $ENDERALIB_DATA_DIR or the user config dir)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file name inside the data directory
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub file: String,

    /// Format of the printed configuration
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

impl LoadArgs {
    /// Data directory from the flag, the environment, or the platform default.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }
        if let Ok(dir) = std::env::var("ENDERALIB_DATA_DIR") {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|d| d.join("enderalib"))
            .unwrap_or_else(|| PathBuf::from("enderalib"))
    }
}

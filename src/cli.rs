//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::Verbosity;

/// harmattan - Gill 2D sonic anemometer data processing
///
/// Converts raw Gill WindSonic logger and tower files into CF-1.6 NetCDF,
/// runs quality-control scans, and reports the latest tower readings.
#[derive(Debug, Parser)]
#[command(name = "harmattan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Verbosity derived from the `-v`/`-q` flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert raw sonic files to a CF-1.6 NetCDF file
    Convert {
        /// Raw input files (`.tsv` tower rows, anything else logger lines)
        #[arg(required = true, value_name = "INFILES")]
        infiles: Vec<PathBuf>,

        /// NetCDF output filename
        #[arg(short, long, default_value = "sonic_2d_data.nc", value_name = "FILE")]
        output: PathBuf,

        /// Average into bins of this many seconds (overrides config; 0 keeps
        /// raw samples)
        #[arg(long, value_name = "SECS")]
        average: Option<u64>,

        /// AMF variable-table CSV replacing the embedded defaults
        #[arg(long, value_name = "CSV")]
        variables: Option<PathBuf>,
    },

    /// Run the quality-control scan without writing output
    Check {
        /// Raw input files
        #[arg(required = true, value_name = "INFILES")]
        infiles: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report the latest readings for each tower unit
    Report {
        /// Base data directory (overrides config)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Units to report on, comma separated (overrides config)
        #[arg(long, value_delimiter = ',', value_name = "UNITS")]
        units: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// Print the structure of a NetCDF file
    Inspect {
        /// NetCDF file to inspect
        file: PathBuf,

        /// Also compute per-variable summary statistics
        #[arg(long)]
        stats: bool,
    },

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Configuration introspection commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the active configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the active config file)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

/// Output format for commands that support more than plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

//! `harmattan` - CLI for Gill 2D sonic anemometer data.
//!
//! This binary converts raw sonic captures to CF-1.6 NetCDF, runs the
//! quality-control scan on its own, reports the latest tower readings, and
//! inspects produced files.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use harmattan::amf::VariableTable;
use harmattan::cli::{Cli, Command, ConfigCommand, OutputFormat};
use harmattan::series::SonicSeries;
use harmattan::writer::{self, DatasetAttrs};
use harmattan::{gill, inspect, report};
use harmattan::{init_logging, Config, HarmattanError};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Convert {
            infiles,
            output,
            average,
            variables,
        } => handle_convert(&config, &infiles, &output, average, variables),
        Command::Check { infiles, json } => handle_check(&infiles, json),
        Command::Report { dir, units, format } => handle_report(&config, dir, &units, format),
        Command::Inspect { file, stats } => handle_inspect(&file, stats),
        Command::Config(config_cmd) => handle_config(&config, cli.config, config_cmd),
    }
}

fn handle_convert(
    config: &Config,
    infiles: &[PathBuf],
    output: &Path,
    average: Option<u64>,
    variables: Option<PathBuf>,
) -> Result<()> {
    let outcome = gill::scan_files(infiles)?;
    if outcome.records.is_empty() {
        return Err(HarmattanError::EmptyInput {
            rejected: outcome.stats.rejected(),
        }
        .into());
    }

    let mut series = SonicSeries::from_records(&outcome.records);
    if !series.is_monotonic() {
        warn!("input timestamps are not monotonic; output keeps file order");
    }

    let bin = average.unwrap_or(config.convert.average_seconds);
    if bin > 0 {
        series = series.resample_mean(bin);
    }

    let table = match variables.or_else(|| config.convert.variables_csv.clone()) {
        Some(path) => VariableTable::from_csv(&path)?,
        None => VariableTable::builtin(),
    };
    let attrs = DatasetAttrs {
        title: config.dataset.title.clone(),
        institution: config.dataset.institution.clone(),
        source: config.dataset.source.clone(),
        comment: config.dataset.comment.clone(),
    };
    writer::write_netcdf(&series, &table, &attrs, output)?;

    println!("{}", outcome.stats);
    println!("wrote {} ({} samples)", output.display(), series.len());
    Ok(())
}

fn handle_check(infiles: &[PathBuf], json: bool) -> Result<()> {
    let outcome = gill::scan_files(infiles)?;
    let first = outcome.records.iter().map(|r| r.timestamp).min();
    let last = outcome.records.iter().map(|r| r.timestamp).max();

    if json {
        let payload = serde_json::json!({
            "stats": outcome.stats,
            "first": first,
            "last": last,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", outcome.stats);
        if let (Some(first), Some(last)) = (first, last) {
            println!("readings from {first} to {last}");
        }
    }
    Ok(())
}

fn handle_report(
    config: &Config,
    dir: Option<PathBuf>,
    units: &[String],
    format: OutputFormat,
) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.report.data_dir.clone());
    let units = if units.is_empty() {
        config.report.units.clone()
    } else {
        units.to_vec()
    };

    let reports = report::report(&dir, &units, config.report.bin_seconds);
    match format {
        OutputFormat::Plain => print!("{}", report::render_plain(&reports)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

fn handle_inspect(file: &Path, stats: bool) -> Result<()> {
    let tree = inspect::read_structure(file)?;
    print!("{}", inspect::render_tree(&tree));

    if stats {
        println!();
        for var_path in tree.variable_paths() {
            match inspect::read_variable(file, &var_path) {
                Ok(data) => println!("{}", inspect::render_stats(&data)),
                Err(e) => println!("{}: {e}", var_path.trim_start_matches('/')),
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cli_config: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Dataset]");
                println!("  Title:          {}", config.dataset.title);
                println!("  Institution:    {}", config.dataset.institution);
                println!(
                    "  Source:         {}",
                    config.dataset.source.as_deref().unwrap_or("(unset)")
                );
                println!(
                    "  Comment:        {}",
                    config.dataset.comment.as_deref().unwrap_or("(unset)")
                );
                println!();
                println!("[Convert]");
                println!("  Average (s):    {}", config.convert.average_seconds);
                println!(
                    "  Variables CSV:  {}",
                    config
                        .convert
                        .variables_csv
                        .as_deref()
                        .map_or("(embedded)".to_string(), |p| p.display().to_string())
                );
                println!();
                println!("[Report]");
                println!("  Data dir:       {}", config.report.data_dir.display());
                println!("  Units:          {}", config.report.units.join(", "));
                println!("  Bin (s):        {}", config.report.bin_seconds);
            }
        }
        ConfigCommand::Path => {
            let path = cli_config.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(cli_config)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

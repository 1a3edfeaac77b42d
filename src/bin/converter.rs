//! Readings Converter - batch CLI turning reading XML files into CSV reports.

use clap::Parser;
use community_readings::{
    batch::{run_batch, BatchConfig},
    logging, Error, Result,
};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "readings_converter")]
#[command(about = "Convert community meter-reading XML files to CSV reports (batch mode)", long_about = None)]
struct Cli {
    /// Directory containing the input XML files
    #[arg(short, long, default_value = "./data/input")]
    input: PathBuf,

    /// Directory for the generated CSV files
    #[arg(short, long, default_value = "./data/output")]
    output: PathBuf,

    /// CSV field delimiter (single ASCII character)
    #[arg(short, long, default_value = ";")]
    delimiter: String,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(logging::log_level(cli.quiet, cli.verbose)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = BatchConfig {
        input_dir: cli.input.clone(),
        output_dir: cli.output.clone(),
        delimiter: parse_delimiter(&cli.delimiter)?,
    };

    run_batch(&config)?;
    Ok(())
}

fn parse_delimiter(value: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() && !matches!(byte, b'"' | b'\r' | b'\n') => Ok(*byte),
        _ => Err(Error::InvalidConfig(format!(
            "delimiter must be a single ASCII character, got '{}'",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["readings_converter"]);
        assert_eq!(cli.input, PathBuf::from("./data/input"));
        assert_eq!(cli.output, PathBuf::from("./data/output"));
        assert_eq!(parse_delimiter(&cli.delimiter).unwrap(), b';');
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("\"").is_err());
        assert!(parse_delimiter("é").is_err());
    }
}

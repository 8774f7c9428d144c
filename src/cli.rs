use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Stream delimited text into typed records for bulk loading", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert delimited lines from input into typed records and load them
    /// into the sink
    Stream(StreamArgs),
    /// Run the converter fixtures and exit without reading input
    Selftest,
}

#[derive(Debug, Args)]
pub struct StreamArgs {
    /// Free-text label echoed in progress and summary lines
    pub prefix: String,
    /// Estimated total row count; enables percent-complete and remaining-time
    /// reporting (non-positive disables it)
    pub total_rows: Option<i64>,
    /// Schema file describing the table, delimiter, and column converters
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
    /// Input file ('-' for stdin)
    #[arg(short = 'i', long = "input", default_value = "-")]
    pub input: PathBuf,
    /// Sink output file ('-' for stdout)
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
    /// Records per sink commit batch
    #[arg(long = "batch-size", default_value_t = crate::sink::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Character encoding of the input stream (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

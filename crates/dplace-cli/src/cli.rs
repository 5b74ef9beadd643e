//! CLI argument definitions for the `dplace` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use dplace_cli::logging::LogFormat;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "dplace",
    version,
    about = "Access and curate a D-PLACE data repository",
    long_about = "Access and curate a D-PLACE data repository.\n\n\
                  The repository is taken from --repos, else from the DPLACE_REPOS\n\
                  environment variable, else from ./dplace-data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root directory of the data repository.
    #[arg(long = "repos", value_name = "DIR", global = true)]
    pub repos: Option<PathBuf>,

    /// Warnings by default; -v adds info, -vv debug, -q keeps errors only.
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub color: Color,

    /// Log level for the dplace crates, taking precedence over -v and -q.
    #[arg(long = "log-level", value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(long = "log-format", value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub log_format: LogFormatArg,

    /// Append log lines to this file rather than stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List datasets.
    Ls,

    /// Check the repository for consistency.
    Check,

    /// Extract a subset of the data to a CSV file.
    Extract(ExtractArgs),

    /// Update data derived from a Glottolog repository clone.
    Glottolog(GlottologArgs),

    /// Annotate cited bibliography entries with languoids.
    Glottologbib,

    /// Write SOURCES.md.
    Index,

    /// Assign societies to TDWG level-2 regions.
    Tdwg,

    /// Convert the repository into a CLDF StructureDataset.
    Cldf(CldfArgs),
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Output CSV file.
    #[arg(value_name = "FILENAME")]
    pub filename: PathBuf,

    /// Restrict to these society ids.
    #[arg(long = "society", value_delimiter = ',')]
    pub society: Option<Vec<String>>,

    /// Restrict to the societies of this tree.
    #[arg(long = "tree")]
    pub tree: Option<String>,

    /// Restrict to these datasets.
    #[arg(long = "dataset", value_delimiter = ',')]
    pub dataset: Option<Vec<String>>,

    /// Restrict to these variables.
    #[arg(long = "variable", value_delimiter = ',')]
    pub variable: Option<Vec<String>>,
}

#[derive(Args)]
pub struct GlottologArgs {
    /// Path to a clone of the Glottolog data repository.
    #[arg(value_name = "GLOTTOLOG_REPOS")]
    pub glottolog: PathBuf,

    /// Glottolog release the clone is checked out at, e.g. 5.0.
    #[arg(long = "glottolog-version", value_name = "VERSION")]
    pub glottolog_version: String,
}

#[derive(Args)]
pub struct CldfArgs {
    /// Output directory of the dataset.
    #[arg(value_name = "OUTPUT_DIR")]
    pub out_dir: PathBuf,

    /// Convert a single raw dataset directory.
    #[arg(long = "dataset-dir", value_name = "DIR")]
    pub dataset_dir: Option<PathBuf>,

    /// Remove code references that do not resolve to a code.
    #[arg(long = "fix-codes")]
    pub fix_codes: bool,

    /// Skip validation of the written dataset.
    #[arg(long = "dev")]
    pub dev: bool,

    /// GeoJSON file with regions used to label societies.
    #[arg(long = "regions", value_name = "GEOJSON")]
    pub regions: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

/// `pretty` for reading, `compact` for one line per event, `json` for tools.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

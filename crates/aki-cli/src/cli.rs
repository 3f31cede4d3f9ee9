//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "aki",
    version,
    about = "Compute KDIGO acute kidney injury stages from ICU time series",
    long_about = "Compute hourly KDIGO acute kidney injury stages per stay.\n\n\
                  Reads urine output, creatinine, renal replacement therapy and\n\
                  demographics CSV files from a folder and writes one staged table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stage every stay found in a folder of CSV files.
    Run(RunArgs),

    /// List the probes run by default and the stage column each one adds.
    Probes,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Folder containing the dataset CSV files.
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Urine output file name inside FOLDER.
    #[arg(long = "urineoutput-file", default_value = "urineoutput.csv")]
    pub urineoutput_file: String,

    /// Creatinine file name inside FOLDER.
    #[arg(long = "creatinine-file", default_value = "creatinine.csv")]
    pub creatinine_file: String,

    /// Renal replacement therapy file name inside FOLDER.
    #[arg(long = "rrt-file", default_value = "rrt.csv")]
    pub rrt_file: String,

    /// Demographics file name inside FOLDER.
    #[arg(long = "demographics-file", default_value = "demographics.csv")]
    pub demographics_file: String,

    /// JSON analyser configuration (probes, preprocessors, key columns).
    #[arg(long = "config", value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Result file (default: <FOLDER>/aki.csv).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Stay identifier column (overrides the configuration file).
    #[arg(long = "stay-column", value_name = "COLUMN")]
    pub stay_column: Option<String>,

    /// Time column (overrides the configuration file).
    #[arg(long = "time-column", value_name = "COLUMN")]
    pub time_column: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

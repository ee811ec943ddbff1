use crate::configuration::constants::cargo_env::CARGO_PKG_NAME;
use crate::protocol::Protocol;
use crate::reporter::OutputFormat;
use clap::arg_enum;
use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

arg_enum! {
    #[derive(Debug, Clone, Copy)]
    pub enum LogLevel {
        Off, Error, Warn, Info, Debug, Trace,
    }
}

/// Converts Dart test runner output into test lifecycle signals.
#[derive(StructOpt, Debug)]
#[structopt(name = CARGO_PKG_NAME)]
pub struct Opt {
    /// Recorded test runner output, standard input when omitted
    #[structopt(parse(from_os_str))]
    pub input: Option<PathBuf>,

    /// Set a custom configuration file. Supported: YAML, JSON, TOML, HJSON
    #[structopt(long, short = "c", parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// Reporter protocol of the input
    #[structopt(case_insensitive = true, long, short = "p", possible_values = &Protocol::variants())]
    pub protocol: Option<Protocol>,

    /// Rendering of the emitted signals
    #[structopt(case_insensitive = true, long, short = "f", possible_values = &OutputFormat::variants())]
    pub format: Option<OutputFormat>,

    /// Report loading, setUpAll and tearDownAll pseudo tests even when they pass
    #[structopt(long)]
    pub reveal_hidden: bool,

    /// Sets a logging level
    #[structopt(case_insensitive = true, long, short = "L", possible_values = &LogLevel::variants(), env = "LOG_LEVEL")]
    pub logging: Option<LogLevel>,

    /// File to which application will write logs
    #[structopt(long, short = "O", env = "LOG_OUTPUT_FILE")]
    pub log_output_file: Option<PathBuf>,
}

impl Into<LevelFilter> for LogLevel {
    fn into(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

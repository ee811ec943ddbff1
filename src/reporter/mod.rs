pub mod summary;
pub mod teamcity;

use crate::reporter::summary::{Status, Summary};
use crate::reporter::teamcity::ServiceMessage;
use crate::signal::*;
use derivative::*;
use serde_derive::Deserialize;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Rendering of signals on the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `<verb> <name>` line per signal.
    Text,
    TeamCity,
    /// One JSON object per line.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

impl OutputFormat {
    pub fn variants() -> [&'static str; 3] {
        ["text", "teamcity", "json"]
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "teamcity" => Ok(OutputFormat::TeamCity),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Output format '{}' not supported", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::TeamCity => write!(f, "teamcity"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Writes every signal to `target` and keeps the tally of outcomes.
///
/// The first write failure stops further output and is returned by
/// [`Reporter::finish`].
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Reporter<W: Write> {
    format: OutputFormat,
    #[derivative(Debug = "ignore")]
    target: W,
    summary: Summary,
    error: Option<io::Error>,
}

impl<W: Write> Reporter<W> {
    pub fn new(target: W, format: OutputFormat) -> Self {
        Self {
            format,
            target,
            summary: Summary::default(),
            error: None,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn finish(mut self) -> io::Result<Summary> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.target.flush()?;
        Ok(self.summary)
    }

    fn report(&mut self, signal: Signal) {
        if let Some(status) = Status::of(&signal) {
            self.summary.record(status);
        }
        if let Signal::SessionFinished { success } = signal {
            self.summary.success = success;
        }
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.write(&signal) {
            error!("Failed to write {} signal: {}", self.format, e);
            self.error = Some(e);
        }
    }

    fn write(&mut self, signal: &Signal) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.target, "{}", signal.to_string().trim_end_matches('\n')),
            OutputFormat::TeamCity => match ServiceMessage::from_signal(signal) {
                Some(message) => writeln!(self.target, "{}", message),
                None => Ok(()),
            },
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.target, signal)?;
                writeln!(self.target)
            }
        }
    }
}

impl<W: Write> Signaller for Reporter<W> {
    fn session_attached(&mut self) {
        self.report(Signal::Attached)
    }

    fn test_started(&mut self, event: TestStarted) {
        self.report(Signal::TestStarted(event))
    }

    fn test_finished(&mut self, event: TestFinished) {
        self.report(Signal::TestFinished(event))
    }

    fn test_failed(&mut self, event: TestFailed) {
        self.report(Signal::TestFailed(event))
    }

    fn test_ignored(&mut self, event: TestIgnored) {
        self.report(Signal::TestIgnored(event))
    }

    fn test_output(&mut self, event: TestOutput) {
        self.report(Signal::TestOutput(event))
    }

    fn suite_finished(&mut self, event: SuiteFinished) {
        self.report(Signal::SuiteFinished(event))
    }

    fn tests_count(&mut self, count: u32) {
        self.report(Signal::TestsCount { count })
    }

    fn session_finished(&mut self, success: Option<bool>) {
        self.report(Signal::SessionFinished { success })
    }
}

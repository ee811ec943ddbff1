//! Colorized compact reporter output, e.g.
//!
//! ```text
//! 00:02 +1 -1: line endings fails once [E]
//!   Expected: 'a'
//!     Actual: 'b'
//!   package:test  expect
//! ```

use crate::protocol::event::{Failure, TestEvent};
use crate::time::elapsed::Elapsed;
use lazy_static::*;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref ANSI_REGEX: Regex =
        Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("Regex compilation error");
    static ref STATUS_REGEX: Regex = Regex::new(
        r"^(?:(?P<elapsed>(?:\d+:)?\d+:\d{2}) )?\+(?P<passed>\d+)(?: ~(?P<skipped>\d+))?(?: -(?P<failed>\d+))?: (?P<description>.*)$"
    )
    .expect("Regex compilation error");
    static ref STACK_FRAME_REGEX: Regex =
        Regex::new(r"^(?:dart:|package:|file:|\S+\.dart\b|===== asynchronous gap)")
            .expect("Regex compilation error");
}

const ERROR_MARKER: &str = " [E]";
const SUMMARIES: [&str; 4] = [
    "All tests passed!",
    "Some tests failed.",
    "No tests ran.",
    "All tests skipped.",
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counters {
    passed: u32,
    skipped: u32,
    failed: u32,
}

#[derive(Debug)]
struct StatusLine {
    elapsed: Option<Elapsed>,
    counters: Counters,
    description: String,
}

#[derive(Debug)]
struct RunningTest {
    name: String,
    started: Option<Elapsed>,
    failing: bool,
    message: Vec<String>,
    stack: Vec<String>,
}

impl RunningTest {
    fn new(name: String, started: Option<Elapsed>) -> Self {
        Self {
            name,
            started,
            failing: false,
            message: vec![],
            stack: vec![],
        }
    }

    fn into_failure(self, duration: Option<u64>) -> TestEvent {
        let message = self.message.join("\n").trim_end().to_owned();
        let stack_trace = if self.stack.is_empty() {
            None
        } else {
            Some(self.stack.join("\n"))
        };
        TestEvent::Fail(Failure {
            name: self.name,
            message,
            stack_trace,
            is_error: false,
            duration,
        })
    }
}

/// Tracks the counters of the last status line and the test they refer to.
#[derive(Debug, Default)]
pub struct LegacyDecoder {
    counters: Counters,
    current: Option<RunningTest>,
    last_elapsed: Option<Elapsed>,
}

impl LegacyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_status_line(text: &str) -> bool {
        STATUS_REGEX.is_match(&strip_ansi(text))
    }

    pub fn decode(&mut self, text: &str) -> Vec<TestEvent> {
        let text = strip_ansi(text);
        match parse_status(&text) {
            Some(status) => self.status(status),
            None => self.detail(&text),
        }
    }

    /// Reports a failing test whose details ran until the end of input.
    pub fn finish(&mut self) -> Vec<TestEvent> {
        match self.current.take() {
            Some(current) if current.failing => {
                let duration = elapsed_between(current.started, self.last_elapsed);
                vec![current.into_failure(duration)]
            }
            Some(current) => {
                debug!("Output ended while '{}' was still running", current.name);
                vec![]
            }
            None => vec![],
        }
    }

    fn status(&mut self, status: StatusLine) -> Vec<TestEvent> {
        let previous = std::mem::replace(&mut self.counters, status.counters);
        if status.elapsed.is_some() {
            self.last_elapsed = status.elapsed;
        }
        let description = status
            .description
            .trim_end()
            .trim_end_matches(ERROR_MARKER)
            .to_owned();
        let mut events = vec![];
        let mut closed = None;

        if let Some(mut current) = self.current.take() {
            let duration = elapsed_between(current.started, status.elapsed);
            if status.counters.failed > previous.failed {
                current.failing = true;
            }
            if current.failing {
                if current.name == description {
                    self.current = Some(current);
                } else {
                    closed = Some(current.name.clone());
                    events.push(current.into_failure(duration));
                }
            } else if status.counters.skipped > previous.skipped {
                closed = Some(current.name.clone());
                events.push(TestEvent::Skip {
                    name: current.name,
                    reason: None,
                });
            } else if status.counters.passed > previous.passed {
                closed = Some(current.name.clone());
                events.push(TestEvent::Pass {
                    name: current.name,
                    duration,
                });
            } else {
                self.current = Some(current);
            }
        }

        if SUMMARIES.contains(&description.as_str()) {
            if let Some(current) = self.current.take() {
                warn!("'{}' reported no outcome before the summary", current.name);
            }
            events.push(TestEvent::SessionDone {
                success: Some(status.counters.failed == 0),
                time: status.elapsed.map(Elapsed::as_millis),
            });
            return events;
        }

        let starts_new = match &self.current {
            Some(current) if current.name == description => false,
            Some(current) => {
                debug!(
                    "'{}' started while '{}' reported no outcome",
                    description, current.name
                );
                true
            }
            None => closed.as_deref() != Some(description.as_str()),
        };
        if starts_new {
            events.push(TestEvent::Start {
                name: description.clone(),
                time: status.elapsed.map(Elapsed::as_millis),
            });
            self.current = Some(RunningTest::new(description, status.elapsed));
        }
        events
    }

    fn detail(&mut self, text: &str) -> Vec<TestEvent> {
        match self.current.as_mut() {
            Some(current) if current.failing => {
                let line = text.trim_end();
                let line = line.strip_prefix("  ").unwrap_or(line);
                if line.trim().is_empty() && current.stack.is_empty() {
                    if !current.message.is_empty() {
                        current.message.push(String::new());
                    }
                } else if !current.stack.is_empty() || STACK_FRAME_REGEX.is_match(line.trim_start())
                {
                    if !line.trim().is_empty() {
                        current.stack.push(line.trim_start().to_owned());
                    }
                } else {
                    current.message.push(line.to_owned());
                }
                vec![]
            }
            Some(current) => vec![TestEvent::Output {
                name: Some(current.name.clone()),
                message: format!("{}\n", text),
            }],
            None => {
                if !text.trim().is_empty() {
                    debug!("Dropping line outside of any test: {}", text);
                }
                vec![]
            }
        }
    }
}

fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_REGEX.replace_all(text, "")
}

fn parse_status(text: &str) -> Option<StatusLine> {
    let caps = STATUS_REGEX.captures(text)?;
    let counter = |name: &str| -> u32 {
        caps.name(name)
            .and_then(|value| value.as_str().parse().ok())
            .unwrap_or(0)
    };
    let elapsed = match caps.name("elapsed") {
        Some(stamp) => match stamp.as_str().parse::<Elapsed>() {
            Ok(elapsed) => Some(elapsed),
            Err(e) => {
                debug!("{}", e);
                None
            }
        },
        None => None,
    };
    Some(StatusLine {
        elapsed,
        counters: Counters {
            passed: counter("passed"),
            skipped: counter("skipped"),
            failed: counter("failed"),
        },
        description: caps["description"].to_owned(),
    })
}

fn elapsed_between(started: Option<Elapsed>, now: Option<Elapsed>) -> Option<u64> {
    match (started, now) {
        (Some(started), Some(now)) => Some(now.since(started)),
        _ => None,
    }
}

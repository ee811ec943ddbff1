//! TeamCity service messages, as understood by IDE test consoles.

use crate::reader::OutputKind;
use crate::signal::Signal;
use std::fmt;

const ROOT_NODE_ID: &str = "0";

/// Node id as shown to the console; `0` stays reserved for the root.
fn node_id(id: u64) -> u64 {
    id.saturating_add(1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceMessage {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
}

impl ServiceMessage {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: vec![],
        }
    }

    pub fn attr<V: ToString>(mut self, key: &'static str, value: V) -> Self {
        self.attributes.push((key, value.to_string()));
        self
    }

    pub fn opt_attr<V: ToString>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    /// Service message for a signal; the end of the session has none.
    pub fn from_signal(signal: &Signal) -> Option<Self> {
        let message = match signal {
            Signal::Attached => ServiceMessage::new("enteredTheMatrix"),
            Signal::TestStarted(e) => {
                let name = if e.is_suite { "testSuiteStarted" } else { "testStarted" };
                ServiceMessage::new(name)
                    .attr("name", &e.name)
                    .attr("nodeId", node_id(e.id))
                    .attr(
                        "parentNodeId",
                        e.parent_id.map_or_else(|| ROOT_NODE_ID.to_owned(), |id| node_id(id).to_string()),
                    )
                    .opt_attr("locationHint", e.location_hint.as_ref())
                    .attr("nodeType", e.node_type)
                    .opt_attr("nodeArgs", e.node_args.as_ref())
            }
            Signal::TestFinished(e) => ServiceMessage::new("testFinished")
                .attr("name", &e.name)
                .attr("nodeId", node_id(e.id))
                .opt_attr("duration", e.duration_ms),
            Signal::TestFailed(e) => {
                let mut message = ServiceMessage::new("testFailed")
                    .attr("name", &e.name)
                    .attr("nodeId", node_id(e.id))
                    .attr("message", &e.message)
                    .opt_attr("details", e.stack_trace.as_ref())
                    .opt_attr("duration", e.duration_ms);
                if e.is_error {
                    message = message.attr("error", "true");
                }
                if let (Some(expected), Some(actual)) = (&e.expected, &e.actual) {
                    message = message
                        .attr("type", "comparisonFailure")
                        .attr("expected", expected)
                        .attr("actual", actual)
                        .opt_attr("expectedFile", e.expected_file_path.as_ref());
                }
                message
            }
            Signal::TestIgnored(e) => ServiceMessage::new("testIgnored")
                .attr("name", &e.name)
                .attr("nodeId", node_id(e.id))
                .attr("message", e.reason.as_deref().unwrap_or_default())
                .opt_attr("details", e.stack_trace.as_ref()),
            Signal::TestOutput(e) => {
                let name = match e.stream {
                    OutputKind::Stderr => "testStdErr",
                    OutputKind::Stdout | OutputKind::System => "testStdOut",
                };
                ServiceMessage::new(name)
                    .attr("name", &e.name)
                    .attr("nodeId", node_id(e.id))
                    .attr("out", &e.message)
            }
            Signal::SuiteFinished(e) => ServiceMessage::new("testSuiteFinished")
                .attr("name", &e.name)
                .attr("nodeId", node_id(e.id)),
            Signal::TestsCount { count } => ServiceMessage::new("testCount").attr("count", count),
            Signal::SessionFinished { .. } => return None,
        };
        Some(message)
    }
}

impl fmt::Display for ServiceMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "##teamcity[{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {}='{}'", key, escape(value))?;
        }
        write!(f, "]")
    }
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => escaped.push_str("||"),
            '\'' => escaped.push_str("|'"),
            '\n' => escaped.push_str("|n"),
            '\r' => escaped.push_str("|r"),
            '[' => escaped.push_str("|["),
            ']' => escaped.push_str("|]"),
            c => escaped.push(c),
        }
    }
    escaped
}

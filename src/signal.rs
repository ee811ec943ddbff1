//! Test lifecycle signals and the [`Signaller`] contract that consumes them.

use crate::reader::OutputKind;
use serde_derive::Serialize;
use std::fmt;

/// Kind of tree node announced by [`TestStarted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Suite,
    Group,
    Test,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeKind::Suite => write!(f, "suite"),
            NodeKind::Group => write!(f, "group"),
            NodeKind::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStarted {
    pub name: String,
    pub id: u64,
    /// `None` attaches the node to the session root.
    pub parent_id: Option<u64>,
    pub location_hint: Option<String>,
    pub node_type: NodeKind,
    pub node_args: Option<String>,
    pub is_suite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFinished {
    pub name: String,
    pub id: u64,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFailed {
    pub name: String,
    pub id: u64,
    pub message: String,
    pub stack_trace: Option<String>,
    /// Unexpected exception rather than a failed expectation.
    pub is_error: bool,
    pub actual: Option<String>,
    pub expected: Option<String>,
    pub expected_file_path: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestIgnored {
    pub name: String,
    pub id: u64,
    pub reason: Option<String>,
    pub stack_trace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutput {
    pub name: String,
    pub id: u64,
    pub message: String,
    pub stream: OutputKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteFinished {
    pub name: String,
    pub id: u64,
}

/// Receiver of the ordered signal sequence.
///
/// `test_failed` and `test_ignored` are terminal for a test, exactly like
/// `test_finished`: a reported test gets exactly one of the three. Output
/// may still follow a terminal signal until the runner reports the test
/// done.
pub trait Signaller {
    fn session_attached(&mut self);
    fn test_started(&mut self, event: TestStarted);
    fn test_finished(&mut self, event: TestFinished);
    fn test_failed(&mut self, event: TestFailed);
    fn test_ignored(&mut self, event: TestIgnored);
    fn test_output(&mut self, event: TestOutput);
    fn suite_finished(&mut self, event: SuiteFinished);

    fn tests_count(&mut self, _count: u32) {}

    fn session_finished(&mut self, _success: Option<bool>) {}
}

/// Owned form of every signal, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "signal", rename_all = "camelCase")]
pub enum Signal {
    Attached,
    TestStarted(TestStarted),
    TestFinished(TestFinished),
    TestFailed(TestFailed),
    TestIgnored(TestIgnored),
    TestOutput(TestOutput),
    SuiteFinished(SuiteFinished),
    TestsCount { count: u32 },
    SessionFinished { success: Option<bool> },
}

/// One line per signal, `<verb> <name> [detail]`.
impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Signal::Attached => write!(f, "attached"),
            Signal::TestStarted(e) if e.is_suite => write!(f, "suite started {}", e.name),
            Signal::TestStarted(e) => write!(f, "start {}", e.name),
            Signal::TestFinished(e) => write!(f, "pass {}", e.name),
            Signal::TestFailed(e) => write!(f, "fail {} {}", e.name, e.is_error),
            Signal::TestIgnored(e) => match &e.reason {
                Some(reason) => write!(f, "skip {} {}", e.name, reason),
                None => write!(f, "skip {}", e.name),
            },
            Signal::TestOutput(e) => write!(f, "print {} {}", e.name, e.message),
            Signal::SuiteFinished(e) => write!(f, "suite finished {}", e.name),
            Signal::TestsCount { count } => write!(f, "count {}", count),
            Signal::SessionFinished { success: Some(success) } => write!(f, "done {}", success),
            Signal::SessionFinished { success: None } => write!(f, "done"),
        }
    }
}

impl Signaller for Vec<Signal> {
    fn session_attached(&mut self) {
        self.push(Signal::Attached);
    }

    fn test_started(&mut self, event: TestStarted) {
        self.push(Signal::TestStarted(event));
    }

    fn test_finished(&mut self, event: TestFinished) {
        self.push(Signal::TestFinished(event));
    }

    fn test_failed(&mut self, event: TestFailed) {
        self.push(Signal::TestFailed(event));
    }

    fn test_ignored(&mut self, event: TestIgnored) {
        self.push(Signal::TestIgnored(event));
    }

    fn test_output(&mut self, event: TestOutput) {
        self.push(Signal::TestOutput(event));
    }

    fn suite_finished(&mut self, event: SuiteFinished) {
        self.push(Signal::SuiteFinished(event));
    }

    fn tests_count(&mut self, count: u32) {
        self.push(Signal::TestsCount { count });
    }

    fn session_finished(&mut self, success: Option<bool>) {
        self.push(Signal::SessionFinished { success });
    }
}

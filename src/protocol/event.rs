//! Decoded form of one runner output line.

use serde_derive::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub protocol_version: Option<String>,
    pub runner_version: Option<String>,
    pub pid: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuiteInfo {
    pub id: u64,
    pub platform: Option<String>,
    pub path: Option<String>,
}

/// Position of a test or group declaration in its source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupInfo {
    pub id: u64,
    pub suite_id: Option<u64>,
    pub parent_id: Option<u64>,
    pub name: Option<String>,
    pub test_count: Option<u32>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestInfo {
    pub id: u64,
    pub name: String,
    pub suite_id: Option<u64>,
    /// Enclosing groups, outermost first.
    pub group_ids: Vec<u64>,
    pub skip: bool,
    pub skip_reason: Option<String>,
    pub location: Location,
    pub time: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Success,
    Failure,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestDone {
    pub test_id: u64,
    pub result: TestResult,
    pub hidden: bool,
    pub skipped: bool,
    pub time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestError {
    pub test_id: u64,
    pub error: String,
    pub stack_trace: String,
    pub is_failure: bool,
    pub time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Print {
    pub test_id: u64,
    pub message: String,
    pub time: Option<u64>,
}

/// Failure of a name-keyed test.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub name: String,
    pub message: String,
    pub stack_trace: Option<String>,
    pub is_error: bool,
    pub duration: Option<u64>,
}

/// One lifecycle transition reported by the test runner.
///
/// Id-keyed variants come from the JSON reporter protocol. Name-keyed
/// variants (`Start` .. `Output`) come from the compact JSON form and the
/// legacy text reporter, where the test name is the only identity.
#[derive(Debug, Clone, PartialEq)]
pub enum TestEvent {
    SessionStart(SessionInfo),
    AllSuites { count: u32 },
    Suite(SuiteInfo),
    GroupStart(GroupInfo),
    TestStart(TestInfo),
    TestDone(TestDone),
    Error(TestError),
    Print(Print),
    SessionDone { success: Option<bool>, time: Option<u64> },
    Start { name: String, time: Option<u64> },
    Pass { name: String, duration: Option<u64> },
    Fail(Failure),
    Skip { name: String, reason: Option<String> },
    Output { name: Option<String>, message: String },
    /// The runner rejected `--reporter json`; package:test is too old.
    ReporterUnsupported,
}

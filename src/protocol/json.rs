//! JSON reporter protocol (`pub run test --reporter json`), one object per
//! line, discriminated by `type`.

use crate::protocol::event::*;
use serde_derive::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum WireEvent {
    Start(WireStart),
    AllSuites(WireAllSuites),
    Suite(WireSuiteEvent),
    Group(WireGroupEvent),
    TestStart(WireTestStart),
    TestDone(WireTestDone),
    Error(WireError),
    Print(WirePrint),
    Message(WirePrint),
    Done(WireDone),
    Pass(WirePass),
    Fail(WireFail),
    Skip(WireSkip),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStart {
    protocol_version: Option<String>,
    runner_version: Option<String>,
    pid: Option<u32>,
    name: Option<String>,
    time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireAllSuites {
    count: u32,
}

#[derive(Debug, Deserialize)]
struct WireSuiteEvent {
    suite: WireSuite,
}

#[derive(Debug, Deserialize)]
struct WireSuite {
    id: u64,
    platform: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireGroupEvent {
    group: WireGroup,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroup {
    id: u64,
    #[serde(rename = "suiteID")]
    suite_id: Option<u64>,
    #[serde(rename = "parentID")]
    parent_id: Option<u64>,
    name: Option<String>,
    test_count: Option<u32>,
    line: Option<u32>,
    column: Option<u32>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMetadata {
    #[serde(default)]
    skip: bool,
    skip_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTestStart {
    test: WireTest,
    time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireTest {
    id: u64,
    name: String,
    #[serde(rename = "suiteID")]
    suite_id: Option<u64>,
    #[serde(rename = "groupIDs", default)]
    group_ids: Vec<u64>,
    metadata: Option<WireMetadata>,
    line: Option<u32>,
    column: Option<u32>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTestDone {
    #[serde(rename = "testID")]
    test_id: u64,
    result: TestResult,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    skipped: bool,
    time: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireError {
    #[serde(rename = "testID")]
    test_id: Option<u64>,
    name: Option<String>,
    #[serde(default)]
    error: String,
    #[serde(default)]
    stack_trace: String,
    #[serde(default)]
    is_failure: bool,
    time: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrint {
    #[serde(rename = "testID")]
    test_id: Option<u64>,
    name: Option<String>,
    #[serde(default)]
    message: String,
    message_type: Option<String>,
    time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireDone {
    success: Option<bool>,
    time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WirePass {
    name: Option<String>,
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFail {
    name: Option<String>,
    fail_message: Option<String>,
    message: Option<String>,
    stack_trace: Option<String>,
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireSkip {
    name: Option<String>,
    reason: Option<String>,
}

/// Decodes JSON lines, remembering the name of the last compact `start`
/// so that name-less compact events can be attributed to it.
#[derive(Debug, Default)]
pub struct JsonDecoder {
    current: Option<String>,
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(None)` for well-formed objects that carry nothing to report.
    pub fn decode(&mut self, text: &str) -> Result<Option<TestEvent>, serde_json::Error> {
        let wire: WireEvent = serde_json::from_str(text)?;
        Ok(self.convert(wire))
    }

    fn convert(&mut self, wire: WireEvent) -> Option<TestEvent> {
        let event = match wire {
            WireEvent::Start(start) => match start.name {
                Some(name) => {
                    self.current = Some(name.clone());
                    TestEvent::Start {
                        name,
                        time: start.time,
                    }
                }
                None => TestEvent::SessionStart(SessionInfo {
                    protocol_version: start.protocol_version,
                    runner_version: start.runner_version,
                    pid: start.pid,
                }),
            },
            WireEvent::AllSuites(all) => TestEvent::AllSuites { count: all.count },
            WireEvent::Suite(WireSuiteEvent { suite }) => TestEvent::Suite(SuiteInfo {
                id: suite.id,
                platform: suite.platform,
                path: suite.path,
            }),
            WireEvent::Group(WireGroupEvent { group }) => TestEvent::GroupStart(GroupInfo {
                id: group.id,
                suite_id: group.suite_id,
                parent_id: group.parent_id,
                name: group.name,
                test_count: group.test_count,
                location: Location {
                    line: group.line,
                    column: group.column,
                    url: group.url,
                },
            }),
            WireEvent::TestStart(WireTestStart { test, time }) => {
                let metadata = test.metadata.unwrap_or_default();
                TestEvent::TestStart(TestInfo {
                    id: test.id,
                    name: test.name,
                    suite_id: test.suite_id,
                    group_ids: test.group_ids,
                    skip: metadata.skip,
                    skip_reason: metadata.skip_reason,
                    location: Location {
                        line: test.line,
                        column: test.column,
                        url: test.url,
                    },
                    time,
                })
            }
            WireEvent::TestDone(done) => TestEvent::TestDone(TestDone {
                test_id: done.test_id,
                result: done.result,
                hidden: done.hidden,
                skipped: done.skipped,
                time: done.time,
            }),
            WireEvent::Error(error) => match error.test_id {
                Some(test_id) => TestEvent::Error(TestError {
                    test_id,
                    error: error.error,
                    stack_trace: error.stack_trace,
                    is_failure: error.is_failure,
                    time: error.time,
                }),
                None => {
                    let name = self.name_or_current(error.name)?;
                    self.close(&name);
                    TestEvent::Fail(Failure {
                        name,
                        message: error.error,
                        stack_trace: non_blank(error.stack_trace),
                        is_error: !error.is_failure,
                        duration: None,
                    })
                }
            },
            WireEvent::Print(print) | WireEvent::Message(print) => {
                if let Some(kind) = &print.message_type {
                    trace!("Message of type {} treated as print", kind);
                }
                match print.test_id {
                    Some(test_id) => TestEvent::Print(Print {
                        test_id,
                        message: print.message,
                        time: print.time,
                    }),
                    None => TestEvent::Output {
                        name: self.name_or_current(print.name),
                        message: print.message,
                    },
                }
            }
            WireEvent::Done(done) => TestEvent::SessionDone {
                success: done.success,
                time: done.time,
            },
            WireEvent::Pass(pass) => {
                let name = self.name_or_current(pass.name)?;
                self.close(&name);
                TestEvent::Pass {
                    name,
                    duration: pass.duration,
                }
            }
            WireEvent::Fail(fail) => {
                let name = self.name_or_current(fail.name)?;
                self.close(&name);
                TestEvent::Fail(Failure {
                    name,
                    message: fail.fail_message.or(fail.message).unwrap_or_default(),
                    stack_trace: fail.stack_trace.and_then(non_blank),
                    is_error: false,
                    duration: fail.duration,
                })
            }
            WireEvent::Skip(skip) => {
                let name = self.name_or_current(skip.name)?;
                self.close(&name);
                TestEvent::Skip {
                    name,
                    reason: skip.reason,
                }
            }
            WireEvent::Unknown => {
                trace!("Skipping event of unknown type");
                return None;
            }
        };
        Some(event)
    }

    fn name_or_current(&self, name: Option<String>) -> Option<String> {
        name.or_else(|| self.current.clone())
    }

    fn close(&mut self, name: &str) {
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
    }
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

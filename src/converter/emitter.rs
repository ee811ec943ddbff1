use crate::converter::tree::{node_args, NodeStatus, TestTree};
use crate::protocol::event::{Failure, GroupInfo, Print, TestDone, TestError, TestEvent, TestInfo, TestResult};
use crate::reader::OutputKind;
use crate::signal::*;
use crate::time::duration_between;
use lazy_static::*;
use regex::Regex;

lazy_static! {
    static ref COMPARISON_REGEX: Regex =
        Regex::new(r"(?m)^[ \t]*Expected: (?P<expected>.*)\r?\n[ \t]*Actual: (?P<actual>.*)$")
            .expect("Regex compilation error");
}

const COMPARISON_FAILED: &str = "Comparison failed";
const FAILED_TO_START: &str = "Failed to start";
const UPDATE_PACKAGE_TEST: &str =
    "Please update your pubspec.yaml dependency on package:test to version 0.12.9 or later.";

/// Failure text split into a headline and an optional expected/actual pair.
#[derive(Debug, PartialEq)]
struct Comparison {
    message: String,
    expected: Option<String>,
    actual: Option<String>,
}

impl Comparison {
    fn parse(text: &str) -> Self {
        match COMPARISON_REGEX.captures(text) {
            Some(caps) => {
                let start = caps.get(0).map_or(0, |m| m.start());
                let headline = text[..start].trim();
                Self {
                    message: if headline.is_empty() {
                        COMPARISON_FAILED.to_owned()
                    } else {
                        headline.to_owned()
                    },
                    expected: Some(caps["expected"].trim_end().to_owned()),
                    actual: Some(caps["actual"].trim_end().to_owned()),
                }
            }
            None => Self {
                message: text.to_owned(),
                expected: None,
                actual: None,
            },
        }
    }
}

/// Maps decoded events onto the signal sequence, one event at a time.
#[derive(Debug, Default)]
pub struct SignalEmitter {
    tree: TestTree,
    attached: bool,
    reveal_hidden: bool,
}

impl SignalEmitter {
    pub fn new(reveal_hidden: bool) -> Self {
        Self {
            reveal_hidden,
            ..Self::default()
        }
    }

    pub fn set_reveal_hidden(&mut self, reveal_hidden: bool) {
        self.reveal_hidden = reveal_hidden;
    }

    pub fn emit<S: Signaller>(&mut self, event: TestEvent, signaller: &mut S) {
        if !self.attached {
            self.attached = true;
            signaller.session_attached();
        }
        match event {
            TestEvent::SessionStart(info) => debug!(
                "Runner {} speaks protocol {} (pid {:?})",
                info.runner_version.as_deref().unwrap_or("unknown"),
                info.protocol_version.as_deref().unwrap_or("unknown"),
                info.pid
            ),
            TestEvent::AllSuites { count } => debug!("{} suites to load", count),
            TestEvent::Suite(info) => self.tree.add_suite(info),
            TestEvent::GroupStart(info) => self.group_start(info, signaller),
            TestEvent::TestStart(info) => self.test_start(info, signaller),
            TestEvent::TestDone(done) => self.test_done(done, signaller),
            TestEvent::Error(error) => self.error(error, signaller),
            TestEvent::Print(print) => self.print(print, signaller),
            TestEvent::SessionDone { success, .. } => self.session_done(success, signaller),
            TestEvent::Start { name, time } => self.named_start(&name, time, signaller),
            TestEvent::Pass { name, duration } => self.named_pass(&name, duration, signaller),
            TestEvent::Fail(failure) => self.named_fail(failure, signaller),
            TestEvent::Skip { name, reason } => self.named_skip(&name, reason, signaller),
            TestEvent::Output { name, message } => self.named_output(name, message, signaller),
            TestEvent::ReporterUnsupported => self.reporter_unsupported(signaller),
        }
    }

    fn group_start<S: Signaller>(&mut self, info: GroupInfo, signaller: &mut S) {
        if self.tree.group(info.id).is_some() {
            debug!("Group {} announced twice", info.id);
            return;
        }
        let group = self.tree.add_group(info);
        if group.parent_id.is_none() {
            match group.test_count {
                Some(count) if count > 0 => signaller.tests_count(count),
                _ => {}
            }
        }
    }

    fn test_start<S: Signaller>(&mut self, info: TestInfo, signaller: &mut S) {
        let id = info.id;
        if self.tree.test(id).is_some() {
            debug!("Test {} announced twice", id);
            return;
        }
        let node = self.tree.add_test(info);
        if node.skip {
            let reason = node.skip_reason.clone();
            self.start_test(id, signaller);
            self.terminate(id, NodeStatus::Skipped);
            signaller.test_ignored(TestIgnored {
                name: self.display_name(id),
                id,
                reason,
                stack_trace: None,
            });
        } else if !node.hidden_if_passed || self.reveal_hidden {
            self.start_test(id, signaller);
        }
    }

    fn test_done<S: Signaller>(&mut self, done: TestDone, signaller: &mut S) {
        let id = done.test_id;
        let node = match self.tree.test(id) {
            Some(node) => node,
            None => {
                debug!("Completion of unknown test {}", id);
                return;
            }
        };
        let duration_ms = duration_between(node.start_time, done.time);
        let status = node.status;
        let hidden = node.hidden_if_passed && !status.is_reported();

        if status.is_terminal() {
            trace!("Test {} already reported its outcome", id);
        } else if done.result == TestResult::Success {
            if done.skipped && !hidden {
                self.terminate(id, NodeStatus::Skipped);
                signaller.test_ignored(TestIgnored {
                    name: self.display_name(id),
                    id,
                    reason: None,
                    stack_trace: None,
                });
            } else if !hidden {
                self.terminate(id, NodeStatus::Passed);
                signaller.test_finished(TestFinished {
                    name: self.display_name(id),
                    id,
                    duration_ms,
                });
            }
        } else {
            if hidden {
                self.start_test(id, signaller);
            }
            let is_error = done.result == TestResult::Error;
            self.terminate(id, if is_error { NodeStatus::Broken } else { NodeStatus::Failed });
            signaller.test_failed(TestFailed {
                name: self.display_name(id),
                id,
                message: String::new(),
                stack_trace: None,
                is_error,
                actual: None,
                expected: None,
                expected_file_path: None,
                duration_ms,
            });
        }

        for group_id in self.tree.complete_test(id) {
            self.suite_finished(group_id, signaller);
        }
    }

    fn error<S: Signaller>(&mut self, error: TestError, signaller: &mut S) {
        let id = error.test_id;
        let (status, start_time) = match self.tree.test(id) {
            Some(node) => (node.status, node.start_time),
            None => {
                debug!("Error for unknown test {}: {}", id, error.error);
                return;
            }
        };
        let stack_trace = Some(error.stack_trace).filter(|trace| !trace.is_empty());
        if status.is_terminal() {
            self.output(id, with_newline(error.error), OutputKind::Stderr, signaller);
            if let Some(stack_trace) = stack_trace {
                self.output(id, with_newline(stack_trace), OutputKind::Stderr, signaller);
            }
            return;
        }
        if !status.is_reported() {
            self.start_test(id, signaller);
        }
        if !error.is_failure {
            trace!("Test {} raised an unexpected error", id);
        }
        self.fail(
            id,
            &error.error,
            None,
            false,
            duration_between(start_time, error.time),
            signaller,
        );
        if let Some(stack_trace) = stack_trace {
            self.output(id, with_newline(stack_trace), OutputKind::Stderr, signaller);
        }
    }

    fn print<S: Signaller>(&mut self, print: Print, signaller: &mut S) {
        let id = print.test_id;
        let reveal = match self.tree.test(id) {
            Some(node) if node.status.is_reported() => false,
            Some(node) if node.is_loading() => true,
            Some(node) => {
                debug!("Dropping output of hidden '{}': {}", node.name, print.message);
                return;
            }
            None => {
                debug!("Output for unknown test {}: {}", id, print.message);
                return;
            }
        };
        if reveal {
            self.start_test(id, signaller);
        }
        self.output(id, with_newline(print.message), OutputKind::Stdout, signaller);
    }

    fn session_done<S: Signaller>(&mut self, success: Option<bool>, signaller: &mut S) {
        for group_id in self.tree.close_open_groups() {
            self.suite_finished(group_id, signaller);
        }
        signaller.session_finished(success);
    }

    fn named_start<S: Signaller>(&mut self, name: &str, time: Option<u64>, signaller: &mut S) {
        if let Some(id) = self.tree.named_id(name) {
            if self.tree.test(id).map_or(false, |node| !node.status.is_terminal()) {
                debug!("'{}' is already running", name);
                return;
            }
        }
        let id = self.tree.add_named(name, time);
        self.start_test(id, signaller);
    }

    fn named_pass<S: Signaller>(&mut self, name: &str, duration_ms: Option<u64>, signaller: &mut S) {
        if let Some(id) = self.running_named(name) {
            self.terminate(id, NodeStatus::Passed);
            signaller.test_finished(TestFinished {
                name: name.to_owned(),
                id,
                duration_ms,
            });
        }
    }

    fn named_fail<S: Signaller>(&mut self, failure: Failure, signaller: &mut S) {
        let id = match self.tree.named_id(&failure.name) {
            Some(id) => id,
            None => {
                debug!("Failure of unknown test '{}'", failure.name);
                return;
            }
        };
        let terminal = self.tree.test(id).map_or(true, |node| node.status.is_terminal());
        if terminal {
            self.output(id, with_newline(failure.message), OutputKind::Stderr, signaller);
            if let Some(stack_trace) = failure.stack_trace {
                self.output(id, with_newline(stack_trace), OutputKind::Stderr, signaller);
            }
        } else {
            self.fail(
                id,
                &failure.message,
                failure.stack_trace.filter(|trace| !trace.is_empty()),
                failure.is_error,
                failure.duration,
                signaller,
            );
        }
    }

    fn named_skip<S: Signaller>(&mut self, name: &str, reason: Option<String>, signaller: &mut S) {
        if let Some(id) = self.running_named(name) {
            self.terminate(id, NodeStatus::Skipped);
            signaller.test_ignored(TestIgnored {
                name: name.to_owned(),
                id,
                reason,
                stack_trace: None,
            });
        }
    }

    fn named_output<S: Signaller>(&mut self, name: Option<String>, message: String, signaller: &mut S) {
        match name.as_deref().and_then(|name| self.tree.named_id(name)) {
            Some(id) => self.output(id, with_newline(message), OutputKind::Stdout, signaller),
            None => debug!("Dropping output outside of any test: {}", message),
        }
    }

    fn reporter_unsupported<S: Signaller>(&mut self, signaller: &mut S) {
        warn!("{}", UPDATE_PACKAGE_TEST);
        let id = self.tree.add_named(FAILED_TO_START, None);
        self.start_test(id, signaller);
        self.fail(id, UPDATE_PACKAGE_TEST, None, true, None, signaller);
    }

    fn running_named(&self, name: &str) -> Option<u64> {
        match self.tree.named_id(name) {
            Some(id) if self.tree.test(id).map_or(false, |node| !node.status.is_terminal()) => Some(id),
            Some(_) => {
                debug!("'{}' already reported its outcome", name);
                None
            }
            None => {
                debug!("Outcome of unknown test '{}'", name);
                None
            }
        }
    }

    /// Announces a test, preceded by every enclosing group not shown yet.
    fn start_test<S: Signaller>(&mut self, id: u64, signaller: &mut S) {
        let node = match self.tree.test(id) {
            Some(node) => node,
            None => return,
        };
        let parent_id = self.tree.test_parent(node);
        if let Some(parent_id) = parent_id {
            self.start_groups(parent_id, signaller);
        }
        let node = match self.tree.test(id) {
            Some(node) => node,
            None => return,
        };
        let started = TestStarted {
            name: node.display_name.clone(),
            id,
            parent_id,
            location_hint: self
                .tree
                .location_hint(node.suite_id, parent_id, Some(&node.display_name)),
            node_type: NodeKind::Test,
            node_args: node_args(&node.location),
            is_suite: false,
        };
        if let Some(node) = self.tree.test_mut(id) {
            node.status = NodeStatus::Running;
        }
        signaller.test_started(started);
    }

    fn start_groups<S: Signaller>(&mut self, group_id: u64, signaller: &mut S) {
        for id in self.tree.unstarted_chain(group_id) {
            let started = match self.tree.group(id) {
                Some(group) => {
                    let parent_id = self.tree.group_parent(group);
                    let name = group.display_name.clone().unwrap_or_default();
                    let is_root = group.parent_id.is_none();
                    TestStarted {
                        location_hint: self.tree.location_hint(
                            group.suite_id,
                            group.parent_id,
                            Some(&name).filter(|_| !is_root).map(String::as_str),
                        ),
                        name,
                        id,
                        parent_id,
                        node_type: if is_root { NodeKind::Suite } else { NodeKind::Group },
                        node_args: node_args(&group.location),
                        is_suite: true,
                    }
                }
                None => continue,
            };
            self.tree.mark_group_started(id);
            signaller.test_started(started);
        }
    }

    fn fail<S: Signaller>(
        &mut self,
        id: u64,
        text: &str,
        stack_trace: Option<String>,
        is_error: bool,
        duration_ms: Option<u64>,
        signaller: &mut S,
    ) {
        let comparison = Comparison::parse(text);
        self.terminate(id, if is_error { NodeStatus::Broken } else { NodeStatus::Failed });
        signaller.test_failed(TestFailed {
            name: self.display_name(id),
            id,
            message: comparison.message,
            stack_trace,
            is_error,
            actual: comparison.actual,
            expected: comparison.expected,
            expected_file_path: None,
            duration_ms,
        });
    }

    fn output<S: Signaller>(&self, id: u64, message: String, stream: OutputKind, signaller: &mut S) {
        signaller.test_output(TestOutput {
            name: self.display_name(id),
            id,
            message,
            stream,
        });
    }

    fn suite_finished<S: Signaller>(&self, id: u64, signaller: &mut S) {
        if let Some(name) = self.tree.group(id).and_then(|group| group.display_name.clone()) {
            signaller.suite_finished(SuiteFinished { name, id });
        }
    }

    fn terminate(&mut self, id: u64, status: NodeStatus) {
        if let Some(node) = self.tree.test_mut(id) {
            node.status = status;
        }
    }

    fn display_name(&self, id: u64) -> String {
        self.tree
            .test(id)
            .map(|node| node.display_name.clone())
            .unwrap_or_default()
    }
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

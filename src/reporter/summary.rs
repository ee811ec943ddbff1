use crate::signal::Signal;
use serde_derive::Serialize;
use std::fmt;

/// Final outcome of one reported test.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Failed,
    Broken,
    Passed,
    Skipped,
}

impl Status {
    /// Outcome carried by a terminal signal.
    pub fn of(signal: &Signal) -> Option<Self> {
        match signal {
            Signal::TestFinished(_) => Some(Status::Passed),
            Signal::TestFailed(failed) if failed.is_error => Some(Status::Broken),
            Signal::TestFailed(_) => Some(Status::Failed),
            Signal::TestIgnored(_) => Some(Status::Skipped),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub passed: u32,
    pub failed: u32,
    pub broken: u32,
    pub skipped: u32,
    /// Verdict of the runner itself, when it reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl Summary {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Broken => self.broken += 1,
            Status::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.broken + self.skipped
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.broken == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} tests: {} passed, {} failed, {} broken, {} skipped",
            self.total(),
            self.passed,
            self.failed,
            self.broken,
            self.skipped
        )
    }
}

use crate::time::error::Error;
use core::str::FromStr;
use lazy_static::*;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref ELAPSED_REGEX: Regex = Regex::new(
        r"^(?:(?P<hours>\d+):)?(?P<minutes>\d+):(?P<seconds>\d{2})$"
    )
    .expect("Regex compilation error");
}

/// Wall clock stamp printed in front of compact reporter status lines,
/// e.g. `00:04` or `1:02:17`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed {
    seconds: u64,
}

impl Elapsed {
    pub fn as_millis(self) -> u64 {
        self.seconds.saturating_mul(1000)
    }

    /// Milliseconds from `earlier` to `self`, clamped at zero.
    pub fn since(self, earlier: Elapsed) -> u64 {
        self.as_millis().saturating_sub(earlier.as_millis())
    }
}

impl FromStr for Elapsed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = match ELAPSED_REGEX.captures(s) {
            Some(caps) => caps,
            None => return Err(Error::Syntax(format!("'{}' is not a MM:SS stamp", s))),
        };
        let field = |name: &str| -> Result<u64, Error> {
            match caps.name(name) {
                Some(value) => value
                    .as_str()
                    .parse::<u64>()
                    .map_err(|e| Error::OutOfRange(format!("{} in '{}'", e, s))),
                None => Ok(0),
            }
        };
        let hours = field("hours")?;
        let minutes = field("minutes")?;
        let seconds = field("seconds")?;
        if seconds >= 60 || (caps.name("hours").is_some() && minutes >= 60) {
            return Err(Error::OutOfRange(format!("'{}'", s)));
        }
        hours
            .checked_mul(60 * 60)
            .and_then(|total| minutes.checked_mul(60).and_then(|m| total.checked_add(m)))
            .and_then(|total| total.checked_add(seconds))
            .map(|seconds| Self { seconds })
            .ok_or_else(|| Error::OutOfRange(format!("'{}' overflows", s)))
    }
}

impl From<Elapsed> for Duration {
    fn from(elapsed: Elapsed) -> Duration {
        Duration::from_secs(elapsed.seconds)
    }
}

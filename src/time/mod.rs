pub mod elapsed;
pub mod error;

/// Milliseconds between two runner time stamps, `None` unless both are known.
pub fn duration_between(start: Option<u64>, end: Option<u64>) -> Option<u64> {
    match (start, end) {
        (Some(start), Some(end)) => Some(end.saturating_sub(start)),
        _ => None,
    }
}

use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Stream a chunk of process output arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Stdout,
    Stderr,
    System,
}

impl OutputKind {
    const ALL: [OutputKind; 3] = [OutputKind::Stdout, OutputKind::Stderr, OutputKind::System];

    fn index(self) -> usize {
        match self {
            OutputKind::Stdout => 0,
            OutputKind::Stderr => 1,
            OutputKind::System => 2,
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputKind::Stdout => write!(f, "stdout"),
            OutputKind::Stderr => write!(f, "stderr"),
            OutputKind::System => write!(f, "system"),
        }
    }
}

/// One complete logical line, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: OutputKind,
    pub text: String,
}

/// Accumulates output chunks into lines.
///
/// Every stream kind has its own pending buffer, so a partial stdout line
/// is never glued to an stderr chunk. Bytes are only decoded once a whole
/// line is present, which keeps multi-byte characters split across chunks
/// intact.
#[derive(Debug, Default)]
pub struct LineReader {
    pending: [Vec<u8>; 3],
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8], kind: OutputKind) -> Vec<Line> {
        let buffer = &mut self.pending[kind.index()];
        let mut lines = vec![];
        let mut rest = chunk;
        while let Some(position) = rest.iter().position(|&b| b == b'\n') {
            buffer.extend_from_slice(&rest[..position]);
            lines.push(Line {
                kind,
                text: decode(buffer),
            });
            buffer.clear();
            rest = &rest[position + 1..];
        }
        buffer.extend_from_slice(rest);
        if !buffer.is_empty() {
            trace!("Buffered {} bytes of incomplete {} line", buffer.len(), kind);
        }
        lines
    }

    /// Flushes unterminated tails, stdout first.
    pub fn finish(&mut self) -> Vec<Line> {
        let mut lines = vec![];
        for kind in OutputKind::ALL.iter().copied() {
            let buffer = &mut self.pending[kind.index()];
            if !buffer.is_empty() {
                lines.push(Line {
                    kind,
                    text: decode(buffer),
                });
                buffer.clear();
            }
        }
        lines
    }

    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(|buffer| !buffer.is_empty())
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = match bytes.last() {
        Some(b'\r') => &bytes[..bytes.len() - 1],
        _ => bytes,
    };
    String::from_utf8_lossy(bytes).into_owned()
}

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    Open { path: PathBuf, source: io::Error },
    Input(io::Error),
    Output(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, source } => write!(f, "cannot open {}: {}", path.display(), source),
            Error::Input(e) => write!(f, "cannot read test runner output: {}", e),
            Error::Output(e) => write!(f, "cannot write signals: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { source, .. } => Some(source),
            Error::Input(e) | Error::Output(e) => Some(e),
        }
    }
}

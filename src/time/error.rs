use std::fmt;

/// An error that occurred while parsing an elapsed time stamp.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    Syntax(String),
    OutOfRange(String),
}

impl ::std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Syntax(ref err) => write!(f, "invalid elapsed time: {}", err),
            Error::OutOfRange(ref err) => write!(f, "elapsed time out of range: {}", err),
        }
    }
}

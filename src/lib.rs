//! Streaming parser for Dart test runner output.
//!
//! Raw process output goes in as byte chunks, ordered test lifecycle
//! signals come out through a [`Signaller`](signal::Signaller).

#[macro_use]
extern crate log;

pub mod app;
pub mod configuration;
pub mod converter;
pub mod protocol;
pub mod reader;
pub mod reporter;
pub mod signal;
pub mod time;

pub use converter::EventsConverter;
pub use protocol::Protocol;
pub use reader::OutputKind;
pub use signal::{Signal, Signaller};

pub mod event;
pub mod json;
pub mod legacy;

use crate::protocol::event::TestEvent;
use crate::protocol::json::JsonDecoder;
use crate::protocol::legacy::LegacyDecoder;
use crate::reader::Line;
use serde_derive::Deserialize;
use std::fmt;
use std::str::FromStr;

const REPORTER_UNSUPPORTED: &str = "\"json\" is not an allowed value for option \"reporter\"";

/// Wire format of the runner output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Lock onto whichever format is recognised first.
    Auto,
    Json,
    Legacy,
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Auto
    }
}

impl Protocol {
    pub fn variants() -> [&'static str; 3] {
        ["auto", "json", "legacy"]
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Protocol::Auto),
            "json" => Ok(Protocol::Json),
            "legacy" | "text" => Ok(Protocol::Legacy),
            _ => Err(format!("Protocol '{}' not supported", s)),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Protocol::Auto => write!(f, "auto"),
            Protocol::Json => write!(f, "json"),
            Protocol::Legacy => write!(f, "legacy"),
        }
    }
}

/// Turns complete lines into test events.
#[derive(Debug, Default)]
pub struct Decoder {
    protocol: Protocol,
    json: JsonDecoder,
    legacy: LegacyDecoder,
}

impl Decoder {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    /// The configured protocol, or the detected one once `Auto` locked in.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn decode(&mut self, line: &Line) -> Vec<TestEvent> {
        let text = line.text.as_str();
        trace!("<<< [{}] {}", line.kind, text);
        match self.protocol {
            Protocol::Json => self.decode_json(text).into_iter().collect(),
            Protocol::Legacy => self.legacy.decode(text),
            Protocol::Auto => {
                if text.trim_start().starts_with('{') {
                    if let Ok(event) = self.json.decode(text) {
                        info!("Detected JSON reporter protocol");
                        self.protocol = Protocol::Json;
                        return event.into_iter().collect();
                    }
                }
                if LegacyDecoder::is_status_line(text) {
                    info!("Detected legacy reporter protocol");
                    self.protocol = Protocol::Legacy;
                    return self.legacy.decode(text);
                }
                if text.contains(REPORTER_UNSUPPORTED) {
                    return vec![TestEvent::ReporterUnsupported];
                }
                debug!("Dropping unrecognised line: {}", text);
                vec![]
            }
        }
    }

    pub fn finish(&mut self) -> Vec<TestEvent> {
        match self.protocol {
            Protocol::Legacy => self.legacy.finish(),
            _ => vec![],
        }
    }

    fn decode_json(&mut self, text: &str) -> Option<TestEvent> {
        if text.trim().is_empty() {
            return None;
        }
        match self.json.decode(text) {
            Ok(event) => event,
            Err(e) => {
                if text.contains(REPORTER_UNSUPPORTED) {
                    return Some(TestEvent::ReporterUnsupported);
                }
                debug!("Dropping malformed line ({}): {}", e, text);
                None
            }
        }
    }
}

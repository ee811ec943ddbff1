use crate::configuration::command_line::Opt;
use crate::configuration::constants::common::{DEFAULT_CHUNK_SIZE, ENV_PREFIX};
use crate::protocol::Protocol;
use crate::reporter::OutputFormat;
use config::{Config, ConfigError, Environment, File};
use derivative::*;
use serde_derive::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Settings {
    pub protocol: Protocol,
    pub format: OutputFormat,
    pub reveal_hidden: bool,
    /// Bytes read from the input at a time.
    #[derivative(Default(value = "DEFAULT_CHUNK_SIZE"))]
    pub chunk_size: usize,
}

impl Settings {
    /// Defaults, overridden by `file` and then by `DART_TEST_EVENTS_*` variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::new();
        if let Some(file) = file {
            config.merge(File::from(file))?;
        }
        config.merge(Environment::with_prefix(ENV_PREFIX))?;

        let settings: Settings = config.try_into()?;
        if settings.chunk_size == 0 {
            return Err(ConfigError::Message("chunk_size must be positive".to_owned()));
        }
        Ok(settings)
    }

    pub fn override_with(&mut self, options: &Opt) {
        if let Some(protocol) = options.protocol {
            self.protocol = protocol;
        }
        if let Some(format) = options.format {
            self.format = format;
        }
        self.reveal_hidden |= options.reveal_hidden;
    }
}

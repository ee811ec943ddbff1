pub mod error;

use crate::app::error::Error;
use crate::configuration::settings::Settings;
use crate::converter::EventsConverter;
use crate::reader::OutputKind;
use crate::reporter::summary::Summary;
use crate::reporter::Reporter;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Feeds recorded or piped runner output through the converter.
pub struct App {
    settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        App { settings }
    }

    /// Converts `input`, or standard input, and prints signals on standard output.
    pub fn run(&self, input: Option<&Path>) -> Result<Summary, Error> {
        let stdout = io::stdout();
        let output = stdout.lock();
        match input {
            Some(path) => {
                info!("Reading test runner output from {}", path.display());
                let file = File::open(path).map_err(|source| Error::Open {
                    path: path.to_owned(),
                    source,
                })?;
                self.convert(file, output)
            }
            None => {
                info!("Reading test runner output from standard input");
                let stdin = io::stdin();
                let input = stdin.lock();
                self.convert(input, output)
            }
        }
    }

    pub fn convert<R: Read, W: Write>(&self, mut input: R, output: W) -> Result<Summary, Error> {
        debug!("Converting with {:?}", self.settings);
        let reporter = Reporter::new(output, self.settings.format);
        let mut converter = EventsConverter::new(reporter)
            .with_protocol(self.settings.protocol)
            .reveal_hidden(self.settings.reveal_hidden);

        let mut buffer = vec![0u8; self.settings.chunk_size.max(1)];
        let mut total = 0usize;
        loop {
            let read = match input.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Input(e)),
            };
            total += read;
            converter.process(&buffer[..read], OutputKind::Stdout);
        }
        debug!("Read {} bytes of {} output", total, converter.protocol());

        let summary = converter.into_signaller().finish().map_err(Error::Output)?;
        info!("{}", summary);
        Ok(summary)
    }
}

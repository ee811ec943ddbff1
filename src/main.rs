// #![forbid(unsafe_code)]
// #![deny(unused_mut)]
// #![deny(unused_variables)]
// #![deny(dead_code)]
// #![deny(unused_imports)]
//#![deny(warnings)]

extern crate chrono;
extern crate dart_test_events;

#[macro_use]
extern crate log;

use dart_test_events::app::App;
use dart_test_events::configuration::command_line::{LogLevel, Opt};
use dart_test_events::configuration::constants::exit_code;
use dart_test_events::configuration::settings::Settings;
use log::LevelFilter;
use signal_hook::{iterator::Signals, SIGINT};
use std::{path::PathBuf, process::exit, thread};
use structopt::StructOpt;

fn main() {
    let options = Opt::from_args();

    init_logging(
        options.logging.unwrap_or(LogLevel::Info).into(),
        &options.log_output_file,
    );

    match Signals::new(&[SIGINT]) {
        Ok(signals) => {
            thread::spawn(move || {
                for sig in signals.forever() {
                    info!("Received signal {:?}, stopping", sig);
                    exit(exit_code::INTERRUPTED);
                }
            });
        }
        Err(e) => warn!("Cannot register SIGINT handler: {}", e),
    }

    let mut settings = match Settings::load(options.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            exit(exit_code::IO_ERROR);
        }
    };
    settings.override_with(&options);
    debug!("Initiated configuration {:#?}", settings);

    let app = App::new(settings);
    match app.run(options.input.as_deref()) {
        Ok(summary) if summary.is_success() => {}
        Ok(summary) => {
            warn!("{} tests failed, {} broken", summary.failed, summary.broken);
            exit(exit_code::TESTS_FAILED);
        }
        Err(e) => {
            error!("{}", e);
            exit(exit_code::IO_ERROR);
        }
    }
}

fn init_logging(level: LevelFilter, output: &Option<PathBuf>) {
    let mut dispatcher = fern::Dispatch::new()
        // Perform allocation-free log formatting
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}:{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record
                    .line()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "".to_owned()),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(log_file) = output {
        match fern::log_file(log_file) {
            Ok(file) => dispatcher = dispatcher.chain(file),
            Err(e) => eprintln!("Cannot open log file {}: {}", log_file.display(), e),
        }
    }
    if let Err(e) = dispatcher.apply() {
        eprintln!("Logger already initialised: {}", e);
    }
    info!("Logging level {} enabled", level);
}

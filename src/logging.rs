//! Logger setup shared by both binaries.
//!
//! `log4rs.yml` in the working directory wins when it parses; otherwise a
//! console-only configuration with the same pattern is installed.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}";

/// Install the global logger. Safe to call once per process.
pub fn init() {
    if Path::new(LOG_CONFIG_FILE).exists() {
        match log4rs::init_file(LOG_CONFIG_FILE, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!("Failed to load {}: {}, using console logging", LOG_CONFIG_FILE, e),
        }
    }

    if let Err(e) = init_console(LevelFilter::Info) {
        eprintln!("Failed to initialise console logging: {}", e);
    }
}

fn init_console(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .logger(Logger::builder().build("headless_chrome", LevelFilter::Warn))
        .logger(Logger::builder().build("reqwest", LevelFilter::Warn))
        .build(Root::builder().appender("stdout").build(level))?;

    log4rs::init_config(config)?;
    Ok(())
}

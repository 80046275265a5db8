//! Platform logging initialization for courier_app.
//!
//! Terminal output goes to stderr; stdout carries the host protocol.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./courier.log";
const DESTINATION_VAR: &str = "COURIER_LOG";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to ./courier.log in current directory.
    File,
    /// Write to stderr.
    Terminal,
    /// Write to both file and stderr.
    Both,
}

impl LogDestination {
    /// Reads `COURIER_LOG` (`file`, `terminal` or `both`); defaults to `Both`.
    pub fn from_env() -> Self {
        std::env::var(DESTINATION_VAR)
            .ok()
            .and_then(|value| Self::parse(&value))
            .unwrap_or(LogDestination::Both)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Some(LogDestination::File),
            "terminal" | "stderr" => Some(LogDestination::Terminal),
            "both" => Some(LogDestination::Both),
            _ => None,
        }
    }
}

/// Initialize the logger with the specified destination.
pub fn initialize(destination: LogDestination) {
    let level = courier_logging::default_level();
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::Both => {
            let mut loggers = vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        // reqwest and hyper are chatty at debug.
        .add_filter_allow_str("courier")
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

fn create_file_logger(level: LevelFilter, config: Config) -> Option<Box<dyn SharedLogger>> {
    let log_path = PathBuf::from(LOG_FILE);
    match File::create(&log_path) {
        Ok(file) => {
            let logger: Box<dyn SharedLogger> = WriteLogger::new(level, config, file);
            Some(logger)
        }
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogDestination;

    #[test]
    fn destination_names_parse_case_insensitively() {
        assert_eq!(LogDestination::parse("FILE"), Some(LogDestination::File));
        assert_eq!(LogDestination::parse(" stderr "), Some(LogDestination::Terminal));
        assert_eq!(LogDestination::parse("both"), Some(LogDestination::Both));
        assert_eq!(LogDestination::parse("syslog"), None);
    }
}

//! Logger setup for the bot binary.
//!
//! Destination and level come from `BOT_LOG_DESTINATION` and `BOT_LOG_LEVEL`.
//! File output goes to `./quote_bot.log` in the current working directory.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./quote_bot.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    /// Append to ./quote_bot.log in the current directory.
    File,
    Terminal,
    Both,
}

impl FromStr for LogDestination {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LogDestination::File),
            "terminal" => Ok(LogDestination::Terminal),
            "both" => Ok(LogDestination::Both),
            other => Err(format!("unknown log destination {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub destination: LogDestination,
    pub level: LevelFilter,
}

impl LogSettings {
    /// Unknown values fall back to the defaults; logging is not set up yet, so
    /// the problem is printed to stderr.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let destination = lookup("BOT_LOG_DESTINATION")
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                value.parse().unwrap_or_else(|err| {
                    eprintln!("Warning: {err}; logging to terminal");
                    LogDestination::Terminal
                })
            })
            .unwrap_or(LogDestination::Terminal);
        let level = lookup("BOT_LOG_LEVEL")
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                value.trim().parse().unwrap_or_else(|_| {
                    eprintln!("Warning: unknown log level {value:?}; using info");
                    LevelFilter::Info
                })
            })
            .unwrap_or(LevelFilter::Info);
        Self { destination, level }
    }
}

/// Initialize the global logger. Safe to call more than once; later calls no-op.
pub fn initialize(settings: LogSettings) {
    let LogSettings { destination, level } = settings;
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => {
            vec![TermLogger::new(
                level,
                config,
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )]
        }
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
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
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<std::fs::File>>> {
    let log_path = PathBuf::from(LOG_FILE);
    // Each scheduled run appends, so the file keeps a history of cycles.
    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not open log file at {:?}: {}", log_path, err);
            None
        }
    }
}

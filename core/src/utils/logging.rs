use super::sd_toml::Output;
use crate::error::CoreError;
use log::{error, LevelFilter};
use simplelog::{Config, SimpleLogger, WriteLogger};
use std::fs::OpenOptions;

/// Map the TOML `logging` value to a level. Anything unknown is `Warn`
pub fn log_level(logging: Option<&str>) -> LevelFilter {
    if let Some(log_level) = logging {
        match log_level.to_lowercase().as_str() {
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            _ => LevelFilter::Warn,
        }
    } else {
        LevelFilter::Warn
    }
}

/// Install the global logger. Logs are appended to `log_file` if set, otherwise written to the terminal
pub fn init_logging(output: &Output) -> Result<(), CoreError> {
    let level = log_level(output.logging.as_deref());

    if let Some(path) = &output.log_file {
        let output_result = OpenOptions::new().create(true).append(true).open(path);
        let log_file = match output_result {
            Ok(result) => result,
            Err(err) => {
                error!("[sdcore] Failed to create log file at {path}. Error: {err:?}");
                return Err(CoreError::LogFile);
            }
        };
        // A logger may already be installed, keep using it
        let _ = WriteLogger::init(level, Config::default(), log_file);
        return Ok(());
    }

    let _ = SimpleLogger::init(level, Config::default());
    Ok(())
}

//! Logger set-up with `simplelog`.
//!
//! Library code only emits `log` macros; a binary or a test picks the sink here.
use crate::ReactorModels::reactor_error::ReactorError;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Installs a terminal logger. Returns `Ok(false)` when a logger is already installed.
pub fn init_logger(level: LevelFilter) -> Result<bool, ReactorError> {
    Ok(TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto).is_ok())
}

/// Terminal logger plus a copy of every record written to `path`.
pub fn init_logger_with_file<P: AsRef<Path>>(level: LevelFilter, path: P) -> Result<bool, ReactorError> {
    let file = File::create(path)?;
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), file),
    ];
    Ok(CombinedLogger::init(loggers).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_a_no_op() {
        let _ = init_logger(LevelFilter::Warn).unwrap();
        assert!(!init_logger(LevelFilter::Info).unwrap());
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(!init_logger_with_file(LevelFilter::Info, file.path()).unwrap());
    }
}

use std::env;

use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable holding the log level filter.
pub const LOG_ENV: &str = "ARS_LOG";

/// Prints `[TAG] message`. Call sites pick the tag with an upper-case target,
/// e.g. `warn!(target: "MISS", ...)`; anything else is tagged with its level.
pub struct TagLogger {
    level: LevelFilter,
}

impl TagLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    pub fn from_env() -> Self {
        let level = env::var(LOG_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(LevelFilter::Info);
        Self::new(level)
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

fn is_tag(target: &str) -> bool {
    !target.is_empty() && target.chars().all(|c| c.is_ascii_uppercase() || c == '-')
}

pub fn format_record(record: &Record) -> String {
    let target = record.target();
    if is_tag(target) {
        format!("[{}] {}", target, record.args())
    } else {
        format!("[{}] {}", record.level().as_str(), record.args())
    }
}

impl Log for TagLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", format_record(record));
        }
    }

    fn flush(&self) {}
}

pub fn init() -> Result<(), log::SetLoggerError> {
    let logger = TagLogger::from_env();
    let level = logger.level();
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(level))
}

/// Same as [`init`], but routes output through `progress` so log lines are
/// printed above any live progress bars instead of tearing them.
pub fn init_with_progress(progress: MultiProgress) -> Result<(), log::SetLoggerError> {
    let logger = TagLogger::from_env();
    let level = logger.level();
    LogWrapper::new(progress, logger).try_init()?;
    log::set_max_level(level);
    Ok(())
}

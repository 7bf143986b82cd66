use std::str::FromStr;

use simplelog::{LevelFilter, WriteLogger};

use crate::config::LoggingConfig;

/// Route `log` records to the configured file.
/// Best-effort: failures are silently ignored (logging must never block the
/// interpreter).
pub fn init(config: &LoggingConfig) {
    let level = LevelFilter::from_str(&config.level).unwrap_or(LevelFilter::Warn);
    if level == LevelFilter::Off {
        return;
    }
    let Some(path) = config.file_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return;
    };
    let _ = WriteLogger::init(level, simplelog::Config::default(), file);
}

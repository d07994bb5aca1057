use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Appends `timestamp [LEVEL] message` lines to a file.
pub struct Logger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Logger {
    pub fn new(log_file: &Path, level: LevelFilter) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;

        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(file, "{} [{}] {}", timestamp, record.level(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the file logger as the global logger.
pub fn init_file(log_file: &Path, level: LevelFilter) -> anyhow::Result<()> {
    let logger = Logger::new(log_file, level)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

/// Installs `env_logger`, honoring `RUST_LOG` and defaulting to `level`.
pub fn init_stderr(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};
    use std::fs;

    #[test]
    fn test_file_logger_appends_lines() {
        let path = std::env::temp_dir().join(format!("dex-alert-bot-{}.log", std::process::id()));
        let _ = fs::remove_file(&path);

        let logger = Logger::new(&path, LevelFilter::Info).unwrap();
        logger.log(
            &Record::builder()
                .args(format_args!("scan complete"))
                .level(Level::Info)
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("hidden detail"))
                .level(Level::Debug)
                .build(),
        );
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[INFO] scan complete"));
        assert!(!contents.contains("hidden detail"));
        let _ = fs::remove_file(&path);
    }
}

//! Sync run logging
//!
//! Every message is printed to stdout with a timestamp; when a log
//! directory is configured, a per-run log file receives a copy.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

static LOGGER: OnceLock<Arc<Mutex<SyncLogger>>> = OnceLock::new();

// ============================================================================
// Log Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Info,
    Download,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "[INFO]",
            LogLevel::Download => "[DOWNLOAD]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

// ============================================================================
// Sync Logger
// ============================================================================

pub struct SyncLogger {
    log_file: Option<File>,
}

impl SyncLogger {
    fn new(log_dir: Option<&Path>) -> Self {
        let log_file = log_dir.and_then(|dir| {
            fs::create_dir_all(dir).ok()?;
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(format!("sync_{}.log", timestamp)))
                .ok()
        });

        Self { log_file }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.log_file {
            let _ = writeln!(file, "{}", msg);
            let _ = file.flush();
        }

        println!("{}", msg);
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let formatted = format!("[{}] {} {}", timestamp, level.prefix(), message);
        self.write_raw(&formatted);
    }
}

// ============================================================================
// Global Logger Access
// ============================================================================

/// Initialize the global logger (call once at startup). Pass a directory to
/// keep a file copy of the run's log alongside the stdout output.
pub fn init_logger(log_dir: Option<&Path>) {
    LOGGER.get_or_init(|| Arc::new(Mutex::new(SyncLogger::new(log_dir))));
}

/// Get the global logger instance
fn logger() -> Arc<Mutex<SyncLogger>> {
    LOGGER
        .get_or_init(|| Arc::new(Mutex::new(SyncLogger::new(None))))
        .clone()
}

// ============================================================================
// Convenience Logging Functions
// ============================================================================

pub fn log_info(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Info, message);
    }
}

pub fn log_download(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Download, message);
    }
}

pub fn log_warning(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Warning, message);
    }
}

pub fn log_error(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Error, message);
    }
}

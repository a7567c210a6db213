//! Run logging.
//!
//! A single global [`LOG_SINK`] prints level-tagged progress lines to stderr
//! (stdout stays free for the JSON run report). The minimum level comes
//! from `STARLOAD_LOG` (`info`, `success`, `warning`, `error`).
//!
//! Only the orchestrator and CLI log; builders and checks stay silent.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Environment variable holding the minimum level.
pub const LOG_LEVEL_ENV: &str = "STARLOAD_LOG";

/// Log level, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "info" | "debug" | "trace" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, rendered as indentation.
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Line as printed to stderr.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        format!("{}{} {}", "   ".repeat(self.indent as usize), prefix, self.message)
    }
}

/// Global log sink
pub static LOG_SINK: Lazy<LogSink> = Lazy::new(LogSink::from_env);

/// Filters entries by level and prints the rest.
pub struct LogSink {
    min_level: LogLevel,
}

impl LogSink {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    fn from_env() -> Self {
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Info);
        Self::new(level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level()
    }

    /// Print `entry` if it passes the level filter. Returns whether it did.
    pub fn log(&self, entry: LogEntry) -> bool {
        if !self.enabled(entry.level) {
            return false;
        }
        eprintln!("{}", entry.render());
        true
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_SINK.log(LogEntry::new(LogLevel::Error, msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_SINK.log(LogEntry::new(LogLevel::Info, msg).with_indent(indent));
}

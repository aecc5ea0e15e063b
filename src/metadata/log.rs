//! Metadata for log-file chunks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of the most significant entry within a log chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// The detected line format of a log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Structured,
    Json,
    Apache,
    Nginx,
    Syslog,
    Custom,
}

/// Metadata describing one run of adjacent log lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMetadata {
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    /// Highest severity level observed among the chunk's entries.
    pub log_level: Option<LogLevel>,
    pub log_format: LogFormat,
    pub error_count: usize,
    pub source_app: Option<String>,
}

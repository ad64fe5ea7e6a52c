//! Structured logging for the benchmark harness
//!
//! Console-oriented logger with level filtering, colored output and an
//! optional JSON line format. Every benchmark run gets a correlation ID so
//! report files and log streams can be matched up afterwards.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Debug level - detailed information for debugging
    Debug = 0,
    /// Info level - general application information
    Info = 1,
    /// Warning level - potentially harmful situations
    Warn = 2,
    /// Error level - error events but application can continue
    Error = 3,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Debug => "\x1b[36m", // Cyan
            LogLevel::Info => "\x1b[32m",  // Green
            LogLevel::Warn => "\x1b[33m",  // Yellow
            LogLevel::Error => "\x1b[31m", // Red
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for the JSON line format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Correlation ID of the benchmark run
    pub run_id: Uuid,
}

/// Console logger used by the benchmark driver
#[derive(Debug, Clone)]
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
    /// Emit JSON lines instead of human-readable text
    json_output: bool,
    /// Correlation ID for this benchmark run
    run_id: Uuid,
}

impl Logger {
    /// Create a new logger with a fresh run correlation ID
    pub fn new(min_level: LogLevel, use_color: bool) -> Self {
        Self {
            min_level,
            use_color,
            json_output: false,
            run_id: Uuid::new_v4(),
        }
    }

    /// Switch the logger to JSON line output
    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    /// Get the correlation ID for this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Log a message at the given level
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }

        if self.json_output {
            let entry = LogEntry {
                timestamp: Utc::now(),
                level,
                message: message.to_string(),
                run_id: self.run_id,
            };
            if let Ok(line) = serde_json::to_string(&entry) {
                eprintln!("{}", line);
            }
            return;
        }

        let timestamp = Utc::now().format("%H:%M:%S%.3f");
        if self.use_color {
            eprintln!(
                "{} {}{:5}{} {}",
                timestamp,
                level.color_code(),
                level.as_str(),
                LogLevel::reset_code(),
                message
            );
        } else {
            eprintln!("{} {:5} {}", timestamp, level.as_str(), message);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Info, true)
    }
}

//! Centralized configuration for recfile writer and log adapter.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - `from_env()` reads RECFILE_* variables, fluent setters override them.
//!
//! Env:
//! - RECFILE_FOLD_WIDTH  — fold long single-line values with `\` (0/unset = off)
//! - RECFILE_LOG_LEVEL   — minimal level for RecfileLogger (default info)
//! - RECFILE_LEVEL_KEY   — field name for the level (default "Urgency", "" disables)
//! - RECFILE_MSG_KEY     — field name for the message (default "Message")
//! - RECFILE_TIME_KEY    — field name for the timestamp (default "Time", "" disables)

use log::LevelFilter;
use std::fmt;

/// Encoder options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterConfig {
    /// Max physical line width for single-line values; longer ones are folded
    /// with trailing-`\` continuation. None — never fold.
    /// Env: RECFILE_FOLD_WIDTH (default unset)
    pub fold_width: Option<usize>,
}

impl WriterConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("RECFILE_FOLD_WIDTH") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.fold_width = if n == 0 { None } else { Some(n) };
            }
        }
        cfg
    }

    pub fn with_fold_width(mut self, width: Option<usize>) -> Self {
        self.fold_width = width;
        self
    }

    pub fn build(self) -> Self {
        self
    }
}

impl fmt::Display for WriterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WriterConfig {{ fold_width: {} }}",
            self.fold_width
                .map(|v| v.to_string())
                .unwrap_or_else(|| "off".to_string()),
        )
    }
}

/// Options for RecfileLogger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Events below this level are dropped.
    /// Env: RECFILE_LOG_LEVEL (default info)
    pub level: LevelFilter,

    /// Field name for the level; empty disables the field.
    /// Env: RECFILE_LEVEL_KEY (default "Urgency")
    pub level_key: String,

    /// Field name for the message (always written).
    /// Env: RECFILE_MSG_KEY (default "Message")
    pub msg_key: String,

    /// Field name for the RFC 3339 UTC timestamp; empty disables the field.
    /// Env: RECFILE_TIME_KEY (default "Time")
    pub time_key: String,

    /// Encoder options used for every event.
    pub writer: WriterConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            level_key: "Urgency".to_string(),
            msg_key: "Message".to_string(),
            time_key: "Time".to_string(),
            writer: WriterConfig::default(),
        }
    }
}

impl LoggerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self {
            writer: WriterConfig::from_env(),
            ..Self::default()
        };

        if let Ok(v) = std::env::var("RECFILE_LOG_LEVEL") {
            if let Ok(lvl) = v.trim().parse::<LevelFilter>() {
                cfg.level = lvl;
            }
        }
        // пустое значение допустимо: поле отключается
        if let Ok(v) = std::env::var("RECFILE_LEVEL_KEY") {
            cfg.level_key = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("RECFILE_MSG_KEY") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.msg_key = s.to_string();
            }
        }
        if let Ok(v) = std::env::var("RECFILE_TIME_KEY") {
            cfg.time_key = v.trim().to_string();
        }

        cfg
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_level_key<S: Into<String>>(mut self, key: S) -> Self {
        self.level_key = key.into();
        self
    }

    pub fn with_msg_key<S: Into<String>>(mut self, key: S) -> Self {
        self.msg_key = key.into();
        self
    }

    pub fn with_time_key<S: Into<String>>(mut self, key: S) -> Self {
        self.time_key = key.into();
        self
    }

    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> Self {
        self
    }
}

impl fmt::Display for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_off = |s: &str| if s.is_empty() { "off".to_string() } else { s.to_string() };
        write!(
            f,
            "LoggerConfig {{ level: {}, level_key: {}, msg_key: {}, time_key: {}, writer: {} }}",
            self.level,
            or_off(&self.level_key),
            self.msg_key,
            or_off(&self.time_key),
            self.writer,
        )
    }
}

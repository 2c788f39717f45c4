// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Log engine configuration file types and parsing.
//!
//! JSON5 configuration format supporting:
//! - Registry table sizing
//! - Named loggers with their sink and line format
//! - Comments and trailing commas

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::logging::{
    validate_time_format, Level, LogError, LoggerConfig, LoggerRegistry, NullSink, OutputSink,
    RegistryConfig, StreamSink,
};

/// Engine configuration (JSON5 file format)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Name table sizing; omitted fields take their defaults
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Loggers created at startup, in order
    #[serde(default)]
    pub loggers: Vec<LoggerSpec>,
}

/// Where a configured logger writes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkSpec {
    /// Buffered standard output
    #[default]
    Stdout,
    /// Buffered standard error
    Stderr,
    /// Unbuffered standard output descriptor
    StdoutFd,
    /// Unbuffered standard error descriptor
    StderrFd,
    /// Discard everything
    Null,
    /// Buffered file, appended to
    File(PathBuf),
}

impl SinkSpec {
    /// Open the described sink
    pub fn open(&self) -> Result<Box<dyn OutputSink>, LogError> {
        let sink: Box<dyn OutputSink> = match self {
            SinkSpec::Stdout => Box::new(StreamSink::stdout()),
            SinkSpec::Stderr => Box::new(StreamSink::stderr()),
            #[cfg(unix)]
            SinkSpec::StdoutFd => Box::new(crate::logging::DescriptorSink::stdout()),
            #[cfg(unix)]
            SinkSpec::StderrFd => Box::new(crate::logging::DescriptorSink::stderr()),
            #[cfg(not(unix))]
            SinkSpec::StdoutFd => Box::new(StreamSink::stdout()),
            #[cfg(not(unix))]
            SinkSpec::StderrFd => Box::new(StreamSink::stderr()),
            SinkSpec::Null => Box::new(NullSink),
            SinkSpec::File(path) => Box::new(StreamSink::file(path)?),
        };
        Ok(sink)
    }
}

/// Logger as stored in config file
///
/// Format fields that are left out take the `LoggerConfig` defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggerSpec {
    /// Name used to look the logger up
    pub name: String,

    #[serde(default)]
    pub sink: SinkSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_terminator: Option<String>,
}

impl LoggerSpec {
    /// Logger configuration with defaults filled in
    pub fn logger_config(&self) -> LoggerConfig {
        let defaults = LoggerConfig::default();
        LoggerConfig {
            level: self.level.unwrap_or(defaults.level),
            queue_capacity: self.queue_capacity.unwrap_or(defaults.queue_capacity),
            colors: self.colors.unwrap_or(defaults.colors),
            flush: self.flush.unwrap_or(defaults.flush),
            time_format: self
                .time_format
                .clone()
                .unwrap_or(defaults.time_format),
            line_prefix: self
                .line_prefix
                .clone()
                .unwrap_or(defaults.line_prefix),
            line_terminator: self
                .line_terminator
                .clone()
                .unwrap_or(defaults.line_terminator),
        }
    }
}

impl Config {
    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to JSON5 string (with pretty formatting)
    pub fn to_json5(&self) -> String {
        // Plain JSON is valid JSON5; json5 has no pretty printer
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5();
        std::fs::write(path, content)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let load_factor = self.registry.load_factor;
        if !(load_factor > 0.0 && load_factor < 1.0) {
            return Err(ConfigError::InvalidLoadFactor(load_factor));
        }
        if self.registry.initial_capacity == 0 {
            return Err(ConfigError::InvalidTableCapacity);
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, logger) in self.loggers.iter().enumerate() {
            if logger.name.is_empty() {
                return Err(ConfigError::EmptyLoggerName { index: idx });
            }
            if let Some(&first) = seen.get(logger.name.as_str()) {
                return Err(ConfigError::DuplicateLogger {
                    name: logger.name.clone(),
                    logger_indices: (first, idx),
                });
            }
            seen.insert(&logger.name, idx);

            if logger.queue_capacity == Some(0) {
                return Err(ConfigError::InvalidQueueCapacity {
                    name: logger.name.clone(),
                });
            }
            if let Some(format) = &logger.time_format {
                validate_time_format(format).map_err(|_| ConfigError::InvalidTimeFormat {
                    name: logger.name.clone(),
                    format: format.clone(),
                })?;
            }
        }
        Ok(())
    }

    /// Validate, then create every configured logger in a new registry
    ///
    /// If any logger fails, the loggers already created are shut down when
    /// the partial registry is dropped.
    pub fn build(&self) -> Result<LoggerRegistry, ConfigError> {
        self.validate()?;

        let registry = LoggerRegistry::with_config(self.registry);
        for logger in &self.loggers {
            let sink = logger
                .sink
                .open()
                .map_err(|e| ConfigError::Logger(logger.name.clone(), e))?;
            registry
                .create_logger(&logger.name, Some(logger.logger_config()), Some(sink))
                .map_err(|e| ConfigError::Logger(logger.name.clone(), e))?;
        }
        Ok(registry)
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, String),
    ParseError(String),
    EmptyLoggerName {
        index: usize,
    },
    DuplicateLogger {
        name: String,
        logger_indices: (usize, usize),
    },
    InvalidQueueCapacity {
        name: String,
    },
    InvalidTimeFormat {
        name: String,
        format: String,
    },
    InvalidLoadFactor(f64),
    InvalidTableCapacity,
    Logger(String, LogError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(
                    f,
                    "failed to read config file '{}': {}",
                    path.display(),
                    msg
                )
            }
            ConfigError::ParseError(msg) => write!(f, "failed to parse config: {}", msg),
            ConfigError::EmptyLoggerName { index } => {
                write!(f, "logger {} has an empty name", index)
            }
            ConfigError::DuplicateLogger {
                name,
                logger_indices,
            } => write!(
                f,
                "duplicate logger '{}' (loggers {} and {})",
                name, logger_indices.0, logger_indices.1
            ),
            ConfigError::InvalidQueueCapacity { name } => {
                write!(f, "queue_capacity for logger '{}' must be at least 1", name)
            }
            ConfigError::InvalidTimeFormat { name, format } => {
                write!(f, "invalid time_format '{}' for logger '{}'", format, name)
            }
            ConfigError::InvalidLoadFactor(value) => {
                write!(f, "load_factor {} is outside (0, 1)", value)
            }
            ConfigError::InvalidTableCapacity => {
                write!(f, "initial_capacity must be at least 1")
            }
            ConfigError::Logger(name, err) => {
                write!(f, "failed to create logger '{}': {}", name, err)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Logger(_, err) => Some(err),
            _ => None,
        }
    }
}

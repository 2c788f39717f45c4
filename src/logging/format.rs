// SPDX-License-Identifier: Apache-2.0 OR MIT
// Per-logger configuration and line rendering

use super::entry::LogMessage;
use super::severity::COLOR_RESET;
use super::sink::OutputSink;
use super::{Level, LogError};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::io;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_LINE_PREFIX: &str = "";
pub const DEFAULT_LINE_TERMINATOR: &str = "\n";

/// How a logger filters and frames its lines
///
/// Fields left out of a config file take their defaults. A logger keeps its
/// configuration unchanged for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Lowest level that is written
    pub level: Level,
    /// Maximum number of messages waiting for the worker
    pub queue_capacity: usize,
    /// Wrap each line in a level color and a reset escape
    pub colors: bool,
    /// Flush the sink after every line
    pub flush: bool,
    /// strftime-style timestamp format
    pub time_format: String,
    /// Written before the timestamp
    pub line_prefix: String,
    /// Written after the message text
    pub line_terminator: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            colors: false,
            flush: false,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            line_prefix: DEFAULT_LINE_PREFIX.to_string(),
            line_terminator: DEFAULT_LINE_TERMINATOR.to_string(),
        }
    }
}

impl LoggerConfig {
    /// Substitute defaults for unset fields and validate the rest
    ///
    /// A zero capacity and an empty time format count as unset.
    pub fn normalized(mut self) -> Result<Self, LogError> {
        if self.queue_capacity == 0 {
            self.queue_capacity = DEFAULT_QUEUE_CAPACITY;
        }
        if self.time_format.is_empty() {
            self.time_format = DEFAULT_TIME_FORMAT.to_string();
        }
        validate_time_format(&self.time_format)?;
        Ok(self)
    }

    /// Whether a message at `level` passes this logger's filter
    #[inline]
    pub fn allows(&self, level: Level) -> bool {
        level >= self.level
    }
}

/// Reject time formats chrono cannot render
pub fn validate_time_format(format: &str) -> Result<(), LogError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(LogError::InvalidTimeFormat(format.to_string()));
    }
    Ok(())
}

/// Render one line: `prefix + "[" + timestamp + "] " + LEVEL + " " + text + terminator`
///
/// Runs on the caller's thread. Colors are not part of the rendered text;
/// they are added around it at write time.
pub fn render<Tz>(
    level: Level,
    text: &str,
    config: &LoggerConfig,
    now: &DateTime<Tz>,
) -> Result<String, fmt::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut line = String::with_capacity(
        config.line_prefix.len() + text.len() + config.line_terminator.len() + 32,
    );
    line.push_str(&config.line_prefix);
    line.push('[');
    write!(line, "{}", now.format(&config.time_format))?;
    write!(line, "] {} {}", level.as_str(), text)?;
    line.push_str(&config.line_terminator);
    Ok(line)
}

/// Write a dequeued message to the sink, applying the level filter
///
/// Returns `Ok(false)` when the message was filtered out.
pub fn write_line(
    sink: &mut dyn OutputSink,
    message: &LogMessage,
    config: &LoggerConfig,
) -> io::Result<bool> {
    if !config.allows(message.level()) {
        return Ok(false);
    }

    if config.colors {
        sink.write(message.level().color())?;
    }
    sink.write(message.text())?;
    if config.colors {
        sink.write(COLOR_RESET)?;
    }

    if config.flush {
        sink.flush()?;
    }
    Ok(true)
}

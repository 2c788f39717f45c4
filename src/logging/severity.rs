// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log levels, ordered from least to most severe

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub(crate) const COLOR_RESET: &str = "\x1B[0m";

/// Log level (0-4, higher is more severe)
///
/// Filtering compares ordinals: a logger configured at `Info` writes
/// `Info`, `Warn`, `Error` and `Fatal`, and drops `Debug`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Verbose internals (opcode traces, bus accesses)
    Debug = 0,
    /// Normal progress (ROM loaded, arguments parsed)
    Info = 1,
    /// Something odd that the emulator can live with
    Warn = 2,
    /// An operation failed
    Error = 3,
    /// The emulator cannot continue
    Fatal = 4,
}

impl Level {
    /// All levels in ascending order
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Get level as u8 (0-4)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get level name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// ANSI escape written before a colored line of this level
    pub const fn color(self) -> &'static str {
        match self {
            Level::Debug => "\x1B[32m", // green
            Level::Info => "\x1B[36m",  // cyan
            Level::Warn => "\x1B[33m",  // yellow
            Level::Error => "\x1B[31m", // red
            Level::Fatal => "\x1B[35m", // magenta
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warn),
            3 => Some(Level::Error),
            4 => Some(Level::Fatal),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl std::fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown log level '{}' (expected debug, info, warn, error or fatal)",
            self.0
        )
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("warning").then_some(Level::Warn))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Errors reported by the log engine

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("logger name must not be empty")]
    EmptyName,

    #[error("invalid logger name: {0}")]
    UnknownLogger(String),

    #[error("invalid time format '{0}'")]
    InvalidTimeFormat(String),

    #[error("queue capacity must be at least 1")]
    InvalidCapacity,

    #[error("invalid output handle: {0}")]
    InvalidHandle(String),

    #[error("out of memory: could not allocate {slots} slots for {what}")]
    Allocation { what: &'static str, slots: usize },

    #[error("failed to spawn worker for logger '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("logger '{0}' has shut down")]
    QueueClosed(String),

    #[error("failed to render message for logger '{0}'")]
    Render(String),

    #[error("worker for logger '{0}' panicked")]
    WorkerPanicked(String),

    #[error("sink error: {0}")]
    Sink(#[from] io::Error),
}

impl LogError {
    /// True for errors after which the process is not expected to continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, LogError::Allocation { .. } | LogError::UnknownLogger(_))
    }
}

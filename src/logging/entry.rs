// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log message passed from callers to a logger's worker

use super::Level;

/// One queued log entry
///
/// The text is fully rendered on the caller's thread before the message is
/// enqueued; the worker only decides whether to write it. A message moves
/// from the caller into the queue and from the queue into the worker, which
/// drops it once written.
pub struct LogMessage {
    level: Level,
    text: String,
    terminate: bool,
}

impl LogMessage {
    /// Create an ordinary message carrying a rendered line
    pub fn new(level: Level, text: String) -> Self {
        Self {
            level,
            text,
            terminate: false,
        }
    }

    /// Create the shutdown sentinel
    ///
    /// The worker stops as soon as it dequeues this message and never
    /// writes it.
    pub(crate) fn terminate() -> Self {
        Self {
            level: Level::Fatal,
            text: String::new(),
            terminate: true,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Rendered line, including prefix and terminator
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_terminate(&self) -> bool {
        self.terminate
    }
}

impl std::fmt::Debug for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.terminate {
            return f.write_str("LogMessage(<terminate>)");
        }
        f.debug_struct("LogMessage")
            .field("level", &self.level)
            .field("text", &self.text)
            .finish()
    }
}

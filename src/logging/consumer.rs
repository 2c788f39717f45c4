// SPDX-License-Identifier: Apache-2.0 OR MIT
// Background worker: drains one logger's queue into its sink

use super::entry::LogMessage;
use super::format::{write_line, LoggerConfig};
use super::ringbuffer::MessageQueue;
use super::sink::OutputSink;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of a logger's worker thread
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Blocked on the queue or writing lines
    Running = 0,
    /// Dequeued the terminate sentinel, leaving the loop
    Draining = 1,
    /// Thread has exited
    Terminated = 2,
}

impl WorkerState {
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Running,
            1 => WorkerState::Draining,
            _ => WorkerState::Terminated,
        }
    }
}

/// Counters collected by a worker over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Lines handed to the sink
    pub written: u64,
    /// Messages consumed but below the logger's level
    pub filtered: u64,
    /// Sink writes that failed (the message is dropped)
    pub write_errors: u64,
    /// Messages still queued after the worker stopped
    pub discarded: u64,
}

/// What the worker hands back when it exits
pub(crate) struct WorkerExit {
    pub(crate) sink: Box<dyn OutputSink>,
    pub(crate) stats: WorkerStats,
}

/// Closes the queue and marks the worker terminated however `run` exits
///
/// If a sink panics, the thread unwinds through this guard, so producers
/// blocked on a full queue get their message back instead of waiting for a
/// worker that is gone.
struct ExitGuard {
    queue: Arc<MessageQueue>,
    state: Arc<AtomicU8>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.state
            .store(WorkerState::Terminated as u8, Ordering::Release);
        self.queue.close();
    }
}

/// Worker loop state, moved onto the logger's thread
pub(crate) struct Worker {
    pub(crate) queue: Arc<MessageQueue>,
    pub(crate) config: Arc<LoggerConfig>,
    pub(crate) sink: Box<dyn OutputSink>,
    pub(crate) state: Arc<AtomicU8>,
}

impl Worker {
    /// Run until the terminate sentinel is dequeued (blocks the thread)
    ///
    /// The sink is returned so the owning logger can close it exactly once.
    pub(crate) fn run(mut self) -> WorkerExit {
        let _guard = ExitGuard {
            queue: Arc::clone(&self.queue),
            state: Arc::clone(&self.state),
        };
        let mut stats = WorkerStats::default();

        while let Some(message) = self.queue.dequeue() {
            if message.is_terminate() {
                self.state
                    .store(WorkerState::Draining as u8, Ordering::Release);
                break;
            }
            self.handle(message, &mut stats);
        }

        WorkerExit {
            sink: self.sink,
            stats,
        }
    }

    fn handle(&mut self, message: LogMessage, stats: &mut WorkerStats) {
        match write_line(self.sink.as_mut(), &message, &self.config) {
            Ok(true) => stats.written += 1,
            Ok(false) => stats.filtered += 1,
            Err(_) => stats.write_errors += 1,
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logger and LoggerHandle: one named queue, one worker, one sink

use super::consumer::{Worker, WorkerExit, WorkerState, WorkerStats};
use super::entry::LogMessage;
use super::format::{render, LoggerConfig};
use super::ringbuffer::MessageQueue;
use super::sink::OutputSink;
use super::{Level, LogError};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Registry slot a logger was stored in when it was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoggerId(pub usize);

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Producer side of a logger
///
/// This is a lightweight handle that can be cloned and passed to any thread.
/// Messages are rendered on the calling thread and handed to the worker
/// through the shared queue.
#[derive(Clone)]
pub struct LoggerHandle {
    id: LoggerId,
    name: Arc<str>,
    config: Arc<LoggerConfig>,
    queue: Arc<MessageQueue>,
    state: Arc<AtomicU8>,
}

impl LoggerHandle {
    pub fn id(&self) -> LoggerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Messages waiting for the worker
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Render `text` and queue it, blocking while the queue is full
    ///
    /// Accepts borrowed or owned text. Owned text is released as soon as
    /// the line has been rendered. Level filtering happens in the worker,
    /// so a filtered message still occupies a queue slot until consumed.
    pub fn log<S: AsRef<str>>(&self, level: Level, text: S) -> Result<(), LogError> {
        let line = render(level, text.as_ref(), &self.config, &chrono::Local::now())
            .map_err(|_| LogError::Render(self.name.to_string()))?;
        drop(text);

        self.queue
            .enqueue(LogMessage::new(level, line))
            .map_err(|_| LogError::QueueClosed(self.name.to_string()))
    }

    #[inline]
    pub fn debug<S: AsRef<str>>(&self, text: S) -> Result<(), LogError> {
        self.log(Level::Debug, text)
    }

    #[inline]
    pub fn info<S: AsRef<str>>(&self, text: S) -> Result<(), LogError> {
        self.log(Level::Info, text)
    }

    #[inline]
    pub fn warn<S: AsRef<str>>(&self, text: S) -> Result<(), LogError> {
        self.log(Level::Warn, text)
    }

    #[inline]
    pub fn error<S: AsRef<str>>(&self, text: S) -> Result<(), LogError> {
        self.log(Level::Error, text)
    }

    #[inline]
    pub fn fatal<S: AsRef<str>>(&self, text: S) -> Result<(), LogError> {
        self.log(Level::Fatal, text)
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("level", &self.config.level)
            .field("state", &self.state())
            .finish()
    }
}

/// A running logger: owns the worker thread and, through it, the sink
///
/// Dropping a `Logger` shuts it down; `shutdown` does the same and reports
/// what happened.
pub struct Logger {
    handle: LoggerHandle,
    worker: Option<JoinHandle<WorkerExit>>,
}

impl Logger {
    /// Build the queue and start the worker thread (named `log-<name>`)
    ///
    /// `config` must already be normalized. If the thread cannot be started
    /// the sink is dropped with it and nothing is left running.
    pub(crate) fn spawn(
        id: LoggerId,
        name: &str,
        config: LoggerConfig,
        sink: Box<dyn OutputSink>,
    ) -> Result<Self, LogError> {
        let queue = Arc::new(MessageQueue::new(config.queue_capacity)?);
        let config = Arc::new(config);
        let state = Arc::new(AtomicU8::new(WorkerState::Running as u8));

        let worker = Worker {
            queue: Arc::clone(&queue),
            config: Arc::clone(&config),
            sink,
            state: Arc::clone(&state),
        };

        let join = thread::Builder::new()
            .name(format!("log-{}", name))
            .spawn(move || worker.run())
            .map_err(|source| LogError::Spawn {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            handle: LoggerHandle {
                id,
                name: Arc::from(name),
                config,
                queue,
                state,
            },
            worker: Some(join),
        })
    }

    pub fn handle(&self) -> &LoggerHandle {
        &self.handle
    }

    pub fn id(&self) -> LoggerId {
        self.handle.id
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub(crate) fn assign_id(&mut self, id: LoggerId) {
        self.handle.id = id;
    }

    /// Stop the worker after everything queued so far has been written
    ///
    /// The sentinel waits for queue space like any other message and closes
    /// the queue behind it: later or still-blocked producers get
    /// `QueueClosed`, everything queued ahead of it is written, and the sink
    /// is closed exactly once. If the worker panicked, this returns
    /// `WorkerPanicked` instead of waiting on a queue nobody drains.
    pub fn shutdown(mut self) -> Result<WorkerStats, LogError> {
        self.terminate()
    }

    fn terminate(&mut self) -> Result<WorkerStats, LogError> {
        let Some(worker) = self.worker.take() else {
            return Ok(WorkerStats::default());
        };

        // Fails only if the worker already exited and closed the queue
        let _ = self.handle.queue.enqueue_final(LogMessage::terminate());
        let joined = worker.join();

        self.handle.queue.close();
        let discarded = self.handle.queue.drain() as u64;
        self.handle
            .state
            .store(WorkerState::Terminated as u8, Ordering::Release);

        let WorkerExit { mut sink, mut stats } =
            joined.map_err(|_| LogError::WorkerPanicked(self.handle.name.to_string()))?;
        stats.discarded = discarded;
        sink.close()?;
        Ok(stats)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(err) = self.terminate() {
                eprintln!("[mintboy] logger '{}': {}", self.handle.name, err);
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("handle", &self.handle)
            .field("running", &self.worker.is_some())
            .finish()
    }
}

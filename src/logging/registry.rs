// SPDX-License-Identifier: Apache-2.0 OR MIT
// LoggerRegistry: process-wide map from logger names to running loggers

use super::consumer::WorkerStats;
use super::format::LoggerConfig;
use super::logger::{Logger, LoggerHandle, LoggerId};
use super::sink::{OutputSink, StreamSink};
use super::table::{NameTable, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};
use super::{Level, LogError};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Sizing of the registry's name table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Slots allocated on first insert (rounded up to a power of two)
    pub initial_capacity: usize,
    /// Occupied fraction (live plus tombstones) that triggers doubling
    pub load_factor: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

/// Registry of named loggers
///
/// Create, find, and delete may be called from any thread. Lookups take a
/// shared lock; structural changes take the exclusive lock. Tearing down a
/// logger waits for its worker, so that always happens after the lock has
/// been released.
pub struct LoggerRegistry {
    table: RwLock<NameTable<Logger>>,
    config: RegistryConfig,
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            table: RwLock::new(NameTable::new(config.initial_capacity, config.load_factor)),
            config,
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, NameTable<Logger>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NameTable<Logger>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a logger and start its worker
    ///
    /// `config` defaults to `LoggerConfig::default()` and `sink` to buffered
    /// stdout. Creating a logger under a name that already exists replaces
    /// the old one; the old logger is shut down after everything it had
    /// queued has been written.
    ///
    /// # Errors
    /// `EmptyName`, `InvalidTimeFormat`, allocation failure for the queue or
    /// table, or failure to start the worker thread. Nothing is registered
    /// on error.
    pub fn create_logger(
        &self,
        name: &str,
        config: Option<LoggerConfig>,
        sink: Option<Box<dyn OutputSink>>,
    ) -> Result<LoggerId, LogError> {
        if name.is_empty() {
            return Err(LogError::EmptyName);
        }
        let config = config.unwrap_or_default().normalized()?;
        let sink = sink.unwrap_or_else(|| Box::new(StreamSink::stdout()));

        let (id, replaced) = {
            let mut table = self.write();
            table.reserve()?;

            let logger = Logger::spawn(LoggerId(0), name, config, sink)?;
            let (slot, replaced) = table.insert(name, logger)?;
            let id = LoggerId(slot);
            if let Some(logger) = table.get_mut(name) {
                logger.assign_id(id);
            }
            (id, replaced)
        };

        if let Some(old) = replaced {
            report(old.name().to_string(), old.shutdown());
        }
        Ok(id)
    }

    /// Handle to the logger named `name`
    pub fn find(&self, name: &str) -> Option<LoggerHandle> {
        self.read().get(name).map(|logger| logger.handle().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains(name)
    }

    /// Live logger names in table order
    pub fn names(&self) -> Vec<String> {
        self.read().names()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Current table capacity (0 when no logger has been created)
    pub fn capacity(&self) -> usize {
        self.read().capacity()
    }

    /// Shut down and remove the logger named `name`
    ///
    /// Queued lines are written first. Deleting an unknown name is a no-op.
    pub fn delete_logger(&self, name: &str) {
        let removed = self.write().remove(name);
        if let Some(logger) = removed {
            report(name.to_string(), logger.shutdown());
        }
    }

    /// Shut down every logger and reset the registry
    pub fn delete_loggers(&self) {
        let loggers = self.write().take_all();
        for logger in loggers {
            let name = logger.name().to_string();
            report(name, logger.shutdown());
        }
    }

    /// Log through the logger named `name`, reporting failures
    ///
    /// An unknown name is a programming error: a diagnostic is printed,
    /// every logger is shut down (flushing what it had queued), and the
    /// process exits with status 1. Use [`try_log`](Self::try_log) to get
    /// the error back instead.
    pub fn log<S: AsRef<str>>(&self, name: &str, level: Level, text: S) {
        if let Err(err) = self.try_log(name, level, text) {
            if err.is_fatal() {
                self.fail_fast(&err);
            }
            eprintln!("[mintboy] {}", err);
        }
    }

    /// Log through the logger named `name`
    ///
    /// Blocks while that logger's queue is full.
    pub fn try_log<S: AsRef<str>>(&self, name: &str, level: Level, text: S) -> Result<(), LogError> {
        // The handle is cloned out so the read lock is not held while blocked
        let handle = self
            .find(name)
            .ok_or_else(|| LogError::UnknownLogger(name.to_string()))?;
        handle.log(level, text)
    }

    fn fail_fast(&self, err: &LogError) -> ! {
        eprintln!("[mintboy] {}", err);
        self.delete_loggers();
        std::process::exit(1);
    }
}

impl Drop for LoggerRegistry {
    fn drop(&mut self) {
        self.delete_loggers();
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("config", &self.config)
            .field("table", &*self.read())
            .finish()
    }
}

fn report(name: String, result: Result<WorkerStats, LogError>) {
    match result {
        Ok(stats) if stats.write_errors > 0 || stats.discarded > 0 => eprintln!(
            "[mintboy] logger '{}': {} write errors, {} messages discarded",
            name, stats.write_errors, stats.discarded
        ),
        Ok(_) => {}
        Err(err) => eprintln!("[mintboy] logger '{}': {}", name, err),
    }
}

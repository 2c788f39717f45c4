// Asynchronous named-logger engine for mintboy
//
// Each logger owns a bounded queue, a worker thread, and an output sink.
// Callers render lines on their own thread and enqueue them; the worker
// filters by level and writes to the sink. Loggers are looked up by name
// through the registry.

mod consumer;
mod entry;
mod error;
mod format;
mod logger;
#[macro_use]
mod macros;
mod registry;
mod ringbuffer;
mod severity;
mod sink;
mod table;

// Public exports
pub use consumer::{WorkerState, WorkerStats};
pub use entry::LogMessage;
pub use error::LogError;
pub use format::{
    render, validate_time_format, write_line, LoggerConfig, DEFAULT_LINE_PREFIX,
    DEFAULT_LINE_TERMINATOR, DEFAULT_QUEUE_CAPACITY, DEFAULT_TIME_FORMAT,
};
pub use logger::{Logger, LoggerHandle, LoggerId};
pub use registry::{LoggerRegistry, RegistryConfig};
pub use ringbuffer::MessageQueue;
pub use severity::{Level, ParseLevelError};
#[cfg(unix)]
pub use sink::DescriptorSink;
pub use sink::{MemorySink, NullSink, OutputSink, StreamSink};
pub use table::{NameTable, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};

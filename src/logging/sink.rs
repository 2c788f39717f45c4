// SPDX-License-Identifier: Apache-2.0 OR MIT
// Output sinks: where a logger's worker writes rendered lines

use super::LogError;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for rendered log lines
///
/// A sink is owned by exactly one logger and only ever touched from that
/// logger's worker thread. The logger calls `close` once, after the worker
/// has written its last line.
pub trait OutputSink: Send {
    /// Write a chunk of text (a line, or a color escape around one)
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Flush any buffered output
    fn flush(&mut self) -> io::Result<()>;

    /// Release the underlying handle
    fn close(&mut self) -> io::Result<()>;
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "sink is closed")
}

// ============================================================================
// Stream sink (buffered)
// ============================================================================

/// Buffered character stream: a file or a standard stream
pub struct StreamSink {
    writer: Option<BufWriter<Box<dyn Write + Send>>>,
}

impl StreamSink {
    /// Wrap any writer
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Some(BufWriter::new(Box::new(writer))),
        }
    }

    /// Buffered standard output (the default sink)
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Buffered standard error
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Append to a file, creating it if missing
    pub fn file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl OutputSink for StreamSink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(text.as_bytes()),
            None => Err(closed_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        // Dropping the writer releases the handle (closes files)
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Descriptor sink (unbuffered)
// ============================================================================

/// Raw file descriptor, written with `write(2)` and no buffering
#[cfg(unix)]
pub struct DescriptorSink {
    fd: std::os::unix::io::RawFd,
    /// Whether `close` should close the descriptor
    owned: bool,
    closed: bool,
}

#[cfg(unix)]
impl DescriptorSink {
    /// Standard output descriptor (left open on close)
    pub fn stdout() -> Self {
        Self {
            fd: libc::STDOUT_FILENO,
            owned: false,
            closed: false,
        }
    }

    /// Standard error descriptor (left open on close)
    pub fn stderr() -> Self {
        Self {
            fd: libc::STDERR_FILENO,
            owned: false,
            closed: false,
        }
    }

    /// Write to a descriptor the caller keeps ownership of
    pub fn borrowed(fd: std::os::unix::io::RawFd) -> Result<Self, LogError> {
        Self::checked(fd, false)
    }

    /// Take ownership of a descriptor; it is closed when the logger shuts down
    pub fn owned(fd: std::os::unix::io::RawFd) -> Result<Self, LogError> {
        Self::checked(fd, true)
    }

    fn checked(fd: std::os::unix::io::RawFd, owned: bool) -> Result<Self, LogError> {
        if fd < 0 {
            return Err(LogError::InvalidHandle(format!("descriptor {}", fd)));
        }
        Ok(Self {
            fd,
            owned,
            closed: false,
        })
    }
}

#[cfg(unix)]
impl OutputSink for DescriptorSink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }

        let mut remaining = text.as_bytes();
        while !remaining.is_empty() {
            // SAFETY: `remaining` is a valid, initialized byte slice for the
            // duration of the call and `fd` was checked to be non-negative.
            let written = unsafe {
                libc::write(
                    self.fd,
                    remaining.as_ptr() as *const libc::c_void,
                    remaining.len(),
                )
            };
            if written < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if written == 0 {
                return Err(io::Error::from(io::ErrorKind::WriteZero));
            }
            remaining = &remaining[written as usize..];
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.owned {
            // SAFETY: we own `fd` and it has not been closed yet.
            if unsafe { libc::close(self.fd) } != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Drop for DescriptorSink {
    fn drop(&mut self) {
        if self.owned && !self.closed {
            let _ = self.close();
        }
    }
}

// ============================================================================
// Null and in-memory sinks
// ============================================================================

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    #[inline]
    fn write(&mut self, _text: &str) -> io::Result<()> {
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[inline]
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    chunks: Vec<String>,
    flushes: usize,
    closes: usize,
}

/// In-memory sink
///
/// Clones share one buffer, so a caller can hand one clone to a logger and
/// read what was written through another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Everything written so far, concatenated
    pub fn contents(&self) -> String {
        self.with_state(|state| state.chunks.concat())
    }

    /// Each individual `write` call, in order
    pub fn chunks(&self) -> Vec<String> {
        self.with_state(|state| state.chunks.clone())
    }

    /// Written text split into lines (terminators removed)
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn flush_count(&self) -> usize {
        self.with_state(|state| state.flushes)
    }

    pub fn close_count(&self) -> usize {
        self.with_state(|state| state.closes)
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.with_state(|state| state.chunks.push(text.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_state(|state| state.flushes += 1);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.with_state(|state| state.closes += 1);
        Ok(())
    }
}

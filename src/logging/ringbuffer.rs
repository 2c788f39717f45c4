// SPDX-License-Identifier: Apache-2.0 OR MIT
// Bounded blocking ring buffer feeding one logger's worker
//
// Many producers (any thread calling Log) and one consumer (the logger's
// worker). Producers block while the ring is full; the worker blocks while
// it is empty. Nothing is ever dropped to make room.

use super::entry::LogMessage;
use super::LogError;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Ring state guarded by the queue lock
///
/// `slots.len()` is `capacity + 1`: one slot always stays empty so that
/// `head == tail` means empty and `(head + 1) % slots == tail` means full.
struct Ring {
    slots: Box<[Option<LogMessage>]>,
    /// Write cursor
    head: usize,
    /// Read cursor
    tail: usize,
    /// Live messages, kept for diagnostics only
    size: usize,
    closed: bool,
}

impl Ring {
    #[inline]
    fn advance(&self, cursor: usize) -> usize {
        (cursor + 1) % self.slots.len()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.advance(self.head) == self.tail
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.head == self.tail
    }
}

/// Bounded multi-producer, single-consumer message queue
///
/// A queue of capacity `C` holds up to `C` live messages.
pub struct MessageQueue {
    ring: Mutex<Ring>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl MessageQueue {
    /// Create a new queue
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of queued messages (at least 1)
    ///
    /// # Errors
    /// `InvalidCapacity` for a zero capacity, `Allocation` if the slot
    /// buffer cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self, LogError> {
        if capacity == 0 {
            return Err(LogError::InvalidCapacity);
        }

        let slot_count = capacity.checked_add(1).ok_or(LogError::Allocation {
            what: "message queue",
            slots: capacity,
        })?;

        let mut slots: Vec<Option<LogMessage>> = Vec::new();
        slots
            .try_reserve_exact(slot_count)
            .map_err(|_| LogError::Allocation {
                what: "message queue",
                slots: slot_count,
            })?;
        slots.resize_with(slot_count, || None);

        Ok(Self {
            ring: Mutex::new(Ring {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
                size: 0,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        })
    }

    // Every critical section leaves the ring consistent, so a panic on
    // another thread does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message, blocking while the queue is full
    ///
    /// Returns the message back if the queue was closed before space
    /// became available.
    pub fn enqueue(&self, message: LogMessage) -> Result<(), LogMessage> {
        self.push(message, false)
    }

    /// Append a last message and close the queue in one step
    ///
    /// Waits for space like `enqueue`. Every other producer either got its
    /// message in ahead of this one or gets it back, so nothing lands behind
    /// it. The consumer can still dequeue everything up to and including it.
    pub fn enqueue_final(&self, message: LogMessage) -> Result<(), LogMessage> {
        self.push(message, true)
    }

    fn push(&self, message: LogMessage, close: bool) -> Result<(), LogMessage> {
        let mut ring = self.lock();
        while ring.is_full() && !ring.closed {
            ring = self
                .not_full
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if ring.closed {
            return Err(message);
        }

        let head = ring.head;
        ring.slots[head] = Some(message);
        ring.head = ring.advance(head);
        ring.size += 1;
        ring.closed |= close;
        drop(ring);

        self.not_empty.notify_one();
        if close {
            self.not_full.notify_all();
        }
        Ok(())
    }

    /// Remove the oldest message, blocking while the queue is empty
    ///
    /// Returns `None` only once the queue is closed and empty.
    pub fn dequeue(&self) -> Option<LogMessage> {
        let mut ring = self.lock();
        while ring.is_empty() {
            if ring.closed {
                return None;
            }
            ring = self
                .not_empty
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let tail = ring.tail;
        let message = ring.slots[tail].take();
        ring.tail = ring.advance(tail);
        ring.size -= 1;

        self.not_full.notify_one();
        message
    }

    /// Refuse further messages and wake every blocked thread
    ///
    /// Called once the worker has exited; producers still waiting for space
    /// get their message back instead of waiting forever.
    pub fn close(&self) {
        let mut ring = self.lock();
        ring.closed = true;
        drop(ring);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Release every message still queued without writing it
    ///
    /// Returns the number of messages discarded.
    pub fn drain(&self) -> usize {
        let mut ring = self.lock();
        let mut discarded = 0;
        while !ring.is_empty() {
            let tail = ring.tail;
            if ring.slots[tail].take().is_some() {
                discarded += 1;
            }
            ring.tail = ring.advance(tail);
        }
        ring.size = 0;
        drop(ring);
        self.not_full.notify_all();
        discarded
    }

    /// Maximum number of live messages
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages currently queued
    pub fn len(&self) -> usize {
        self.lock().size
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl std::fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.lock();
        f.debug_struct("MessageQueue")
            .field("capacity", &self.capacity)
            .field("len", &ring.size)
            .field("head", &ring.head)
            .field("tail", &ring.tail)
            .field("closed", &ring.closed)
            .finish()
    }
}

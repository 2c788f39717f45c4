// SPDX-License-Identifier: Apache-2.0 OR MIT
// Open-addressing name table with double hashing and tombstones
//
// Slot index of an entry is stable until the table is resized, so callers
// may use it as an identifier for the entry's lifetime in the slot.

use super::LogError;
use std::mem;

const PRIMARY_PRIME: u64 = 71;
const SECONDARY_PRIME: u64 = 197;

pub const DEFAULT_INITIAL_CAPACITY: usize = 128;
pub const DEFAULT_LOAD_FACTOR: f64 = 0.7;

/// Polynomial string hash over the name's bytes, reduced mod `buckets`
///
/// Equivalent to `sum(prime^(len-1-i) * byte[i]) mod buckets`.
pub(crate) fn string_hash(name: &str, prime: u64, buckets: usize) -> usize {
    let buckets = buckets.max(1) as u64;
    name.bytes()
        .fold(0u64, |hash, byte| (hash * prime + u64::from(byte)) % buckets) as usize
}

/// Every slot index for `name` in search order, each visited once
///
/// The step is forced odd; with a power-of-two capacity that makes the
/// sequence cover the whole table.
fn slot_sequence(name: &str, capacity: usize) -> impl Iterator<Item = usize> {
    let start = string_hash(name, PRIMARY_PRIME, capacity);
    let step = (string_hash(name, SECONDARY_PRIME, capacity) + 1) | 1;
    (0..capacity).map(move |attempt| (start + attempt * step) % capacity)
}

enum Slot<V> {
    Empty,
    Occupied { name: String, value: V },
    Tombstone,
}

impl<V> Slot<V> {
    fn into_value(self) -> Option<V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }
}

fn allocate<V>(capacity: usize) -> Result<Vec<Slot<V>>, LogError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| LogError::Allocation {
            what: "logger table",
            slots: capacity,
        })?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots)
}

/// Map from unique names to values, keyed by open addressing
///
/// The table allocates lazily on first insert, doubles when
/// `(live + tombstones) / capacity` exceeds the load factor, and returns to
/// its unallocated initial state once the last entry is removed.
pub struct NameTable<V> {
    slots: Vec<Slot<V>>,
    live: usize,
    tombstones: usize,
    initial_capacity: usize,
    load_factor: f64,
}

impl<V> Default for NameTable<V> {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR)
    }
}

impl<V> NameTable<V> {
    /// Create an empty table (nothing is allocated yet)
    ///
    /// The initial capacity is rounded up to a power of two. A load factor
    /// outside `(0, 1)` falls back to the default.
    pub fn new(initial_capacity: usize, load_factor: f64) -> Self {
        let load_factor = if load_factor > 0.0 && load_factor < 1.0 {
            load_factor
        } else {
            DEFAULT_LOAD_FACTOR
        };
        Self {
            slots: Vec::new(),
            live: 0,
            tombstones: 0,
            initial_capacity: initial_capacity.max(1).next_power_of_two(),
            load_factor,
        }
    }

    /// Live entries
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Current slot count (0 while unallocated)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Allocate or grow so the next insert has room
    ///
    /// Called by `insert`; exposed so callers can surface allocation
    /// failure before building an expensive value.
    pub fn reserve(&mut self) -> Result<(), LogError> {
        if self.slots.is_empty() {
            self.slots = allocate(self.initial_capacity)?;
            return Ok(());
        }

        let occupied = (self.live + self.tombstones) as f64;
        if occupied / self.slots.len() as f64 > self.load_factor {
            self.rehash(self.slots.len() * 2)?;
        }
        Ok(())
    }

    /// Move live entries into a fresh table of `capacity` slots
    ///
    /// Tombstones are dropped, so indices change.
    fn rehash(&mut self, capacity: usize) -> Result<(), LogError> {
        let old = mem::replace(&mut self.slots, allocate(capacity)?);
        self.tombstones = 0;

        for slot in old {
            if let Slot::Occupied { name, value } = slot {
                // Fresh table: the first empty slot on the chain is ours
                let index = slot_sequence(&name, capacity)
                    .find(|&index| matches!(self.slots[index], Slot::Empty))
                    .ok_or(LogError::Allocation {
                        what: "logger table",
                        slots: capacity,
                    })?;
                self.slots[index] = Slot::Occupied { name, value };
            }
        }
        Ok(())
    }

    /// Slot index of the live entry named `name`
    ///
    /// Tombstones are skipped over; an empty slot ends the chain.
    fn locate(&self, name: &str) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        for index in slot_sequence(name, self.slots.len()) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied { name: existing, .. } if existing == name => {
                    return Some(index)
                }
                _ => {}
            }
        }
        None
    }

    /// Insert or replace the entry for `name`
    ///
    /// Returns the slot index and, on replacement, the previous value. A new
    /// entry reuses the first tombstone on its chain.
    pub fn insert(&mut self, name: &str, value: V) -> Result<(usize, Option<V>), LogError> {
        self.reserve()?;

        if let Some(index) = self.locate(name) {
            let previous = mem::replace(
                &mut self.slots[index],
                Slot::Occupied {
                    name: name.to_string(),
                    value,
                },
            );
            return Ok((index, previous.into_value()));
        }

        let free = slot_sequence(name, self.slots.len())
            .find(|&index| !matches!(self.slots[index], Slot::Occupied { .. }));
        let Some(index) = free else {
            // Only reachable with no free slot left on the chain
            self.rehash(self.slots.len() * 2)?;
            return self.insert(name, value);
        };

        if matches!(self.slots[index], Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied {
            name: name.to_string(),
            value,
        };
        self.live += 1;
        Ok((index, None))
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.locate(name).and_then(|index| match &self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        })
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let index = self.locate(name)?;
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Slot index of `name`, if present
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.locate(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    /// Remove `name`, leaving a tombstone
    ///
    /// Removing the last entry resets the table to its initial state.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        let index = self.locate(name)?;
        let previous = mem::replace(&mut self.slots[index], Slot::Tombstone);
        self.live -= 1;
        self.tombstones += 1;

        if self.live == 0 {
            self.clear();
        }
        previous.into_value()
    }

    /// Take every live value in slot order and reset the table
    pub fn take_all(&mut self) -> Vec<V> {
        let slots = mem::take(&mut self.slots);
        self.live = 0;
        self.tombstones = 0;
        slots.into_iter().filter_map(Slot::into_value).collect()
    }

    /// Drop every entry and release the slots
    pub fn clear(&mut self) {
        self.slots = Vec::new();
        self.live = 0;
        self.tombstones = 0;
    }

    /// Live entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &V)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { name, value } => Some((index, name.as_str(), value)),
                _ => None,
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|(_, name, _)| name.to_string()).collect()
    }
}

impl<V> std::fmt::Debug for NameTable<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameTable")
            .field("live", &self.live)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.slots.len())
            .field("load_factor", &self.load_factor)
            .finish()
    }
}

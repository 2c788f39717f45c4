// SPDX-License-Identifier: Apache-2.0 OR MIT
//! mintboy: Game Boy emulator front-end and its asynchronous log engine.
//!
//! The log engine in [`logging`] keeps a registry of named loggers. Each
//! logger renders lines on the caller's thread and hands them to a
//! dedicated worker thread through a bounded queue. [`config`] loads logger
//! definitions from a JSON5 file.

pub mod config;
#[macro_use]
pub mod logging;

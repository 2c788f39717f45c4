// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros: format a message and log it through a named logger

/// Log a formatted message at an explicit level
///
/// # Examples
/// ```ignore
/// log_at!(registry, "cpu", Level::Info, "PC = {:#06x}", pc);
/// ```
#[macro_export]
macro_rules! log_at {
    ($registry:expr, $name:expr, $level:expr, $($arg:tt)+) => {
        $registry.log($name, $level, format!($($arg)+))
    };
}

/// Log a message with fatal level
///
/// # Examples
/// ```ignore
/// log_fatal!(registry, "cpu", "Illegal opcode {:#04x}", opcode);
/// ```
#[macro_export]
macro_rules! log_fatal {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $crate::log_at!($registry, $name, $crate::logging::Level::Fatal, $($arg)+)
    };
}

/// Log a message with error level
///
/// # Examples
/// ```ignore
/// log_error!(registry, "cart", "Unsupported mapper {}", mapper);
/// ```
#[macro_export]
macro_rules! log_error {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $crate::log_at!($registry, $name, $crate::logging::Level::Error, $($arg)+)
    };
}

/// Log a message with warn level
///
/// # Examples
/// ```ignore
/// log_warn!(registry, "apu", "Channel {} muted", channel);
/// ```
#[macro_export]
macro_rules! log_warn {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $crate::log_at!($registry, $name, $crate::logging::Level::Warn, $($arg)+)
    };
}

/// Log a message with info level
///
/// # Examples
/// ```ignore
/// log_info!(registry, "mintboy", "Loaded {}", path.display());
/// ```
#[macro_export]
macro_rules! log_info {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $crate::log_at!($registry, $name, $crate::logging::Level::Info, $($arg)+)
    };
}

/// Log a message with debug level
///
/// # Examples
/// ```ignore
/// log_debug!(registry, "ppu", "LY = {}", ly);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($registry:expr, $name:expr, $($arg:tt)+) => {
        $crate::log_at!($registry, $name, $crate::logging::Level::Debug, $($arg)+)
    };
}

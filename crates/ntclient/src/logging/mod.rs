// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time configurable logging.
//!
//! Four macros -- `debug!()`, `info!()`, `warn!()`, `error!()` -- backed
//! by a global sink that the embedder installs once via
//! [`init_logging`]. Without the `logging` Cargo feature the macros
//! expand to empty expressions; with the feature but no installed sink
//! they are silent no-ops, so a library user who never calls
//! [`init_logging`] gets exactly the quiet behavior the client promises.
//!
//! ```ignore
//! use ntclient::logging::{init_logging, LogLevel, StderrSink};
//!
//! init_logging(Box::new(StderrSink), LogLevel::Info);
//! info!("connected to {}", addr);
//! ```

#[cfg(feature = "logging")]
mod sink;

#[cfg(feature = "logging")]
pub use sink::{emit, init_logging, FileSink, LogLevel, LogSink, StderrSink};

/// Debug-level message; formatted like `println!()`.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Debug, format_args!($($arg)*))
    };
}

/// Info-level message; formatted like `println!()`.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Info, format_args!($($arg)*))
    };
}

/// Warning-level message; formatted like `println!()`.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Warn, format_args!($($arg)*))
    };
}

/// Error-level message; formatted like `println!()`.
#[macro_export]
#[cfg(feature = "logging")]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::LogLevel::Error, format_args!($($arg)*))
    };
}

/// No-op when the `logging` feature is disabled. Expands to a unit
/// expression so call sites work in both statement and expression
/// position.
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! debug {
    ($($arg:tt)*) => {
        ()
    };
}

/// No-op when the `logging` feature is disabled.
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! info {
    ($($arg:tt)*) => {
        ()
    };
}

/// No-op when the `logging` feature is disabled.
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! warn {
    ($($arg:tt)*) => {
        ()
    };
}

/// No-op when the `logging` feature is disabled.
#[macro_export]
#[cfg(not(feature = "logging"))]
macro_rules! error {
    ($($arg:tt)*) => {
        ()
    };
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    #[test]
    fn macros_compile_and_run_without_a_sink() {
        debug!("detail {}", 1);
        info!("plain");
        warn!("formatted {:?}", vec![1, 2]);
        error!("failure: {}", "reason");
    }
}

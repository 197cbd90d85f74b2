// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Log sinks and the process-global logger slot.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Severity, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Destination for formatted log lines. Implementations must tolerate
/// concurrent calls.
pub trait LogSink: Send + Sync {
    fn write_line(&self, level: LogLevel, line: &str);
}

/// Writes to stderr, one line per message.
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, level: LogLevel, line: &str) {
        eprintln!("[{}] ntclient: {}", level.label(), line);
    }
}

/// Appends to a file. Write failures are swallowed; logging must never
/// take the client down.
pub struct FileSink {
    file: Mutex<std::fs::File>,
}

impl FileSink {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn write_line(&self, level: LogLevel, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "[{}] ntclient: {}", level.label(), line);
        }
    }
}

struct Slot {
    sink: Box<dyn LogSink>,
    min_level: LogLevel,
}

static SLOT: OnceLock<Slot> = OnceLock::new();

/// Install the global sink. The first call wins; later calls are
/// ignored. Never calling this leaves the client silent.
pub fn init_logging(sink: Box<dyn LogSink>, min_level: LogLevel) {
    let _ = SLOT.set(Slot { sink, min_level });
}

/// Called by the logging macros. No-op until [`init_logging`] ran.
#[inline]
pub fn emit(level: LogLevel, args: fmt::Arguments<'_>) {
    if let Some(slot) = SLOT.get() {
        if level >= slot.min_level {
            slot.sink.write_line(level, &args.to_string());
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NT3 wire codec.
//!
//! Everything on the wire is big-endian. Each message is `<type:u8><body>`
//! with a self-delimiting body; there is no outer length prefix, so the
//! codec works directly against any byte source/sink and leaves buffering
//! and backpressure to the caller.
//!
//! [`wire`] holds the primitive layer (booleans, doubles, ULEB128,
//! length-prefixed strings and raw blobs, u8-counted arrays); [`message`]
//! holds the per-message framing on top of it.

pub mod message;
pub mod wire;

pub use message::Message;
pub use wire::{Decoder, Encoder};

use std::fmt;
use std::io;

/// Decode/encode failure at the wire level.
///
/// All variants are recoverable at the codec layer; the connection
/// manager decides whether to tear the connection down.
#[derive(Debug)]
pub enum WireError {
    /// The transport returned EOF in the middle of a frame.
    ShortRead,

    /// Unknown message type or entry type discriminator.
    InvalidTag { tag: u8 },

    /// A wire boolean was neither 0x00 nor 0x01.
    InvalidBoolean { byte: u8 },

    /// A ULEB128 length would not fit in 64 bits.
    UlebOverflow,

    /// An array had more than 255 elements (the count field is one byte).
    ArrayTooLong { len: usize },

    /// Underlying transport failure.
    Io(io::Error),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortRead => write!(f, "unexpected end of stream mid-frame"),
            Self::InvalidTag { tag } => write!(f, "invalid tag {:#04x}", tag),
            Self::InvalidBoolean { byte } => {
                write!(f, "boolean must be 0x00 or 0x01, not {:#04x}", byte)
            }
            Self::UlebOverflow => write!(f, "ULEB128 length exceeds 64 bits"),
            Self::ArrayTooLong { len } => {
                write!(f, "array of {} elements exceeds the u8 count field", len)
            }
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::ShortRead
        } else {
            Self::Io(e)
        }
    }
}

impl WireError {
    /// True when the peer closed the stream cleanly between frames or
    /// mid-frame; the dispatcher treats this as a normal shutdown.
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::ShortRead)
    }
}

/// Result alias for codec operations.
pub type WireResult<T> = std::result::Result<T, WireError>;

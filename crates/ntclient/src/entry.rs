// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entry model: the tagged value union, its wire type tags, and the
//! entry flags bitfield.
//!
//! The wire enum also defines 0x20 (RPC definition); this client never
//! models it, so the tag decodes to [`WireError::InvalidTag`].

use crate::codec::{Decoder, Encoder, WireError, WireResult};
use std::io::{Read, Write};

/// The wire-only sentinel id meaning "the server will assign". It never
/// appears in a store.
pub const PENDING_ID: u16 = 0xFFFF;

/// Wire type tag for an entry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryType {
    Boolean = 0x00,
    Double = 0x01,
    String = 0x02,
    Raw = 0x03,
    BooleanArray = 0x10,
    DoubleArray = 0x11,
    StringArray = 0x12,
}

impl EntryType {
    /// Map a wire tag onto the model. 0x20 (RPC definition) and anything
    /// else unknown is rejected.
    pub fn from_wire(tag: u8) -> WireResult<Self> {
        match tag {
            0x00 => Ok(Self::Boolean),
            0x01 => Ok(Self::Double),
            0x02 => Ok(Self::String),
            0x03 => Ok(Self::Raw),
            0x10 => Ok(Self::BooleanArray),
            0x11 => Ok(Self::DoubleArray),
            0x12 => Ok(Self::StringArray),
            tag => Err(WireError::InvalidTag { tag }),
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// One entry value. A true sum type: the variant is the type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Boolean(bool),
    Double(f64),
    String(String),
    Raw(Vec<u8>),
    BooleanArray(Vec<bool>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl EntryValue {
    /// The wire type tag for this value. Total over all variants.
    pub fn kind(&self) -> EntryType {
        match self {
            Self::Boolean(_) => EntryType::Boolean,
            Self::Double(_) => EntryType::Double,
            Self::String(_) => EntryType::String,
            Self::Raw(_) => EntryType::Raw,
            Self::BooleanArray(_) => EntryType::BooleanArray,
            Self::DoubleArray(_) => EntryType::DoubleArray,
            Self::StringArray(_) => EntryType::StringArray,
        }
    }

    /// Decode a value whose type tag was already read from the frame.
    pub fn read_from<R: Read>(dec: &mut Decoder<R>, kind: EntryType) -> WireResult<Self> {
        Ok(match kind {
            EntryType::Boolean => Self::Boolean(dec.read_bool()?),
            EntryType::Double => Self::Double(dec.read_f64()?),
            EntryType::String => Self::String(dec.read_string()?),
            EntryType::Raw => Self::Raw(dec.read_raw()?),
            EntryType::BooleanArray => Self::BooleanArray(dec.read_bool_array()?),
            EntryType::DoubleArray => Self::DoubleArray(dec.read_f64_array()?),
            EntryType::StringArray => Self::StringArray(dec.read_string_array()?),
        })
    }

    /// Encode the value body. The caller writes the type tag (its place
    /// in the frame differs between assignment and update messages).
    pub fn write_to<W: Write>(&self, enc: &mut Encoder<W>) -> WireResult<()> {
        match self {
            Self::Boolean(v) => enc.write_bool(*v),
            Self::Double(v) => enc.write_f64(*v),
            Self::String(v) => enc.write_string(v),
            Self::Raw(v) => enc.write_raw(v),
            Self::BooleanArray(v) => enc.write_bool_array(v),
            Self::DoubleArray(v) => enc.write_f64_array(v),
            Self::StringArray(v) => enc.write_string_array(v),
        }
    }
}

/// Entry options bitfield. Bit 0 is `persist`; the remaining bits are
/// reserved, written as zero and ignored on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFlags {
    /// Ask the server to persist the entry across reboots.
    pub persist: bool,
}

const PERSIST_BIT: u8 = 0x01;

impl EntryFlags {
    pub fn from_wire(byte: u8) -> Self {
        Self {
            persist: byte & PERSIST_BIT == PERSIST_BIT,
        }
    }

    pub fn to_wire(self) -> u8 {
        if self.persist {
            PERSIST_BIT
        } else {
            0x00
        }
    }
}

/// One shared key/value/flags record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Non-empty, unique within a server session.
    pub name: String,
    /// Server-assigned id, 0x0000..=0xFFFE once stored.
    pub id: u16,
    /// Advances by one on every value update, wrapping mod 2^16.
    pub seq: u16,
    pub flags: EntryFlags,
    pub value: EntryValue,
}

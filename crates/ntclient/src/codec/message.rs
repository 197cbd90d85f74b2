// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NT3 message framing: `<type:u8><body>`, bodies self-delimiting.
//!
//! RPC frames (0x20/0x21) are recognised but their bodies are not
//! parsed; the dispatcher drops them. Unknown type values are rejected.

use super::wire::{Decoder, Encoder};
use super::{WireError, WireResult};
use crate::entry::{Entry, EntryFlags, EntryType, EntryValue};
use std::io::{Read, Write};

pub const KEEP_ALIVE: u8 = 0x00;
pub const CLIENT_HELLO: u8 = 0x01;
pub const PROTOCOL_UNSUPPORTED: u8 = 0x02;
pub const SERVER_HELLO_COMPLETE: u8 = 0x03;
pub const SERVER_HELLO: u8 = 0x04;
pub const CLIENT_HELLO_COMPLETE: u8 = 0x05;
pub const ENTRY_ASSIGNMENT: u8 = 0x10;
pub const ENTRY_UPDATE: u8 = 0x11;
pub const ENTRY_FLAGS_UPDATE: u8 = 0x12;
pub const ENTRY_DELETE: u8 = 0x13;
pub const CLEAR_ALL_ENTRIES: u8 = 0x14;
pub const RPC_EXECUTE: u8 = 0x20;
pub const RPC_RESPONSE: u8 = 0x21;

/// The magic constant protecting clear-all-entries against misaligned
/// frames. A mismatching magic drops the clear silently.
pub const CLEAR_ALL_MAGIC: u32 = 0xD06C_B27A;

/// Server-hello flag bit: the server recognises this client identity
/// from a prior session.
const CLIENT_SEEN_BIT: u8 = 0x01;

/// One protocol message, either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    KeepAlive,
    ClientHello { revision: u16, identity: String },
    ProtocolUnsupported { supported_revision: u16 },
    ServerHelloComplete,
    ServerHello { client_seen: bool, identity: String },
    ClientHelloComplete,
    EntryAssignment(Entry),
    EntryUpdate { id: u16, seq: u16, value: EntryValue },
    EntryFlagsUpdate { id: u16, flags: EntryFlags },
    EntryDelete { id: u16 },
    ClearAllEntries { id: u16, magic: u32 },
    /// Accepted and ignored; the body is not parsed.
    RpcExecute,
    /// Accepted and ignored; the body is not parsed.
    RpcResponse,
}

impl Message {
    /// The type discriminator for this message. Total over all variants.
    pub fn wire_type(&self) -> u8 {
        match self {
            Self::KeepAlive => KEEP_ALIVE,
            Self::ClientHello { .. } => CLIENT_HELLO,
            Self::ProtocolUnsupported { .. } => PROTOCOL_UNSUPPORTED,
            Self::ServerHelloComplete => SERVER_HELLO_COMPLETE,
            Self::ServerHello { .. } => SERVER_HELLO,
            Self::ClientHelloComplete => CLIENT_HELLO_COMPLETE,
            Self::EntryAssignment(_) => ENTRY_ASSIGNMENT,
            Self::EntryUpdate { .. } => ENTRY_UPDATE,
            Self::EntryFlagsUpdate { .. } => ENTRY_FLAGS_UPDATE,
            Self::EntryDelete { .. } => ENTRY_DELETE,
            Self::ClearAllEntries { .. } => CLEAR_ALL_ENTRIES,
            Self::RpcExecute => RPC_EXECUTE,
            Self::RpcResponse => RPC_RESPONSE,
        }
    }

    /// Encode the full frame, type byte included.
    pub fn write_to<W: Write>(&self, enc: &mut Encoder<W>) -> WireResult<()> {
        enc.write_u8(self.wire_type())?;

        match self {
            Self::KeepAlive
            | Self::ServerHelloComplete
            | Self::ClientHelloComplete
            | Self::RpcExecute
            | Self::RpcResponse => Ok(()),

            Self::ClientHello { revision, identity } => {
                enc.write_u16(*revision)?;
                enc.write_string(identity)
            }

            Self::ProtocolUnsupported { supported_revision } => {
                enc.write_u16(*supported_revision)
            }

            Self::ServerHello {
                client_seen,
                identity,
            } => {
                enc.write_u8(if *client_seen { CLIENT_SEEN_BIT } else { 0x00 })?;
                enc.write_string(identity)
            }

            Self::EntryAssignment(entry) => {
                enc.write_string(&entry.name)?;
                enc.write_u8(entry.value.kind().to_wire())?;
                enc.write_u16(entry.id)?;
                enc.write_u16(entry.seq)?;
                enc.write_u8(entry.flags.to_wire())?;
                entry.value.write_to(enc)
            }

            Self::EntryUpdate { id, seq, value } => {
                enc.write_u16(*id)?;
                enc.write_u16(*seq)?;
                enc.write_u8(value.kind().to_wire())?;
                value.write_to(enc)
            }

            Self::EntryFlagsUpdate { id, flags } => {
                enc.write_u16(*id)?;
                enc.write_u8(flags.to_wire())
            }

            Self::EntryDelete { id } => enc.write_u16(*id),

            Self::ClearAllEntries { id, magic } => {
                enc.write_u16(*id)?;
                enc.write_u32(*magic)
            }
        }
    }

    /// Decode one full frame, type byte included.
    pub fn read_from<R: Read>(dec: &mut Decoder<R>) -> WireResult<Self> {
        let tag = dec.read_u8()?;

        match tag {
            KEEP_ALIVE => Ok(Self::KeepAlive),

            CLIENT_HELLO => {
                let revision = dec.read_u16()?;
                let identity = dec.read_string()?;
                Ok(Self::ClientHello { revision, identity })
            }

            PROTOCOL_UNSUPPORTED => Ok(Self::ProtocolUnsupported {
                supported_revision: dec.read_u16()?,
            }),

            SERVER_HELLO_COMPLETE => Ok(Self::ServerHelloComplete),

            SERVER_HELLO => {
                let flags = dec.read_u8()?;
                let identity = dec.read_string()?;
                Ok(Self::ServerHello {
                    client_seen: flags & CLIENT_SEEN_BIT == CLIENT_SEEN_BIT,
                    identity,
                })
            }

            CLIENT_HELLO_COMPLETE => Ok(Self::ClientHelloComplete),

            ENTRY_ASSIGNMENT => {
                let name = dec.read_string()?;
                let kind = EntryType::from_wire(dec.read_u8()?)?;
                let id = dec.read_u16()?;
                let seq = dec.read_u16()?;
                let flags = EntryFlags::from_wire(dec.read_u8()?);
                let value = EntryValue::read_from(dec, kind)?;
                Ok(Self::EntryAssignment(Entry {
                    name,
                    id,
                    seq,
                    flags,
                    value,
                }))
            }

            ENTRY_UPDATE => {
                let id = dec.read_u16()?;
                let seq = dec.read_u16()?;
                let kind = EntryType::from_wire(dec.read_u8()?)?;
                let value = EntryValue::read_from(dec, kind)?;
                Ok(Self::EntryUpdate { id, seq, value })
            }

            ENTRY_FLAGS_UPDATE => {
                let id = dec.read_u16()?;
                let flags = EntryFlags::from_wire(dec.read_u8()?);
                Ok(Self::EntryFlagsUpdate { id, flags })
            }

            ENTRY_DELETE => Ok(Self::EntryDelete {
                id: dec.read_u16()?,
            }),

            CLEAR_ALL_ENTRIES => {
                let id = dec.read_u16()?;
                let magic = dec.read_u32()?;
                Ok(Self::ClearAllEntries { id, magic })
            }

            RPC_EXECUTE => Ok(Self::RpcExecute),
            RPC_RESPONSE => Ok(Self::RpcResponse),

            tag => Err(WireError::InvalidTag { tag }),
        }
    }
}

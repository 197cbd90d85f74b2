// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection handshake: the four-phase reconciliation of client and
//! server entry sets on a fresh connection.
//!
//! ```text
//! IDLE
//!   send client-hello(0x0300, identity)      -> AWAIT_SERVER_HELLO
//! AWAIT_SERVER_HELLO
//!   recv protocol-unsupported(rev)           -> FAILED
//!   recv server-hello(flags, identity)       -> RECEIVING_ASSIGNMENTS
//! RECEIVING_ASSIGNMENTS                  (loop)
//!   recv entry-assignment                    -> store.create, stay
//!   recv server-hello-complete               -> SENDING_LOCAL
//! SENDING_LOCAL
//!   send assignment(id=0xFFFF) per name the server did not announce,
//!   then client-hello-complete               -> READY
//! ```
//!
//! The socket is not handed to the dispatcher until client-hello-complete
//! has been flushed.

use super::Error;
use crate::codec::{Decoder, Encoder, Message};
use crate::entry::{Entry, PENDING_ID};
use crate::store::{Store, StoreError};
use crate::PROTOCOL_REVISION;
use std::collections::HashSet;
use std::io::{Read, Write};

/// What the handshake learned, for logging.
pub(crate) struct HandshakeSummary {
    pub server_identity: String,
    /// Informational only; does not change behavior.
    pub client_seen: bool,
    pub assignments_received: usize,
    pub assignments_sent: usize,
}

/// Drive the handshake to READY or fail. Runs on the caller's thread
/// with exclusive access to the stream.
pub(crate) fn perform<S: Read + Write>(
    stream: &mut S,
    identity: &str,
    store: &dyn Store,
) -> Result<HandshakeSummary, Error> {
    let mut enc = Encoder::new(&mut *stream);
    Message::ClientHello {
        revision: PROTOCOL_REVISION,
        identity: identity.to_string(),
    }
    .write_to(&mut enc)?;
    drop(enc);
    stream.flush().map_err(Error::Io)?;
    crate::debug!("sent client hello as {:?}", identity);

    let mut dec = Decoder::new(&mut *stream);

    let (client_seen, server_identity) = match Message::read_from(&mut dec)? {
        Message::ServerHello {
            client_seen,
            identity,
        } => (client_seen, identity),
        Message::ProtocolUnsupported { supported_revision } => {
            return Err(Error::UnsupportedRevision(supported_revision));
        }
        other => return Err(Error::UnexpectedMessage(other.wire_type())),
    };
    crate::info!(
        "server {:?} answered hello (seen = {})",
        server_identity,
        client_seen
    );

    // Phase two: the server streams its full entry set.
    let mut server_names: HashSet<String> = HashSet::new();
    loop {
        match Message::read_from(&mut dec)? {
            Message::ServerHelloComplete => break,
            Message::EntryAssignment(entry) => {
                let name = entry.name.clone();
                store.create(entry).map_err(Error::Store)?;
                server_names.insert(name);
            }
            other => return Err(Error::UnexpectedMessage(other.wire_type())),
        }
    }
    drop(dec);

    // Phase three: replay every local entry the server did not announce.
    // The server assigns real ids and echoes them back in steady state.
    let mut assignments_sent = 0;
    let mut enc = Encoder::new(&mut *stream);
    for name in store.names().map_err(Error::Store)? {
        if server_names.contains(&name) {
            continue;
        }

        // Another caller may delete the entry between the keyset
        // snapshot and this lookup; a vanished name is simply skipped.
        let entry = match store.get_by_name(&name) {
            Ok(entry) => entry,
            Err(StoreError::NotFound) => continue,
            Err(e) => return Err(Error::Store(e)),
        };
        Message::EntryAssignment(Entry {
            id: PENDING_ID,
            ..entry
        })
        .write_to(&mut enc)?;
        assignments_sent += 1;
    }

    Message::ClientHelloComplete.write_to(&mut enc)?;
    drop(enc);
    stream.flush().map_err(Error::Io)?;

    Ok(HandshakeSummary {
        server_identity,
        client_seen,
        assignments_received: server_names.len(),
        assignments_sent,
    })
}

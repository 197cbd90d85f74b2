// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection manager: one owned TCP stream, lazy dial, single-writer
//! discipline.
//!
//! The stream lives in a mutex-guarded slot. Any public operation that
//! needs the wire locks the slot, dials and handshakes if the slot is
//! empty, and writes while still holding the lock. The reader thread
//! owns a cloned read half and never takes the lock except to clear the
//! slot on exit; an epoch counter stops a stale reader from clearing a
//! connection it never belonged to.

use super::{dispatch, handshake, Error};
use crate::store::Store;
use parking_lot::Mutex;
use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread;

#[derive(Default)]
struct Slot {
    stream: Option<TcpStream>,
    epoch: u64,
}

pub(crate) struct ConnectionManager {
    dial_addr: String,
    identity: String,
    store: Arc<dyn Store>,
    slot: Arc<Mutex<Slot>>,
}

impl ConnectionManager {
    pub(crate) fn new(dial_addr: String, identity: String, store: Arc<dyn Store>) -> Self {
        Self {
            dial_addr,
            identity,
            store,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Write one pre-encoded frame, dialing and handshaking first if no
    /// connection is live. A write failure drops the connection so the
    /// next call reconnects.
    pub(crate) fn send(&self, frame: &[u8]) -> Result<(), Error> {
        let mut slot = self.slot.lock();
        self.ensure_connected(&mut slot)?;

        let Some(stream) = slot.stream.as_mut() else {
            return Err(Error::NotConnected);
        };

        if let Err(e) = stream.write_all(frame).and_then(|()| stream.flush()) {
            crate::warn!("write failed, dropping connection: {}", e);
            slot.stream = None;
            return Err(Error::Io(e));
        }
        Ok(())
    }

    /// Shut the socket down. The reader thread observes EOF and exits;
    /// a later operation dials afresh.
    pub(crate) fn close(&self) {
        let mut slot = self.slot.lock();
        if let Some(stream) = slot.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn ensure_connected(&self, slot: &mut Slot) -> Result<(), Error> {
        if slot.stream.is_some() {
            return Ok(());
        }

        let mut stream = TcpStream::connect(&self.dial_addr).map_err(|e| Error::DialFailed {
            addr: self.dial_addr.clone(),
            source: e,
        })?;
        stream.set_nodelay(true).ok();

        let summary = handshake::perform(&mut stream, &self.identity, &*self.store)?;
        crate::info!(
            "handshake with {:?} complete ({} assignments in, {} out)",
            summary.server_identity,
            summary.assignments_received,
            summary.assignments_sent
        );

        let read_half = stream.try_clone().map_err(Error::Io)?;
        slot.epoch += 1;
        let epoch = slot.epoch;
        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.slot);

        thread::Builder::new()
            .name("ntclient-rx".to_string())
            .spawn(move || {
                dispatch::run(read_half, &*store);

                // Only clear the slot if it still holds our connection.
                let mut slot = shared.lock();
                if slot.epoch == epoch {
                    slot.stream = None;
                }
            })
            .map_err(Error::Io)?;

        slot.stream = Some(stream);
        Ok(())
    }
}

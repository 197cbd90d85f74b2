// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive layer of the NT3 wire codec.
//!
//! [`Encoder`] and [`Decoder`] wrap any byte sink/source and count the
//! bytes produced/consumed, so framing code can verify that what it wrote
//! is exactly what a peer will read back.

use super::{WireError, WireResult};
use std::io::{Read, Write};

/// Streaming writer for wire primitives. Counts bytes produced.
pub struct Encoder<W> {
    sink: W,
    produced: u64,
}

impl<W: Write> Encoder<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, produced: 0 }
    }

    /// Total bytes written through this encoder.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Consume the encoder, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> WireResult<()> {
        self.sink.write_all(data)?;
        self.produced += data.len() as u64;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> WireResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> WireResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Wire boolean: one byte, 0x00 or 0x01.
    pub fn write_bool(&mut self, value: bool) -> WireResult<()> {
        self.write_u8(u8::from(value))
    }

    /// IEEE-754 binary64, big-endian raw bit pattern.
    pub fn write_f64(&mut self, value: f64) -> WireResult<()> {
        self.write_bytes(&value.to_bits().to_be_bytes())
    }

    /// ULEB128: 7-bit little-endian chunks, high bit means "more follows".
    pub fn write_uleb128(&mut self, mut value: u64) -> WireResult<()> {
        loop {
            let mut chunk = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                chunk |= 0x80;
            }
            self.write_u8(chunk)?;
            if chunk & 0x80 == 0 {
                return Ok(());
            }
        }
    }

    /// ULEB128 length prefix, then the bytes.
    pub fn write_raw(&mut self, data: &[u8]) -> WireResult<()> {
        self.write_uleb128(data.len() as u64)?;
        self.write_bytes(data)
    }

    /// Strings are raw blobs carrying UTF-8.
    pub fn write_string(&mut self, value: &str) -> WireResult<()> {
        self.write_raw(value.as_bytes())
    }

    fn write_array_len(&mut self, len: usize) -> WireResult<()> {
        let count = u8::try_from(len).map_err(|_| WireError::ArrayTooLong { len })?;
        self.write_u8(count)
    }

    pub fn write_bool_array(&mut self, values: &[bool]) -> WireResult<()> {
        self.write_array_len(values.len())?;
        for &v in values {
            self.write_bool(v)?;
        }
        Ok(())
    }

    pub fn write_f64_array(&mut self, values: &[f64]) -> WireResult<()> {
        self.write_array_len(values.len())?;
        for &v in values {
            self.write_f64(v)?;
        }
        Ok(())
    }

    pub fn write_string_array(&mut self, values: &[String]) -> WireResult<()> {
        self.write_array_len(values.len())?;
        for v in values {
            self.write_string(v)?;
        }
        Ok(())
    }
}

/// Streaming reader for wire primitives. Counts bytes consumed.
///
/// EOF inside any primitive surfaces as [`WireError::ShortRead`].
pub struct Decoder<R> {
    source: R,
    consumed: u64,
}

impl<R: Read> Decoder<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            consumed: 0,
        }
    }

    /// Total bytes read through this decoder.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Consume the decoder, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn fill(&mut self, buf: &mut [u8]) -> WireResult<()> {
        self.source.read_exact(buf)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    pub fn read_u8(&mut self) -> WireResult<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> WireResult<u16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_u32(&mut self) -> WireResult<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_bool(&mut self) -> WireResult<bool> {
        match self.read_u8()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            byte => Err(WireError::InvalidBoolean { byte }),
        }
    }

    pub fn read_f64(&mut self) -> WireResult<f64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(f64::from_bits(u64::from_be_bytes(buf)))
    }

    pub fn read_uleb128(&mut self) -> WireResult<u64> {
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            let chunk = u64::from(byte & 0x7f);
            if shift >= 64 || (shift == 63 && chunk > 1) {
                return Err(WireError::UlebOverflow);
            }
            value |= chunk << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    pub fn read_raw(&mut self) -> WireResult<Vec<u8>> {
        let len = self.read_uleb128()?;
        let len = usize::try_from(len).map_err(|_| WireError::UlebOverflow)?;
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Reads a length-prefixed string. The wire carries UTF-8 by
    /// convention but is not validated here; invalid sequences are
    /// replaced and reported as a decode warning rather than a frame
    /// error.
    pub fn read_string(&mut self) -> WireResult<String> {
        let raw = self.read_raw()?;
        match String::from_utf8(raw) {
            Ok(s) => Ok(s),
            Err(e) => {
                crate::warn!(
                    "string on the wire is not valid UTF-8 ({} bytes), replacing",
                    e.as_bytes().len()
                );
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    fn read_array_len(&mut self) -> WireResult<usize> {
        Ok(usize::from(self.read_u8()?))
    }

    pub fn read_bool_array(&mut self) -> WireResult<Vec<bool>> {
        let len = self.read_array_len()?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_bool()?);
        }
        Ok(values)
    }

    pub fn read_f64_array(&mut self) -> WireResult<Vec<f64>> {
        let len = self.read_array_len()?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_f64()?);
        }
        Ok(values)
    }

    pub fn read_string_array(&mut self) -> WireResult<Vec<String>> {
        let len = self.read_array_len()?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_string()?);
        }
        Ok(values)
    }
}

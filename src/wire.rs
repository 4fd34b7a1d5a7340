/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The bit-exact wire format from §6: little-endian scalars, ULEB128
//! length-prefixed strings and sequences, single-byte booleans, and
//! 32-byte little-endian [`ObjectId`]s. Used both for root persistence
//! (snapshots must survive a restart bit-for-bit) and for forwarding
//! [`Event`](crate::events::Event) payloads off-process.

use std::fmt;

use crate::ids::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    UnexpectedEof,
    Uleb128Overflow,
    InvalidUtf8,
    InvalidBool(u8),
    TrailingBytes,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::UnexpectedEof => write!(f, "unexpected end of input"),
            WireError::Uleb128Overflow => write!(f, "ULEB128 value too large"),
            WireError::InvalidUtf8 => write!(f, "string bytes are not valid UTF-8"),
            WireError::InvalidBool(b) => write!(f, "invalid boolean byte {b:#x}"),
            WireError::TrailingBytes => write!(f, "trailing bytes after decoding"),
        }
    }
}

impl std::error::Error for WireError {}

pub type Result<T> = std::result::Result<T, WireError>;

#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(if value { 1 } else { 0 });
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_id(&mut self, id: ObjectId) {
        self.buf.extend_from_slice(&id.to_le_bytes());
    }

    pub fn write_uleb128(&mut self, mut value: u64) {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    pub fn write_str(&mut self, value: &str) {
        self.write_uleb128(value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn write_seq<T, F: FnMut(&mut Writer, &T)>(&mut self, items: &[T], mut write_one: F) {
        self.write_uleb128(items.len() as u64);
        for item in items {
            write_one(self, item);
        }
    }
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    pub fn finish(self) -> Result<()> {
        if self.pos == self.buf.len() {
            Ok(())
        } else {
            Err(WireError::TrailingBytes)
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(WireError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_id(&mut self) -> Result<ObjectId> {
        let bytes: [u8; 32] = self.take(32)?.try_into().unwrap();
        Ok(ObjectId::from_le_bytes(bytes))
    }

    pub fn read_uleb128(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.take(1)?[0];
            if shift >= 64 {
                return Err(WireError::Uleb128Overflow);
            }
            value |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(value)
    }

    pub fn read_str(&mut self) -> Result<String> {
        let len = self.read_uleb128()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| WireError::InvalidUtf8)
    }

    pub fn read_seq<T, F: FnMut(&mut Reader<'a>) -> Result<T>>(
        &mut self,
        mut read_one: F,
    ) -> Result<Vec<T>> {
        let len = self.read_uleb128()? as usize;
        let mut out = Vec::with_capacity(len.min(1 << 16));
        for _ in 0..len {
            out.push(read_one(self)?);
        }
        Ok(out)
    }
}

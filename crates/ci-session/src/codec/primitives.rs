//! Byte-level reader and writer for the PHP serialization format.
//!
//! The format is length-prefixed by byte count and strings may hold multi-byte
//! text, so everything here works on raw byte offsets and never decodes
//! characters.

use std::fmt::Display;

use crate::error::DecodeError;

// =============================================================================
// DECODING
// =============================================================================

/// Cursor over an immutable byte slice.
///
/// Reads return borrowed sub-slices of the input and advance the cursor.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the first byte.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the unread bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the number of unread bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Returns the next byte without consuming it.
    #[inline]
    pub fn peek_byte(&self) -> Result<u8, DecodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEnd { position: self.pos })
    }

    /// Reads exactly `n` bytes.
    #[inline]
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Returns the next `n` bytes without consuming them.
    #[inline]
    pub fn peek(&self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::UnexpectedEnd {
                position: self.data.len(),
            });
        }
        Ok(&self.data[self.pos..self.pos + n])
    }

    /// Reads up to the first occurrence of `delimiter`.
    ///
    /// With `include` the delimiter is part of the result and consumed;
    /// otherwise the cursor stops in front of it.
    pub fn read_until(&mut self, delimiter: u8, include: bool) -> Result<&'a [u8], DecodeError> {
        let offset = self
            .remaining()
            .iter()
            .position(|&b| b == delimiter)
            .ok_or(DecodeError::DelimiterNotFound {
                delimiter,
                position: self.pos,
            })?;
        let len = if include { offset + 1 } else { offset };
        self.read_exact(len)
    }

    /// Consumes one byte and checks that it is `expected`.
    #[inline]
    pub fn expect(&mut self, expected: u8) -> Result<(), DecodeError> {
        let position = self.pos;
        match self.data.get(position) {
            Some(&b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(&b) => Err(DecodeError::UnexpectedByte {
                expected,
                actual: Some(b),
                position,
            }),
            None => Err(DecodeError::UnexpectedByte {
                expected,
                actual: None,
                position,
            }),
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Append-only output buffer.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes the `Display` rendering of a value (integers, lengths).
    pub fn write_display<T: Display>(&mut self, value: T) {
        use std::io::Write;
        // Writing into a Vec cannot fail.
        let _ = write!(self.buf, "{}", value);
    }
}

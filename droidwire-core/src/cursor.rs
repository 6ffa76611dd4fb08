//! Bounds-checked byte reader with explicit per-field endianness
//!
//! The wire format mixes big- and little-endian fields within a single
//! frame, so every read names its byte order instead of assuming one for
//! the whole buffer.

use crate::error::CodecError;

/// A forward-only reader over a byte slice
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True if every byte has been consumed
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, want: usize) -> Result<(), CodecError> {
        if self.remaining() < want {
            return Err(CodecError::TruncatedCommand {
                expected: want,
                actual: self.remaining(),
            });
        }
        Ok(())
    }

    /// Read one unsigned byte
    pub fn u8(&mut self) -> Result<u8, CodecError> {
        self.check(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Read one byte, reinterpreted as signed two's complement
    pub fn i8(&mut self) -> Result<i8, CodecError> {
        Ok(self.u8()? as i8)
    }

    /// Read a big-endian u16
    pub fn u16_be(&mut self) -> Result<u16, CodecError> {
        self.check(2)?;
        let v = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    /// Read a little-endian u16
    pub fn u16_le(&mut self) -> Result<u16, CodecError> {
        self.check(2)?;
        let v = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    /// Consume exactly `n` bytes
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        self.check(n)?;
        let s = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    /// Consume and return everything left
    pub fn rest(&mut self) -> &'a [u8] {
        let s = &self.data[self.pos..];
        self.pos = self.data.len();
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_endian_reads() {
        let mut c = ByteCursor::new(&[0x12, 0x34, 0x34, 0x12, 0xFF]);
        assert_eq!(c.u16_be().unwrap(), 0x1234);
        assert_eq!(c.u16_le().unwrap(), 0x1234);
        assert_eq!(c.i8().unwrap(), -1);
        assert!(c.is_empty());
    }

    #[test]
    fn test_underrun_reports_sizes() {
        let mut c = ByteCursor::new(&[0x01]);
        assert_eq!(c.u8().unwrap(), 0x01);
        assert_eq!(
            c.u16_be(),
            Err(CodecError::TruncatedCommand {
                expected: 2,
                actual: 0
            })
        );
    }

    #[test]
    fn test_take_and_rest() {
        let mut c = ByteCursor::new(&[1, 2, 3, 4]);
        assert_eq!(c.take(2).unwrap(), &[1, 2]);
        assert_eq!(c.rest(), &[3, 4]);
        assert!(c.take(1).is_err());
    }
}

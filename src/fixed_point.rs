//! Fixed-point (milli-unit) field encoding.
//!
//! Physical quantities travel as unsigned 16-bit big-endian integers scaled
//! by 1000, so 4.2 V is sent as `4200` (`0x10 0x68`). Replies are read field
//! by field through [`FieldReader`].

use crate::error::{B6Error, Result};

/// Scale between a physical value and its wire integer
pub const SCALE: f64 = 1000.0;

/// Convert a physical value to its milli-unit integer.
///
/// Fails with [`B6Error::FieldOutOfRange`] when the rounded value does not fit
/// in 16 bits or the input is not finite.
pub fn to_milli(field: &'static str, value: f64) -> Result<u16> {
    let scaled = (value * SCALE).round();
    if !scaled.is_finite() || scaled < 0.0 || scaled > u16::MAX as f64 {
        return Err(B6Error::FieldOutOfRange { field, value });
    }
    Ok(scaled as u16)
}

/// Convert a milli-unit integer back to its physical value.
pub fn from_milli(raw: u16) -> f64 {
    raw as f64 / SCALE
}

/// Append a physical value as two big-endian bytes.
pub fn push_milli(buf: &mut Vec<u8>, field: &'static str, value: f64) -> Result<()> {
    let raw = to_milli(field, value)?;
    buf.extend_from_slice(&raw.to_be_bytes());
    Ok(())
}

/// Sequential big-endian reader over the fields of a reply.
#[derive(Debug)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Start reading `buf` at `offset`.
    pub fn new(buf: &'a [u8], offset: usize) -> Self {
        FieldReader { buf, pos: offset }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let bytes = self.buf.get(self.pos..end).ok_or(B6Error::FrameTooShort {
            expected: end,
            actual: self.buf.len(),
        })?;
        self.pos = end;
        Ok(bytes)
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read one byte as an on/off flag.
    pub fn flag(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    /// Read a raw two-byte big-endian integer.
    pub fn u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a two-byte milli-unit field as volts.
    pub fn volts(&mut self) -> Result<f64> {
        Ok(from_milli(self.u16()?))
    }

    /// Skip bytes the protocol leaves unused.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }
}

//! Hex field reader for the body of a single record line (everything after ':').
//! Each decoded byte is folded into a running checksum.

use crate::error::DecodeErrorKind;

const BYTE_CHAR_LEN: usize = 2;

pub(crate) struct FieldReader<'a> {
    digits: &'a [u8],
    sum: u8,
}

impl<'a> FieldReader<'a> {
    pub(crate) const fn new(digits: &'a [u8]) -> Self {
        Self { digits, sum: 0 }
    }

    /// Running checksum over all bytes decoded so far.
    pub(crate) const fn sum(&self) -> u8 {
        self.sum
    }

    /// Number of hex digits not consumed yet.
    pub(crate) const fn remaining(&self) -> usize {
        self.digits.len()
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8, DecodeErrorKind> {
        let (pair, rest) = match self.digits {
            [] => return Err(DecodeErrorKind::RecordTooShort),
            [_] => return Err(DecodeErrorKind::MalformedHex),
            _ => self.digits.split_at(BYTE_CHAR_LEN),
        };
        let byte = (nibble(pair[0])? << 4) | nibble(pair[1])?;
        self.digits = rest;
        self.sum = self.sum.wrapping_add(byte);
        Ok(byte)
    }

    /// Big-endian 16-bit field.
    pub(crate) fn read_word(&mut self) -> Result<u16, DecodeErrorKind> {
        let high = self.read_byte()?;
        let low = self.read_byte()?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, DecodeErrorKind> {
        let mut bytes = Vec::with_capacity(n);
        for _ in 0..n {
            bytes.push(self.read_byte()?);
        }
        Ok(bytes)
    }
}

const fn nibble(ch: u8) -> Result<u8, DecodeErrorKind> {
    match ch {
        b'0'..=b'9' => Ok(ch - b'0'),
        b'a'..=b'f' => Ok(ch - b'a' + 10),
        b'A'..=b'F' => Ok(ch - b'A' + 10),
        _ => Err(DecodeErrorKind::MalformedHex),
    }
}

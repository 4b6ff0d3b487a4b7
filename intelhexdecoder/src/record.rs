//! The `record` module defines the [`RecordType`] of an Intel HEX line and the
//! [`Record`] value the decoder emits for data records.

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    Data = 0x0,
    EndOfFile = 0x1,
    ExtendedSegmentAddress = 0x2,
    StartSegmentAddress = 0x3,
    ExtendedLinearAddress = 0x4,
    StartLinearAddress = 0x5,
}

impl RecordType {
    /// Maps the raw record type byte. Types above `0x05` have no meaning and
    /// yield `None`.
    ///
    /// # Example
    /// ```
    /// use intelhexdecoder::RecordType;
    ///
    /// assert_eq!(RecordType::from_byte(0x04), Some(RecordType::ExtendedLinearAddress));
    /// assert_eq!(RecordType::from_byte(0x06), None);
    /// ```
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Data),
            0x01 => Some(Self::EndOfFile),
            0x02 => Some(Self::ExtendedSegmentAddress),
            0x03 => Some(Self::StartSegmentAddress),
            0x04 => Some(Self::ExtendedLinearAddress),
            0x05 => Some(Self::StartLinearAddress),
            _ => None,
        }
    }

    /// Payload length every record of this type must declare.
    /// Data records may carry anything from 0 to 255 bytes, so they have none.
    #[must_use]
    pub const fn expected_length(self) -> Option<usize> {
        match self {
            Self::Data => None,
            Self::EndOfFile => Some(0),
            Self::ExtendedSegmentAddress | Self::ExtendedLinearAddress => Some(2),
            Self::StartSegmentAddress | Self::StartLinearAddress => Some(4),
        }
    }
}

/// Address and payload of one decoded data record.
///
/// The address already includes whatever segment or linear base was in
/// effect when the record was read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Record {
    pub address: u32,
    pub bytes: Vec<u8>,
}

impl Record {
    #[must_use]
    pub const fn new(address: u32, bytes: Vec<u8>) -> Self {
        Self { address, bytes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Address one past the last byte of the record.
    /// Returned as `u64` since a linear record can end exactly at 4 GiB.
    #[must_use]
    pub fn end_address(&self) -> u64 {
        u64::from(self.address) + self.bytes.len() as u64
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}:", self.address)?;
        for b in &self.bytes {
            write!(f, " {b:02X}")?;
        }
        Ok(())
    }
}

/// Calculate the checksum byte for the given record bytes
/// (length, address, type and payload).
///
/// # Example
/// ```
/// use intelhexdecoder::checksum;
///
/// // :020000021200EA
/// assert_eq!(checksum(&[0x02, 0x00, 0x00, 0x02, 0x12, 0x00]), 0xEA);
/// ```
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (!sum).wrapping_add(1) // two's complement
}

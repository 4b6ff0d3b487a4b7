//! The `error` module defines the [`DecodeError`] enum that describes the errors that
//! can occur when decoding an Intel HEX stream via [`Decoder`](crate::Decoder).
//! It carries two pieces of information:
//! 1. What kind of error was encountered (via [`DecodeErrorKind`]), or the I/O error
//!    reported by the underlying reader.
//! 2. At which line of the stream the decoding failed.
//!
//! Every error is fatal for the decoder that produced it.

use crate::record::RecordType;
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum DecodeError {
    /// Record-level failure and the 1-based line number it was detected at.
    ParseRecordError(DecodeErrorKind, usize),
    /// Error reported by the underlying reader, passed through as-is.
    Io(Arc<io::Error>),
}

impl DecodeError {
    /// Returns the kind of record error, or `None` for I/O errors.
    #[must_use]
    pub const fn kind(&self) -> Option<&DecodeErrorKind> {
        match self {
            Self::ParseRecordError(kind, _) => Some(kind),
            Self::Io(_) => None,
        }
    }

    /// Returns the line number the error was detected at, or `None` for I/O errors.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::ParseRecordError(_, line) => Some(*line),
            Self::Io(_) => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl PartialEq for DecodeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ParseRecordError(k1, l1), Self::ParseRecordError(k2, l2)) => {
                k1 == k2 && l1 == l2
            }
            (Self::Io(e1), Self::Io(e2)) => Arc::ptr_eq(e1, e2),
            _ => false,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseRecordError(base_err, line) => write!(f, "line {line}: {base_err}"),
            Self::Io(err) => write!(f, "I/O error while reading hex stream: {err}"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ParseRecordError(base_err, _) => Some(base_err),
            Self::Io(err) => Some(err.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Line has content but does not begin with a ':'
    MissingRecordMark,
    /// Non-hexadecimal character or an unpaired hex digit
    MalformedHex,
    /// Declared field extends past the end of the line
    RecordTooShort,
    /// Record's payload length does not match the record type
    InvalidRecordLength(RecordType, usize, usize),
    /// Sum of all record bytes is not zero (holds the residual sum)
    InvalidChecksum(u8),
    /// Hex digits left over after the checksum byte
    TrailingData(usize),
    /// Stream ended without an end-of-file record
    MissingEndRecord,
    /// Non-blank line found after the end-of-file record
    RecordAfterEnd,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRecordMark => {
                write!(f, "missing record mark ':'")
            }
            Self::MalformedHex => {
                write!(f, "malformed hex digits")
            }
            Self::RecordTooShort => {
                write!(f, "record too short")
            }
            Self::InvalidRecordLength(rtype, expected, actual) => {
                write!(
                    f,
                    "invalid record length - for record type {rtype:?} expected {expected} bytes, found {actual}"
                )
            }
            Self::InvalidChecksum(residual) => {
                write!(
                    f,
                    "invalid checksum - record sums to 0x{residual:02X} instead of 0x00"
                )
            }
            Self::TrailingData(digits) => {
                write!(f, "trailing data - {digits} hex digit(s) after checksum")
            }
            Self::MissingEndRecord => {
                write!(f, "missing end record")
            }
            Self::RecordAfterEnd => {
                write!(f, "record after end")
            }
        }
    }
}

impl Error for DecodeErrorKind {}

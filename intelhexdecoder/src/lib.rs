//! # `intelhexdecoder`
//!
//! `intelhexdecoder` is a Rust library for decoding Intel HEX streams record by record.
//!
//! The library provides:
//! - Pull-based decoder over any buffered reader (via [`Decoder`] struct).
//! - Segment (type 2) and linear (type 4) address bookkeeping, including 16-bit
//!   wraparound of segment records.
//! - Start addresses from type 3 (CS:IP) and type 5 (EIP) records.
//! - Error handling with [`DecodeError`].
//!
//! ## Example
//!
//! ```
//! use intelhexdecoder::Decoder;
//!
//! let hex = "\
//! :1000000000E10EBFEFE531E001E011E0010F40E05B
//! :1000100052E00E94710432E000E111EF010F41E073
//! :00000001FF
//! ";
//!
//! let mut decoder = Decoder::new(hex.as_bytes());
//! while decoder.pull() {
//!     let record = decoder.record();
//!     println!("{:04X} {}", record.address, record.bytes.len());
//! }
//! assert!(decoder.error().is_none());
//! ```

mod decoder;
mod error;
mod fields;
mod record;

// Public APIs
#[cfg(feature = "benchmarking")]
pub use decoder::bench_priv_parse_line;
pub use decoder::{BaseAddress, Decoder, decode_str};
pub use error::{DecodeError, DecodeErrorKind};
pub use record::{Record, RecordType, checksum};

//! The `decoder` module provides the [`Decoder`] struct, a pull-based reader of
//! Intel HEX records.
//!
//! The decoder consumes one line at a time from any [`BufRead`] source. Records that
//! only change decoder state (end-of-file, extended segment/linear address, start
//! address) are absorbed internally; every call to [`Decoder::pull`] stops at the next
//! data record. Start addresses from type 3 and type 5 records are kept aside and
//! can be queried once decoding is finished.
//!
//! Any error is terminal: it is stored once and every later pull returns `false`
//! without touching the reader again.

use crate::error::{DecodeError, DecodeErrorKind};
use crate::fields::FieldReader;
use crate::record::{Record, RecordType};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Size of the address window a 16-bit record offset can reach.
const SEGMENT_WINDOW: usize = 0x1_0000;

/// Base address contributed by the most recent type 2 or type 4 record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BaseAddress {
    /// No extended address record seen yet
    #[default]
    None,
    /// Segment base (`segment << 4`), added to the record offset
    Segment(u32),
    /// Upper linear address (`upper << 16`), OR-ed with the record offset
    Linear(u32),
}

impl BaseAddress {
    /// Absolute address of a record offset under this base.
    ///
    /// # Example
    /// ```
    /// use intelhexdecoder::BaseAddress;
    ///
    /// assert_eq!(BaseAddress::Segment(0x12000).resolve(0xFFFF), 0x21FFF);
    /// assert_eq!(BaseAddress::Linear(0xFFFF_0000).resolve(0x0010), 0xFFFF_0010);
    /// ```
    #[must_use]
    pub fn resolve(self, offset: u16) -> u32 {
        let offset = u32::from(offset);
        match self {
            Self::None => offset,
            Self::Segment(base) => base + offset,
            Self::Linear(base) => base | offset,
        }
    }

    /// Start of the 64 KiB window that offsets wrap around in.
    const fn window_start(self) -> u32 {
        match self {
            Self::Segment(base) => base,
            Self::None | Self::Linear(_) => 0,
        }
    }
}

/// Fields of one checked record line.
struct RawRecord {
    rtype: u8,
    offset: u16,
    payload: Vec<u8>,
}

#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    /// Line buffer reused between reads
    buf: Vec<u8>,
    /// Lines consumed so far
    line: usize,
    /// End-of-file record seen
    ended: bool,
    base: BaseAddress,
    cs_ip: Option<(u16, u16)>,
    eip: Option<u32>,
    current: Record,
    /// Wrapped tail of a data record that crossed the segment boundary
    pending: Option<Record>,
    error: Option<DecodeError>,
    /// Error already handed out by the iterator
    error_reported: bool,
}

impl Decoder<BufReader<File>> {
    /// Opens a hex file for decoding.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    ///
    /// # Example
    /// ```
    /// use intelhexdecoder::Decoder;
    ///
    /// let mut decoder = Decoder::open("tests/fixtures/avr_blink.hex").unwrap();
    /// while decoder.pull() {}
    /// assert!(decoder.error().is_none());
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Decoder<R> {
    /// Creates a decoder reading lines from `reader`.
    ///
    /// # Example
    /// ```
    /// use intelhexdecoder::Decoder;
    ///
    /// let hex = ":0B0010006164647265737320676170A7\n:00000001FF\n";
    /// let mut decoder = Decoder::new(hex.as_bytes());
    ///
    /// assert!(decoder.pull());
    /// assert_eq!(decoder.record().address, 0x0010);
    /// assert_eq!(decoder.record().bytes, b"address gap");
    /// assert!(!decoder.pull());
    /// assert!(decoder.error().is_none());
    /// ```
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            ended: false,
            base: BaseAddress::None,
            cs_ip: None,
            eip: None,
            current: Record::default(),
            pending: None,
            error: None,
            error_reported: false,
        }
    }

    /// Advances to the next data record.
    ///
    /// Returns `true` when a new record is available via [`Decoder::record`].
    /// Returns `false` once the stream is exhausted, or when an error occurred
    /// (see [`Decoder::error`]). The error is sticky: later calls return `false`
    /// straight away.
    pub fn pull(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        if let Some(record) = self.pending.take() {
            trace!(address = record.address, len = record.len(), "wrapped data record");
            self.current = record;
            return true;
        }

        match self.advance() {
            Ok(Some(record)) => {
                trace!(address = record.address, len = record.len(), "data record");
                self.current = record;
                true
            }
            Ok(None) => false,
            Err(err) => {
                debug!(%err, "decoding stopped");
                self.error = Some(err);
                false
            }
        }
    }

    /// Most recent data record produced by [`Decoder::pull`].
    /// Empty record at address 0 before the first successful pull.
    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.current
    }

    /// First error encountered, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    /// CS:IP pair of the last type 3 record seen.
    #[must_use]
    pub const fn cs_ip(&self) -> Option<(u16, u16)> {
        self.cs_ip
    }

    /// EIP of the last type 5 record seen.
    #[must_use]
    pub const fn eip(&self) -> Option<u32> {
        self.eip
    }

    /// Number of lines consumed so far, blank ones included.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub const fn base_address(&self) -> BaseAddress {
        self.base
    }

    /// Whether the end-of-file record has been read.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Reads lines until a data record is ready or the stream ends.
    fn advance(&mut self) -> Result<Option<Record>, DecodeError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                if self.ended {
                    return Ok(None);
                }
                return Err(self.record_error(DecodeErrorKind::MissingEndRecord));
            }
            self.line += 1;

            let line = self.buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            if self.ended {
                return Err(self.record_error(DecodeErrorKind::RecordAfterEnd));
            }

            let raw = parse_line(line).map_err(|kind| self.record_error(kind))?;
            if let Some(record) = self.apply(raw) {
                return Ok(Some(record));
            }
        }
    }

    /// Updates decoder state from a checked record. Returns the record to emit
    /// for data records.
    fn apply(&mut self, raw: RawRecord) -> Option<Record> {
        let Some(rtype) = RecordType::from_byte(raw.rtype) else {
            warn!(
                line = self.line,
                rtype = raw.rtype,
                "ignoring record of unknown type"
            );
            return None;
        };

        match rtype {
            RecordType::Data => return Some(self.data_record(raw.offset, raw.payload)),
            RecordType::EndOfFile => {
                debug!(line = self.line, "end of file record");
                self.ended = true;
            }
            RecordType::ExtendedSegmentAddress => {
                let segment = be_word(&raw.payload, 0);
                self.base = BaseAddress::Segment(u32::from(segment) << 4);
                debug!(line = self.line, base = ?self.base, "extended segment address");
            }
            RecordType::StartSegmentAddress => {
                let cs = be_word(&raw.payload, 0);
                let ip = be_word(&raw.payload, 2);
                if self.cs_ip.is_some() {
                    debug!(line = self.line, "overriding previous start segment address");
                }
                self.cs_ip = Some((cs, ip));
            }
            RecordType::ExtendedLinearAddress => {
                let upper = be_word(&raw.payload, 0);
                self.base = BaseAddress::Linear(u32::from(upper) << 16);
                debug!(line = self.line, base = ?self.base, "extended linear address");
            }
            RecordType::StartLinearAddress => {
                let high = be_word(&raw.payload, 0);
                let low = be_word(&raw.payload, 2);
                if self.eip.is_some() {
                    debug!(line = self.line, "overriding previous start linear address");
                }
                self.eip = Some((u32::from(high) << 16) | u32::from(low));
            }
        }
        None
    }

    /// Builds the data record at the current base. Outside linear mode, bytes past
    /// the end of the 64 KiB window are split off into the pending record, which
    /// starts again at the bottom of the window.
    fn data_record(&mut self, offset: u16, mut bytes: Vec<u8>) -> Record {
        let address = self.base.resolve(offset);

        if !matches!(self.base, BaseAddress::Linear(_)) {
            let room = SEGMENT_WINDOW - usize::from(offset);
            if bytes.len() > room {
                let tail = bytes.split_off(room);
                let wrapped = Record::new(self.base.window_start(), tail);
                debug!(
                    line = self.line,
                    address = wrapped.address,
                    len = wrapped.len(),
                    "data record wraps around segment boundary"
                );
                self.pending = Some(wrapped);
            }
        }

        Record::new(address, bytes)
    }

    fn record_error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::ParseRecordError(kind, self.line)
    }
}

impl<R: BufRead> Iterator for Decoder<R> {
    type Item = Result<Record, DecodeError>;

    /// Yields every data record, then the error (if any) once.
    fn next(&mut self) -> Option<Self::Item> {
        if self.pull() {
            return Some(Ok(self.current.clone()));
        }
        if self.error_reported {
            return None;
        }
        self.error_reported = true;
        self.error.clone().map(Err)
    }
}

impl<R: BufRead> FusedIterator for Decoder<R> {}

/// Decodes a complete in-memory hex image into its data records.
///
/// # Errors
/// Returns the first error encountered while decoding.
///
/// # Example
/// ```
/// use intelhexdecoder::decode_str;
///
/// let records = decode_str(":020000021200EA\n:02FFFF00000000\n:00000001FF\n").unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].address, 0x21FFF);
/// assert_eq!(records[1].address, 0x12000);
/// ```
pub fn decode_str(input: &str) -> Result<Vec<Record>, DecodeError> {
    Decoder::new(input.as_bytes()).collect()
}

/// Decodes and checks one trimmed, non-empty line. The line is validated as a
/// whole (length table, checksum, trailing data) before it can affect any state.
fn parse_line(line: &[u8]) -> Result<RawRecord, DecodeErrorKind> {
    let Some((&b':', body)) = line.split_first() else {
        return Err(DecodeErrorKind::MissingRecordMark);
    };

    let mut fields = FieldReader::new(body);
    let reclen = fields.read_byte()?;
    let offset = fields.read_word()?;
    let rtype = fields.read_byte()?;

    if let Some(known) = RecordType::from_byte(rtype)
        && let Some(expected) = known.expected_length()
        && usize::from(reclen) != expected
    {
        return Err(DecodeErrorKind::InvalidRecordLength(
            known,
            expected,
            usize::from(reclen),
        ));
    }

    let payload = fields.read_bytes(usize::from(reclen))?;

    // Checksum byte brings the running sum back to zero
    fields.read_byte()?;
    if fields.sum() != 0 {
        return Err(DecodeErrorKind::InvalidChecksum(fields.sum()));
    }
    if fields.remaining() > 0 {
        return Err(DecodeErrorKind::TrailingData(fields.remaining()));
    }

    Ok(RawRecord {
        rtype,
        offset,
        payload,
    })
}

fn be_word(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

/// Exposes single-line parsing to the benchmarks.
#[cfg(feature = "benchmarking")]
#[must_use]
pub fn bench_priv_parse_line(line: &[u8]) -> bool {
    parse_line(line).is_ok()
}

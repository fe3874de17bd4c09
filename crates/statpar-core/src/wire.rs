//! Fixed-size result record encoding.
//!
//! Used by process-isolated workers to send their single result over the
//! shared byte stream.
//!
//! ```text
//! +-----------+---------------------------+
//! | tag (u8)  | value (f64, 8 bytes, LE)  |
//! +-----------+---------------------------+
//! ```
//!
//! Each record is written with one `write_all` call. Nine bytes is below
//! `PIPE_BUF`, so a record from one worker never interleaves with another's.

use std::io::{self, BufReader, Read, Write};

use thiserror::Error;

use crate::constants::RECORD_LEN;
use crate::kind::{StatKind, StatResult};

/// Errors that can occur while encoding or decoding records.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown record tag: {0}")]
    UnknownTag(u8),

    #[error("truncated record: got {got} of {expected} bytes")]
    Truncated { got: usize, expected: usize },

    #[error("end of stream")]
    EndOfStream,
}

/// Encode a result into its on-wire form.
#[must_use]
pub fn encode_record(result: &StatResult) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    buf[0] = result.kind.tag();
    buf[1..].copy_from_slice(&result.value.to_le_bytes());
    buf
}

/// Decode one complete record.
pub fn decode_record(buf: &[u8; RECORD_LEN]) -> Result<StatResult, WireError> {
    let kind = StatKind::from_tag(buf[0]).ok_or(WireError::UnknownTag(buf[0]))?;
    let mut value = [0u8; 8];
    value.copy_from_slice(&buf[1..]);
    Ok(StatResult::new(kind, f64::from_le_bytes(value)))
}

/// Write one record in a single write and flush it.
pub fn write_record<W: Write>(writer: &mut W, result: &StatResult) -> Result<(), WireError> {
    let buf = encode_record(result);
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Read one record.
///
/// Returns [`WireError::EndOfStream`] when the stream ends cleanly on a
/// record boundary and [`WireError::Truncated`] when it ends mid-record.
pub fn read_record<R: Read>(reader: &mut R) -> Result<StatResult, WireError> {
    let mut buf = [0u8; RECORD_LEN];
    let mut filled = 0;
    while filled < RECORD_LEN {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(WireError::Io(e)),
        }
    }
    match filled {
        0 => Err(WireError::EndOfStream),
        RECORD_LEN => decode_record(&buf),
        got => Err(WireError::Truncated {
            got,
            expected: RECORD_LEN,
        }),
    }
}

/// Buffered reader yielding records until end of stream.
pub struct RecordReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the next record.
    pub fn read(&mut self) -> Result<StatResult, WireError> {
        read_record(&mut self.reader)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<StatResult, WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read() {
            Err(WireError::EndOfStream) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn layout_is_tag_then_le_double() {
        let buf = encode_record(&StatResult::new(StatKind::Mean, 50.0));
        assert_eq!(buf, [1, 0, 0, 0, 0, 0, 0, 0x49, 0x40]);
    }

    #[test]
    fn unknown_tag_rejected() {
        let mut buf = encode_record(&StatResult::new(StatKind::Median, 1.0));
        buf[0] = 9;
        assert!(matches!(decode_record(&buf), Err(WireError::UnknownTag(9))));
    }

    #[test]
    fn three_records_in_any_order() {
        let records = [
            StatResult::new(StatKind::Deviation, 35.355_339),
            StatResult::new(StatKind::Mean, 50.0),
            StatResult::new(StatKind::Median, 49.5),
        ];
        let mut stream = Vec::new();
        for r in &records {
            write_record(&mut stream, r).unwrap();
        }
        assert_eq!(stream.len(), 3 * RECORD_LEN);

        let decoded: Vec<StatResult> = RecordReader::new(Cursor::new(stream))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn clean_end_of_stream() {
        let mut reader = Cursor::new(Vec::new());
        assert!(matches!(read_record(&mut reader), Err(WireError::EndOfStream)));
    }

    #[test]
    fn partial_record_is_truncated() {
        let buf = encode_record(&StatResult::new(StatKind::Mean, 1.0));
        let mut reader = Cursor::new(buf[..4].to_vec());
        assert!(matches!(
            read_record(&mut reader),
            Err(WireError::Truncated { got: 4, expected: 9 })
        ));
    }

    #[test]
    fn special_values_survive() {
        for value in [0.0, -0.0, f64::MAX, f64::MIN_POSITIVE, f64::INFINITY] {
            let buf = encode_record(&StatResult::new(StatKind::Deviation, value));
            let back = decode_record(&buf).unwrap();
            assert_eq!(back.value.to_bits(), value.to_bits());
        }
    }

    /// A reader that hands out one byte per call, like a pipe under pressure.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = buf.len().min(1);
            self.0.read(&mut buf[..end])
        }
    }

    #[test]
    fn reassembles_fragmented_reads() {
        let buf = encode_record(&StatResult::new(StatKind::Median, 2.5));
        let mut reader = Trickle(Cursor::new(buf.to_vec()));
        let result = read_record(&mut reader).unwrap();
        assert_eq!(result, StatResult::new(StatKind::Median, 2.5));
    }
}

//! Binary layout of an Atrisense record.
//!
//! Records are packed back to back without header, padding or checksum:
//!
//! ```text
//! offset  0  u32  scan_number
//! offset  4  f32  x_angle_deg
//! offset  8  f32  y_angle_deg
//! offset 12  f32  distance_m
//! offset 16  u16  intensity
//! ```
//!
//! All fields are little-endian. A record is 18 bytes long.

use crate::constants::{
    DEFAULT_READ_CHUNK_RECORDS, DISTANCE_OFFSET, INTENSITY_OFFSET, RECORD_SIZE,
    SCAN_NUMBER_OFFSET, X_ANGLE_OFFSET, Y_ANGLE_OFFSET,
};
use crate::error::{DecoderError, Result};
use atrisense_data::Record;
use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Read};

fn check_layout(len: usize) -> Result<()> {
    if len == 0 {
        return Err(DecoderError::EmptyInput("binary input"));
    }
    if len % RECORD_SIZE != 0 {
        return Err(DecoderError::Alignment {
            len,
            stride: RECORD_SIZE,
        });
    }
    Ok(())
}

// `chunk` must hold exactly one record.
fn decode_fields(chunk: &[u8]) -> Record {
    debug_assert_eq!(chunk.len(), RECORD_SIZE);
    Record {
        scan_number: LittleEndian::read_u32(&chunk[SCAN_NUMBER_OFFSET..X_ANGLE_OFFSET]),
        x_angle_deg: LittleEndian::read_f32(&chunk[X_ANGLE_OFFSET..Y_ANGLE_OFFSET]),
        y_angle_deg: LittleEndian::read_f32(&chunk[Y_ANGLE_OFFSET..DISTANCE_OFFSET]),
        distance_m: LittleEndian::read_f32(&chunk[DISTANCE_OFFSET..INTENSITY_OFFSET]),
        intensity: LittleEndian::read_u16(&chunk[INTENSITY_OFFSET..RECORD_SIZE]),
    }
}

/// Decodes a single packed record.
pub fn decode_record(bytes: &[u8; RECORD_SIZE]) -> Record {
    decode_fields(bytes)
}

/// Packs a record into its on-disk representation.
pub fn encode_record(record: &Record) -> [u8; RECORD_SIZE] {
    let mut bytes = [0u8; RECORD_SIZE];
    LittleEndian::write_u32(
        &mut bytes[SCAN_NUMBER_OFFSET..X_ANGLE_OFFSET],
        record.scan_number,
    );
    LittleEndian::write_f32(&mut bytes[X_ANGLE_OFFSET..Y_ANGLE_OFFSET], record.x_angle_deg);
    LittleEndian::write_f32(&mut bytes[Y_ANGLE_OFFSET..DISTANCE_OFFSET], record.y_angle_deg);
    LittleEndian::write_f32(&mut bytes[DISTANCE_OFFSET..INTENSITY_OFFSET], record.distance_m);
    LittleEndian::write_u16(&mut bytes[INTENSITY_OFFSET..RECORD_SIZE], record.intensity);
    bytes
}

/// Decodes a whole buffer into records, one per 18-byte stride.
///
/// Fails with [`DecoderError::EmptyInput`] on an empty buffer and with
/// [`DecoderError::Alignment`] when the length is not a multiple of the
/// record size. Field values are never rejected.
pub fn decode(buffer: &[u8]) -> Result<Vec<Record>> {
    check_layout(buffer.len())?;
    Ok(buffer.chunks_exact(RECORD_SIZE).map(decode_fields).collect())
}

/// Lazily decodes records from a reader, a bounded number of records at a time.
///
/// The iterator is finite and cannot be restarted. Complete records are
/// yielded as soon as they are read; an empty source or a trailing partial
/// record is reported as the last item.
pub struct RecordReader<R> {
    reader: R,
    chunk: Vec<u8>,
    filled: usize,
    decoded: std::vec::IntoIter<Record>,
    bytes_read: usize,
    eof: bool,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> RecordReader<R> {
        RecordReader::with_chunk_records(reader, DEFAULT_READ_CHUNK_RECORDS)
    }

    pub fn with_chunk_records(reader: R, chunk_records: usize) -> RecordReader<R> {
        RecordReader {
            reader,
            chunk: vec![0; chunk_records.max(1) * RECORD_SIZE],
            filled: 0,
            decoded: Vec::new().into_iter(),
            bytes_read: 0,
            eof: false,
            done: false,
        }
    }

    /// Number of bytes consumed from the underlying reader so far.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    fn fill(&mut self) -> io::Result<()> {
        while self.filled < self.chunk.len() {
            match self.reader.read(&mut self.chunk[self.filled..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.filled += n;
                    self.bytes_read += n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn decode_filled(&mut self) {
        let n_bytes = (self.filled / RECORD_SIZE) * RECORD_SIZE;
        let records: Vec<Record> = self.chunk[..n_bytes]
            .chunks_exact(RECORD_SIZE)
            .map(decode_fields)
            .collect();
        // carry the partial record over to the next read
        self.chunk.copy_within(n_bytes..self.filled, 0);
        self.filled -= n_bytes;
        self.decoded = records.into_iter();
    }

    fn finish(&mut self) -> Option<Result<Record>> {
        self.done = true;
        if self.bytes_read == 0 {
            return Some(Err(DecoderError::EmptyInput("binary input")));
        }
        if self.filled != 0 {
            return Some(Err(DecoderError::Alignment {
                len: self.bytes_read,
                stride: RECORD_SIZE,
            }));
        }
        None
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(record) = self.decoded.next() {
                return Some(Ok(record));
            }
            if self.eof {
                return self.finish();
            }
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e.into()));
            }
            self.decode_filled();
        }
    }
}

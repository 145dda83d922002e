use crate::constants::{EXIT_INVALID_DATA, EXIT_NOT_FOUND, EXIT_UNEXPECTED};
use crate::pipeline::Stage;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("No data to process: {0} is empty.")]
    EmptyInput(&'static str),
    /// Every decoded record was skipped by the transform, so a later stage
    /// received no points. The input itself was well formed.
    #[error("No points to {0}: every record has a non-positive distance.")]
    NoPoints(&'static str),
    #[error("Input of {len} bytes is not aligned with the record size of {stride} bytes.")]
    Alignment { len: usize, stride: usize },
    #[error("Stage \"{required}\" must be completed first. Current stage is \"{actual}\".")]
    Sequence { required: Stage, actual: Stage },
    #[error("Point refers to record #{record_index} but only {record_count} records were decoded.")]
    Correspondence {
        record_index: usize,
        record_count: usize,
    },
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl DecoderError {
    /// Process exit code for a command line driver.
    /// Missing input, malformed input and everything else map to distinct codes.
    /// An input whose records were all skipped is well formed, so
    /// [`DecoderError::NoPoints`] falls in the last group.
    pub fn exit_code(&self) -> i32 {
        match self {
            DecoderError::NotFound(_) => EXIT_NOT_FOUND,
            DecoderError::EmptyInput(_) | DecoderError::Alignment { .. } => EXIT_INVALID_DATA,
            _ => EXIT_UNEXPECTED,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecoderError>;

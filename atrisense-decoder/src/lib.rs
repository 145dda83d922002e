//! Decoder for Atrisense rangefinder scans.
//!
//! A scan file is a flat sequence of 18-byte little-endian records. The
//! records are decoded, converted from azimuth/elevation/distance to
//! Cartesian points, optionally checked against the measured distance and
//! exported as an ASCII PLY point cloud.
//!
//! ```no_run
//! use atrisense_decoder::{run, PipelineConfig};
//!
//! let config = PipelineConfig::new("atrisense.bin", "atrisense_point_cloud.ply");
//! let report = run(&config)?;
//! println!("{} points written", report.point_count);
//! # Ok::<(), atrisense_decoder::DecoderError>(())
//! ```

pub mod codec;
mod config;
mod constants;
mod error;
mod numeric;
mod pipeline;
pub mod ply;
pub mod transform;
pub mod validate;

pub use crate::codec::{decode, decode_record, encode_record, RecordReader};
pub use crate::config::PipelineConfig;
pub use crate::constants::{
    DEFAULT_READ_CHUNK_RECORDS, DEFAULT_TOLERANCE, EXIT_INVALID_DATA, EXIT_NOT_FOUND,
    EXIT_UNEXPECTED, RECORD_SIZE,
};
pub use crate::error::{DecoderError, Result};
pub use crate::pipeline::{
    run, DecodingPipeline, PipelineReport, RawBuffer, Stage, Validation,
};
pub use crate::ply::{export_ply, write_ply};
pub use crate::transform::{to_cartesian, transform, transform_parallel};
pub use crate::validate::{verify_all, verify_one};
pub use atrisense_data::{CartesianPoint, Record, ValidationResult};

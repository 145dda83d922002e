use crate::codec::{self, RecordReader};
use crate::config::PipelineConfig;
use crate::constants::{DEFAULT_READ_CHUNK_RECORDS, RECORD_SIZE};
use crate::error::{DecoderError, Result};
use crate::ply;
use crate::transform::{transform, transform_parallel};
use crate::validate::verify_all;
use atrisense_data::{CartesianPoint, Record, ValidationResult};
use log::{debug, info, warn};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Progress of a [`DecodingPipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Empty,
    Loaded,
    Decoded,
    Transformed,
    Validated,
    Exported,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Empty => "empty",
            Stage::Loaded => "loaded",
            Stage::Decoded => "decoded",
            Stage::Transformed => "transformed",
            Stage::Validated => "validated",
            Stage::Exported => "exported",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of the optional validation branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Validation {
    Validated(ValidationResult),
    Skipped,
}

/// Bytes of a source file. Never empty, never mutated after loading.
#[derive(Clone, Debug, PartialEq)]
pub struct RawBuffer {
    bytes: Box<[u8]>,
}

impl RawBuffer {
    pub fn new(bytes: Vec<u8>) -> Result<RawBuffer> {
        if bytes.is_empty() {
            return Err(DecoderError::EmptyInput("binary file"));
        }
        Ok(RawBuffer {
            bytes: bytes.into_boxed_slice(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

enum State {
    Empty,
    Loaded {
        raw: RawBuffer,
    },
    Decoded {
        records: Vec<Record>,
    },
    Transformed {
        records: Vec<Record>,
        points: Vec<CartesianPoint>,
        validation: Validation,
    },
    Exported {
        records: Vec<Record>,
        points: Vec<CartesianPoint>,
        validation: Validation,
        output: PathBuf,
    },
    Failed {
        during: Stage,
    },
}

impl State {
    fn stage(&self) -> Stage {
        match self {
            State::Empty => Stage::Empty,
            State::Loaded { .. } => Stage::Loaded,
            State::Decoded { .. } => Stage::Decoded,
            State::Transformed {
                validation: Validation::Validated(_),
                ..
            } => Stage::Validated,
            State::Transformed { .. } => Stage::Transformed,
            State::Exported { .. } => Stage::Exported,
            State::Failed { .. } => Stage::Failed,
        }
    }
}

/// Counts and outcome of a completed [`run`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    pub bytes_read: usize,
    pub record_count: usize,
    pub point_count: usize,
    pub validation: Validation,
    pub output: PathBuf,
}

impl PipelineReport {
    /// Records dropped by the transform because of a non-positive distance.
    pub fn skipped_count(&self) -> usize {
        self.record_count - self.point_count
    }
}

/// Drives load, decode, transform, validate and export in that order.
///
/// Every operation checks the current stage first and fails with
/// [`DecoderError::Sequence`] when its prerequisite has not completed; such a
/// call leaves the pipeline untouched. An error raised by the stage itself
/// moves the pipeline to [`Stage::Failed`], from which only [`reset`] recovers.
///
/// [`reset`]: DecodingPipeline::reset
pub struct DecodingPipeline {
    config: PipelineConfig,
    state: State,
}

impl Default for DecodingPipeline {
    fn default() -> Self {
        DecodingPipeline::new(PipelineConfig::default())
    }
}

impl DecodingPipeline {
    pub fn new(config: PipelineConfig) -> DecodingPipeline {
        DecodingPipeline {
            config,
            state: State::Empty,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// Stage that was running when the pipeline failed.
    pub fn failed_during(&self) -> Option<Stage> {
        match self.state {
            State::Failed { during } => Some(during),
            _ => None,
        }
    }

    pub fn records(&self) -> Option<&[Record]> {
        match &self.state {
            State::Decoded { records }
            | State::Transformed { records, .. }
            | State::Exported { records, .. } => Some(records.as_slice()),
            _ => None,
        }
    }

    pub fn points(&self) -> Option<&[CartesianPoint]> {
        match &self.state {
            State::Transformed { points, .. } | State::Exported { points, .. } => {
                Some(points.as_slice())
            }
            _ => None,
        }
    }

    pub fn validation(&self) -> Option<Validation> {
        match &self.state {
            State::Transformed { validation, .. } | State::Exported { validation, .. } => {
                Some(*validation)
            }
            _ => None,
        }
    }

    /// Path of the written point cloud once exported.
    pub fn output(&self) -> Option<&Path> {
        match &self.state {
            State::Exported { output, .. } => Some(output.as_path()),
            _ => None,
        }
    }

    /// Drops all data and returns to [`Stage::Empty`].
    pub fn reset(&mut self) {
        debug!("Pipeline reset from stage \"{}\"", self.stage());
        self.state = State::Empty;
    }

    fn take_state(&mut self) -> State {
        std::mem::replace(&mut self.state, State::Empty)
    }

    fn out_of_order(&mut self, previous: State, required: Stage) -> DecoderError {
        let actual = previous.stage();
        self.state = previous;
        DecoderError::Sequence { required, actual }
    }

    fn fail<T>(&mut self, during: Stage, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            debug!("Pipeline failed during \"{}\": {}", during, e);
            self.state = State::Failed { during };
        }
        result
    }

    /// Reads the whole source file. Returns the number of bytes read.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        match self.take_state() {
            State::Empty => {}
            other => return Err(self.out_of_order(other, Stage::Empty)),
        }
        let raw = read_source(path);
        let raw = self.fail(Stage::Loaded, raw)?;
        info!("Read {} bytes from {}", raw.len(), path.display());
        Ok(self.accept_raw(raw))
    }

    /// Loads bytes that are already in memory.
    pub fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<usize> {
        match self.take_state() {
            State::Empty => {}
            other => return Err(self.out_of_order(other, Stage::Empty)),
        }
        let raw = self.fail(Stage::Loaded, RawBuffer::new(bytes))?;
        debug!("Loaded {} bytes from memory", raw.len());
        Ok(self.accept_raw(raw))
    }

    fn accept_raw(&mut self, raw: RawBuffer) -> usize {
        let n_bytes = raw.len();
        self.state = State::Loaded { raw };
        n_bytes
    }

    /// Splits the loaded bytes into records. Returns the number of records.
    pub fn decode(&mut self) -> Result<usize> {
        let raw = match self.take_state() {
            State::Loaded { raw } => raw,
            other => return Err(self.out_of_order(other, Stage::Loaded)),
        };
        let records = self.fail(Stage::Decoded, codec::decode(raw.as_bytes()))?;
        info!("Decoded {} records successfully", records.len());
        let n_records = records.len();
        self.state = State::Decoded { records };
        Ok(n_records)
    }

    /// Reads and decodes `path` in chunks of `config.read_chunk_records`
    /// records, going from [`Stage::Empty`] straight to [`Stage::Decoded`].
    /// The raw bytes are never held as a whole. Returns the number of records.
    pub fn decode_streamed<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        match self.take_state() {
            State::Empty => {}
            other => return Err(self.out_of_order(other, Stage::Empty)),
        }
        let chunk_records = self
            .config
            .read_chunk_records
            .unwrap_or(DEFAULT_READ_CHUNK_RECORDS);
        let records = self.fail(Stage::Decoded, stream_source(path, chunk_records))?;
        info!(
            "Decoded {} records from {} in chunks of {}",
            records.len(),
            path.display(),
            chunk_records
        );
        let n_records = records.len();
        self.state = State::Decoded { records };
        Ok(n_records)
    }

    /// Converts the decoded records to points. Returns the number of points.
    pub fn transform(&mut self) -> Result<usize> {
        let records = match self.take_state() {
            State::Decoded { records } => records,
            other => return Err(self.out_of_order(other, Stage::Decoded)),
        };
        let points = if self.config.transform_threads > 1 {
            transform_parallel(&records, self.config.transform_threads)
        } else {
            transform(&records)
        };
        info!(
            "Converted {} records to Cartesian coordinates",
            points.len()
        );
        if points.len() < records.len() {
            debug!(
                "Skipped {} records with non-positive distance",
                records.len() - points.len()
            );
        }
        let n_points = points.len();
        self.state = State::Transformed {
            records,
            points,
            validation: Validation::Skipped,
        };
        Ok(n_points)
    }

    /// Checks every point against its record using the configured tolerance.
    /// Points are left as they are; running it again recomputes the result.
    pub fn validate(&mut self) -> Result<ValidationResult> {
        let (records, points) = match self.take_state() {
            State::Transformed {
                records, points, ..
            } => (records, points),
            other => return Err(self.out_of_order(other, Stage::Transformed)),
        };
        let tolerance = self.config.tolerance;
        let result = self.fail(Stage::Validated, verify_all(&points, &records, tolerance))?;
        info!(
            "Distance validation: {}/{} points correct. Ratio: {:.2}% within tolerance of {}",
            result.valid_count, result.total_count, result.ratio_percent, tolerance
        );
        if !result.all_valid() {
            warn!(
                "{} points deviate from their measured distance",
                result.total_count - result.valid_count
            );
        }
        self.state = State::Transformed {
            records,
            points,
            validation: Validation::Validated(result),
        };
        Ok(result)
    }

    /// Writes the points to a PLY file. Allowed with or without validation.
    pub fn export<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let (records, points, validation) = match self.take_state() {
            State::Transformed {
                records,
                points,
                validation,
            } => (records, points, validation),
            other => return Err(self.out_of_order(other, Stage::Transformed)),
        };
        self.fail(Stage::Exported, ply::export_ply(&points, path))?;
        info!("PLY file is written successfully to {}", path.display());
        self.state = State::Exported {
            records,
            points,
            validation,
            output: path.to_path_buf(),
        };
        Ok(())
    }
}

fn source_error(path: &Path, e: io::Error) -> DecoderError {
    match e.kind() {
        io::ErrorKind::NotFound => DecoderError::NotFound(path.to_path_buf()),
        _ => DecoderError::IoError(e),
    }
}

fn read_source(path: &Path) -> Result<RawBuffer> {
    if !path.is_file() {
        return Err(DecoderError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|e| source_error(path, e))?;
    RawBuffer::new(bytes)
}

fn stream_source(path: &Path, chunk_records: usize) -> Result<Vec<Record>> {
    if !path.is_file() {
        return Err(DecoderError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| source_error(path, e))?;
    RecordReader::with_chunk_records(file, chunk_records).collect()
}

/// Runs every stage for `config`, validating only when `config.validate` is set.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let mut pipeline = DecodingPipeline::new(config.clone());
    let (bytes_read, record_count) = match config.read_chunk_records {
        Some(_) => {
            let record_count = pipeline.decode_streamed(&config.input)?;
            (record_count * RECORD_SIZE, record_count)
        }
        None => {
            let bytes_read = pipeline.load(&config.input)?;
            (bytes_read, pipeline.decode()?)
        }
    };
    let point_count = pipeline.transform()?;
    let validation = if config.validate {
        Validation::Validated(pipeline.validate()?)
    } else {
        Validation::Skipped
    };
    pipeline.export(&config.output)?;
    Ok(PipelineReport {
        bytes_read,
        record_count,
        point_count,
        validation,
        output: config.output.clone(),
    })
}

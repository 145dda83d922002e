use crate::constants::{DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_TOLERANCE};
use std::path::PathBuf;

/// Settings for one decoding run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Binary scan file to read.
    pub input: PathBuf,
    /// PLY file to write.
    pub output: PathBuf,
    /// Run the distance validation before exporting.
    pub validate: bool,
    /// Absolute tolerance on squared distances.
    pub tolerance: f64,
    /// Threads used by the coordinate transform. 1 keeps it on the caller's thread.
    pub transform_threads: usize,
    /// Records decoded per read when streaming the input. `None` loads the
    /// whole file before decoding.
    pub read_chunk_records: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            validate: true,
            tolerance: DEFAULT_TOLERANCE,
            transform_threads: 1,
            read_chunk_records: None,
        }
    }
}

impl PipelineConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output: Q) -> Self {
        PipelineConfig {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_transform_threads(mut self, n_threads: usize) -> Self {
        self.transform_threads = n_threads.max(1);
        self
    }

    pub fn with_read_chunk_records(mut self, chunk_records: usize) -> Self {
        self.read_chunk_records = Some(chunk_records.max(1));
        self
    }
}

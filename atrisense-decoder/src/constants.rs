/// Size of one packed record on disk: u32 + 3 * f32 + u16.
pub const RECORD_SIZE: usize = 18;
/// Absolute tolerance applied to squared distances by the validator.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
/// Records decoded per read when streaming from a reader.
pub const DEFAULT_READ_CHUNK_RECORDS: usize = 4096;

pub(crate) const SCAN_NUMBER_OFFSET: usize = 0;
pub(crate) const X_ANGLE_OFFSET: usize = 4;
pub(crate) const Y_ANGLE_OFFSET: usize = 8;
pub(crate) const DISTANCE_OFFSET: usize = 12;
pub(crate) const INTENSITY_OFFSET: usize = 16;

pub(crate) const DEFAULT_INPUT_FILE: &str = "atrisense.bin";
pub(crate) const DEFAULT_OUTPUT_FILE: &str = "atrisense_point_cloud.ply";

pub const EXIT_NOT_FOUND: i32 = 1;
pub const EXIT_INVALID_DATA: i32 = 2;
pub const EXIT_UNEXPECTED: i32 = 3;

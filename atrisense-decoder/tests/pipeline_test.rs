use approx::assert_relative_eq;
use atrisense_decoder::{
    decode, encode_record, run, DecoderError, DecodingPipeline, PipelineConfig, Record,
    RecordReader, Stage, Validation, EXIT_INVALID_DATA, EXIT_NOT_FOUND, EXIT_UNEXPECTED,
    RECORD_SIZE,
};
use std::fs;
use std::path::PathBuf;

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> TempDir {
        let path = std::env::temp_dir().join(format!(
            "atrisense_pipeline_test_{}_{}",
            std::process::id(),
            name
        ));
        fs::create_dir_all(&path).unwrap();
        TempDir { path }
    }

    fn join(&self, file: &str) -> PathBuf {
        self.path.join(file)
    }

    fn write_records(&self, file: &str, records: &[Record]) -> PathBuf {
        let bytes: Vec<u8> = records.iter().flat_map(encode_record).collect();
        let path = self.join(file);
        fs::write(&path, bytes).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

#[test]
fn test_single_record_end_to_end() {
    let dir = TempDir::new("single");
    let record = Record::new(1, 0.0, 0.0, 10.0, 500);
    let input = dir.write_records("scan.bin", &[record]);
    let output = dir.join("cloud.ply");

    let mut pipeline = DecodingPipeline::new(PipelineConfig::new(&input, &output));
    assert_eq!(pipeline.load(&input).unwrap(), RECORD_SIZE);
    assert_eq!(pipeline.decode().unwrap(), 1);
    assert_eq!(pipeline.records().unwrap()[0], record);

    assert_eq!(pipeline.transform().unwrap(), 1);
    let point = pipeline.points().unwrap()[0];
    assert_relative_eq!(point.x, 10.0);
    assert_relative_eq!(point.y, 0.0);
    assert_relative_eq!(point.z, 0.0);
    assert_eq!(point.intensity, 500);

    let result = pipeline.validate().unwrap();
    assert_eq!(result.valid_count, 1);
    assert_eq!(result.total_count, 1);
    assert_relative_eq!(result.ratio_percent, 100.0);

    pipeline.export(&output).unwrap();
    assert_eq!(pipeline.stage(), Stage::Exported);

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"element vertex 1"));
    assert_eq!(lines.last(), Some(&"10.000000 0.000000 0.000000 500"));
    assert_eq!(lines.len(), 9);
}

#[test]
fn test_negative_distance_is_skipped() {
    let dir = TempDir::new("negative");
    let input = dir.write_records(
        "scan.bin",
        &[
            Record::new(1, 10.0, 5.0, -1.0, 100),
            Record::new(1, 20.0, -5.0, 4.0, 200),
        ],
    );
    let output = dir.join("cloud.ply");

    let report = run(&PipelineConfig::new(&input, &output)).unwrap();
    assert_eq!(report.record_count, 2);
    assert_eq!(report.point_count, 1);
    assert_eq!(report.skipped_count(), 1);
    match report.validation {
        Validation::Validated(result) => {
            assert_eq!(result.valid_count, 1);
            assert_eq!(result.total_count, 1);
        }
        Validation::Skipped => panic!("validation is enabled by default"),
    }

    let mut pipeline = DecodingPipeline::default();
    pipeline.load(&input).unwrap();
    pipeline.decode().unwrap();
    pipeline.transform().unwrap();
    let points = pipeline.points().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].record_index, 1);
    assert_eq!(points[0].intensity, 200);
    assert_relative_eq!(points[0].norm(), 4.0, max_relative = 1e-5);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("element vertex 1\n"));
    assert!(text.ends_with(" 200\n"));
}

#[test]
fn test_run_without_validation() {
    let dir = TempDir::new("no_validation");
    let input = dir.write_records("scan.bin", &[Record::new(3, 45.0, 30.0, 2.5, 7)]);
    let output = dir.join("cloud.ply");

    let config = PipelineConfig::new(&input, &output).with_validation(false);
    let report = run(&config).unwrap();
    assert_eq!(report.validation, Validation::Skipped);
    assert_eq!(report.bytes_read, RECORD_SIZE);
    assert!(output.is_file());
}

#[test]
fn test_empty_file() {
    let dir = TempDir::new("empty");
    let input = dir.join("scan.bin");
    fs::write(&input, b"").unwrap();

    let err = run(&PipelineConfig::new(&input, dir.join("cloud.ply"))).unwrap_err();
    assert!(matches!(err, DecoderError::EmptyInput(_)));
    assert_eq!(err.exit_code(), EXIT_INVALID_DATA);
    assert!(matches!(decode(&[]), Err(DecoderError::EmptyInput(_))));
}

#[test]
fn test_misaligned_file() {
    let dir = TempDir::new("misaligned");
    let input = dir.join("scan.bin");
    fs::write(&input, [0u8; 17]).unwrap();
    let output = dir.join("cloud.ply");

    let err = run(&PipelineConfig::new(&input, &output)).unwrap_err();
    assert!(matches!(err, DecoderError::Alignment { len: 17, stride: 18 }));
    assert_eq!(err.exit_code(), EXIT_INVALID_DATA);
    assert!(!output.exists());
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new("missing");
    let err = run(&PipelineConfig::new(dir.join("absent.bin"), dir.join("cloud.ply")))
        .unwrap_err();
    assert!(matches!(err, DecoderError::NotFound(_)));
    assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
}

#[test]
fn test_all_records_skipped_is_not_malformed() {
    let dir = TempDir::new("all_skipped");
    let input = dir.write_records(
        "scan.bin",
        &[
            Record::new(1, 10.0, 5.0, -1.0, 100),
            Record::new(1, 20.0, -5.0, 0.0, 200),
        ],
    );
    let output = dir.join("cloud.ply");

    let err = run(&PipelineConfig::new(&input, &output)).unwrap_err();
    assert!(matches!(err, DecoderError::NoPoints("validate")));
    assert_eq!(err.exit_code(), EXIT_UNEXPECTED);

    let config = PipelineConfig::new(&input, &output).with_validation(false);
    let err = run(&config).unwrap_err();
    assert!(matches!(err, DecoderError::NoPoints("export")));
    assert_eq!(err.exit_code(), EXIT_UNEXPECTED);
    assert!(!output.exists());
}

#[test]
fn test_run_streamed() {
    let dir = TempDir::new("run_streamed");
    let records: Vec<Record> = (0..40)
        .map(|i| Record::new(i / 8, i as f32 * 9.0, 10.0, 1.0 + i as f32 * 0.25, i as u16))
        .collect();
    let input = dir.write_records("scan.bin", &records);
    let whole_output = dir.join("whole.ply");
    let streamed_output = dir.join("streamed.ply");

    let whole = run(&PipelineConfig::new(&input, &whole_output)).unwrap();
    let config = PipelineConfig::new(&input, &streamed_output).with_read_chunk_records(7);
    let streamed = run(&config).unwrap();

    assert_eq!(streamed.bytes_read, whole.bytes_read);
    assert_eq!(streamed.record_count, 40);
    assert_eq!(streamed.point_count, whole.point_count);
    assert_eq!(streamed.validation, whole.validation);
    assert_eq!(
        fs::read_to_string(&streamed_output).unwrap(),
        fs::read_to_string(&whole_output).unwrap()
    );

    let config =
        PipelineConfig::new(dir.join("absent.bin"), &streamed_output).with_read_chunk_records(7);
    let err = run(&config).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
}

#[test]
fn test_streaming_matches_whole_file() {
    let dir = TempDir::new("streaming");
    let records: Vec<Record> = (0..257)
        .map(|i| {
            Record::new(
                i / 32,
                (i as f32) * 1.4,
                ((i % 90) as f32) - 45.,
                (i % 11) as f32 * 0.5,
                (i * 3) as u16,
            )
        })
        .collect();
    let input = dir.write_records("scan.bin", &records);

    let whole = decode(&fs::read(&input).unwrap()).unwrap();
    let file = fs::File::open(&input).unwrap();
    let streamed = RecordReader::with_chunk_records(file, 16)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(streamed, whole);
    assert_eq!(whole, records);
}

#[test]
fn test_round_trip_law() {
    let dir = TempDir::new("round_trip");
    let mut records = Vec::new();
    for azimuth in (0..360).step_by(10) {
        for elevation in (-90..=90).step_by(15) {
            let distance = 0.1 + (azimuth as f32) / 7.0 + (elevation as f32).abs() / 13.0;
            records.push(Record::new(0, azimuth as f32, elevation as f32, distance, 1));
        }
    }
    let input = dir.write_records("scan.bin", &records);
    let output = dir.join("cloud.ply");

    let mut pipeline =
        DecodingPipeline::new(PipelineConfig::new(&input, &output).with_transform_threads(3));
    pipeline.load(&input).unwrap();
    pipeline.decode().unwrap();
    pipeline.transform().unwrap();

    let records = pipeline.records().unwrap();
    let points = pipeline.points().unwrap();
    assert_eq!(points.len(), records.len());
    for point in points {
        let distance = records[point.record_index].distance_m as f64;
        assert_relative_eq!(point.norm(), distance, max_relative = 1e-5);
    }
}

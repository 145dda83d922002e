use atrisense_decoder::{run, PipelineConfig, PipelineReport, Validation, ValidationResult};
use clap::Parser;
use log::{error, info, LevelFilter};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Decodes an Atrisense scan file into a PLY point cloud.", long_about = None)]
struct Args {
    /// Binary scan file made of 18-byte records.
    #[arg(env = "ATRISENSE_INPUT", default_value = "atrisense.bin")]
    input: PathBuf,

    /// Destination of the ASCII PLY point cloud.
    #[arg(short, long, env = "ATRISENSE_OUTPUT", default_value = "atrisense_point_cloud.ply")]
    output: PathBuf,

    /// Skip the distance validation step.
    #[arg(long, env = "ATRISENSE_NO_VALIDATION")]
    no_validation: bool,

    /// Absolute tolerance on squared distances used by the validation.
    #[arg(long, env = "ATRISENSE_TOLERANCE", default_value_t = 1e-4)]
    tolerance: f64,

    /// Threads used for the coordinate transform.
    #[arg(long, env = "ATRISENSE_THREADS", default_value_t = 1)]
    threads: usize,

    /// Decode while reading, this many records at a time, instead of loading
    /// the whole file first.
    #[arg(long, env = "ATRISENSE_CHUNK_RECORDS")]
    chunk_records: Option<usize>,

    /// Print a JSON summary on stdout.
    #[arg(long)]
    json: bool,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    rust_log: LevelFilter,
}

#[derive(Serialize)]
struct Summary {
    bytes_read: usize,
    record_count: usize,
    point_count: usize,
    skipped_count: usize,
    validation: Option<ValidationResult>,
    output: PathBuf,
}

impl From<&PipelineReport> for Summary {
    fn from(report: &PipelineReport) -> Self {
        Summary {
            bytes_read: report.bytes_read,
            record_count: report.record_count,
            point_count: report.point_count,
            skipped_count: report.skipped_count(),
            validation: match report.validation {
                Validation::Validated(result) => Some(result),
                Validation::Skipped => None,
            },
            output: report.output.clone(),
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.rust_log)
        .format_target(false)
        .init();

    let mut config = PipelineConfig::new(&args.input, &args.output)
        .with_validation(!args.no_validation)
        .with_tolerance(args.tolerance)
        .with_transform_threads(args.threads);
    if let Some(chunk_records) = args.chunk_records {
        config = config.with_read_chunk_records(chunk_records);
    }

    let report = match run(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("[ERROR] {}", e);
            std::process::exit(e.exit_code());
        }
    };

    if report.validation == Validation::Skipped {
        info!("Distance validation was skipped");
    }

    if args.json {
        match serde_json::to_string_pretty(&Summary::from(&report)) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("[ERROR] Failed to serialize summary: {}", e);
                std::process::exit(atrisense_decoder::EXIT_UNEXPECTED);
            }
        }
    }
}

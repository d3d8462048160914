//! jpegfit: recompress images to a JPEG quality or a target file size.

mod telemetry;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use jpegfit_core::request::{
    parse_quality, process_fixed_quality, process_to_size, CompressedOutput, Endpoint,
    FixedQualityRequest, RequestError, SizeTargetRequest,
};
use jpegfit_core::NativeCodec;
use rayon::prelude::*;

#[derive(Parser)]
#[command(name = "jpegfit")]
#[command(about = "Recompress images to a JPEG quality or a target file size")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "JPEGFIT_LOG", default_value = "info")]
    log_level: String,

    /// Log every probe of the size search
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Directory for outputs (default: next to each input)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Carry EXIF metadata into the output
    #[arg(long)]
    preserve_exif: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-encode at a fixed JPEG quality
    Compress {
        /// Images to compress
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// JPEG quality (10-100, default 80)
        #[arg(short, long, env = "JPEGFIT_QUALITY")]
        quality: Option<String>,

        /// Rotate upright from the EXIF orientation first
        #[arg(long)]
        auto_rotate: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Compress towards a target size in KB
    Fit {
        /// Images to compress
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Preset deciding defaults, probe budget and output name
        #[arg(short, long, default_value = "resize-to-20", value_parser = parse_endpoint)]
        endpoint: Endpoint,

        /// Target size in KB (5-1000, default from the endpoint)
        #[arg(short, long)]
        target_kb: Option<String>,

        /// Quality mode for compress-to endpoints: high, balanced, premium, maximum
        #[arg(short, long)]
        mode: Option<String>,

        /// Keep the stored orientation instead of rotating upright
        #[arg(long)]
        no_auto_rotate: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// List size-target endpoints and their defaults
    Endpoints {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_endpoint(value: &str) -> Result<Endpoint, String> {
    let endpoint: Endpoint = value.parse().map_err(|e: RequestError| e.to_string())?;
    if !endpoint.is_size_target() {
        return Err(format!("'{endpoint}' does not take a size target; use the compress command"));
    }
    Ok(endpoint)
}

/// Result of one input file.
struct FileReport {
    input: PathBuf,
    output: PathBuf,
    compressed: CompressedOutput,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level, cli.verbose)?;

    match cli.command {
        Commands::Compress {
            files,
            quality,
            auto_rotate,
            output,
        } => {
            let request = FixedQualityRequest::new(parse_quality(quality.as_deref()))
                .with_preserve_exif(output.preserve_exif)
                .with_auto_rotate(auto_rotate);

            run_batch(&files, &output, |bytes, name| {
                process_fixed_quality(&NativeCodec, bytes, name, &request)
            })
        }

        Commands::Fit {
            files,
            endpoint,
            target_kb,
            mode,
            no_auto_rotate,
            output,
        } => {
            let request =
                SizeTargetRequest::from_form(endpoint, target_kb.as_deref(), mode.as_deref())?
                    .with_preserve_exif(output.preserve_exif)
                    .with_auto_rotate(!no_auto_rotate);

            run_batch(&files, &output, |bytes, name| {
                process_to_size(&NativeCodec, bytes, name, &request)
            })
        }

        Commands::Endpoints { json } => {
            print_endpoints(json)?;
            Ok(())
        }
    }
}

/// Process every file in parallel, write outputs, report, and fail if any file failed.
///
/// Inputs that would land on the same output path get a numbered name
/// (`a_compressed_80_2.jpg`) instead of overwriting each other.
fn run_batch<F>(files: &[PathBuf], output: &OutputArgs, process: F) -> anyhow::Result<()>
where
    F: Fn(&[u8], &str) -> Result<CompressedOutput, RequestError> + Sync,
{
    if let Some(dir) = &output.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let results: Vec<anyhow::Result<CompressedOutput>> = files
        .par_iter()
        .map(|path| compress_file(path, &process))
        .collect();

    let mut claimed = HashSet::new();
    let mut reports = Vec::new();
    let mut failed = 0;
    for (path, result) in files.iter().zip(results) {
        let written = result.and_then(|compressed| {
            let dir = output_dir(path, output.out_dir.as_deref());
            let target = claim_output_path(&mut claimed, dir, &compressed.meta.filename);
            write_output(path, target, compressed)
        });
        match written {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {:#}", path.display(), e);
            }
        }
    }

    if output.json {
        let values: Vec<_> = reports.iter().map(report_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed", failed, files.len());
    }
    Ok(())
}

fn compress_file<F>(path: &Path, process: &F) -> anyhow::Result<CompressedOutput>
where
    F: Fn(&[u8], &str) -> Result<CompressedOutput, RequestError>,
{
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(process(&bytes, &name)?)
}

fn output_dir<'a>(input: &'a Path, out_dir: Option<&'a Path>) -> &'a Path {
    out_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new(""))
}

/// Reserve `dir/filename` for this batch, numbering the name when an
/// earlier input already took it.
fn claim_output_path(claimed: &mut HashSet<PathBuf>, dir: &Path, filename: &str) -> PathBuf {
    // Compare canonical directories so `d` and `./d` collide too.
    let key_dir = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let stem = filename.strip_suffix(".jpg").unwrap_or(filename);

    let mut name = filename.to_string();
    let mut n = 1;
    while !claimed.insert(key_dir.join(&name)) {
        n += 1;
        name = format!("{stem}_{n}.jpg");
    }
    if n > 1 {
        tracing::warn!(requested = filename, renamed = %name, "Output name already used in this batch");
    }
    dir.join(name)
}

fn write_output(
    input: &Path,
    output: PathBuf,
    compressed: CompressedOutput,
) -> anyhow::Result<FileReport> {
    std::fs::write(&output, &compressed.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output,
        compressed,
    })
}

fn print_report(report: &FileReport) {
    let stats = &report.compressed.stats;
    let meta = &report.compressed.meta;
    println!(
        "{} -> {} ({} -> {} bytes, {}x{}, quality {}, scale {:.1}, {})",
        report.input.display(),
        report.output.display(),
        meta.original_size,
        meta.compressed_size,
        stats.width,
        stats.height,
        stats.quality,
        stats.scale_factor,
        report.compressed.outcome.as_str(),
    );
}

fn report_json(report: &FileReport) -> serde_json::Value {
    serde_json::json!({
        "input": report.input.to_string_lossy(),
        "output": report.output.to_string_lossy(),
        "outcome": report.compressed.outcome,
        "stats": report.compressed.stats,
        "meta": report.compressed.meta,
    })
}

fn print_endpoints(json: bool) -> anyhow::Result<()> {
    let endpoints: Vec<Endpoint> = Endpoint::ALL
        .into_iter()
        .filter(|endpoint| endpoint.is_size_target())
        .collect();

    if json {
        let values: Vec<_> = endpoints
            .iter()
            .map(|endpoint| {
                let mode = endpoint.default_quality_mode();
                serde_json::json!({
                    "name": endpoint.as_str(),
                    "defaultTargetKb": endpoint.default_target_kb(),
                    "defaultMode": mode,
                    "maxIterations": endpoint.max_iterations(mode),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    for endpoint in endpoints {
        let mode = endpoint.default_quality_mode();
        println!(
            "{:<16} target {:>4} KB  mode {:<9} probes/scale {}",
            endpoint.as_str(),
            endpoint.default_target_kb().unwrap_or_default(),
            mode.map(|m| m.as_str()).unwrap_or("-"),
            endpoint.max_iterations(mode),
        );
    }
    Ok(())
}

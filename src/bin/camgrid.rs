use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "camgrid",
    version,
    about = "Composite per-camera JPEG frames into a synchronized grid MP4"
)]
struct Cli {
    /// Input folder with `<camera>_..._fn<number>.jpg` frames.
    #[arg(short = 'i', long = "input-path", alias = "input_path")]
    input_path: PathBuf,

    /// Output folder; the video is written as `output.mp4` inside it.
    #[arg(short = 'o', long = "output-path", alias = "output_path")]
    output_path: PathBuf,

    /// Output frame rate [0-120] (e.g. 30).
    #[arg(short = 'f', long, value_parser = clap::value_parser!(u32).range(0..=120))]
    framerate: u32,

    /// Camera placement order (e.g. Dev0 Dev1 Dev2).
    #[arg(
        short = 'c',
        long = "camera-order",
        alias = "camera_order",
        num_args = 1..,
        required = true
    )]
    camera_order: Vec<camgrid::CameraId>,

    /// Worker threads for loading frames (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,

    /// Video codec.
    #[arg(long, value_enum, default_value_t = CodecChoice::H264)]
    codec: CodecChoice,

    /// `ffmpeg` executable to use.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Extra directory to load label fonts from (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Fail instead of replacing an existing `output.mp4`.
    #[arg(long)]
    no_overwrite: bool,

    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log filter (overridden by `RUST_LOG`).
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecChoice {
    H264,
    Mpeg4,
}

impl From<CodecChoice> for camgrid::VideoCodec {
    fn from(c: CodecChoice) -> Self {
        match c {
            CodecChoice::H264 => camgrid::VideoCodec::H264,
            CodecChoice::Mpeg4 => camgrid::VideoCodec::Mpeg4,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    camgrid::init_logging(&camgrid::LoggingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    let started = Instant::now();
    match cmd_run(cli) {
        Ok(()) => {
            eprintln!("Run time: {:.2}s", started.elapsed().as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("camgrid: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(cli: Cli) -> anyhow::Result<()> {
    let cfg = camgrid::RunConfig::new(
        &cli.input_path,
        &cli.output_path,
        cli.framerate,
        cli.camera_order.clone(),
    )
    .with_threads(cli.threads)
    .with_encode(camgrid::EncodeSettings {
        codec: cli.codec.into(),
        ffmpeg_bin: cli.ffmpeg.clone(),
        overwrite: !cli.no_overwrite,
    });
    cfg.validate()?;
    echo_config(&cfg);

    let label = camgrid::LabelRenderer::with_system_fonts(&cli.font_dirs, cfg.label.clone());
    let mut sink = camgrid::FfmpegSink::new(camgrid::FfmpegSinkOpts {
        out_path: cfg.output_file(),
        overwrite: cfg.encode.overwrite,
        codec: cfg.encode.codec,
        ffmpeg_bin: cfg.encode.ffmpeg_bin.clone(),
    });

    let mut on_progress = |p: camgrid::Progress| {
        if let Some(line) = p.status_line() {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "\r{line}");
            let _ = err.flush();
        }
    };
    let report = camgrid::run_mosaic(&cfg, &label, &mut sink, &mut on_progress);
    eprintln!();
    let report = report?;

    eprintln!(
        "Video created successfully at: {}",
        report.output_path.display()
    );
    if !report.frames_skipped.is_empty() {
        let skipped: Vec<String> = report
            .frames_skipped
            .iter()
            .map(ToString::to_string)
            .collect();
        eprintln!(
            "Frames skipped after load errors: {} ({})",
            skipped.len(),
            skipped.join(", ")
        );
    }
    if !report.missing_cameras.is_empty() {
        let missing: Vec<&str> = report
            .missing_cameras
            .iter()
            .map(camgrid::CameraId::as_str)
            .collect();
        eprintln!(
            "Cameras that were not found in the input folder: {}",
            missing.join(", ")
        );
    }

    if let Some(path) = &cli.report {
        write_report(path, &report)?;
    }
    Ok(())
}

fn echo_config(cfg: &camgrid::RunConfig) {
    let cams: Vec<&str> = cfg.camera_order.iter().map(|c| c.as_str()).collect();
    eprintln!("All parameters are valid.");
    eprintln!("Input Path: {}", cfg.input_dir.display());
    eprintln!("Output Path: {}", cfg.output_dir.display());
    eprintln!("Framerate: {}", cfg.fps);
    eprintln!("Camera Order: {}", cams.join(" "));
    eprintln!();
}

fn write_report(path: &Path, report: &camgrid::RunReport) -> anyhow::Result<()> {
    camgrid::ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("write run report '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

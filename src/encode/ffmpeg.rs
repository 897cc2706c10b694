use std::{
    ffi::OsString,
    io::Read as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::encode::sink::{FrameSink, SinkConfig, check_order, check_size};
use crate::foundation::core::FrameNumber;
use crate::foundation::error::{MosaicError, MosaicResult};

/// Highest frame rate accepted on the command line.
pub const MAX_FPS: u32 = 120;

/// Output video codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264 (`libx264`, `yuv420p`).
    #[default]
    H264,
    /// MPEG-4 Part 2 tagged `mp4v`.
    Mpeg4,
}

impl VideoCodec {
    fn encoder_args(self) -> &'static [&'static str] {
        match self {
            Self::H264 => &["-c:v", "libx264", "-pix_fmt", "yuv420p"],
            Self::Mpeg4 => &["-c:v", "mpeg4", "-tag:v", "mp4v", "-q:v", "3", "-pix_fmt", "yuv420p"],
        }
    }
}

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    pub codec: VideoCodec,
    /// `ffmpeg` executable; looked up on `PATH` when not absolute.
    pub ffmpeg_bin: PathBuf,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            codec: VideoCodec::default(),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }
}

/// Sink that spawns `ffmpeg` and streams raw RGB frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_frame: Option<FrameNumber>,
    frames_written: u64,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_frame: None,
            frames_written: 0,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> MosaicResult<()> {
        if cfg.fps == 0 || cfg.fps > MAX_FPS {
            return Err(MosaicError::data(format!(
                "cannot encode at {} fps (must be 1..={MAX_FPS})",
                cfg.fps
            )));
        }
        if cfg.size.is_empty() {
            return Err(MosaicError::data("ffmpeg sink width/height must be non-zero"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(MosaicError::data(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_available(&self.opts.ffmpeg_bin) {
            return Err(MosaicError::data(format!(
                "'{}' is required for MP4 encoding, but could not be run",
                self.opts.ffmpeg_bin.display()
            )));
        }

        let mut cmd = Command::new(&self.opts.ffmpeg_bin);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(ffmpeg_args(&cfg, &self.opts));

        let mut child = cmd.spawn().map_err(|e| {
            MosaicError::data(format!(
                "failed to spawn '{}': {e}",
                self.opts.ffmpeg_bin.display()
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MosaicError::data("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MosaicError::data("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            size = %cfg.size,
            fps = cfg.fps,
            codec = ?self.opts.codec,
            "started ffmpeg"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_frame = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: FrameNumber, canvas: &image::RgbImage) -> MosaicResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MosaicError::encode("ffmpeg sink not started"))?;
        check_order(self.last_frame, frame)?;
        check_size(cfg.size, canvas)?;
        self.last_frame = Some(frame);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(MosaicError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(canvas.as_raw()).map_err(|e| {
            MosaicError::encode(format!("failed to write frame {frame} to ffmpeg stdin: {e}"))
        })?;
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> MosaicResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| MosaicError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            MosaicError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| MosaicError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| MosaicError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(MosaicError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // A sink dropped mid-run closes stdin so ffmpeg exits instead of waiting forever.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }
}

/// Command-line arguments for one encode. Odd canvas sizes are padded to even.
pub fn ffmpeg_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    args.push(if opts.overwrite { "-y" } else { "-n" }.into());

    let size = format!("{}x{}", cfg.size.width, cfg.size.height);
    let fps = cfg.fps.to_string();
    for a in [
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
        "-s",
        size.as_str(),
        // For rawvideo input `-r` goes before `-i`.
        "-r",
        fps.as_str(),
        "-i",
        "pipe:0",
        "-an",
        "-vf",
        "pad=ceil(iw/2)*2:ceil(ih/2)*2",
    ] {
        args.push(a.into());
    }
    for a in opts.codec.encoder_args() {
        args.push((*a).into());
    }
    args.push("-movflags".into());
    args.push("+faststart".into());
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MosaicResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `bin -version` runs successfully.
pub fn is_ffmpeg_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_ffmpeg_available(Path::new("ffmpeg"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

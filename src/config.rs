//! Run configuration.

use std::path::{Path, PathBuf};

use crate::{
    encode::ffmpeg::{MAX_FPS, VideoCodec},
    foundation::core::CameraId,
    foundation::error::{MosaicError, MosaicResult},
    index::naming::FrameNameRule,
    render::label::LabelStyle,
};

/// File name of the encoded mosaic inside the output directory.
pub const OUTPUT_FILE_NAME: &str = "output.mp4";

/// Everything one mosaic run needs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunConfig {
    /// Directory holding the per-camera JPEG frames.
    pub input_dir: PathBuf,
    /// Directory receiving `output.mp4`.
    pub output_dir: PathBuf,
    /// Output frame rate, in `0..=120`.
    pub fps: u32,
    /// Placement order of the cameras in the grid.
    pub camera_order: Vec<CameraId>,
    /// Worker threads for per-camera loading. `None` lets rayon decide.
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub naming: FrameNameRule,
    #[serde(default)]
    pub label: LabelStyle,
    #[serde(default)]
    pub encode: EncodeSettings,
}

/// Encoder selection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EncodeSettings {
    pub codec: VideoCodec,
    pub ffmpeg_bin: PathBuf,
    pub overwrite: bool,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            codec: VideoCodec::default(),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            overwrite: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "camgrid=debug,warn").
    pub level: String,
    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl RunConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        fps: u32,
        camera_order: Vec<CameraId>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            fps,
            camera_order,
            threads: None,
            naming: FrameNameRule::default(),
            label: LabelStyle::default(),
            encode: EncodeSettings::default(),
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_encode(mut self, encode: EncodeSettings) -> Self {
        self.encode = encode;
        self
    }

    pub fn with_naming(mut self, naming: FrameNameRule) -> Self {
        self.naming = naming;
        self
    }

    /// Path of the encoded video.
    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILE_NAME)
    }

    /// Check flag-level constraints and that both directories exist.
    pub fn validate(&self) -> MosaicResult<()> {
        check_dir("Input path", &self.input_dir)?;
        check_dir("Output path", &self.output_dir)?;
        if self.fps > MAX_FPS {
            return Err(MosaicError::configuration(format!(
                "Framerate must be between 0 and {MAX_FPS}. You provided: {}",
                self.fps
            )));
        }
        if self.camera_order.is_empty() {
            return Err(MosaicError::configuration(
                "Camera order must name at least one camera",
            ));
        }
        if self.threads == Some(0) {
            return Err(MosaicError::configuration("Threads must be at least 1"));
        }
        if self.naming.extension.is_empty() {
            return Err(MosaicError::configuration(
                "Frame file extension must be non-empty",
            ));
        }
        Ok(())
    }
}

fn check_dir(what: &str, path: &Path) -> MosaicResult<()> {
    if !path.exists() {
        return Err(MosaicError::configuration(format!(
            "{what} {} does not exist.",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(MosaicError::configuration(format!(
            "{what} {} is not a directory.",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

//! camgrid turns per-camera JPEG frame sequences into one synchronized grid video.
//!
//! # Pipeline overview
//!
//! 1. **Index**: scan the input directory and group `<camera>_..._fn<n>.jpg` files into
//!    `camera -> frame number -> path` ([`FrameIndex`]).
//! 2. **Layout**: decode one sample frame and derive the fixed two-column grid
//!    ([`GridGeometry`]).
//! 3. **Composite**: for each frame number in ascending order, load every camera's tile in
//!    parallel (placeholder when missing or unreadable), label it, and place it on a fresh
//!    canvas ([`Compositor`]).
//! 4. **Encode**: stream canvases in order into a [`FrameSink`], usually the system `ffmpeg`
//!    binary ([`FfmpegSink`]).
//!
//! Failures below frame-number granularity are absorbed; a frame number whose composite
//! fails is dropped; setup failures end the run.
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod encode;
pub mod foundation;
pub mod index;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod render;

pub use assets::decode::{decode_frame, decode_jpeg, probe_tile_size};
pub use config::{EncodeSettings, LoggingConfig, OUTPUT_FILE_NAME, RunConfig};
pub use encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, MAX_FPS, VideoCodec, ensure_parent_dir, ffmpeg_args,
    is_ffmpeg_available, is_ffmpeg_on_path,
};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{CameraId, FrameNumber, ImageSize};
pub use foundation::error::{MosaicError, MosaicResult};
pub use index::naming::{FrameNameRule, ParsedFrameName};
pub use index::scan::{FrameIndex, IndexStats};
pub use layout::grid::{GridGeometry, MAX_CAMS_PER_ROW};
pub use logging::init_logging;
pub use pipeline::{
    LoopStats, Progress, RunReport, Stage, composite_frames, render_index, run_mosaic,
};
pub use render::compositor::Compositor;
pub use render::label::{LabelRenderer, LabelStyle};
pub use render::loader::{FrameLoader, TileOutcome, TileSource};

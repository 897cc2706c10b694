use std::{path::PathBuf, time::Instant};

use crate::{
    assets::decode::probe_tile_size,
    config::RunConfig,
    encode::sink::{FrameSink, SinkConfig},
    foundation::core::{CameraId, FrameNumber},
    foundation::error::MosaicResult,
    index::scan::{FrameIndex, IndexStats},
    layout::grid::GridGeometry,
    render::{
        compositor::Compositor,
        label::LabelRenderer,
        loader::{FrameLoader, TileSource},
    },
};

/// Phases of a run, in order. Recorded in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Indexing,
    GeometryResolved,
    Compositing,
    Finalized,
}

/// Reported after every processed frame number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Frame numbers processed so far, including skipped ones.
    pub done: usize,
    pub total: usize,
    pub frame: FrameNumber,
    /// Whether this frame number reached the sink.
    pub written: bool,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.done as f64 / self.total as f64) * 100.0
    }

    /// `Progress: 42.00% (21/50)` for a frame that reached the sink, `None` otherwise.
    pub fn status_line(&self) -> Option<String> {
        self.written.then(|| {
            format!(
                "Progress: {:.2}% ({}/{})",
                self.percent(),
                self.done,
                self.total
            )
        })
    }
}

/// Outcome of the frame loop.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoopStats {
    pub frames_written: u64,
    pub frames_skipped: Vec<FrameNumber>,
}

/// Summary of a finished run.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub geometry: GridGeometry,
    pub fps: u32,
    pub cameras: Vec<CameraId>,
    pub missing_cameras: Vec<CameraId>,
    pub frames_total: usize,
    pub frames_written: u64,
    pub frames_skipped: Vec<FrameNumber>,
    pub index: IndexStats,
    pub elapsed_secs: f64,
}

/// Validate `cfg`, index the input directory, and render every frame number into `sink`.
pub fn run_mosaic(
    cfg: &RunConfig,
    label: &LabelRenderer,
    sink: &mut dyn FrameSink,
    on_progress: &mut dyn FnMut(Progress),
) -> MosaicResult<RunReport> {
    cfg.validate()?;
    log_stage(Stage::Indexing);
    let index = FrameIndex::scan_dir(&cfg.input_dir, &cfg.camera_order, &cfg.naming)?;
    render_index(cfg, &index, label, sink, on_progress)
}

/// Render an already built index. Geometry comes from a sample decode of the index.
pub fn render_index(
    cfg: &RunConfig,
    index: &FrameIndex,
    label: &LabelRenderer,
    sink: &mut dyn FrameSink,
    on_progress: &mut dyn FnMut(Progress),
) -> MosaicResult<RunReport> {
    let started = Instant::now();

    let tile = probe_tile_size(index)?;
    let geometry = GridGeometry::new(index.camera_count(), tile)?;
    log_stage(Stage::GeometryResolved);
    tracing::info!(
        cameras = geometry.camera_count,
        rows = geometry.rows,
        cols = geometry.cams_per_row,
        tile = %geometry.tile,
        canvas = %geometry.canvas,
        "resolved grid geometry"
    );

    let compositor = Compositor::new(geometry, index.present_cameras().to_vec(), cfg.threads)?;
    let loader = FrameLoader::new(index, tile, label);

    sink.begin(SinkConfig {
        size: geometry.canvas,
        fps: cfg.fps,
    })?;

    log_stage(Stage::Compositing);
    let frames = index.sorted_frame_numbers();
    let stats = composite_frames(&frames, &compositor, &loader, sink, on_progress)?;

    sink.end()?;
    log_stage(Stage::Finalized);

    Ok(RunReport {
        output_path: cfg.output_file(),
        geometry,
        fps: cfg.fps,
        cameras: index.present_cameras().to_vec(),
        missing_cameras: index.missing_cameras().to_vec(),
        frames_total: frames.len(),
        frames_written: stats.frames_written,
        frames_skipped: stats.frames_skipped,
        index: index.stats(),
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

/// Composite `frames` in the given order and push each finished canvas to `sink`.
///
/// A frame whose composite fails is logged and dropped; sink errors end the loop.
pub fn composite_frames(
    frames: &[FrameNumber],
    compositor: &Compositor,
    source: &dyn TileSource,
    sink: &mut dyn FrameSink,
    on_progress: &mut dyn FnMut(Progress),
) -> MosaicResult<LoopStats> {
    let mut stats = LoopStats::default();
    let total = frames.len();

    for (i, &frame) in frames.iter().enumerate() {
        let written = match compositor.compose(source, frame) {
            Ok(canvas) => {
                sink.push_frame(frame, &canvas)?;
                stats.frames_written += 1;
                true
            }
            Err(e) if !e.is_fatal() => {
                tracing::warn!(%frame, error = %e, "skipping frame");
                stats.frames_skipped.push(frame);
                false
            }
            Err(e) => return Err(e),
        };

        on_progress(Progress {
            done: i + 1,
            total,
            frame,
            written,
        });
    }

    Ok(stats)
}

fn log_stage(stage: Stage) {
    tracing::info!(?stage, "stage");
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;

use crate::foundation::core::{FrameNumber, ImageSize};
use crate::foundation::error::{MosaicError, MosaicResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Canvas size; every pushed frame has exactly this size.
    pub size: ImageSize,
    /// Output frame rate.
    pub fps: u32,
}

/// Consumer of finished canvases.
///
/// Ordering contract: `push_frame` is called with strictly increasing frame numbers.
/// Frame numbers may have gaps (dropped or never captured frames); sinks emit pushed
/// frames back to back.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MosaicResult<()>;
    /// Push one canvas.
    fn push_frame(&mut self, frame: FrameNumber, canvas: &image::RgbImage) -> MosaicResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> MosaicResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameNumber, image::RgbImage)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameNumber, image::RgbImage)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MosaicResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: FrameNumber, canvas: &image::RgbImage) -> MosaicResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MosaicError::encode("in-memory sink not started"))?;
        check_order(self.frames.last().map(|(f, _)| *f), frame)?;
        check_size(cfg.size, canvas)?;
        self.frames.push((frame, canvas.clone()));
        Ok(())
    }

    fn end(&mut self) -> MosaicResult<()> {
        self.finished = true;
        Ok(())
    }
}

pub(crate) fn check_order(last: Option<FrameNumber>, next: FrameNumber) -> MosaicResult<()> {
    if let Some(last) = last
        && next <= last
    {
        return Err(MosaicError::encode(format!(
            "sink received out-of-order frame {next} after {last}"
        )));
    }
    Ok(())
}

pub(crate) fn check_size(expected: ImageSize, canvas: &image::RgbImage) -> MosaicResult<()> {
    let got = ImageSize::of(canvas);
    if got != expected {
        return Err(MosaicError::encode(format!(
            "frame size mismatch: got {got}, expected {expected}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

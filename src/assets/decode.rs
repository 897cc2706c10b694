use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::core::ImageSize,
    foundation::error::{MosaicError, MosaicResult},
    index::scan::FrameIndex,
};

/// Decode JPEG bytes into a tightly packed RGB8 buffer.
pub fn decode_jpeg(bytes: &[u8]) -> MosaicResult<image::RgbImage> {
    let dyn_img = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
        .context("decode jpeg from memory")?;
    Ok(dyn_img.into_rgb8())
}

/// Read and decode one frame file.
pub fn decode_frame(path: &Path) -> MosaicResult<image::RgbImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read frame bytes from '{}'", path.display()))?;
    decode_jpeg(&bytes).map_err(|e| match e {
        MosaicError::Other(err) => {
            MosaicError::Other(err.context(format!("frame '{}'", path.display())))
        }
        other => other,
    })
}

/// Decode one sample frame to learn the tile size for the whole run.
///
/// The sample is the lowest frame number of the first present camera, so the choice is
/// stable across runs.
pub fn probe_tile_size(index: &FrameIndex) -> MosaicResult<ImageSize> {
    let sample = index
        .present_cameras()
        .iter()
        .find_map(|cam| index.frames_for(cam)?.values().next())
        .ok_or_else(|| MosaicError::data("no sample frame available to size the grid"))?;

    let img = decode_frame(sample).map_err(|e| {
        MosaicError::data(format!(
            "error reading sample image '{}': {e:#}",
            sample.display()
        ))
    })?;

    let size = ImageSize::of(&img);
    if size.is_empty() {
        return Err(MosaicError::data(format!(
            "sample image '{}' has zero size",
            sample.display()
        )));
    }
    tracing::debug!(sample = %sample.display(), %size, "probed tile size");
    Ok(size)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

use std::sync::Arc;

use crate::{
    assets::decode::decode_frame,
    foundation::core::{CameraId, FrameNumber, ImageSize},
    foundation::error::{MosaicError, MosaicResult},
    index::scan::FrameIndex,
    render::label::LabelRenderer,
};

/// Produces one decorated tile per (camera, frame number).
///
/// Implementations are called concurrently from the compositor's worker pool. An `Err`
/// means the tile could not be produced at all and drops the whole frame number.
pub trait TileSource: Sync {
    fn load_tile(&self, camera: &CameraId, frame: FrameNumber) -> MosaicResult<image::RgbImage>;
}

/// Where a tile's pixels came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TileOutcome {
    /// Decoded from the indexed file.
    Decoded,
    /// The camera has no file for this frame number.
    Missing,
    /// The file exists but could not be read or decoded.
    DecodeFailed(String),
    /// The file decoded to a size different from the run's tile size.
    SizeMismatch { got: ImageSize },
}

impl TileOutcome {
    pub fn used_placeholder(&self) -> bool {
        !matches!(self, Self::Decoded)
    }
}

/// Loads frames from a [`FrameIndex`], substituting the placeholder when a file is absent
/// or unusable, then draws the frame label.
pub struct FrameLoader<'a> {
    index: &'a FrameIndex,
    placeholder: Arc<image::RgbImage>,
    tile: ImageSize,
    label: &'a LabelRenderer,
}

impl<'a> FrameLoader<'a> {
    pub fn new(index: &'a FrameIndex, tile: ImageSize, label: &'a LabelRenderer) -> Self {
        Self {
            index,
            placeholder: Arc::new(image::RgbImage::new(tile.width, tile.height)),
            tile,
            label,
        }
    }

    /// Shared zero-valued tile. Never drawn on; loads take a private copy.
    pub fn placeholder(&self) -> &Arc<image::RgbImage> {
        &self.placeholder
    }

    pub fn tile_size(&self) -> ImageSize {
        self.tile
    }

    /// Load and decorate one tile, reporting whether the placeholder was used.
    pub fn load_tile_with_outcome(
        &self,
        camera: &CameraId,
        frame: FrameNumber,
    ) -> MosaicResult<(image::RgbImage, TileOutcome)> {
        let (mut img, outcome) = self.resolve(camera, frame);
        match &outcome {
            TileOutcome::Decoded => {}
            TileOutcome::Missing => {
                tracing::debug!(%camera, %frame, "no file for frame; using placeholder");
            }
            TileOutcome::DecodeFailed(reason) => {
                tracing::warn!(
                    %camera,
                    %frame,
                    reason = %reason,
                    "error loading frame; using placeholder"
                );
            }
            TileOutcome::SizeMismatch { got } => {
                tracing::warn!(
                    %camera,
                    %frame,
                    got = %got,
                    expected = %self.tile,
                    "frame size differs from the grid tile; using placeholder"
                );
            }
        }

        self.label.decorate(&mut img, frame).map_err(|e| {
            MosaicError::render(format!("label for camera {camera} frame {frame}: {e}"))
        })?;
        Ok((img, outcome))
    }

    fn resolve(&self, camera: &CameraId, frame: FrameNumber) -> (image::RgbImage, TileOutcome) {
        let Some(path) = self.index.frame_path(camera, frame) else {
            return (self.placeholder_copy(), TileOutcome::Missing);
        };

        match decode_frame(path) {
            Ok(img) => {
                let got = ImageSize::of(&img);
                if got == self.tile {
                    (img, TileOutcome::Decoded)
                } else {
                    (self.placeholder_copy(), TileOutcome::SizeMismatch { got })
                }
            }
            Err(e) => (
                self.placeholder_copy(),
                TileOutcome::DecodeFailed(format!("{e:#}")),
            ),
        }
    }

    fn placeholder_copy(&self) -> image::RgbImage {
        image::RgbImage::clone(&self.placeholder)
    }
}

impl TileSource for FrameLoader<'_> {
    fn load_tile(&self, camera: &CameraId, frame: FrameNumber) -> MosaicResult<image::RgbImage> {
        self.load_tile_with_outcome(camera, frame)
            .map(|(img, _)| img)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/loader.rs"]
mod tests;

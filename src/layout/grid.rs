use crate::foundation::{
    core::ImageSize,
    error::{MosaicError, MosaicResult},
};

/// Fixed column count of the mosaic grid.
pub const MAX_CAMS_PER_ROW: u32 = 2;

/// Canvas layout for one run: equal-size tiles in a row-major grid of at most two columns.
///
/// A final row holding a single tile is centered horizontally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct GridGeometry {
    pub tile: ImageSize,
    pub canvas: ImageSize,
    pub cams_per_row: u32,
    pub rows: u32,
    pub camera_count: u32,
}

impl GridGeometry {
    pub fn new(camera_count: usize, tile: ImageSize) -> MosaicResult<Self> {
        if camera_count == 0 {
            return Err(MosaicError::configuration(
                "grid needs at least one camera",
            ));
        }
        if tile.is_empty() {
            return Err(MosaicError::data(format!(
                "tile size must be non-zero, got {tile}"
            )));
        }
        let camera_count = u32::try_from(camera_count)
            .map_err(|_| MosaicError::configuration("too many cameras for one grid"))?;

        let cams_per_row = MAX_CAMS_PER_ROW.min(camera_count);
        let rows = camera_count.div_ceil(cams_per_row);

        let width = tile.width.checked_mul(cams_per_row);
        let height = tile.height.checked_mul(rows);
        let (Some(width), Some(height)) = (width, height) else {
            return Err(MosaicError::data(format!(
                "canvas for {camera_count} tiles of {tile} overflows u32"
            )));
        };

        Ok(Self {
            tile,
            canvas: ImageSize::new(width, height),
            cams_per_row,
            rows,
            camera_count,
        })
    }

    /// Number of tiles placed in `row`.
    pub fn row_len(&self, row: u32) -> u32 {
        let start = row * self.cams_per_row;
        self.camera_count
            .saturating_sub(start)
            .min(self.cams_per_row)
    }

    /// Top-left pixel of the tile in `slot` (0-based, caller camera order).
    pub fn slot_origin(&self, slot: u32) -> MosaicResult<(u32, u32)> {
        if slot >= self.camera_count {
            return Err(MosaicError::composite(format!(
                "slot {slot} out of range for {} cameras",
                self.camera_count
            )));
        }
        let row = slot / self.cams_per_row;
        let col = slot % self.cams_per_row;
        let y = row * self.tile.height;
        let x = if self.row_len(row) == 1 {
            (self.canvas.width - self.tile.width) / 2
        } else {
            col * self.tile.width
        };
        Ok((x, y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;

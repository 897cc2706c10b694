use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::{
    foundation::core::{CameraId, FrameNumber, ImageSize},
    foundation::error::{MosaicError, MosaicResult},
    layout::grid::GridGeometry,
    render::loader::TileSource,
};

/// Builds one grid canvas per frame number.
///
/// Per-camera loads fan out on a worker pool owned for the whole run and fan back in
/// in camera order before any pixel is placed. The canvas never leaves `compose` until
/// it is complete.
pub struct Compositor {
    geometry: GridGeometry,
    cameras: Vec<CameraId>,
    pool: rayon::ThreadPool,
}

impl Compositor {
    /// `cameras` is the placement order; its length must match the geometry.
    pub fn new(
        geometry: GridGeometry,
        cameras: Vec<CameraId>,
        threads: Option<usize>,
    ) -> MosaicResult<Self> {
        if cameras.len() != geometry.camera_count as usize {
            return Err(MosaicError::configuration(format!(
                "compositor got {} cameras for a grid of {}",
                cameras.len(),
                geometry.camera_count
            )));
        }
        Ok(Self {
            geometry,
            cameras,
            pool: build_thread_pool(threads)?,
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn cameras(&self) -> &[CameraId] {
        &self.cameras
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Load every camera's tile for `frame` in parallel and place them on a fresh canvas.
    ///
    /// Any tile error, including a panic inside the source, fails the whole frame with
    /// [`MosaicError::Composite`].
    pub fn compose(
        &self,
        source: &dyn TileSource,
        frame: FrameNumber,
    ) -> MosaicResult<image::RgbImage> {
        let tiles = self.pool.install(|| {
            self.cameras
                .par_iter()
                .map(|camera| (camera, load_caught(source, camera, frame)))
                .collect::<Vec<_>>()
        });

        let mut ready = Vec::with_capacity(tiles.len());
        for (camera, tile) in tiles {
            let tile = tile.map_err(|e| {
                MosaicError::composite(format!(
                    "error loading frame {frame} for camera {camera}: {e}"
                ))
            })?;
            ready.push(tile);
        }

        self.place(&ready)
    }

    /// Copy tiles (in camera order) onto a zeroed canvas.
    pub fn place(&self, tiles: &[image::RgbImage]) -> MosaicResult<image::RgbImage> {
        let ImageSize { width, height } = self.geometry.canvas;
        let mut canvas = image::RgbImage::new(width, height);

        for (slot, tile) in tiles.iter().enumerate() {
            if ImageSize::of(tile) != self.geometry.tile {
                return Err(MosaicError::composite(format!(
                    "tile {slot} is {}, expected {}",
                    ImageSize::of(tile),
                    self.geometry.tile
                )));
            }
            let (x, y) = self.geometry.slot_origin(slot as u32)?;
            image::imageops::replace(&mut canvas, tile, i64::from(x), i64::from(y));
        }
        Ok(canvas)
    }
}

fn load_caught(
    source: &dyn TileSource,
    camera: &CameraId,
    frame: FrameNumber,
) -> MosaicResult<image::RgbImage> {
    panic::catch_unwind(AssertUnwindSafe(|| source.load_tile(camera, frame))).unwrap_or_else(
        |payload| {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Err(MosaicError::render(format!("tile load panicked: {msg}")))
        },
    )
}

fn build_thread_pool(threads: Option<usize>) -> MosaicResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MosaicError::configuration(
            "worker 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("camgrid-load-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MosaicError::data(format!("failed to build worker thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;

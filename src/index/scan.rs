use std::{
    collections::{BTreeMap, BTreeSet, HashSet, btree_map::Entry},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::core::{CameraId, FrameNumber},
    foundation::error::{MosaicError, MosaicResult},
    index::naming::FrameNameRule,
};

/// Counters collected while building a [`FrameIndex`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    /// Files that matched the naming rule and a requested camera.
    pub indexed_files: usize,
    /// Files that did not follow the naming rule.
    pub skipped_files: usize,
    /// Well-formed files whose camera was not requested.
    pub ignored_files: usize,
    /// Files dropped because another file of the same camera had the same frame number.
    pub duplicate_frames: usize,
}

/// Per-camera frame paths keyed by frame number, plus the union of all frame numbers.
///
/// Immutable once built. Cameras are only present if they were requested and at least
/// one of their files was found.
#[derive(Clone, Debug)]
pub struct FrameIndex {
    cameras: BTreeMap<CameraId, BTreeMap<FrameNumber, PathBuf>>,
    frame_numbers: BTreeSet<FrameNumber>,
    present: Vec<CameraId>,
    missing: Vec<CameraId>,
    stats: IndexStats,
}

impl FrameIndex {
    /// Scan `dir` (non-recursively) and index the files of the requested cameras.
    pub fn scan_dir(
        dir: &Path,
        camera_order: &[CameraId],
        rule: &FrameNameRule,
    ) -> MosaicResult<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read input directory '{}'", dir.display()))
            .map_err(|e| MosaicError::configuration(format!("{e:#}")))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("list input directory '{}'", dir.display()))
                .map_err(|e| MosaicError::configuration(format!("{e:#}")))?;
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_file() || file_type.is_symlink() {
                paths.push(entry.path());
            }
        }

        let index = Self::from_paths(paths, camera_order, rule)?;
        tracing::info!(
            dir = %dir.display(),
            cameras = index.present.len(),
            frames = index.frame_numbers.len(),
            skipped = index.stats.skipped_files,
            "indexed input directory"
        );
        Ok(index)
    }

    /// Build an index from candidate file paths. Only the file name is parsed.
    ///
    /// Paths are processed in file-name order so duplicate resolution is deterministic.
    pub fn from_paths(
        paths: impl IntoIterator<Item = PathBuf>,
        camera_order: &[CameraId],
        rule: &FrameNameRule,
    ) -> MosaicResult<Self> {
        let requested = dedup_in_order(camera_order);
        let wanted: HashSet<&CameraId> = requested.iter().collect();

        let mut named: Vec<(String, PathBuf)> = paths
            .into_iter()
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?.to_owned();
                Some((name, p))
            })
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut cameras = BTreeMap::<CameraId, BTreeMap<FrameNumber, PathBuf>>::new();
        let mut frame_numbers = BTreeSet::new();
        let mut stats = IndexStats::default();

        for (name, path) in named {
            let Some(parsed) = rule.parse(&name) else {
                tracing::debug!(file = %name, "skipping file that does not match the naming rule");
                stats.skipped_files += 1;
                continue;
            };
            if !wanted.contains(&parsed.camera) {
                stats.ignored_files += 1;
                continue;
            }

            match cameras
                .entry(parsed.camera.clone())
                .or_default()
                .entry(parsed.frame)
            {
                Entry::Vacant(slot) => {
                    slot.insert(path);
                    frame_numbers.insert(parsed.frame);
                    stats.indexed_files += 1;
                }
                Entry::Occupied(kept) => {
                    tracing::warn!(
                        camera = %parsed.camera,
                        frame = %parsed.frame,
                        kept = %kept.get().display(),
                        dropped = %path.display(),
                        "duplicate frame number for camera"
                    );
                    stats.duplicate_frames += 1;
                }
            }
        }

        if cameras.is_empty() {
            return Err(MosaicError::configuration(
                "no requested camera found in input (check the camera order against the file names)",
            ));
        }

        let (present, missing): (Vec<_>, Vec<_>) = requested
            .into_iter()
            .partition(|cam| cameras.contains_key(cam));

        Ok(Self {
            cameras,
            frame_numbers,
            present,
            missing,
            stats,
        })
    }

    /// Cameras found in the input, in the caller's requested order.
    pub fn present_cameras(&self) -> &[CameraId] {
        &self.present
    }

    /// Requested cameras with no file in the input, in requested order.
    pub fn missing_cameras(&self) -> &[CameraId] {
        &self.missing
    }

    /// Every distinct frame number seen across all indexed cameras.
    pub fn frame_numbers(&self) -> &BTreeSet<FrameNumber> {
        &self.frame_numbers
    }

    /// Frame numbers in ascending order.
    pub fn sorted_frame_numbers(&self) -> Vec<FrameNumber> {
        self.frame_numbers.iter().copied().collect()
    }

    pub fn camera_count(&self) -> usize {
        self.present.len()
    }

    pub fn frame_path(&self, camera: &CameraId, frame: FrameNumber) -> Option<&Path> {
        self.cameras
            .get(camera)
            .and_then(|frames| frames.get(&frame))
            .map(PathBuf::as_path)
    }

    pub fn frames_for(&self, camera: &CameraId) -> Option<&BTreeMap<FrameNumber, PathBuf>> {
        self.cameras.get(camera)
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }
}

fn dedup_in_order(order: &[CameraId]) -> Vec<CameraId> {
    let mut seen = HashSet::new();
    order
        .iter()
        .filter(|cam| seen.insert(*cam))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/index/scan.rs"]
mod tests;

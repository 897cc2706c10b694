use crate::foundation::core::{CameraId, FrameNumber};

/// File name convention for per-camera frames: `<camera>_..._<marker><digits>.<ext>`.
///
/// The marker is a fixed number of characters at the start of the last `_` segment
/// (`fn` in `Dev0_x_fn01.jpg`). Its content is not checked, only its length.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameNameRule {
    /// Extension without the leading dot. Matched case-sensitively.
    pub extension: String,
    /// Number of characters to skip before the frame digits.
    pub marker_len: usize,
}

impl Default for FrameNameRule {
    fn default() -> Self {
        Self {
            extension: "jpg".to_string(),
            marker_len: 2,
        }
    }
}

/// Result of a successful [`FrameNameRule::parse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFrameName {
    pub camera: CameraId,
    pub frame: FrameNumber,
}

impl FrameNameRule {
    /// Parse a bare file name. `None` means the file does not follow the convention.
    pub fn parse(&self, file_name: &str) -> Option<ParsedFrameName> {
        let stem = file_name
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')?;

        let mut segments = stem.split('_');
        let camera = segments.next().filter(|s| !s.is_empty())?;
        let last = segments.next_back()?;

        let after_marker = last.get(self.marker_len..)?;
        let digits = after_marker.split('.').next().unwrap_or_default();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let frame = digits.parse::<u64>().ok()?;

        Some(ParsedFrameName {
            camera: CameraId::new(camera).ok()?,
            frame: FrameNumber(frame),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/index/naming.rs"]
mod tests;

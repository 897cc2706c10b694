/// Grid canvas assembly with per-frame fan-out/fan-in.
pub mod compositor;
/// Frame-number label drawing.
pub mod label;
/// Per-camera tile loading with placeholder fallback.
pub mod loader;

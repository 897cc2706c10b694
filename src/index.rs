/// File name convention parsing.
pub mod naming;
/// Directory scanning and the per-camera frame index.
pub mod scan;

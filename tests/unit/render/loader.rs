use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::*;
use crate::index::naming::FrameNameRule;
use crate::render::label::LabelStyle;

fn write_jpeg(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("camgrid_unit").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn fontless() -> LabelRenderer {
    LabelRenderer::new(
        Arc::new(usvg::fontdb::Database::new()),
        LabelStyle::default(),
    )
}

fn cam(id: &str) -> CameraId {
    CameraId::new(id).unwrap()
}

#[test]
fn loads_decodes_and_labels_existing_frame() {
    let dir = scratch_dir("loader_ok");
    write_jpeg(&dir.join("A_x_fn01.jpg"), 300, 80, [200, 200, 200]);
    let index = FrameIndex::scan_dir(&dir, &[cam("A")], &FrameNameRule::default()).unwrap();

    let label = fontless();
    let loader = FrameLoader::new(&index, ImageSize::new(300, 80), &label);
    let (img, outcome) = loader
        .load_tile_with_outcome(&cam("A"), FrameNumber(1))
        .unwrap();

    assert_eq!(outcome, TileOutcome::Decoded);
    assert_eq!(img.dimensions(), (300, 80));
    // Outside the label box the decoded pixels are untouched.
    let far = img.get_pixel(290, 75).0;
    assert!(far.iter().all(|c| (*c as i32 - 200).abs() <= 3));
    // Inside the box they are darkened.
    let inside = img.get_pixel(100, 30).0;
    assert!(inside.iter().all(|c| (*c as i32 - 80).abs() <= 3));
}

#[test]
fn missing_frame_uses_placeholder() {
    let dir = scratch_dir("loader_missing");
    write_jpeg(&dir.join("A_x_fn01.jpg"), 64, 48, [255, 255, 255]);
    let index = FrameIndex::scan_dir(&dir, &[cam("A")], &FrameNameRule::default()).unwrap();

    let label = fontless();
    let loader = FrameLoader::new(&index, ImageSize::new(64, 48), &label);
    let (img, outcome) = loader
        .load_tile_with_outcome(&cam("A"), FrameNumber(2))
        .unwrap();

    assert_eq!(outcome, TileOutcome::Missing);
    assert!(outcome.used_placeholder());
    assert_eq!(img.dimensions(), (64, 48));
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
    assert!(loader.placeholder().pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn corrupt_file_falls_back_to_placeholder() {
    let dir = scratch_dir("loader_corrupt");
    std::fs::write(dir.join("A_x_fn01.jpg"), b"not a jpeg").unwrap();
    let index = FrameIndex::scan_dir(&dir, &[cam("A")], &FrameNameRule::default()).unwrap();

    let label = fontless();
    let loader = FrameLoader::new(&index, ImageSize::new(32, 32), &label);
    let (img, outcome) = loader
        .load_tile_with_outcome(&cam("A"), FrameNumber(1))
        .unwrap();

    assert!(matches!(outcome, TileOutcome::DecodeFailed(_)));
    assert_eq!(img.dimensions(), (32, 32));
}

#[test]
fn wrong_size_frame_falls_back_to_placeholder() {
    let dir = scratch_dir("loader_size");
    write_jpeg(&dir.join("A_x_fn01.jpg"), 40, 20, [10, 20, 30]);
    let index = FrameIndex::scan_dir(&dir, &[cam("A")], &FrameNameRule::default()).unwrap();

    let label = fontless();
    let loader = FrameLoader::new(&index, ImageSize::new(32, 32), &label);
    let (img, outcome) = loader
        .load_tile_with_outcome(&cam("A"), FrameNumber(1))
        .unwrap();

    assert_eq!(
        outcome,
        TileOutcome::SizeMismatch {
            got: ImageSize::new(40, 20)
        }
    );
    assert_eq!(img.dimensions(), (32, 32));
}

#[test]
fn tile_source_returns_plain_image() {
    let dir = scratch_dir("loader_trait");
    write_jpeg(&dir.join("A_x_fn01.jpg"), 16, 16, [0, 0, 0]);
    let index = FrameIndex::scan_dir(&dir, &[cam("A")], &FrameNameRule::default()).unwrap();

    let label = fontless();
    let loader = FrameLoader::new(&index, ImageSize::new(16, 16), &label);
    let source: &dyn TileSource = &loader;
    let img = source.load_tile(&cam("A"), FrameNumber(9)).unwrap();
    assert_eq!(img.dimensions(), (16, 16));
}

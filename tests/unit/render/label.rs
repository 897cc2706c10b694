use super::*;

fn fontless() -> LabelRenderer {
    LabelRenderer::new(
        Arc::new(usvg::fontdb::Database::new()),
        LabelStyle::default(),
    )
}

#[test]
fn box_is_darkened_inclusive_of_far_edge() {
    let mut img = image::RgbImage::from_pixel(300, 80, image::Rgb([200, 100, 50]));
    fontless().decorate(&mut img, FrameNumber(3)).unwrap();

    assert_eq!(img.get_pixel(4, 4).0, [200, 100, 50]);
    assert_eq!(img.get_pixel(5, 5).0, [80, 40, 20]);
    assert_eq!(img.get_pixel(255, 55).0, [80, 40, 20]);
    assert_eq!(img.get_pixel(256, 55).0, [200, 100, 50]);
    assert_eq!(img.get_pixel(255, 56).0, [200, 100, 50]);
}

#[test]
fn black_tile_stays_black_without_fonts() {
    let mut img = image::RgbImage::new(64, 64);
    fontless().decorate(&mut img, FrameNumber(2)).unwrap();
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn tiny_tiles_are_clipped_not_rejected() {
    let mut img = image::RgbImage::from_pixel(3, 3, image::Rgb([10, 10, 10]));
    fontless().decorate(&mut img, FrameNumber(1)).unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [10, 10, 10]);
    assert_eq!(img.get_pixel(2, 2).0, [10, 10, 10]);

    let mut img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 10, 10]));
    fontless().decorate(&mut img, FrameNumber(1)).unwrap();
    assert_eq!(img.get_pixel(7, 7).0, [4, 4, 4]);
}

fn vendored_font() -> LabelRenderer {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts");
    let mut db = usvg::fontdb::Database::new();
    db.load_fonts_dir(&dir);
    assert!(db.len() > 0, "no font loaded from {}", dir.display());
    LabelRenderer::new(Arc::new(db), LabelStyle::default())
}

fn is_red(p: [u8; 3]) -> bool {
    p[0] > 200 && p[1] < 40 && p[2] < 40
}

fn in_box(x: u32, y: u32) -> bool {
    (5..=255).contains(&x) && (5..=55).contains(&y)
}

#[test]
fn text_is_drawn_red_inside_the_box_only() {
    let mut img = image::RgbImage::new(320, 90);
    vendored_font().decorate(&mut img, FrameNumber(2)).unwrap();

    let mut red_inside = 0;
    for (x, y, p) in img.enumerate_pixels() {
        if in_box(x, y) {
            if is_red(p.0) {
                red_inside += 1;
            }
        } else {
            assert_eq!(p.0, [0, 0, 0], "pixel ({x}, {y}) outside the label box");
        }
    }
    assert!(red_inside > 50, "only {red_inside} red pixels");
}

#[test]
fn long_labels_are_not_clipped_short_of_the_tile_width() {
    let mut img = image::RgbImage::new(700, 90);
    vendored_font()
        .decorate(&mut img, FrameNumber(u64::MAX))
        .unwrap();

    let rightmost = img
        .enumerate_pixels()
        .filter(|(_, _, p)| is_red(p.0))
        .map(|(x, _, _)| x)
        .max()
        .unwrap();
    assert!(rightmost >= 400, "text stops at x={rightmost}");
}

#[test]
fn decoration_is_deterministic() {
    let renderer = vendored_font();
    let base = image::RgbImage::from_pixel(320, 90, image::Rgb([30, 60, 90]));

    let mut a = base.clone();
    let mut b = base.clone();
    renderer.decorate(&mut a, FrameNumber(1234)).unwrap();
    renderer.decorate(&mut b, FrameNumber(1234)).unwrap();
    assert_eq!(a.as_raw(), b.as_raw());
    assert!(a.pixels().any(|p| is_red(p.0)));
}

#[test]
fn system_font_loading_keeps_extra_dirs() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts");
    let renderer = LabelRenderer::with_system_fonts(&[dir], LabelStyle::default());
    assert!(renderer.font_face_count() > 0);
}

#[test]
fn label_svg_contains_both_passes() {
    let svg = label_svg(&LabelStyle::default(), 100, 50, "Frame: 7");
    assert_eq!(svg.matches("Frame: 7").count(), 2);
    assert!(svg.contains(r#"x="11" y="41""#));
    assert!(svg.contains("rgb(255,0,0)"));
    assert!(svg.contains("sans-serif"));
}

#[test]
fn blend_over_respects_premultiplied_alpha() {
    let mut dst = image::RgbImage::from_pixel(2, 1, image::Rgb([100, 100, 100]));
    // Left: transparent. Right: half-transparent premultiplied red.
    let src = [0, 0, 0, 0, 128, 0, 0, 128];
    blend_premul_over_rgb(&mut dst, &src, 2, 1).unwrap();
    assert_eq!(dst.get_pixel(0, 0).0, [100, 100, 100]);
    assert_eq!(dst.get_pixel(1, 0).0, [128 + 50, 50, 50]);
}

#[test]
fn blend_rejects_oversized_patch() {
    let mut dst = image::RgbImage::new(1, 1);
    assert!(blend_premul_over_rgb(&mut dst, &[0; 8], 2, 1).is_err());
}

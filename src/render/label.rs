use std::{path::PathBuf, sync::Arc};

use crate::foundation::{
    core::FrameNumber,
    error::{MosaicError, MosaicResult},
};

/// Appearance of the frame-number label drawn in the top-left corner of every tile.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabelStyle {
    /// Top-left corner of the darkened box.
    pub box_origin: (u32, u32),
    /// Box extent. The far edge is inclusive.
    pub box_size: (u32, u32),
    /// Opacity of the black box fill.
    pub box_opacity: f32,
    /// Baseline origin of the colored text pass.
    pub text_origin: (f32, f32),
    /// Offset of the black outline pass relative to `text_origin`.
    pub outline_offset: (f32, f32),
    pub outline_width: f32,
    pub stroke_width: f32,
    pub font_size: f32,
    pub text_rgb: [u8; 3],
    /// Preferred families, most preferred first. A generic fallback is always appended.
    pub font_families: Vec<String>,
    /// Height of the band rasterized for the text. The band spans the full tile width.
    pub raster_height: u32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            box_origin: (5, 5),
            box_size: (250, 50),
            box_opacity: 0.6,
            text_origin: (10.0, 40.0),
            outline_offset: (1.0, 1.0),
            outline_width: 3.0,
            stroke_width: 1.0,
            font_size: 30.0,
            text_rgb: [255, 0, 0],
            font_families: vec![
                "DejaVu Sans".to_string(),
                "Liberation Sans".to_string(),
                "Arial".to_string(),
                "Helvetica".to_string(),
            ],
            raster_height: 64,
        }
    }
}

/// Draws `Frame: <n>` labels. Cheap to clone; the font database is shared.
#[derive(Clone)]
pub struct LabelRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
    style: LabelStyle,
}

impl std::fmt::Debug for LabelRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelRenderer")
            .field("font_faces", &self.fontdb.len())
            .field("style", &self.style)
            .finish()
    }
}

impl LabelRenderer {
    pub fn new(fontdb: Arc<usvg::fontdb::Database>, style: LabelStyle) -> Self {
        Self { fontdb, style }
    }

    /// Load system fonts plus every font found under `extra_dirs`.
    pub fn with_system_fonts(extra_dirs: &[PathBuf], style: LabelStyle) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in extra_dirs {
            db.load_fonts_dir(dir);
        }
        if db.len() == 0 {
            tracing::warn!("no fonts found; frame labels will only show the darkened box");
        } else {
            tracing::debug!(faces = db.len(), "loaded label fonts");
        }
        Self::new(Arc::new(db), style)
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    pub fn font_face_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Darken the label box and draw the two-pass text in place.
    pub fn decorate(&self, img: &mut image::RgbImage, frame: FrameNumber) -> MosaicResult<()> {
        darken_box(img, &self.style);
        self.draw_text(img, &format!("Frame: {frame}"))
    }

    fn draw_text(&self, img: &mut image::RgbImage, text: &str) -> MosaicResult<()> {
        let (img_w, img_h) = img.dimensions();
        let w = img_w;
        let h = img_h.min(self.style.raster_height);
        if w == 0 || h == 0 {
            return Ok(());
        }

        let svg = label_svg(&self.style, w, h, text);
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| MosaicError::render(format!("parse label svg: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| MosaicError::render("failed to allocate label pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        blend_premul_over_rgb(img, pixmap.data(), w, h)
    }
}

fn label_svg(style: &LabelStyle, w: u32, h: u32, text: &str) -> String {
    let mut families: Vec<String> = style
        .font_families
        .iter()
        .map(|f| format!("'{}'", f.replace('\'', "")))
        .collect();
    families.push("sans-serif".to_string());
    let families = families.join(", ");

    let (tx, ty) = style.text_origin;
    let (ox, oy) = style.outline_offset;
    let [r, g, b] = style.text_rgb;

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<g font-family="{families}" font-size="{fs}" stroke-linejoin="round">
<text x="{x0}" y="{y0}" fill="rgb(0,0,0)" stroke="rgb(0,0,0)" stroke-width="{ow}">{text}</text>
<text x="{tx}" y="{ty}" fill="rgb({r},{g},{b})" stroke="rgb({r},{g},{b})" stroke-width="{sw}">{text}</text>
</g>
</svg>"#,
        fs = style.font_size,
        x0 = tx + ox,
        y0 = ty + oy,
        ow = style.outline_width,
        sw = style.stroke_width,
    )
}

/// Multiply the box region by `1 - opacity` (a black fill blended at `opacity`).
pub(crate) fn darken_box(img: &mut image::RgbImage, style: &LabelStyle) {
    let (img_w, img_h) = img.dimensions();
    let (x0, y0) = style.box_origin;
    let x1 = x0.saturating_add(style.box_size.0).min(img_w.saturating_sub(1));
    let y1 = y0.saturating_add(style.box_size.1).min(img_h.saturating_sub(1));
    if x0 >= img_w || y0 >= img_h {
        return;
    }

    let keep = 1.0 - style.box_opacity.clamp(0.0, 1.0);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let px = img.get_pixel_mut(x, y);
            for c in px.0.iter_mut() {
                *c = (f32::from(*c) * keep).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Source-over blend of a premultiplied RGBA8 `w`x`h` patch onto the top-left of `dst`.
pub(crate) fn blend_premul_over_rgb(
    dst: &mut image::RgbImage,
    src_premul: &[u8],
    w: u32,
    h: u32,
) -> MosaicResult<()> {
    let (dst_w, dst_h) = dst.dimensions();
    if w > dst_w || h > dst_h || src_premul.len() != (w as usize) * (h as usize) * 4 {
        return Err(MosaicError::render(
            "blend_premul_over_rgb expects an rgba8 patch inside the destination",
        ));
    }

    for (i, s) in src_premul.chunks_exact(4).enumerate() {
        let a = u16::from(s[3]);
        if a == 0 {
            continue;
        }
        let x = (i as u32) % w;
        let y = (i as u32) / w;
        let d = dst.get_pixel_mut(x, y);
        if a == 255 {
            d.0 = [s[0], s[1], s[2]];
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255(u16::from(d.0[c]), inv);
            d.0[c] = v.min(255) as u8;
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/render/label.rs"]
mod tests;

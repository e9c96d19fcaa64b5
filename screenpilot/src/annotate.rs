//! Draws coordinate reference markers onto a captured frame.
//!
//! The model reasons in logical coordinates, so the annotator anchors that
//! space visually: five reference points (corners + center) labelled with
//! their logical coordinates, and a banner stating the logical resolution.
//! Drawing happens in the physical pixel buffer, so every logical position is
//! scaled through the cycle's [`ScreenGeometry`] first.

use std::io::Cursor;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::errors::AgentError;
use crate::geometry::ScreenGeometry;
use crate::observation::{AnnotatedObservation, Observation};

const MARKER_COLOR: Rgba<u8> = Rgba([220, 40, 40, 255]);
const LABEL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BANNER_COLOR: Rgba<u8> = Rgba([80, 220, 90, 255]);
const BACKING_COLOR: Rgba<u8> = Rgba([0, 0, 0, 200]);

const GLYPH_SIZE: i32 = 8;
const LABEL_PADDING: i32 = 3;

/// Produce a marked-up copy of the observation. The input is not mutated and
/// the output image has exactly the input's dimensions.
pub fn annotate_observation(
    observation: &Observation,
) -> Result<AnnotatedObservation, AgentError> {
    let image_bytes = annotate_bytes(&observation.image_bytes, &observation.geometry)?;
    Ok(AnnotatedObservation {
        image_bytes,
        captured_at: observation.captured_at,
        geometry: observation.geometry,
    })
}

/// Annotate raw PNG capture bytes against a resolved geometry.
pub fn annotate_bytes(bytes: &[u8], geometry: &ScreenGeometry) -> Result<Vec<u8>, AgentError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AgentError::Annotation(format!("cannot decode capture: {e}")))?;
    let mut img = decoded.to_rgba8();

    let lw = geometry.logical_width;
    let lh = geometry.logical_height;

    // Reference points are defined logically and scaled into pixel positions.
    let reference_points = [
        (0, 0),
        (lw - 1, 0),
        (0, lh - 1),
        (lw - 1, lh - 1),
        (lw / 2, lh / 2),
    ];

    // Glyphs drawn into a HiDPI buffer need the same magnification as the
    // rest of the frame or they come out unreadably small.
    let text_scale = geometry.scale_x.round().max(1.0) as u32;
    let marker_radius = 5.0 * geometry.scale_x.max(1.0);

    for (x, y) in reference_points {
        let (px, py) = geometry.to_physical(x, y);
        draw_disc(&mut img, px, py, marker_radius, MARKER_COLOR);
        draw_label(
            &mut img,
            px,
            py,
            &format!("({x}, {y})"),
            LABEL_COLOR,
            text_scale,
        );
    }

    draw_banner(
        &mut img,
        &format!("Screen: {lw} x {lh}"),
        BANNER_COLOR,
        text_scale,
    );

    debug!(
        logical = format!("{lw}x{lh}"),
        physical = format!("{}x{}", img.width(), img.height()),
        "observation annotated"
    );

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| AgentError::Annotation(format!("cannot encode annotated capture: {e}")))?;
    Ok(out)
}

fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let alpha = f64::from(src[3]) / 255.0;
    let inv = 1.0 - alpha;
    let mix = |d: u8, s: u8| (f64::from(d) * inv + f64::from(s) * alpha).round() as u8;
    Rgba([
        mix(dst[0], src[0]),
        mix(dst[1], src[1]),
        mix(dst[2], src[2]),
        dst[3].max(src[3]),
    ])
}

fn put_blended(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i32 && y < img.height() as i32 {
        let dst = *img.get_pixel(x as u32, y as u32);
        img.put_pixel(x as u32, y as u32, blend_pixel(dst, color));
    }
}

fn draw_disc(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    let min_x = (cx - radius).floor() as i32;
    let max_x = (cx + radius).ceil() as i32;
    let min_y = (cy - radius).floor() as i32;
    let max_y = (cy + radius).ceil() as i32;
    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = f64::from(x) - cx;
            let dy = f64::from(y) - cy;
            if dx * dx + dy * dy <= r2 {
                put_blended(img, x, y, color);
            }
        }
    }
}

fn fill_rect(img: &mut RgbaImage, x0: i32, y0: i32, w: i32, h: i32, color: Rgba<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            put_blended(img, x, y, color);
        }
    }
}

fn draw_bitmap_text(img: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>, scale: u32) {
    let scale = scale.max(1) as i32;
    let mut cursor_x = x;
    for ch in text.chars() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += GLYPH_SIZE * scale;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            let bits = *row;
            for col_idx in 0..GLYPH_SIZE {
                if (bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = y + row_idx as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        put_blended(img, px + sx, py + sy, color);
                    }
                }
            }
        }
        cursor_x += GLYPH_SIZE * scale;
    }
}

fn text_extent(text: &str, scale: u32) -> (i32, i32) {
    let scale = scale.max(1) as i32;
    (
        text.chars().count() as i32 * GLYPH_SIZE * scale,
        GLYPH_SIZE * scale,
    )
}

/// Coordinate label next to a marker, on a dark backing rectangle. The label
/// flips to the other side of the marker near the right/bottom edges so it
/// stays inside the frame.
fn draw_label(img: &mut RgbaImage, px: f64, py: f64, text: &str, color: Rgba<u8>, scale: u32) {
    let (tw, th) = text_extent(text, scale);
    let offset = 8 * scale.max(1) as i32;

    let mut x = px.round() as i32 + offset;
    let mut y = py.round() as i32 + offset;
    if x + tw + 2 * LABEL_PADDING > img.width() as i32 {
        x = px.round() as i32 - offset - tw - 2 * LABEL_PADDING;
    }
    if y + th + 2 * LABEL_PADDING > img.height() as i32 {
        y = py.round() as i32 - offset - th - 2 * LABEL_PADDING;
    }

    fill_rect(
        img,
        x,
        y,
        tw + 2 * LABEL_PADDING,
        th + 2 * LABEL_PADDING,
        BACKING_COLOR,
    );
    draw_bitmap_text(img, x + LABEL_PADDING, y + LABEL_PADDING, text, color, scale);
}

/// Resolution banner centered along the top edge.
fn draw_banner(img: &mut RgbaImage, text: &str, color: Rgba<u8>, scale: u32) {
    let (tw, th) = text_extent(text, scale);
    let x = (img.width() as i32 - tw - 2 * LABEL_PADDING).max(0) / 2;
    let y = 4 * scale.max(1) as i32;

    fill_rect(
        img,
        x,
        y,
        tw + 2 * LABEL_PADDING,
        th + 2 * LABEL_PADDING,
        BACKING_COLOR,
    );
    draw_bitmap_text(img, x + LABEL_PADDING, y + LABEL_PADDING, text, color, scale);
}

// Frame annotation - draws the pose skeleton and a prediction banner onto a copy
// of the input frame

use crate::models::gesture::{GestureCategory, Prediction};
use crate::models::pose::{BodyPose, LandmarkPoint, LandmarkSet, POSE_CONNECTIONS};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

const CONNECTION_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const LANDMARK_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const BANNER_HEIGHT: u32 = 30;
const BANNER_MAX_WIDTH: u32 = 250;
const BANNER_BACKING: Rgb<u8> = Rgb([32, 32, 32]);
const ALLOWED_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const DISALLOWED_COLOR: Rgb<u8> = Rgb([220, 0, 0]);
const UNKNOWN_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

// 8x8 glyphs drawn at 2x, so each character is 16 px square
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_SCALE: u32 = 2;
const GLYPH_SIZE: u32 = 8 * TEXT_SCALE;
const TEXT_ORIGIN: (u32, u32) = (10, 7);

/// Draws detection results the way MediaPipe's drawing utilities do
#[derive(Debug, Clone)]
pub struct FrameAnnotator {
    connection_thickness: u32,
    landmark_radius: u32,
    visibility_threshold: f32,
}

impl Default for FrameAnnotator {
    fn default() -> Self {
        Self {
            connection_thickness: 4,
            landmark_radius: 6,
            visibility_threshold: 0.5,
        }
    }
}

impl FrameAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an annotated copy of `frame`. Only the body pose is drawn.
    pub fn annotate(
        &self,
        frame: &RgbImage,
        landmarks: &LandmarkSet,
        prediction: Option<&Prediction>,
    ) -> RgbImage {
        let mut canvas = frame.clone();

        if let Some(pose) = &landmarks.pose {
            self.draw_pose(&mut canvas, pose);
        }

        if let Some(prediction) = prediction {
            draw_banner(&mut canvas, prediction);
        }

        canvas
    }

    fn draw_pose(&self, canvas: &mut RgbImage, pose: &BodyPose) {
        let (width, height) = canvas.dimensions();
        let pixels: Vec<Option<(i64, i64)>> = pose
            .landmarks()
            .iter()
            .map(|point| self.to_pixel(point, width, height))
            .collect();

        let line_radius = (self.connection_thickness / 2).max(1) as i64;
        for (start, end) in POSE_CONNECTIONS.iter() {
            if let (Some(a), Some(b)) = (pixels[*start as usize], pixels[*end as usize]) {
                draw_line(canvas, a, b, line_radius, CONNECTION_COLOR);
            }
        }

        for (x, y) in pixels.iter().flatten() {
            fill_disc(canvas, *x, *y, self.landmark_radius as i64, LANDMARK_COLOR);
        }
    }

    /// Pixel position of a visible, in-frame landmark
    fn to_pixel(&self, point: &LandmarkPoint, width: u32, height: u32) -> Option<(i64, i64)> {
        if !point.is_visible(self.visibility_threshold) {
            return None;
        }
        if !(0.0..=1.0).contains(&point.x) || !(0.0..=1.0).contains(&point.y) {
            return None;
        }
        let x = ((point.x * width as f32) as i64).min(width as i64 - 1);
        let y = ((point.y * height as f32) as i64).min(height as i64 - 1);
        Some((x, y))
    }
}

// ==============================================================================
// Raster primitives
// ==============================================================================

fn put(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_disc(canvas: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(canvas, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Bresenham line stamped with a disc for thickness
fn draw_line(
    canvas: &mut RgbImage,
    from: (i64, i64),
    to: (i64, i64),
    radius: i64,
    color: Rgb<u8>,
) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fill_disc(canvas, x, y, radius, color);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Top-left bar whose filled width tracks the prediction confidence, with
/// `"<label> (<confidence>)"` written over it
fn draw_banner(canvas: &mut RgbImage, prediction: &Prediction) {
    let text = format!("{} ({:.2})", prediction.class_label, prediction.confidence);
    let text_width = TEXT_ORIGIN.0 * 2 + GLYPH_SIZE * text.chars().count() as u32;

    let (width, height) = canvas.dimensions();
    let banner_width = BANNER_MAX_WIDTH.max(text_width).min(width);
    let banner_height = BANNER_HEIGHT.min(height);
    let filled = (prediction.confidence.clamp(0.0, 1.0) * banner_width as f32).round() as u32;

    let color = match prediction.gesture().map(|g| g.category()) {
        Some(GestureCategory::Allowed) => ALLOWED_COLOR,
        Some(GestureCategory::Disallowed) => DISALLOWED_COLOR,
        None => UNKNOWN_COLOR,
    };

    for y in 0..banner_height {
        for x in 0..banner_width {
            let pixel = if x < filled { color } else { BANNER_BACKING };
            canvas.put_pixel(x, y, pixel);
        }
    }

    draw_text(canvas, &text, TEXT_ORIGIN, (banner_width, banner_height));
}

/// Scaled 8x8 bitmap text, clipped to the top-left `(width, height)` box.
/// Characters outside the basic Latin set are left blank.
fn draw_text(canvas: &mut RgbImage, text: &str, origin: (u32, u32), clip: (u32, u32)) {
    for (index, c) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(c) else {
            continue;
        };
        let left = origin.0 + index as u32 * GLYPH_SIZE;
        if left >= clip.0 {
            break;
        }

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for sy in 0..TEXT_SCALE {
                    for sx in 0..TEXT_SCALE {
                        let x = left + col * TEXT_SCALE + sx;
                        let y = origin.1 + row as u32 * TEXT_SCALE + sy;
                        if x < clip.0 && y < clip.1 {
                            put(canvas, x as i64, y as i64, TEXT_COLOR);
                        }
                    }
                }
            }
        }
    }
}

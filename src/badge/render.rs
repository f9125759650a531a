//! Badge compositing: rounded background, star glyph and rating text.
//!
//! Rendering is deterministic for a given base image, rating text and
//! config. The badge is drawn on a transparent overlay, alpha-composited
//! over the base and flattened to opaque RGB for the JPEG save path.

use image::buffer::ConvertBuffer;
use image::{Rgba, RgbaImage, RgbImage, imageops};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut, draw_text_mut, text_size};
use imageproc::point::Point;
use imageproc::rect::Rect;

use super::font::BadgeFont;
use super::BadgeConfig;

/// Ratio of the star's inner radius to its outer radius.
const STAR_INNER_RATIO: f32 = 0.44;

/// Points of the star glyph.
const STAR_POINTS: u32 = 5;

/// Renders rating badges with a fixed config and host font.
pub struct BadgeRenderer {
    config: BadgeConfig,
    font: BadgeFont,
}

impl BadgeRenderer {
    /// Create a renderer, loading the badge font from the host or the
    /// embedded fallback.
    pub fn new(config: BadgeConfig) -> Self {
        let font = BadgeFont::load();
        tracing::debug!(font = font.source(), "badge renderer ready");
        Self { config, font }
    }

    pub fn config(&self) -> &BadgeConfig {
        &self.config
    }

    /// Composite the rating badge onto the bottom-right of a base image.
    pub fn render(&self, base: &RgbImage, rating_text: &str) -> RgbImage {
        let cfg = &self.config;
        let mut canvas: RgbaImage = base.convert();
        let mut overlay = RgbaImage::new(canvas.width(), canvas.height());

        let scale = ab_glyph::PxScale::from(cfg.font_size as f32);
        let (text_w, text_h) = text_size(scale, self.font.as_font(), rating_text);

        let badge_h = cfg.star_size.max(text_h) + 2 * cfg.pad_y;
        let badge_w = cfg.star_size + cfg.star_text_gap + text_w + 2 * cfg.pad_x;

        // Anchor bottom-right, clamping to the top-left corner when the
        // badge would extend past the image bounds.
        let mut x1 = i64::from(canvas.width()) - i64::from(cfg.offset_right) - i64::from(badge_w);
        let mut y1 = i64::from(canvas.height()) - i64::from(cfg.offset_bottom) - i64::from(badge_h);
        if x1 < 0 {
            x1 = 0;
        }
        if y1 < 0 {
            y1 = 0;
        }
        let (x1, y1) = (x1 as i32, y1 as i32);

        draw_rounded_rect(
            &mut overlay,
            x1,
            y1,
            badge_w,
            badge_h,
            cfg.corner_radius,
            cfg.round_left,
            cfg.round_right,
            cfg.background,
        );

        let star_cx = x1 as f32 + cfg.pad_x as f32 + cfg.star_size as f32 / 2.0;
        let star_cy = y1 as f32 + badge_h as f32 / 2.0;
        let outer = cfg.star_size as f32 * 0.5;
        let points = star_points(star_cx, star_cy, outer, outer * STAR_INNER_RATIO);
        if points.len() >= 3 {
            draw_polygon_mut(&mut overlay, &points, cfg.star_color);
        }

        let text_x = x1 + (cfg.pad_x + cfg.star_size + cfg.star_text_gap) as i32;
        let text_y = y1 + ((badge_h - text_h) / 2) as i32;
        draw_text_mut(
            &mut overlay,
            cfg.text_color,
            text_x,
            text_y,
            scale,
            self.font.as_font(),
            rating_text,
        );

        imageops::overlay(&mut canvas, &overlay, 0, 0);
        canvas.convert()
    }
}

/// Fill a rectangle with independently rounded left/right corner pairs.
#[allow(clippy::too_many_arguments)]
fn draw_rounded_rect(
    canvas: &mut RgbaImage,
    x1: i32,
    y1: i32,
    w: u32,
    h: u32,
    radius: u32,
    round_left: bool,
    round_right: bool,
    color: Rgba<u8>,
) {
    let r = radius.min(w / 2).min(h / 2);
    if r == 0 || (!round_left && !round_right) {
        draw_filled_rect_mut(canvas, Rect::at(x1, y1).of_size(w, h), color);
        return;
    }
    let ri = r as i32;

    // Center band, full height
    if w > 2 * r {
        draw_filled_rect_mut(canvas, Rect::at(x1 + ri, y1).of_size(w - 2 * r, h), color);
    }

    // Side bands; a rounded side gets a shortened band plus corner circles
    for (rounded, band_x, cx) in [
        (round_left, x1, x1 + ri),
        (round_right, x1 + (w - r) as i32, x1 + (w - 1 - r) as i32),
    ] {
        if rounded {
            if h > 2 * r {
                draw_filled_rect_mut(canvas, Rect::at(band_x, y1 + ri).of_size(r, h - 2 * r), color);
            }
            draw_filled_circle_mut(canvas, (cx, y1 + ri), ri, color);
            draw_filled_circle_mut(canvas, (cx, y1 + (h - 1 - r) as i32), ri, color);
        } else {
            draw_filled_rect_mut(canvas, Rect::at(band_x, y1).of_size(r, h), color);
        }
    }
}

/// Vertices of a five-pointed star, apex up, alternating outer and inner
/// radius. Consecutive duplicates after integer rounding are dropped so
/// tiny stars stay drawable.
fn star_points(cx: f32, cy: f32, r_outer: f32, r_inner: f32) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(STAR_POINTS as usize * 2);
    let step = std::f32::consts::PI / STAR_POINTS as f32;
    let mut angle = -std::f32::consts::FRAC_PI_2;

    for i in 0..STAR_POINTS * 2 {
        let r = if i % 2 == 0 { r_outer } else { r_inner };
        let p = Point::new(
            (cx + angle.cos() * r).round() as i32,
            (cy + angle.sin() * r).round() as i32,
        );
        if points.last() != Some(&p) {
            points.push(p);
        }
        angle += step;
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

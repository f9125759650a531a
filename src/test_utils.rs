//! Shared helpers for tests that need real JPEG files on disk.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};

use crate::cover::marker;

/// Encodes a generated image as plain JPEG bytes (no badge marker).
pub fn encode_plain_jpeg(width: u32, height: u32, color: Rgb<u8>) -> Vec<u8> {
    encode_jpeg(&RgbImage::from_pixel(width, height, color))
}

fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), 95);
    encoder
        .encode(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Writes a JPEG at `path` with per-pixel colors from `pixel`.
pub fn write_test_cover(path: &Path, width: u32, height: u32, pixel: impl Fn(u32, u32) -> Rgb<u8>) {
    let img = RgbImage::from_fn(width, height, |x, y| pixel(x, y));
    std::fs::write(path, encode_jpeg(&img)).unwrap();
}

/// Writes a solid-color JPEG at `path` that already carries the badge marker.
pub fn write_stamped_cover(path: &Path, color: Rgb<u8>) {
    let plain = encode_plain_jpeg(300, 450, color);
    let stamped = marker::embed_marker(plain, path, None).unwrap();
    std::fs::write(path, stamped).unwrap();
}

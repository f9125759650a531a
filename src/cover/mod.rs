//! Cover-art I/O: opening, fitting and saving the per-directory cover file.
//!
//! Every title directory holds at most one live cover under a fixed name.
//! Covers are normalized to a fixed resolution on open and re-encoded as a
//! whole file on save; nothing here patches bytes in place, so an
//! interrupted run never leaves a half-written cover behind.

pub mod backup;
pub mod marker;
pub mod similarity;

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ExtendedColorType, RgbImage, imageops::FilterType};

use crate::error::{Error, Result};

/// Canonical cover file name within a title directory.
pub const COVER_NAME: &str = "folder.jpg";

/// Fixed output resolution.
pub const TARGET_WIDTH: u32 = 300;
pub const TARGET_HEIGHT: u32 = 450;

/// Pixel density written into the JPEG header.
pub const TARGET_DPI: u16 = 96;

/// High quality keeps the badge text legible after re-encoding.
const JPEG_QUALITY: u8 = 95;

/// Path of the live cover within a directory.
pub fn cover_path(dir: &Path) -> PathBuf {
    dir.join(COVER_NAME)
}

/// Open an image and center-crop-fit it to the target cover resolution.
pub fn open_fit(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| Error::image(path, e))?;
    Ok(img
        .resize_to_fill(TARGET_WIDTH, TARGET_HEIGHT, FilterType::Lanczos3)
        .to_rgb8())
}

/// Encode a rendered cover as JPEG, embed the idempotence marker and write
/// the result over `path` as a whole file.
///
/// The encoder writes every component at full resolution (1x1 sampling
/// factors, no chroma subsampling), which keeps the small badge text and
/// the colored star edges crisp at this size.
///
/// `marker_extra` is free-form provenance text recorded next to the marker
/// sentinel (source field, rendered rating).
pub fn save_stamped(img: &RgbImage, path: &Path, marker_extra: &str) -> Result<()> {
    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut encoded), JPEG_QUALITY);
    encoder.set_pixel_density(PixelDensity::dpi(TARGET_DPI));
    encoder
        .encode(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| Error::image(path, e))?;

    let stamped = marker::embed_marker(encoded, path, Some(marker_extra))?;
    fs::write(path, stamped)?;
    Ok(())
}

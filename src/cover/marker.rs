//! Idempotence marker embedded in the cover's image metadata.
//!
//! The pipeline must never stamp a badge onto an image that already carries
//! one, and must never back up an image it authored itself. Both checks hang
//! off a sentinel substring stored in the JPEG's EXIF ImageDescription
//! field. The storage location is private to this module; the rest of the
//! system only ever asks "has this image been stamped?" and "mark this
//! image as stamped".
//!
//! The marker lives outside pixel data, so two stamped covers with
//! identical pixels but different provenance text both read as stamped.

use std::fs;
use std::path::Path;

use exif::{In, Tag, Value};
use img_parts::ImageEXIF;
use img_parts::jpeg::Jpeg;

use crate::error::{Error, Result};

/// Sentinel proving this pipeline authored an image. Absence means the
/// cover was supplied externally and is safe to back up.
pub const MARKER: &str = "COVER_BURNER_BADGE_V1";

/// True when the image at `path` carries the marker sentinel.
///
/// Any failure to read or parse the file reads as "no marker": an
/// unreadable cover is treated like an externally supplied one and the
/// backup safety checks elsewhere keep it from being clobbered silently.
pub fn has_marker(path: &Path) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };
    read_description(&bytes).is_some_and(|desc| desc.contains(MARKER))
}

/// Append the marker (and optional provenance text) to a description,
/// leaving it unchanged when the sentinel is already present.
pub fn marked_description(current: &str, extra: Option<&str>) -> String {
    if current.contains(MARKER) {
        return current.to_string();
    }
    let mut out = String::from(current);
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(MARKER);
    if let Some(extra) = extra.filter(|e| !e.is_empty()) {
        out.push(' ');
        out.push_str(extra);
    }
    out
}

/// Rewrite a JPEG's EXIF segment so its ImageDescription carries the
/// marker. Existing description text is preserved ahead of the sentinel.
pub fn embed_marker(jpeg_bytes: Vec<u8>, path: &Path, extra: Option<&str>) -> Result<Vec<u8>> {
    let mut jpeg = Jpeg::from_bytes(jpeg_bytes.into())
        .map_err(|e| Error::metadata(path, format!("not a parseable JPEG: {e}")))?;

    let current = jpeg
        .exif()
        .and_then(|raw| description_from_exif(&raw))
        .unwrap_or_default();
    let description = marked_description(&current, extra);

    jpeg.set_exif(Some(exif_with_description(&description).into()));

    let mut out = Vec::new();
    jpeg.encoder()
        .write_to(&mut out)
        .map_err(|e| Error::metadata(path, format!("failed to re-encode JPEG: {e}")))?;
    Ok(out)
}

/// ImageDescription text of a JPEG byte buffer, if any.
fn read_description(jpeg_bytes: &[u8]) -> Option<String> {
    let jpeg = Jpeg::from_bytes(jpeg_bytes.to_vec().into()).ok()?;
    let raw = jpeg.exif()?;
    description_from_exif(&raw)
}

/// Parse raw TIFF-format EXIF data and pull out the ImageDescription.
fn description_from_exif(raw: &[u8]) -> Option<String> {
    let exif = exif::Reader::new().read_raw(raw.to_vec()).ok()?;
    let field = exif.get_field(Tag::ImageDescription, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(chunks) => {
            let text = chunks
                .iter()
                .map(|c| String::from_utf8_lossy(c))
                .collect::<Vec<_>>()
                .join(" ");
            Some(text.trim_end_matches('\0').to_string())
        }
        _ => None,
    }
}

/// Build a minimal TIFF-format EXIF buffer holding one IFD0 with a single
/// ImageDescription (0x010E) ASCII entry.
fn exif_with_description(description: &str) -> Vec<u8> {
    let desc_bytes = description.as_bytes();
    let desc_len = desc_bytes.len() as u32 + 1; // trailing NUL

    let ifd0_offset: u32 = 8; // right after the TIFF header
    let ifd0_entries: u16 = 1;
    // entry count + entries + next-IFD pointer
    let ifd0_size = 2 + 12 * ifd0_entries as usize + 4;
    let data_offset = ifd0_offset + ifd0_size as u32;

    let mut exif = Vec::with_capacity(ifd0_offset as usize + ifd0_size + desc_bytes.len() + 1);

    // TIFF header, little-endian
    exif.extend_from_slice(b"II");
    exif.extend_from_slice(&42u16.to_le_bytes());
    exif.extend_from_slice(&ifd0_offset.to_le_bytes());

    // IFD0
    exif.extend_from_slice(&ifd0_entries.to_le_bytes());

    // ImageDescription entry: tag, type ASCII, count, value/offset
    exif.extend_from_slice(&0x010Eu16.to_le_bytes());
    exif.extend_from_slice(&2u16.to_le_bytes());
    exif.extend_from_slice(&desc_len.to_le_bytes());
    if desc_len <= 4 {
        let mut value = [0u8; 4];
        value[..desc_bytes.len()].copy_from_slice(desc_bytes);
        exif.extend_from_slice(&value);
    } else {
        exif.extend_from_slice(&data_offset.to_le_bytes());
    }

    // Next-IFD pointer: none
    exif.extend_from_slice(&0u32.to_le_bytes());

    if desc_len > 4 {
        exif.extend_from_slice(desc_bytes);
        exif.push(0);
    }

    exif
}

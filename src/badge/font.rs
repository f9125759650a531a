//! Font selection for the rating text.
//!
//! A fixed preference list of well-known host font files is tried first
//! (bold faces before regular, matching the badge's look). When none of
//! them loads, an embedded fallback face takes over, so a renderer can
//! always be built regardless of what the host has installed.

use std::path::Path;

use ab_glyph::FontVec;

/// Last-resort face compiled into the binary (Bitstream Vera license,
/// see assets/DejaVuSans-Bold.LICENSE).
const FALLBACK_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");

/// Preferred host font files, tried in order before the embedded fallback.
const FONT_CANDIDATES: &[&str] = &[
    r"C:\Windows\Fonts\arialbd.ttf",
    r"C:\Windows\Fonts\arial.ttf",
    r"C:\Windows\Fonts\calibrib.ttf",
    r"C:\Windows\Fonts\calibri.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// A loaded badge font.
pub struct BadgeFont {
    font: FontVec,
    source: String,
}

impl BadgeFont {
    /// Load the first usable host font, or the embedded fallback.
    pub fn load() -> Self {
        for candidate in FONT_CANDIDATES {
            if let Some(font) = load_file(Path::new(candidate)) {
                tracing::debug!(font = candidate, "loaded badge font");
                return Self {
                    font,
                    source: (*candidate).to_string(),
                };
            }
        }

        tracing::debug!("no host font candidate loaded, using embedded fallback");
        let font =
            FontVec::try_from_vec(FALLBACK_FONT.to_vec()).expect("embedded font is a valid face");
        Self {
            font,
            source: "embedded DejaVu Sans Bold".to_string(),
        }
    }

    pub fn as_font(&self) -> &FontVec {
        &self.font
    }

    /// Where the font came from, for logging.
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn load_file(path: &Path) -> Option<FontVec> {
    let bytes = std::fs::read(path).ok()?;
    FontVec::try_from_vec(bytes).ok()
}

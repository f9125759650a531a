//! Rating extraction from NFO metadata files.
//!
//! NFO files in the wild are imperfect: ratings may live in the root-level
//! `<rating>` element, in `<criticrating>`, or in a nested
//! `<ratings><rating name="...">` collection; values may use `.` or `,` as
//! the decimal separator; documents may not even be well-formed XML.
//!
//! Extraction therefore runs an ordered chain of strategies per field: a
//! structured parse of the whole document first, then a permissive regex
//! scan over the raw text. Each strategy yields `None` instead of failing,
//! so the chain is testable in isolation and easy to extend. Only strictly
//! positive values are accepted; a zero rating means "not usefully present".

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

/// Conventionally named NFO files, tried before any other `*.nfo`.
const PREFERRED_NFO_NAMES: &[&str] = &["movie.nfo", "tvshow.nfo"];

/// Rating entries in the nested collection carrying this provider name are
/// preferred over unnamed or otherwise-named siblings.
const TRUSTED_PROVIDER: &str = "imdb";

/// The two recognized rating-bearing NFO fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RatingField {
    /// Generic `<rating>` element, including the nested ratings collection
    #[value(name = "rating")]
    Rating,
    /// Critic score in `<criticrating>`
    #[value(name = "criticrating")]
    CriticRating,
}

impl RatingField {
    /// Element name as it appears in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::CriticRating => "criticrating",
        }
    }

    /// The other recognized field, consulted on fallback.
    pub fn other(self) -> Self {
        match self {
            Self::Rating => Self::CriticRating,
            Self::CriticRating => Self::Rating,
        }
    }
}

impl std::fmt::Display for RatingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rating extracted from an NFO document, with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct NfoRating {
    /// Strictly positive rating value
    pub value: f64,
    /// Field the value came from
    pub field: RatingField,
    /// True when the non-preferred field supplied the value
    pub fallback: bool,
}

impl NfoRating {
    /// The rating rendered with exactly one decimal digit, as drawn on the
    /// badge.
    pub fn display_value(&self) -> String {
        format_rating(self.value)
    }
}

/// Round to one decimal place (ties to even) and render with exactly one
/// digit after the decimal point.
pub fn format_rating(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round_ties_even() / 10.0)
}

// ============================================================================
// Extraction
// ============================================================================

/// Extract the first usable rating from NFO text.
///
/// Tries the preferred field first, then the other recognized field unless
/// `allow_fallback` is false. Per field, the structured XML parse runs
/// before the permissive text scan. Returns `None` when no strategy yields
/// a strictly positive value.
pub fn extract_rating(
    text: &str,
    preferred: RatingField,
    allow_fallback: bool,
) -> Option<NfoRating> {
    let mut fields = vec![preferred];
    if allow_fallback {
        fields.push(preferred.other());
    }

    let doc = parse_document(text);

    for (idx, field) in fields.into_iter().enumerate() {
        let structured = doc.as_ref().and_then(|d| d.field_value(field));
        let value = structured
            .filter(|v| *v > 0.0)
            .or_else(|| scan_field(text, field).filter(|v| *v > 0.0));

        if let Some(value) = value {
            return Some(NfoRating {
                value,
                field,
                fallback: idx == 1,
            });
        }
    }

    None
}

/// Search a directory's NFO files for a rating.
///
/// `movie.nfo` and `tvshow.nfo` are tried first when present, then every
/// other `*.nfo` in lexicographic order. The first file yielding a rating
/// wins. Unreadable files are skipped.
pub fn find_rating_in_dir(
    dir: &Path,
    preferred: RatingField,
    allow_fallback: bool,
) -> Option<(PathBuf, NfoRating)> {
    for path in nfo_candidates(dir) {
        let Ok(text) = fs::read_to_string(&path) else {
            tracing::debug!(path = %path.display(), "skipping unreadable NFO");
            continue;
        };
        if let Some(rating) = extract_rating(&text, preferred, allow_fallback) {
            return Some((path, rating));
        }
    }
    None
}

/// NFO files in a directory, conventional names first, the rest sorted.
fn nfo_candidates(dir: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = PREFERRED_NFO_NAMES
        .iter()
        .map(|name| dir.join(name))
        .filter(|p| p.is_file())
        .collect();

    let mut rest: Vec<PathBuf> = fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().and_then(|e| e.to_str()) == Some("nfo")
                && !out.contains(p)
        })
        .collect();
    rest.sort();
    out.extend(rest);
    out
}

// ============================================================================
// Structured parse
// ============================================================================

/// Rating-bearing content collected from one pass over the XML tree.
#[derive(Debug, Default)]
struct Document {
    /// Text of the first root-level `<rating>`
    rating: Option<String>,
    /// Text of the first root-level `<criticrating>`
    criticrating: Option<String>,
    /// Entries of the nested ratings collection: (name attribute, value text)
    nested: Vec<(Option<String>, String)>,
}

impl Document {
    /// Resolve a field against the collected tree, per field semantics:
    /// `criticrating` reads only its direct element; `rating` prefers the
    /// direct element, then the trusted-provider nested entry, then the
    /// first parseable nested entry.
    fn field_value(&self, field: RatingField) -> Option<f64> {
        match field {
            RatingField::CriticRating => parse_number(self.criticrating.as_deref()?),
            RatingField::Rating => {
                if let Some(v) = self.rating.as_deref().and_then(parse_number) {
                    return Some(v);
                }

                let trusted = self.nested.iter().find(|(name, _)| {
                    name.as_deref()
                        .is_some_and(|n| n.trim().eq_ignore_ascii_case(TRUSTED_PROVIDER))
                });
                if let Some(v) = trusted.and_then(|(_, val)| parse_number(val)) {
                    return Some(v);
                }

                self.nested.iter().find_map(|(_, val)| parse_number(val))
            }
        }
    }
}

/// Parse an NFO document into its rating-bearing parts.
///
/// Returns `None` on any XML error; the caller falls through to the
/// permissive scan.
fn parse_document(text: &str) -> Option<Document> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut doc = Document::default();
    let mut stack: Vec<String> = Vec::new();
    // Depth of the enclosing <ratings> element, if we are inside one
    let mut ratings_depth: Option<usize> = None;
    // In-progress nested entry: name attribute, inline text, <value> text
    let mut entry: Option<(Option<String>, String, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if name == "ratings" && ratings_depth.is_none() {
                    ratings_depth = Some(stack.len());
                } else if name == "rating" && ratings_depth.is_some() && entry.is_none() {
                    let provider = e
                        .try_get_attribute("name")
                        .ok()
                        .flatten()
                        .and_then(|a| a.unescape_value().ok())
                        .map(|v| v.to_string());
                    entry = Some((provider, String::new(), String::new()));
                }

                stack.push(name);
            }
            Ok(Event::End(_)) => {
                let name = stack.pop()?;

                if name == "rating"
                    && entry.is_some()
                    && ratings_depth.is_some_and(|d| stack.len() > d)
                {
                    let (provider, inline, value) = entry.take()?;
                    // A non-empty <value> child wins over inline text
                    let text = if value.trim().is_empty() { inline } else { value };
                    if !text.trim().is_empty() {
                        doc.nested.push((provider, text.trim().to_string()));
                    }
                } else if name == "ratings" && ratings_depth == Some(stack.len()) {
                    ratings_depth = None;
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().ok()?;

                if stack.len() == 2 {
                    match stack[1].as_str() {
                        "rating" if doc.rating.is_none() && entry.is_none() => {
                            doc.rating = Some(text.trim().to_string());
                        }
                        "criticrating" if doc.criticrating.is_none() => {
                            doc.criticrating = Some(text.trim().to_string());
                        }
                        _ => {}
                    }
                }

                if let Some((_, inline, value)) = entry.as_mut() {
                    match stack.last().map(String::as_str) {
                        Some("rating") => inline.push_str(&text),
                        Some("value") => value.push_str(&text),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    Some(doc)
}

// ============================================================================
// Permissive scan
// ============================================================================

static RATING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<rating[^>]*>\s*([0-9]+(?:[.,][0-9]+)?)\s*</rating>")
        .expect("invalid rating scan regex")
});

static CRITICRATING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<criticrating[^>]*>\s*([0-9]+(?:[.,][0-9]+)?)\s*</criticrating>")
        .expect("invalid criticrating scan regex")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("invalid number regex"));

/// Second-pass scan over the raw text for a `<field>number</field>` pair.
fn scan_field(text: &str, field: RatingField) -> Option<f64> {
    let re = match field {
        RatingField::Rating => &RATING_TAG,
        RatingField::CriticRating => &CRITICRATING_TAG,
    };
    let m = re.captures(text)?;
    m.get(1)?.as_str().replace(',', ".").parse().ok()
}

/// Pull the first decimal number out of a text fragment. Accepts `,` as the
/// decimal separator.
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', ".");
    let m = NUMBER.captures(&s)?;
    m.get(1)?.as_str().parse().ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_preferred_field_wins() {
        let nfo = "<movie><rating>8.1</rating><criticrating>6.4</criticrating></movie>";
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 8.1);
        assert_eq!(r.field, RatingField::Rating);
        assert!(!r.fallback);
    }

    #[test]
    fn test_fallback_to_criticrating() {
        let nfo = "<movie><criticrating>7.5</criticrating></movie>";
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 7.5);
        assert_eq!(r.field, RatingField::CriticRating);
        assert!(r.fallback);
    }

    #[test]
    fn test_zero_rating_falls_through() {
        let nfo = "<movie><rating>0</rating><criticrating>7.5</criticrating></movie>";
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 7.5);
        assert!(r.fallback);
    }

    #[test]
    fn test_fallback_disabled() {
        let nfo = "<movie><criticrating>7.5</criticrating></movie>";
        assert!(extract_rating(nfo, RatingField::Rating, false).is_none());
    }

    #[test]
    fn test_comma_decimal_separator() {
        let nfo = "<movie><rating>7,8</rating></movie>";
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 7.8);
    }

    #[test]
    fn test_nested_ratings_prefers_imdb() {
        let nfo = r#"<movie>
            <ratings>
                <rating name="tmdb"><value>5.0</value></rating>
                <rating name="IMDB"><value>8.3</value></rating>
            </ratings>
        </movie>"#;
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 8.3);
        assert_eq!(r.field, RatingField::Rating);
    }

    #[test]
    fn test_nested_ratings_first_usable_without_imdb() {
        let nfo = r#"<movie>
            <ratings>
                <rating name="tmdb">6.6</rating>
                <rating name="trakt"><value>7.7</value></rating>
            </ratings>
        </movie>"#;
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 6.6);
    }

    #[test]
    fn test_direct_rating_beats_nested() {
        let nfo = r#"<movie>
            <rating>9.0</rating>
            <ratings><rating name="imdb"><value>8.0</value></rating></ratings>
        </movie>"#;
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 9.0);
    }

    #[test]
    fn test_regex_scan_handles_malformed_xml() {
        // Unbalanced tags break the structured parse; the scan still finds it
        let nfo = "<movie><title>Broken & Co<rating>6.9</rating>";
        let r = extract_rating(nfo, RatingField::Rating, true).unwrap();
        assert_eq!(r.value, 6.9);
    }

    #[test]
    fn test_no_rating_anywhere() {
        let nfo = "<movie><title>Silent</title></movie>";
        assert!(extract_rating(nfo, RatingField::Rating, true).is_none());
    }

    #[test]
    fn test_criticrating_preferred() {
        let nfo = "<movie><rating>8.1</rating><criticrating>6.4</criticrating></movie>";
        let r = extract_rating(nfo, RatingField::CriticRating, true).unwrap();
        assert_eq!(r.value, 6.4);
        assert!(!r.fallback);
    }

    #[test]
    fn test_format_rating_one_decimal() {
        assert_eq!(format_rating(8.234), "8.2");
        assert_eq!(format_rating(5.0), "5.0");
        assert_eq!(format_rating(9.99), "10.0");
        assert_eq!(format_rating(7.06), "7.1");
    }

    #[test]
    fn test_find_rating_in_dir_prefers_movie_nfo() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("alpha.nfo"),
            "<movie><rating>3.0</rating></movie>",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("movie.nfo"),
            "<movie><rating>8.0</rating></movie>",
        )
        .unwrap();

        let (path, rating) = find_rating_in_dir(dir.path(), RatingField::Rating, true).unwrap();
        assert_eq!(path.file_name().unwrap(), "movie.nfo");
        assert_eq!(rating.value, 8.0);
    }

    #[test]
    fn test_find_rating_in_dir_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.nfo"), "<movie><rating>2.0</rating></movie>").unwrap();
        std::fs::write(dir.path().join("a.nfo"), "<movie><rating>1.5</rating></movie>").unwrap();

        let (path, rating) = find_rating_in_dir(dir.path(), RatingField::Rating, true).unwrap();
        assert_eq!(path.file_name().unwrap(), "a.nfo");
        assert_eq!(rating.value, 1.5);
    }

    #[test]
    fn test_find_rating_skips_files_without_rating() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.nfo"), "<movie><title>x</title></movie>").unwrap();
        std::fs::write(dir.path().join("b.nfo"), "<movie><rating>4.2</rating></movie>").unwrap();

        let (path, rating) = find_rating_in_dir(dir.path(), RatingField::Rating, true).unwrap();
        assert_eq!(path.file_name().unwrap(), "b.nfo");
        assert_eq!(rating.value, 4.2);
    }

    proptest! {
        /// Formatted ratings always carry exactly one decimal digit and
        /// re-parse to the same one-decimal value.
        #[test]
        fn prop_format_round_trips(value in 0.01f64..100.0) {
            let text = format_rating(value);
            prop_assert!(regex::Regex::new(r"^\d+\.\d$").unwrap().is_match(&text));
            let reparsed: f64 = text.parse().unwrap();
            prop_assert_eq!(format_rating(reparsed), text);
        }
    }
}

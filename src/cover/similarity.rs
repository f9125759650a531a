//! Content-based detection of externally replaced cover art.
//!
//! A user may swap `folder.jpg` for entirely new artwork between runs; the
//! backup lineage must notice and snapshot the new original instead of
//! restoring stale art. Two cheap, independent fingerprints decide "very
//! different", and either one firing is sufficient:
//!
//! - a 256-bit perceptual hash (16x16 grayscale, bit per pixel vs the mean)
//!   compared by Hamming distance, catching structural changes;
//! - a 48-bin normalized RGB histogram compared by total-variation
//!   distance, catching recolored art with similar structure.
//!
//! A fingerprint that cannot be computed (corrupt or unreadable image)
//! contributes no signal. When both methods are indeterminate the pair is
//! treated as not very different, so a transient decode problem never
//! triggers spurious backup churn.

use std::path::Path;

use image::imageops::FilterType;

/// Perceptual hash edge length; the hash is `HASH_SIZE`^2 bits.
const HASH_SIZE: u32 = 16;

/// Differing bits (out of 256) at which covers count as very different.
const HASH_THRESHOLD_BITS: u32 = 80;

/// Histogram edge length used for the color fingerprint.
const HIST_SIZE: u32 = 256;

/// Bins per color channel.
const HIST_BINS: usize = 16;

/// Total-variation distance at which covers count as very different.
const HIST_THRESHOLD: f64 = 0.25;

/// 256-bit perceptual fingerprint of coarse image structure.
pub type PerceptualHash = [u8; (HASH_SIZE * HASH_SIZE / 8) as usize];

/// Decide whether two images depict substantially different artwork.
pub fn very_different(a: &Path, b: &Path) -> bool {
    if let (Some(ha), Some(hb)) = (perceptual_hash(a), perceptual_hash(b))
        && hamming_distance(&ha, &hb) >= HASH_THRESHOLD_BITS
    {
        return true;
    }

    if let (Some(da), Some(db)) = (color_histogram(a), color_histogram(b))
        && histogram_distance(&da, &db) >= HIST_THRESHOLD
    {
        return true;
    }

    false
}

/// Average-hash fingerprint: downscale to 16x16 grayscale, then one bit per
/// pixel, set iff the pixel is at or above the mean intensity.
pub fn perceptual_hash(path: &Path) -> Option<PerceptualHash> {
    let img = image::open(path).ok()?;
    let gray = img
        .resize_exact(HASH_SIZE, HASH_SIZE, FilterType::Lanczos3)
        .to_luma8();

    let pixels: Vec<u8> = gray.pixels().map(|p| p.0[0]).collect();
    let mean = pixels.iter().map(|&p| u32::from(p)).sum::<u32>() as f64 / pixels.len() as f64;

    let mut hash = [0u8; (HASH_SIZE * HASH_SIZE / 8) as usize];
    for (i, &p) in pixels.iter().enumerate() {
        if f64::from(p) >= mean {
            hash[i / 8] |= 1 << (7 - i % 8);
        }
    }
    Some(hash)
}

/// Count of differing bits between two perceptual hashes.
pub fn hamming_distance(a: &PerceptualHash, b: &PerceptualHash) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

/// Normalized per-channel color histogram: 16 bins per RGB channel,
/// concatenated and scaled to sum to 1.
pub fn color_histogram(path: &Path) -> Option<Vec<f64>> {
    let img = image::open(path).ok()?;
    let rgb = img
        .resize_exact(HIST_SIZE, HIST_SIZE, FilterType::Lanczos3)
        .to_rgb8();

    let bin_width = 256 / HIST_BINS;
    let mut counts = vec![0u32; HIST_BINS * 3];
    for pixel in rgb.pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            counts[channel * HIST_BINS + value as usize / bin_width] += 1;
        }
    }

    let total: u32 = counts.iter().sum();
    if total == 0 {
        return None;
    }
    Some(
        counts
            .into_iter()
            .map(|c| f64::from(c) / f64::from(total))
            .collect(),
    )
}

/// Total-variation distance between two normalized histograms, in [0, 1].
pub fn histogram_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum::<f64>() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_test_cover;
    use image::Rgb;

    /// A simple two-tone composition with values kept away from histogram
    /// bin edges, so a small uniform shift stays within the same bins.
    fn two_tone(x: u32, y: u32) -> Rgb<u8> {
        if (x / 20 + y / 20) % 2 == 0 {
            Rgb([40, 72, 104])
        } else {
            Rgb([200, 168, 136])
        }
    }

    #[test]
    fn test_identical_images_not_different() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        write_test_cover(&a, 300, 450, two_tone);
        write_test_cover(&b, 300, 450, two_tone);
        assert!(!very_different(&a, &b));
    }

    #[test]
    fn test_small_uniform_shift_not_different() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        write_test_cover(&a, 300, 450, two_tone);
        write_test_cover(&b, 300, 450, |x, y| {
            let Rgb([r, g, bl]) = two_tone(x, y);
            Rgb([r + 5, g + 5, bl + 5])
        });
        assert!(!very_different(&a, &b));
    }

    #[test]
    fn test_swapped_dominant_channels_different() {
        let dir = tempfile::tempdir().unwrap();
        let red = dir.path().join("red.jpg");
        let blue = dir.path().join("blue.jpg");
        // Same composition, dominant color channel swapped
        write_test_cover(&red, 300, 450, |x, y| {
            if (x / 20 + y / 20) % 2 == 0 {
                Rgb([220, 30, 30])
            } else {
                Rgb([180, 60, 60])
            }
        });
        write_test_cover(&blue, 300, 450, |x, y| {
            if (x / 20 + y / 20) % 2 == 0 {
                Rgb([30, 30, 220])
            } else {
                Rgb([60, 60, 180])
            }
        });
        assert!(very_different(&red, &blue));
    }

    #[test]
    fn test_inverted_structure_different() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        write_test_cover(&a, 300, 450, |x, _| {
            if x < 150 { Rgb([10, 10, 10]) } else { Rgb([245, 245, 245]) }
        });
        write_test_cover(&b, 300, 450, |x, _| {
            if x < 150 { Rgb([245, 245, 245]) } else { Rgb([10, 10, 10]) }
        });
        assert!(very_different(&a, &b));
    }

    #[test]
    fn test_undecodable_pair_is_no_signal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        std::fs::write(&a, b"not an image").unwrap();
        std::fs::write(&b, b"also not an image").unwrap();
        // Both fingerprints indeterminate: conservatively not different
        assert!(!very_different(&a, &b));
    }

    #[test]
    fn test_hamming_distance_of_equal_hashes_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        write_test_cover(&a, 300, 450, two_tone);
        let h = perceptual_hash(&a).unwrap();
        assert_eq!(hamming_distance(&h, &h), 0);
    }

    #[test]
    fn test_histogram_sums_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        write_test_cover(&a, 300, 450, two_tone);
        let hist = color_histogram(&a).unwrap();
        assert_eq!(hist.len(), 48);
        assert!((hist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}

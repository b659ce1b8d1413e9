//! # Perceptual Hashing Module
//!
//! Perceptual hashing generates "fingerprints" that remain similar for visually
//! similar images, unlike cryptographic hashes where minor changes produce
//! completely different outputs.
//!
//! This is the classic DCT pHash:
//!
//! 1. Convert to grayscale and resample to 32×32 (Lanczos3)
//! 2. Run a 2-D DCT-II over the 32×32 block
//! 3. Keep the top-left 8×8 low-frequency coefficients
//! 4. Bit i is set when coefficient i is above the median of the 64
//!
//! ## Hamming Distance Interpretation
//!
//! - 0-3: Nearly identical images (same image with minor modifications)
//! - 4-10: Similar images (same subject with moderate differences)
//! - >10: Different images

use image::imageops::FilterType;
use image::DynamicImage;
use rustdct::DctPlanner;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::processing::blur::to_gray;
use crate::processing::decode::decode_image;

const HASH_INPUT_SIZE: usize = 32;
const HASH_BLOCK_SIZE: usize = 8;

/// A 64-bit perceptual fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Calculate the Hamming distance between two fingerprints
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Check if two images are perceptually similar based on a threshold
    pub fn is_similar(&self, other: &Fingerprint, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Fingerprint)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Calculate the DCT fingerprint of a decoded image
pub fn calculate_fingerprint(img: &DynamicImage) -> Fingerprint {
    let n = HASH_INPUT_SIZE;

    // Luma first, then resample the single channel
    let gray = to_gray(img);
    let small = image::imageops::resize(&gray, n as u32, n as u32, FilterType::Lanczos3);
    let mut pixels: Vec<f64> = small.pixels().map(|p| p[0] as f64).collect();

    dct_2d(&mut pixels, n);

    let mut low = [0.0f64; HASH_BLOCK_SIZE * HASH_BLOCK_SIZE];
    for v in 0..HASH_BLOCK_SIZE {
        for u in 0..HASH_BLOCK_SIZE {
            low[v * HASH_BLOCK_SIZE + u] = pixels[v * n + u];
        }
    }

    let median = median(&low);

    let mut hash: u64 = 0;
    for (i, &coefficient) in low.iter().enumerate() {
        if coefficient > median {
            hash |= 1u64 << (63 - i);
        }
    }

    Fingerprint(hash)
}

/// Calculate a fingerprint from an image file, honouring EXIF orientation
pub fn fingerprint_from_file<P: AsRef<Path>>(path: P) -> Result<Fingerprint, DecodeError> {
    let img = decode_image(path)?;
    Ok(calculate_fingerprint(&img))
}

/// In-place separable DCT-II over an n×n row-major buffer
fn dct_2d(buffer: &mut [f64], n: usize) {
    let mut planner = DctPlanner::new();
    let dct = planner.plan_dct2(n);

    for row in buffer.chunks_exact_mut(n) {
        dct.process_dct2(row);
    }

    let mut column = vec![0.0f64; n];
    for x in 0..n {
        for y in 0..n {
            column[y] = buffer[y * n + x];
        }
        dct.process_dct2(&mut column);
        for y in 0..n {
            buffer[y * n + x] = column[y];
        }
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    // Smooth, asymmetric content so no DCT coefficient sits on the median by accident
    fn scene(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let fx = x as f64 / width as f64;
            let fy = y as f64 / height as f64;
            let v = 128.0
                + 70.0 * (fx * 5.3 + 0.7).sin() * (fy * 3.1 + 0.2).cos()
                + 40.0 * (fx * 1.7 - fy * 2.9).sin();
            let v = v.clamp(0.0, 255.0) as u8;
            Rgb([v, v.saturating_sub(20), v / 2])
        }))
    }

    fn inverted(img: &DynamicImage) -> DynamicImage {
        let mut img = img.clone();
        img.invert();
        img
    }

    #[test]
    fn test_distance() {
        let a = Fingerprint(0b1011);
        let b = Fingerprint(0b0001);
        assert_eq!(a.distance(&b), 2);
        assert!(a.is_similar(&b, 2));
        assert!(!a.is_similar(&b, 1));
        assert_eq!(Fingerprint(0).distance(&Fingerprint(u64::MAX)), 64);
    }

    #[test]
    fn test_identical_images_hash_equal() {
        let img = scene(200, 150);
        assert_eq!(calculate_fingerprint(&img), calculate_fingerprint(&img.clone()));
    }

    #[test]
    fn test_rescaled_image_is_similar() {
        let large = scene(512, 384);
        let small = large.resize_exact(256, 192, FilterType::Triangle);

        let distance = calculate_fingerprint(&large).distance(&calculate_fingerprint(&small));
        assert!(distance <= 5, "distance was {}", distance);
    }

    #[test]
    fn test_different_content_is_far() {
        let img = scene(256, 256);
        let distance = calculate_fingerprint(&img).distance(&calculate_fingerprint(&inverted(&img)));
        assert!(distance > 5, "distance was {}", distance);
    }

    #[test]
    fn test_hex_round_trip() {
        let fp = Fingerprint(0x00ff_10a0_0000_0001);
        assert_eq!(fp.to_string(), "00ff10a000000001");
        assert_eq!("00ff10a000000001".parse::<Fingerprint>().unwrap(), fp);

        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, "\"00ff10a000000001\"");
        assert_eq!(serde_json::from_str::<Fingerprint>(&json).unwrap(), fp);
    }

    #[test]
    fn test_grayscale_before_resample() {
        // Saturated red/blue blocks: resampling per colour channel would clamp differently
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(300, 200, |x, y| {
            if ((x / 37) * 7 + (y / 23) * 3) % 5 < 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        }));
        let gray = DynamicImage::ImageLuma8(to_gray(&img));

        assert_eq!(calculate_fingerprint(&img), calculate_fingerprint(&gray));
    }

    #[test]
    fn test_fingerprint_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.png");
        let img = scene(160, 120);
        img.save(&path).unwrap();

        assert_eq!(fingerprint_from_file(&path).unwrap(), calculate_fingerprint(&img));
        assert!(matches!(
            fingerprint_from_file(dir.path().join("missing.png")),
            Err(DecodeError::Read { .. })
        ));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}

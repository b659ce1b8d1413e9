#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};

const BLOCK: u32 = 32;
const GRID: u32 = 8;

/// Small deterministic generator so fixtures are stable across runs
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 56) as u8
    }
}

/// 256x256 grid of random flat blocks; the layout drives the fingerprint
fn blocks(seed: u64) -> RgbImage {
    let mut rng = Lcg(seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ 0xdead_beef);
    let levels: Vec<u8> = (0..GRID * GRID).map(|_| rng.next()).collect();

    RgbImage::from_fn(BLOCK * GRID, BLOCK * GRID, |x, y| {
        let v = levels[((y / BLOCK) * GRID + x / BLOCK) as usize];
        Rgb([v, v, v])
    })
}

/// Distinct content with a fine texture: scores far above the default threshold
pub fn sharp_image(seed: u64) -> DynamicImage {
    let mut img = blocks(seed);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let v = pixel[0] as i16 + if (x + y) % 2 == 0 { 50 } else { -50 };
        let v = v.clamp(0, 255) as u8;
        *pixel = Rgb([v, v, v]);
    }
    DynamicImage::ImageRgb8(img)
}

/// Same kind of layout, heavily smoothed: scores far below the default threshold
pub fn blurry_image(seed: u64) -> DynamicImage {
    DynamicImage::ImageRgb8(blocks(seed)).blur(8.0)
}

pub fn write_jpeg(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Jpeg).unwrap();
    path
}

pub fn write_png(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

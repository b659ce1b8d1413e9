//! # Blur Scoring
//!
//! Sharpness is measured as the variance of the Laplacian of the grayscale
//! image. Sharp images have strong second derivatives around edges and fine
//! texture; defocused or shaken images do not.
//!
//! Raw variance grows with resolution, so every image is first downscaled
//! (area averaging) until its longest side fits `max_side`. Scores are only
//! comparable against a threshold tuned at the same `max_side`.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};

/// Score reported for files that could not be decoded
pub const DECODE_FAILURE_SCORE: f64 = -1.0;

/// Sharpness of an image: higher is sharper
pub fn blur_score(img: &DynamicImage, max_side: u32) -> f64 {
    let normalized = resize_longest_side(img, max_side);
    laplacian_variance(&to_gray(&normalized))
}

/// Blurry means a real score below the threshold. The decode-failure
/// sentinel is never blurry.
pub fn is_blurry(score: f64, threshold: f64) -> bool {
    score >= 0.0 && score < threshold
}

/// Downscale so the longest side is at most `max_side`, keeping aspect ratio.
/// Smaller images and `max_side == 0` are returned unchanged.
pub fn resize_longest_side(img: &DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let longest = width.max(height);
    if max_side == 0 || longest <= max_side {
        return img.clone();
    }

    let (new_width, new_height) = scaled_dimensions(width, height, max_side);
    // thumbnail_exact averages source pixels per target pixel
    img.thumbnail_exact(new_width, new_height)
}

fn scaled_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let scale = max_side as f64 / width.max(height) as f64;
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    (new_width, new_height)
}

/// BT.601 luma, rounded to 8 bits
pub fn to_gray(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let pixel = rgb.get_pixel(x, y);
        let gray = 0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64;
        Luma([gray.round().clamp(0.0, 255.0) as u8])
    })
}

/// Population variance of the 4-neighbour Laplacian, evaluated at every
/// pixel with reflect-101 borders.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let at = |x: i64, y: i64| -> i64 {
        let x = reflect_101(x, width as i64);
        let y = reflect_101(y, height as i64);
        gray.get_pixel(x as u32, y as u32)[0] as i64
    };

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let lap = at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4 * at(x, y);
            let lap = lap as f64;
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let count = (width as f64) * (height as f64);
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

/// Mirror an out-of-range index without repeating the edge pixel
fn reflect_101(index: i64, len: i64) -> i64 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i
}

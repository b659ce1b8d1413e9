// Per-file analysis stages: decode, blur score, fingerprint
pub mod blur;
pub mod decode;
pub mod perceptual;
pub mod progress;

pub use blur::{blur_score, is_blurry, DECODE_FAILURE_SCORE};
pub use decode::decode_image;
pub use perceptual::{calculate_fingerprint, fingerprint_from_file, Fingerprint};

use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

use crate::error::DecodeError;

/// Everything the per-file stage learns about one image. Independent of
/// every other file, so it can be computed on any thread.
#[derive(Debug)]
pub struct ProcessedImage {
    pub path: PathBuf,
    pub file: String,
    pub analysis: Result<ImageMeasurements, DecodeError>,
}

/// Measurements of a successfully decoded image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMeasurements {
    pub blur_score: f64,
    pub fingerprint: Fingerprint,
    pub dimensions: (u32, u32),
}

impl ImageMeasurements {
    pub fn from_image(img: &DynamicImage, max_side_for_blur: u32) -> Self {
        Self {
            blur_score: blur_score(img, max_side_for_blur),
            fingerprint: calculate_fingerprint(img),
            dimensions: img.dimensions(),
        }
    }
}

/// Decode, score and fingerprint a single file
pub fn process_image(path: &Path, max_side_for_blur: u32) -> ProcessedImage {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let analysis =
        decode_image(path).map(|img| ImageMeasurements::from_image(&img, max_side_for_blur));

    ProcessedImage {
        path: path.to_path_buf(),
        file,
        analysis,
    }
}

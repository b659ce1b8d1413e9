use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Page-like aspect ratios (A4 is about 1.414)
const DOCUMENT_RATIO_MIN: f64 = 1.3;
const DOCUMENT_RATIO_MAX: f64 = 1.5;

/// Destination bucket for an image that is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Clean,
    Screenshots,
    Documents,
}

impl Bucket {
    /// Configured folder name for this bucket
    pub fn folder_name<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            Self::Clean => &config.folder_clean,
            Self::Screenshots => &config.folder_screenshots,
            Self::Documents => &config.folder_documents,
        }
    }
}

/// Heuristic bucket assignment from filename and dimensions.
///
/// Rules, first match wins: screenshot marker in the name, page-like
/// aspect ratio, otherwise clean. Unknown dimensions skip the ratio rule.
pub fn classify(file_name: &str, dimensions: Option<(u32, u32)>, config: &Config) -> Bucket {
    let name = file_name.to_lowercase();
    if config
        .screenshot_markers
        .iter()
        .any(|marker| !marker.is_empty() && name.contains(&marker.to_lowercase()))
    {
        return Bucket::Screenshots;
    }

    if let Some((width, height)) = dimensions {
        if is_document_like(width, height) {
            return Bucket::Documents;
        }
    }

    Bucket::Clean
}

fn is_document_like(width: u32, height: u32) -> bool {
    let longer = width.max(height) as f64;
    let shorter = width.min(height).max(1) as f64;
    let ratio = longer / shorter;
    (DOCUMENT_RATIO_MIN..=DOCUMENT_RATIO_MAX).contains(&ratio)
}

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Configuration for analysis and action execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Laplacian variance below which an image counts as blurry
    pub blur_threshold: f64,

    /// Maximum Hamming distance at which two fingerprints are duplicates
    pub hash_distance_max: u32,

    /// Allowed file extensions, lowercase with leading dot
    pub allowed_extensions: Vec<String>,

    /// Longest side images are downscaled to before blur scoring (0 = never resize).
    /// Blur thresholds are only meaningful for the max side they were tuned at.
    pub max_side_for_blur: u32,

    /// Bucket for images that need no special handling
    pub folder_clean: String,

    /// Bucket for screenshots
    pub folder_screenshots: String,

    /// Bucket for page-shaped images
    pub folder_documents: String,

    /// Case-insensitive filename markers that identify screenshots
    pub screenshot_markers: Vec<String>,

    /// Per-file analysis workers (0 = one per CPU, 1 = sequential)
    pub threads: usize,

    /// Render a progress bar while analysing
    pub show_progress: bool,

    /// Log every analysed file
    pub debug_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blur_threshold: 300.0,
            hash_distance_max: 5,
            allowed_extensions: vec![
                ".jpg".to_string(),
                ".jpeg".to_string(),
                ".png".to_string(),
                ".webp".to_string(),
            ],
            max_side_for_blur: 1024,
            folder_clean: "Clean/".to_string(),
            folder_screenshots: "Screenshots/".to_string(),
            folder_documents: "Documents/".to_string(),
            screenshot_markers: vec![
                "screenshot".to_string(),
                "screen shot".to_string(),
                "snip".to_string(),
                "snipping".to_string(),
            ],
            threads: 1,
            show_progress: false,
            debug_log: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Defaults overridden by the process environment (and a `.env` file if present)
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the known variable names
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("BLUR_THRESHOLD") {
            config.blur_threshold = parse_var("BLUR_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("HASH_DISTANCE_MAX") {
            config.hash_distance_max = parse_var("HASH_DISTANCE_MAX", &value)?;
        }
        if let Some(value) = lookup("ALLOWED_EXTS") {
            config.allowed_extensions = value
                .split(',')
                .map(|ext| ext.trim().to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect();
        }
        if let Some(value) = lookup("MAX_SIDE_FOR_BLUR") {
            config.max_side_for_blur = parse_var("MAX_SIDE_FOR_BLUR", &value)?;
        }
        if let Some(value) = lookup("FOLDER_CLEAN") {
            config.folder_clean = value;
        }
        if let Some(value) = lookup("FOLDER_SCREENSHOTS") {
            config.folder_screenshots = value;
        }
        if let Some(value) = lookup("FOLDER_DOCUMENTS") {
            config.folder_documents = value;
        }
        if let Some(value) = lookup("DEBUG_LOG") {
            config.debug_log = value.trim() == "1";
        }
        if let Some(value) = lookup("TRIAGE_THREADS") {
            config.threads = parse_var("TRIAGE_THREADS", &value)?;
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.blur_threshold.is_finite() || self.blur_threshold < 0.0 {
            return Err(Error::Configuration(
                "Blur threshold must be a non-negative number".to_string(),
            ));
        }

        // Fingerprints are 64 bits wide
        if self.hash_distance_max > 64 {
            return Err(Error::Configuration(
                "Hash distance must be between 0 and 64".to_string(),
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(Error::Configuration(
                "At least one allowed extension is required".to_string(),
            ));
        }

        for (name, folder) in [
            ("clean", &self.folder_clean),
            ("screenshots", &self.folder_screenshots),
            ("documents", &self.folder_documents),
        ] {
            if folder.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "The {} folder name must not be empty",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Worker count for parallel stages: `threads`, or one per CPU when 0
    pub fn worker_threads(&self) -> usize {
        match self.threads {
            0 => num_cpus::get(),
            n => n,
        }
    }

    /// A rayon pool sized by [`worker_threads`](Self::worker_threads), local to the caller
    pub fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads())
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build thread pool: {}", e)))
    }

    /// Whether `path` carries one of the allowed extensions (case-insensitive).
    /// Non-UTF-8 names are matched lossily.
    pub fn is_allowed(&self, path: &Path) -> bool {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_lowercase(),
            None => return false,
        };

        self.allowed_extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_lowercase()))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{} has an invalid value: {:?}", key, value)))
}

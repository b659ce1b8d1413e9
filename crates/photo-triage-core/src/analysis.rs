//! Folder analysis: one verdict per image.
//!
//! Decoding, blur scoring and fingerprinting are independent per file and
//! may run on a rayon pool. The duplicate merge is not: it walks the
//! processed files in listing order through a single [`ScanSession`] so the
//! first-seen file always stays canonical.

use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::classifier::classify;
use crate::config::Config;
use crate::deduplication::{DuplicateCheck, DuplicateIndex};
use crate::discovery::discover_images;
use crate::error::Result;
use crate::logging::log_decode_error;
use crate::processing::progress::ProgressTracker;
use crate::processing::{is_blurry, process_image, ProcessedImage, DECODE_FAILURE_SCORE};
use crate::types::{ActionKind, ImageRecord, StatusTag};

/// State of one analysis call: the verdicts so far plus the duplicate index.
/// Created per call and consumed by it; never shared between scans.
#[derive(Debug)]
pub struct ScanSession<'a> {
    config: &'a Config,
    index: DuplicateIndex,
    records: Vec<ImageRecord>,
}

impl<'a> ScanSession<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            index: DuplicateIndex::new(config.hash_distance_max),
            records: Vec::new(),
        }
    }

    /// Turn one processed file into a verdict. Must be called in listing order.
    pub fn ingest(&mut self, processed: ProcessedImage) -> &ImageRecord {
        let config = self.config;
        let ProcessedImage {
            path,
            file,
            analysis,
        } = processed;

        let mut status = Vec::new();
        let mut duplicate_of = None;

        let record = match analysis {
            Ok(measurements) => {
                let blurry = is_blurry(measurements.blur_score, config.blur_threshold);
                if blurry {
                    status.push(StatusTag::Blurry);
                }

                if let DuplicateCheck::Match(original) =
                    self.index.query(measurements.fingerprint, &file)
                {
                    status.push(StatusTag::Duplicate);
                    duplicate_of = Some(original);
                }

                let suggested_folder = if status.is_empty() {
                    Some(
                        classify(&file, Some(measurements.dimensions), config)
                            .folder_name(config)
                            .to_string(),
                    )
                } else {
                    None
                };

                verdict(
                    file,
                    path,
                    status,
                    duplicate_of,
                    suggested_folder,
                    measurements.blur_score,
                    blurry,
                    Some(measurements.fingerprint),
                    None,
                )
            }
            Err(e) => {
                log_decode_error(&e);
                // Nothing to compare, so nothing to flag; the filename rule still applies
                let suggested_folder = classify(&file, None, config).folder_name(config).to_string();

                verdict(
                    file,
                    path,
                    status,
                    None,
                    Some(suggested_folder),
                    DECODE_FAILURE_SCORE,
                    false,
                    None,
                    Some(e.to_string()),
                )
            }
        };

        if config.debug_log {
            info!(
                "[analyze] {} score={:.2} blurry={} status={:?}",
                record.file, record.blur_score, record.is_blurry, record.status
            );
        } else {
            debug!(
                "[analyze] {} score={:.2} blurry={} status={:?}",
                record.file, record.blur_score, record.is_blurry, record.status
            );
        }

        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn index(&self) -> &DuplicateIndex {
        &self.index
    }

    pub fn into_records(self) -> Vec<ImageRecord> {
        self.records
    }
}

#[allow(clippy::too_many_arguments)]
fn verdict(
    file: String,
    path: PathBuf,
    status: Vec<StatusTag>,
    duplicate_of: Option<String>,
    suggested_folder: Option<String>,
    blur_score: f64,
    is_blurry: bool,
    fingerprint: Option<crate::processing::Fingerprint>,
    decode_error: Option<String>,
) -> ImageRecord {
    // Any flag routes to delete and drops the bucket
    let (action, suggested_folder) = if status.is_empty() {
        (ActionKind::Move, suggested_folder)
    } else {
        (ActionKind::Delete, None)
    };

    ImageRecord {
        file,
        path,
        status,
        action,
        duplicate_of,
        suggested_folder,
        blur_score,
        is_blurry,
        fingerprint,
        decode_error,
    }
}

/// Runs analysis over a folder snapshot
pub struct AnalysisPipeline<'a> {
    config: &'a Config,
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Analyse every allowed file directly inside `folder`
    pub fn analyze(&self, folder: &Path) -> Result<Vec<ImageRecord>> {
        let files = discover_images(folder, self.config)?;
        info!("Found {} candidate images in {}", files.len(), folder.display());
        self.analyze_files(&files)
    }

    /// Analyse an explicit file list; its order is the scan order
    pub fn analyze_files(&self, files: &[PathBuf]) -> Result<Vec<ImageRecord>> {
        let tracker = ProgressTracker::new(files.len(), self.config.show_progress);
        let processed = self.process_all(files, &tracker)?;

        let mut session = ScanSession::new(self.config);
        for image in processed {
            session.ingest(image);
        }

        tracker.finish();
        Ok(session.into_records())
    }

    /// Per-file stage. Output order matches `files` regardless of threading.
    fn process_all(
        &self,
        files: &[PathBuf],
        tracker: &ProgressTracker,
    ) -> Result<Vec<ProcessedImage>> {
        let max_side = self.config.max_side_for_blur;
        let process = |path: &PathBuf| {
            let processed = process_image(path, max_side);
            tracker.increment(processed.analysis.is_ok());
            processed
        };

        if self.config.worker_threads() <= 1 || files.len() <= 1 {
            return Ok(files.iter().map(process).collect());
        }

        let pool = self.config.thread_pool()?;

        Ok(pool.install(|| files.par_iter().map(process).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{Fingerprint, ImageMeasurements};
    use crate::error::DecodeError;

    fn processed(file: &str, blur_score: f64, fingerprint: u64, dims: (u32, u32)) -> ProcessedImage {
        ProcessedImage {
            path: PathBuf::from("/photos").join(file),
            file: file.to_string(),
            analysis: Ok(ImageMeasurements {
                blur_score,
                fingerprint: Fingerprint(fingerprint),
                dimensions: dims,
            }),
        }
    }

    fn undecodable(file: &str) -> ProcessedImage {
        let path = PathBuf::from("/photos").join(file);
        ProcessedImage {
            path: path.clone(),
            file: file.to_string(),
            analysis: Err(DecodeError::Read {
                path,
                source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
            }),
        }
    }

    #[test]
    fn test_sharp_and_blurred() {
        let config = Config::default();
        let mut session = ScanSession::new(&config);

        session.ingest(processed("sharp.jpg", 800.0, 0, (4000, 2250)));
        session.ingest(processed("blurred.jpg", 50.0, u64::MAX, (4000, 2250)));

        let records = session.into_records();
        assert!(records[0].status.is_empty());
        assert_eq!(records[0].action, ActionKind::Move);
        assert_eq!(records[0].suggested_folder.as_deref(), Some("Clean/"));

        assert_eq!(records[1].status, vec![StatusTag::Blurry]);
        assert_eq!(records[1].action, ActionKind::Delete);
        assert!(records[1].is_blurry);
        assert_eq!(records[1].suggested_folder, None);
    }

    #[test]
    fn test_duplicate_points_backwards() {
        let config = Config::default();
        let mut session = ScanSession::new(&config);

        session.ingest(processed("photo.jpg", 800.0, 0, (100, 100)));
        let copy = session.ingest(processed("photo_copy.jpg", 800.0, 0b11, (100, 100)));

        assert_eq!(copy.status, vec![StatusTag::Duplicate]);
        assert_eq!(copy.duplicate_of.as_deref(), Some("photo.jpg"));
        assert_eq!(copy.action, ActionKind::Delete);
        assert_eq!(copy.suggested_folder, None);
        assert_eq!(session.index().len(), 1);
    }

    #[test]
    fn test_session_uses_configured_tolerance() {
        let mut config = Config::default();
        config.hash_distance_max = 1;
        let mut session = ScanSession::new(&config);
        assert_eq!(session.index().tolerance(), 1);

        session.ingest(processed("a.jpg", 800.0, 0, (100, 100)));
        session.ingest(processed("b.jpg", 800.0, 0b11, (100, 100)));

        let files: Vec<&str> = session.records().iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["a.jpg", "b.jpg"]);
        assert!(session.records()[1].status.is_empty());
    }

    #[test]
    fn test_above_tolerance_is_independent() {
        let config = Config::default();
        let mut session = ScanSession::new(&config);

        session.ingest(processed("a.jpg", 800.0, 0, (100, 100)));
        let b = session.ingest(processed("b.jpg", 800.0, 0b111111, (100, 100)));

        assert!(b.status.is_empty());
        assert_eq!(b.duplicate_of, None);
        assert_eq!(session.index().len(), 2);
    }

    #[test]
    fn test_blurry_duplicate_carries_both_tags() {
        let config = Config::default();
        let mut session = ScanSession::new(&config);

        // Blurry originals still join the index
        session.ingest(processed("soft.jpg", 10.0, 7, (100, 100)));
        let again = session.ingest(processed("soft_again.jpg", 10.0, 7, (100, 100)));

        assert_eq!(again.status, vec![StatusTag::Blurry, StatusTag::Duplicate]);
        assert_eq!(again.duplicate_of.as_deref(), Some("soft.jpg"));
    }

    #[test]
    fn test_decode_failure_is_recorded() {
        let config = Config::default();
        let mut session = ScanSession::new(&config);

        let record = session.ingest(undecodable("Screenshot_broken.png"));

        assert_eq!(record.blur_score, DECODE_FAILURE_SCORE);
        assert!(!record.is_blurry);
        assert!(record.status.is_empty());
        assert_eq!(record.fingerprint, None);
        assert!(record.decode_error.is_some());
        assert_eq!(record.action, ActionKind::Move);
        assert_eq!(record.suggested_folder.as_deref(), Some("Screenshots/"));
        assert!(session.index().is_empty());
    }

    #[test]
    fn test_buckets_follow_classifier() {
        let config = Config::default();
        let mut session = ScanSession::new(&config);

        let doc = session.ingest(processed("scan.jpg", 800.0, 0, (2480, 3508)));
        assert_eq!(doc.suggested_folder.as_deref(), Some("Documents/"));

        let shot = session.ingest(processed("screenshot.png", 800.0, u64::MAX, (1920, 1080)));
        assert_eq!(shot.suggested_folder.as_deref(), Some("Screenshots/"));
    }
}

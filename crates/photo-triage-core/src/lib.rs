//! Core functionality for triaging a folder of photos.
//!
//! This library provides the components behind the two external operations:
//! - File discovery and per-file analysis (blur score, perceptual fingerprint)
//! - Duplicate detection within a single scan
//! - Bucket classification of the images worth keeping
//! - Applying the approved moves and deletes

// -- External Dependencies --
use log::info;
use std::collections::HashSet;
use std::path::Path;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use action::ActionExecutor;
pub use analysis::{AnalysisPipeline, ScanSession};
pub use config::*;
pub use error::{DecodeError, Error, Result};
pub use processing::Fingerprint;
pub use types::*;

// -- Public Modules --
pub mod action;
pub mod analysis;
pub mod api;
pub mod classifier;
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod logging;
pub mod processing;
pub mod safety;
pub mod types;

/// Main entry point: one configuration, any number of scans and batches
pub struct Triage {
    config: Config,
}

impl Triage {
    /// Create a new Triage with a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyse every allowed image directly inside `folder`
    pub fn analyze(&self, folder: &Path) -> Result<Vec<ImageRecord>> {
        info!("Analysing {}", folder.display());
        AnalysisPipeline::new(&self.config).analyze(folder)
    }

    /// Apply caller-approved actions. Per-item failures land in the summary.
    pub fn apply_actions(
        &self,
        base_folder: Option<&Path>,
        actions: &[ActionRequest],
    ) -> ActionSummary {
        let executor = ActionExecutor::new(&self.config, base_folder);
        // Parallel only over disjoint sources
        let distinct = actions.iter().map(|a| &a.path).collect::<HashSet<_>>().len() == actions.len();
        let summary = if self.config.threads == 1 || !distinct {
            executor.apply(actions)
        } else {
            executor.apply_parallel(actions)
        };

        info!(
            "Applied {} actions: {} moved, {} deleted, {} failed",
            summary.total(),
            summary.moved.len(),
            summary.deleted.len(),
            summary.failed.len()
        );
        summary
    }
}

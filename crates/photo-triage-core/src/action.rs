//! Applies caller-approved move/delete requests.
//!
//! Every request is handled on its own: a failure is recorded and the batch
//! carries on, and nothing is rolled back. Deletes are permanent; there is
//! no trash and no undo.

use log::{debug, warn};
use rayon::prelude::*;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::logging::{log_action_failure, log_fs_modification};
use crate::safety::{candidate_name, check_bucket_folder, check_delete_target, clear_readonly};
use crate::types::{ActionKind, ActionOutcome, ActionRequest, ActionSummary};

pub struct ActionExecutor<'a> {
    config: &'a Config,
    base_folder: Option<PathBuf>,
}

impl<'a> ActionExecutor<'a> {
    /// `base_folder` anchors bucket-relative moves; requests with an explicit
    /// target folder do not need it.
    pub fn new(config: &'a Config, base_folder: Option<&Path>) -> Self {
        Self {
            config,
            base_folder: base_folder.map(Path::to_path_buf),
        }
    }

    /// Apply every request in order and summarise
    pub fn apply(&self, requests: &[ActionRequest]) -> ActionSummary {
        let mut summary = ActionSummary::default();
        for request in requests {
            summary.record(request.path.clone(), self.execute(request));
        }
        summary
    }

    /// Like [`apply`](Self::apply) but on a pool sized by `Config::threads`.
    /// Requests must name distinct source files; the summary keeps request order.
    pub fn apply_parallel(&self, requests: &[ActionRequest]) -> ActionSummary {
        let pool = match self.config.thread_pool() {
            Ok(pool) => pool,
            Err(e) => {
                warn!("{}; applying sequentially", e);
                return self.apply(requests);
            }
        };

        let outcomes: Vec<ActionOutcome> = pool.install(|| {
            requests
                .par_iter()
                .map(|request| self.execute(request))
                .collect()
        });

        let mut summary = ActionSummary::default();
        for (request, outcome) in requests.iter().zip(outcomes) {
            summary.record(request.path.clone(), outcome);
        }
        summary
    }

    /// Apply a single request. Never panics and never returns an error:
    /// failures come back as [`ActionOutcome::Failed`].
    pub fn execute(&self, request: &ActionRequest) -> ActionOutcome {
        let source = request.path.as_path();

        let result = if !source.exists() {
            Err("not found".to_string())
        } else {
            match &request.action {
                ActionKind::Delete => self.delete(source).map(|_| ActionOutcome::Deleted),
                ActionKind::Move => self.move_file(source, request).map(ActionOutcome::Moved),
                ActionKind::Other(_) => Err("unknown action".to_string()),
            }
        };

        result.unwrap_or_else(|reason| {
            log_action_failure(source, &request.action.to_string(), &reason);
            ActionOutcome::Failed(reason)
        })
    }

    fn delete(&self, source: &Path) -> Result<(), String> {
        check_delete_target(source)?;

        if let Err(e) = clear_readonly(source) {
            debug!("Could not clear read-only flag on {}: {}", source.display(), e);
        }

        fs::remove_file(source).map_err(|e| e.to_string())?;
        log_fs_modification("delete", source, Some("permanent"));
        Ok(())
    }

    fn move_file(&self, source: &Path, request: &ActionRequest) -> Result<PathBuf, String> {
        if source.is_dir() {
            return Err("refusing to move a directory".to_string());
        }

        let file_name = source
            .file_name()
            .map(Path::new)
            .ok_or_else(|| "source has no file name".to_string())?;

        let directory = self.destination_dir(request)?;
        // Idempotent, also when another worker creates it first
        fs::create_dir_all(&directory)
            .map_err(|e| format!("could not create {}: {}", directory.display(), e))?;

        let destination = claim_and_move(source, &directory, file_name).map_err(|e| e.to_string())?;

        let details = format!("to {}", destination.display());
        log_fs_modification("move", source, Some(&details));
        Ok(destination)
    }

    fn destination_dir(&self, request: &ActionRequest) -> Result<PathBuf, String> {
        if let Some(target) = &request.target_folder {
            return Ok(target.clone());
        }

        let folder = request
            .suggested_folder
            .as_deref()
            .unwrap_or(&self.config.folder_clean);
        let folder = check_bucket_folder(folder)?;

        let base = self
            .base_folder
            .as_ref()
            .ok_or_else(|| "missing base folder".to_string())?;

        Ok(base.join(folder))
    }
}

/// Move `source` into `directory` under the first free name. The name is
/// claimed atomically so an existing file is never replaced.
fn claim_and_move(source: &Path, directory: &Path, file_name: &Path) -> io::Result<PathBuf> {
    let mut attempt = 0;
    loop {
        let candidate = candidate_name(directory, file_name, attempt);
        match place(source, &candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Create `destination` as a second name for `source` (hard link, or an
/// exclusive copy across filesystems), then drop the source name.
fn place(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
        Err(_) => copy_exclusive(source, destination)?,
    }

    if let Err(e) = fs::remove_file(source) {
        // Keep the source as the only copy
        let _ = fs::remove_file(destination);
        return Err(e);
    }

    Ok(())
}

fn copy_exclusive(source: &Path, destination: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    if let Err(e) = io::copy(&mut reader, &mut writer).and_then(|_| writer.sync_all()) {
        drop(writer);
        let _ = fs::remove_file(destination);
        return Err(e);
    }

    if let Ok(metadata) = fs::metadata(source) {
        let _ = fs::set_permissions(destination, metadata.permissions());
    }

    Ok(())
}

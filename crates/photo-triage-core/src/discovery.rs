use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};

/// Files directly inside `directory` whose extension is allowed.
///
/// Entries come back in the order the filesystem lists them. That order is
/// not sorted and decides which of two duplicates is seen first.
pub fn discover_images(directory: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if directory.as_os_str().is_empty() {
        return Err(Error::InvalidInput("Missing folder_path".to_string()));
    }

    if !directory.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Not a directory: {}",
            directory.display()
        )));
    }

    let mut image_files = Vec::new();

    for entry in WalkDir::new(directory)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Log error but continue with other files
                warn!("Error listing entry in {}: {}", directory.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if config.is_allowed(entry.path()) {
            image_files.push(entry.into_path());
        }
    }

    Ok(image_files)
}

// -- Tests --

//! Guards the executor runs before touching the filesystem.

use std::io;
use std::path::{Component, Path, PathBuf};

/// A suggested bucket must stay inside the base folder: relative, no `..`
pub fn check_bucket_folder(folder: &str) -> Result<&Path, String> {
    let path = Path::new(folder);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if folder.trim().is_empty() || escapes {
        return Err("invalid destination folder".to_string());
    }

    Ok(path)
}

/// Delete targets must be plain files (or links to them), never directories
pub fn check_delete_target(path: &Path) -> Result<(), String> {
    if path.is_dir() {
        return Err("refusing to delete a directory".to_string());
    }
    Ok(())
}

/// Best effort: make the file writable so it can be removed
pub fn clear_readonly(path: &Path) -> io::Result<()> {
    let metadata = std::fs::metadata(path)?;
    let mut permissions = metadata.permissions();
    if !permissions.readonly() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(permissions.mode() | 0o200);
    }
    #[cfg(not(unix))]
    {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
    }

    std::fs::set_permissions(path, permissions)
}

/// Destination name for a move attempt: the plain name first, then `stem (n).ext`
pub fn candidate_name(directory: &Path, file_name: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return directory.join(file_name);
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("file"));

    let mut name = format!("{} ({})", stem, attempt);
    if let Some(ext) = file_name.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }

    directory.join(name)
}

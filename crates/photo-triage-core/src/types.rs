use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::processing::Fingerprint;

/// Problems detected on an image during analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTag {
    Blurry,
    Duplicate,
}

/// Types of actions that can be applied to an image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Move into a bucket folder
    Move,

    /// Permanently delete the file
    Delete,

    /// Anything else a caller sent; always fails as an unknown action
    Other(String),
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "move" => Self::Move,
            "delete" => Self::Delete,
            _ => Self::Other(value),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Move => "move".to_string(),
            ActionKind::Delete => "delete".to_string(),
            ActionKind::Other(other) => other,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => f.write_str("move"),
            Self::Delete => f.write_str("delete"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// Verdict for one analysed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File name within the scanned folder
    pub file: String,

    /// Full path to the file
    pub path: PathBuf,

    /// Blurry and/or duplicate, in that order
    pub status: Vec<StatusTag>,

    /// Suggested action; delete whenever `status` is non-empty
    pub action: ActionKind,

    /// Earlier file in the same scan this one duplicates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<String>,

    /// Destination bucket, only for moves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_folder: Option<String>,

    /// Laplacian variance, -1 when the file could not be decoded
    pub blur_score: f64,

    pub is_blurry: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

impl ImageRecord {
    pub fn has_status(&self, tag: StatusTag) -> bool {
        self.status.contains(&tag)
    }

    /// The action request a caller gets by accepting this verdict unchanged
    pub fn to_action_request(&self) -> ActionRequest {
        ActionRequest {
            path: self.path.clone(),
            action: self.action.clone(),
            suggested_folder: self.suggested_folder.clone(),
            target_folder: None,
        }
    }
}

/// One caller-approved operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Source file
    pub path: PathBuf,

    pub action: ActionKind,

    /// Bucket relative to the base folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_folder: Option<String>,

    /// Explicit destination directory; wins over `suggested_folder`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_folder: Option<PathBuf>,
}

impl ActionRequest {
    pub fn delete(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            action: ActionKind::Delete,
            suggested_folder: None,
            target_folder: None,
        }
    }

    pub fn move_to_bucket(path: impl Into<PathBuf>, folder: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action: ActionKind::Move,
            suggested_folder: Some(folder.into()),
            target_folder: None,
        }
    }

    pub fn move_to_dir(path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            action: ActionKind::Move,
            suggested_folder: None,
            target_folder: Some(target.into()),
        }
    }
}

/// Result of applying a single action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Moved to the final (possibly uniquified) path
    Moved(PathBuf),

    Deleted,

    Failed(String),
}

/// A failed action as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAction {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate result of a batch, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub moved: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<FailedAction>,
}

impl ActionSummary {
    /// Fold one outcome into the summary
    pub fn record(&mut self, source: PathBuf, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Moved(destination) => self.moved.push(destination),
            ActionOutcome::Deleted => self.deleted.push(source),
            ActionOutcome::Failed(error) => self.failed.push(FailedAction {
                path: source,
                error,
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.moved.len() + self.deleted.len() + self.failed.len()
    }
}

//! JSON entry points for whatever transport sits on top.
//!
//! Each handler validates the payload, runs the core operation and returns
//! the response body. Only call-level problems come back as `Err`; per-item
//! failures are part of the response.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::action::ActionExecutor;
use crate::analysis::AnalysisPipeline;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{ActionRequest, ActionSummary, FailedAction};

/// Liveness check
pub fn ping() -> Value {
    json!({ "status": "ok" })
}

/// `{"folder_path": ...}` -> array of image records
pub fn handle_analyze(payload: &Value, config: &Config) -> Result<Value> {
    let folder = payload
        .get("folder_path")
        .and_then(Value::as_str)
        .filter(|folder| !folder.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput("Missing folder_path".to_string()))?;

    let records = AnalysisPipeline::new(config).analyze(Path::new(folder))?;
    Ok(serde_json::to_value(records)?)
}

/// `{"base_folder": ..., "actions": [...]}` -> `{moved, deleted, failed}`
pub fn handle_apply(payload: &Value, config: &Config) -> Result<Value> {
    let items = payload
        .get("actions")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidInput("Missing actions".to_string()))?;

    let base_folder = payload
        .get("base_folder")
        .and_then(Value::as_str)
        .filter(|base| !base.is_empty())
        .map(PathBuf::from);

    let summary = apply_items(items, base_folder.as_deref(), config);
    Ok(serde_json::to_value(summary)?)
}

/// Parse and apply item by item so one bad entry cannot sink the batch
fn apply_items(items: &[Value], base_folder: Option<&Path>, config: &Config) -> ActionSummary {
    let executor = ActionExecutor::new(config, base_folder);
    let mut summary = ActionSummary::default();

    for item in items {
        match serde_json::from_value::<ActionRequest>(item.clone()) {
            Ok(request) => summary.record(request.path.clone(), executor.execute(&request)),
            Err(e) => {
                let path = item
                    .get("path")
                    .and_then(Value::as_str)
                    .map(PathBuf::from)
                    .unwrap_or_default();
                log::warn!("Rejected malformed action for '{}': {}", path.display(), e);
                summary.failed.push(FailedAction {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_ping() {
        assert_eq!(ping()["status"], "ok");
    }

    #[test]
    fn test_analyze_missing_folder() {
        let config = Config::default();
        assert!(matches!(
            handle_analyze(&json!({}), &config),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            handle_analyze(&json!({ "folder_path": "" }), &config),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_analyze_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        fs::write(&file, b"x").unwrap();

        let result = handle_analyze(
            &json!({ "folder_path": file.to_string_lossy() }),
            &Config::default(),
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_analyze_empty_folder() {
        let dir = tempdir().unwrap();
        let body = handle_analyze(
            &json!({ "folder_path": dir.path().to_string_lossy() }),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(body, json!([]));
    }

    #[test]
    fn test_apply_missing_actions() {
        let config = Config::default();
        assert!(matches!(
            handle_apply(&json!({}), &config),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            handle_apply(&json!({ "actions": "delete everything" }), &config),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_apply_reports_each_item() {
        let dir = tempdir().unwrap();
        let keep = dir.path().join("keep.jpg");
        let drop = dir.path().join("drop.jpg");
        fs::write(&keep, b"k").unwrap();
        fs::write(&drop, b"d").unwrap();

        let payload = json!({
            "base_folder": dir.path().to_string_lossy(),
            "actions": [
                { "path": keep.to_string_lossy(), "action": "move", "suggested_folder": "Clean/" },
                { "path": drop.to_string_lossy(), "action": "delete" },
                { "path": "/nowhere/ghost.jpg", "action": "delete" },
                { "path": "/nowhere/odd.jpg" },
                { "path": drop.to_string_lossy(), "action": "rename" }
            ]
        });

        let body = handle_apply(&payload, &Config::default()).unwrap();
        let moved = dir.path().join("Clean").join("keep.jpg");

        assert_eq!(body["moved"], json!([moved.to_string_lossy()]));
        assert_eq!(body["deleted"], json!([drop.to_string_lossy()]));

        let failed = body["failed"].as_array().unwrap();
        assert_eq!(failed.len(), 3);
        assert_eq!(failed[0]["error"], "not found");
        assert_eq!(failed[1]["path"], "/nowhere/odd.jpg");
        // Already deleted by the earlier item
        assert_eq!(failed[2]["error"], "not found");
    }

    #[test]
    fn test_apply_empty_batch() {
        let body = handle_apply(&json!({ "actions": [] }), &Config::default()).unwrap();
        assert_eq!(body, json!({ "moved": [], "deleted": [], "failed": [] }));
    }
}

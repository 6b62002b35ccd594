use serde_json::json;
use std::path::PathBuf;

use crate::backup;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;

fn backup_export(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let Some(workspace) = state.workspace.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let summary = backup::export_workspace_bundle(workspace, &out_path)
        .map_err(|e| HandlerErr::new("backup_export_failed", format!("{e:#}")))?;
    Ok(json!({
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
        "outPath": out_path.to_string_lossy()
    }))
}

/// Restores a bundle into the current workspace and reloads the in-memory
/// store from the restored snapshot.
fn backup_import(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let Some(workspace) = state.workspace.clone() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    let in_path = PathBuf::from(get_required_str(params, "inPath")?);
    let summary = backup::import_workspace_bundle(&in_path, &workspace)
        .map_err(|e| HandlerErr::new("backup_import_failed", format!("{e:#}")))?;
    let store = Store::open(&workspace, false)
        .map_err(|e| HandlerErr::new("store_open_failed", format!("{e:#}")))?;
    state.store = Some(store);
    Ok(json!({ "bundleFormatDetected": summary.bundle_format_detected }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(match backup_export(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(error) => error.response(&req.id),
        }),
        "backup.import" => Some(match backup_import(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(error) => error.response(&req.id),
        }),
        _ => None,
    }
}

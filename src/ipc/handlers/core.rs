use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens (or creates) a workspace and loads its snapshot. On a fresh
/// workspace, `seedDemoData: true` generates the demo dataset; otherwise
/// the store starts empty. An existing snapshot is loaded as-is.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = path else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    let seed_demo_data = req
        .params
        .get("seedDemoData")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    match Store::open(&path, seed_demo_data) {
        Ok(store) => {
            state.workspace = Some(path.clone());
            let initialized = store.data.initialized;
            state.store = Some(store);
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "initialized": initialized
                }),
            )
        }
        Err(e) => err(&req.id, "store_open_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}

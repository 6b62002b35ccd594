use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{require_store, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn users_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let store = require_store(state)?;
    Ok(json!({ "users": to_json(&store.data.users)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "users.list" => Some(match users_list(state) {
            Ok(result) => ok(&req.id, result),
            Err(error) => error.response(&req.id),
        }),
        _ => None,
    }
}

use crate::integrity;
use crate::ipc::error::ok;
use crate::ipc::helpers::{require_store, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};

fn check(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let store = require_store(state)?;
    to_json(&integrity::check(&store.data))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "integrity.check" => Some(match check(state) {
            Ok(result) => ok(&req.id, result),
            Err(error) => error.response(&req.id),
        }),
        _ => None,
    }
}

use serde_json::json;

use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_store, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Snapshot;

fn dashboard_kpis(data: &Snapshot) -> Result<serde_json::Value, HandlerErr> {
    to_json(&calc::dashboard_kpis(data))
}

fn mark_sheet(data: &Snapshot, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let semester = get_required_str(params, "semester")?;
    let sheet = calc::generate_mark_sheet(data, &student_id, &semester)?;
    Ok(json!({ "markSheet": to_json(&sheet)? }))
}

fn dispatch(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = require_store(state)?;
    match req.method.as_str() {
        "dashboard.kpis" => dashboard_kpis(&store.data),
        "reports.markSheet" => mark_sheet(&store.data, &req.params),
        _ => unreachable!("routed method"),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.kpis" | "reports.markSheet" => Some(match dispatch(state, req) {
            Ok(result) => ok(&req.id, result),
            Err(error) => error.response(&req.id),
        }),
        _ => None,
    }
}

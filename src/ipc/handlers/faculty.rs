use chrono::Utc;
use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_i64, get_required_str, persist, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::{Faculty, Role, Store, User};

fn faculty_list(store: &Store) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "faculty": to_json(&store.data.faculty)? }))
}

/// Creates the faculty row and its mirrored Faculty-role user under one
/// shared id: one greater than the max of all existing user and faculty ids.
fn faculty_add(store: &mut Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let email = get_required_str(params, "email")?;
    let department = get_required_str(params, "department")?;
    let title = get_required_str(params, "title")?;
    let office = get_required_str(params, "office")?;

    let id = store.data.next_account_id();
    let member = Faculty {
        id,
        name: name.clone(),
        email: email.clone(),
        department,
        title,
        office,
    };
    store.data.faculty.push(member.clone());
    store.data.users.push(User {
        id,
        name,
        email,
        role: Role::Faculty,
        last_login: Utc::now().to_rfc3339(),
        status: "Active".to_string(),
        student_id: None,
        faculty_id: Some(id),
    });
    persist(store)?;
    Ok(json!({ "faculty": to_json(&member)? }))
}

/// Deletes the faculty row and the mirrored user. Courses still naming the
/// instructor keep the dangling name; integrity.check reports those.
fn faculty_remove(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let faculty_id = get_required_i64(params, "facultyId")?;
    store.data.faculty.retain(|f| f.id != faculty_id);
    store.data.users.retain(|u| u.id != faculty_id);
    persist(store)?;
    Ok(json!({ "success": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = crate::ipc::helpers::require_store_mut(state)?;
    match req.method.as_str() {
        "faculty.list" => faculty_list(store),
        "faculty.add" => faculty_add(store, &req.params),
        "faculty.remove" => faculty_remove(store, &req.params),
        _ => unreachable!("routed method"),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "faculty.list" | "faculty.add" | "faculty.remove" => Some(match dispatch(state, req) {
            Ok(result) => ok(&req.id, result),
            Err(error) => error.response(&req.id),
        }),
        _ => None,
    }
}

use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_store, to_json, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Snapshot;
use serde_json::json;

fn students_list(data: &Snapshot) -> Result<serde_json::Value, HandlerErr> {
    let students: Vec<_> = data
        .students
        .iter()
        .map(|s| calc::student_view(data, s))
        .collect();
    Ok(json!({ "students": to_json(&students)? }))
}

fn students_by_course(
    data: &Snapshot,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    let students: Vec<_> = data
        .enrolled_students(&course_id)
        .iter()
        .filter_map(|id| data.student(id))
        .map(|s| calc::student_view(data, s))
        .collect();
    Ok(json!({ "students": to_json(&students)? }))
}

fn students_semesters(
    data: &Snapshot,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let semesters = calc::semesters_for_student(data, &student_id);
    Ok(json!({ "semesters": semesters }))
}

fn dispatch(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = require_store(state)?;
    match req.method.as_str() {
        "students.list" => students_list(&store.data),
        "students.byCourse" => students_by_course(&store.data, &req.params),
        "students.semesters" => students_semesters(&store.data, &req.params),
        _ => unreachable!("routed method"),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" | "students.byCourse" | "students.semesters" => {
            Some(match dispatch(state, req) {
                Ok(result) => ok(&req.id, result),
                Err(error) => error.response(&req.id),
            })
        }
        _ => None,
    }
}

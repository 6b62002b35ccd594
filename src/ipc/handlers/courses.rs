use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_required_i64, get_required_str, persist, require_store_mut, to_json, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{Course, Store};

fn courses_list(store: &Store) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "courses": to_json(&store.data.courses)? }))
}

fn courses_for_student(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let courses = store.data.courses_for_student(&student_id);
    Ok(json!({ "courses": to_json(&courses)? }))
}

fn courses_for_faculty(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let faculty_id = get_required_i64(params, "facultyId")?;
    let courses = store.data.courses_for_faculty(faculty_id);
    Ok(json!({ "courses": to_json(&courses)? }))
}

fn courses_by_department(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let department = get_required_str(params, "department")?;
    let courses: Vec<&Course> = store
        .data
        .courses
        .iter()
        .filter(|c| c.department == department)
        .collect();
    Ok(json!({ "courses": to_json(&courses)? }))
}

/// The uppercased course code is the id. Validation order: code collision
/// first, then instructor reference; nothing mutates until both pass.
fn courses_add(store: &mut Store, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let title = get_required_str(params, "title")?;
    let code = get_required_str(params, "code")?;
    let department = get_required_str(params, "department")?;
    let credits = get_required_i64(params, "credits")?;
    let instructor = get_required_str(params, "instructor")?;
    if credits <= 0 {
        return Err(HandlerErr::bad_params("credits must be positive"));
    }

    let id = code.to_uppercase();
    if store.data.course(&id).is_some() {
        return Err(HandlerErr::new("conflict", "course code exists"));
    }
    if store.data.faculty_by_name(&instructor).is_none() {
        return Err(HandlerErr::new(
            "invalid_reference",
            format!("instructor {} is not a known faculty member", instructor),
        ));
    }

    let course = Course {
        id: id.clone(),
        title,
        code,
        department,
        credits,
        instructor,
    };
    store.data.courses.push(course.clone());
    store.data.enrollments.insert(id.clone(), Vec::new());
    store.data.assessments.insert(id, Vec::new());
    persist(store)?;
    Ok(json!({ "course": to_json(&course)? }))
}

/// Cascades the enrollment and assessment lists; attendance rows are left
/// behind (reported by integrity.check, not repaired). Removing an unknown
/// course is a no-op, not an error.
fn courses_remove(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    store.data.courses.retain(|c| c.id != course_id);
    store.data.enrollments.remove(&course_id);
    store.data.assessments.remove(&course_id);
    persist(store)?;
    Ok(json!({ "success": true }))
}

fn courses_enroll(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    let student_id = get_required_str(params, "studentId")?;
    if store.data.course(&course_id).is_none() {
        return Err(HandlerErr::new("not_found", "course not found"));
    }
    if store.data.student(&student_id).is_none() {
        return Err(HandlerErr::new("not_found", "student not found"));
    }
    if store.data.is_enrolled(&course_id, &student_id) {
        return Ok(json!({ "success": true, "alreadyEnrolled": true }));
    }
    store
        .data
        .enrollments
        .entry(course_id)
        .or_default()
        .push(student_id);
    persist(store)?;
    Ok(json!({ "success": true, "alreadyEnrolled": false }))
}

fn dispatch(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = require_store_mut(state)?;
    match req.method.as_str() {
        "courses.list" => courses_list(store),
        "courses.forStudent" => courses_for_student(store, &req.params),
        "courses.forFaculty" => courses_for_faculty(store, &req.params),
        "courses.byDepartment" => courses_by_department(store, &req.params),
        "courses.add" => courses_add(store, &req.params),
        "courses.remove" => courses_remove(store, &req.params),
        "courses.enroll" => courses_enroll(store, &req.params),
        _ => unreachable!("routed method"),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" | "courses.forStudent" | "courses.forFaculty" | "courses.byDepartment"
        | "courses.add" | "courses.remove" | "courses.enroll" => Some(match dispatch(state, req) {
            Ok(result) => ok(&req.id, result),
            Err(error) => error.response(&req.id),
        }),
        _ => None,
    }
}

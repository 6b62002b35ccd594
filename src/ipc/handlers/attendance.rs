use chrono::NaiveDate;
use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_required_i64, get_required_str, persist, require_store_mut, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{AttendanceStatus, CourseAttendance, Store};

/// Per-student attended/held counts over everything recorded for a course.
fn attendance_summary(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    let empty = CourseAttendance::new();
    let by_student = store.data.attendance.get(&course_id).unwrap_or(&empty);

    let rows: Vec<serde_json::Value> = by_student
        .iter()
        .map(|(student_id, by_date)| {
            let attended = by_date
                .values()
                .filter(|s| s.counts_as_attended())
                .count();
            let name = store
                .data
                .student(student_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            json!({
                "studentId": student_id,
                "studentName": name,
                "attendedClasses": attended,
                "totalClassesHeld": by_date.len()
            })
        })
        .collect();
    Ok(json!({ "summary": rows }))
}

fn attendance_daily(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    let student_id = get_required_str(params, "studentId")?;
    let name = store
        .data
        .student(&student_id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let records: Vec<serde_json::Value> = store
        .data
        .attendance
        .get(&course_id)
        .and_then(|by_student| by_student.get(&student_id))
        .map(|by_date| {
            by_date
                .iter()
                .map(|(date, status)| {
                    json!({
                        "studentId": student_id,
                        "studentName": name,
                        "date": date,
                        "status": status.as_str()
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(json!({ "records": records }))
}

/// Course-wide view of one calendar month: student id -> date -> status.
fn attendance_month(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    let year = get_required_i64(params, "year")?;
    let month = get_required_i64(params, "month")?;
    if !(1..=12).contains(&month) {
        return Err(HandlerErr::bad_params("month must be between 1 and 12"));
    }
    let prefix = format!("{:04}-{:02}-", year, month);

    let mut rows = serde_json::Map::new();
    if let Some(by_student) = store.data.attendance.get(&course_id) {
        for (student_id, by_date) in by_student {
            let mut dates = serde_json::Map::new();
            for (date, status) in by_date.range(prefix.clone()..) {
                if !date.starts_with(&prefix) {
                    break;
                }
                dates.insert(date.clone(), json!(status.as_str()));
            }
            if !dates.is_empty() {
                rows.insert(student_id.clone(), serde_json::Value::Object(dates));
            }
        }
    }
    Ok(json!({ "attendance": rows }))
}

/// Upserts a single (course, student, date) cell. Course and student are
/// not validated against the tables; orphans show up in integrity.check.
fn attendance_set(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    let student_id = get_required_str(params, "studentId")?;
    let date = get_required_str(params, "date")?;
    let status_raw = get_required_str(params, "status")?;

    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err(HandlerErr::bad_params("date must be YYYY-MM-DD"));
    }
    let Some(status) = AttendanceStatus::parse(&status_raw) else {
        return Err(HandlerErr::bad_params(
            "status must be Present, Absent, Late, or Excused",
        ));
    };

    store
        .data
        .attendance
        .entry(course_id)
        .or_default()
        .entry(student_id)
        .or_default()
        .insert(date, status);
    persist(store)?;
    Ok(json!({ "success": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = require_store_mut(state)?;
    match req.method.as_str() {
        "attendance.summary" => attendance_summary(store, &req.params),
        "attendance.daily" => attendance_daily(store, &req.params),
        "attendance.month" => attendance_month(store, &req.params),
        "attendance.set" => attendance_set(store, &req.params),
        _ => unreachable!("routed method"),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.summary" | "attendance.daily" | "attendance.month" | "attendance.set" => {
            Some(match dispatch(state, req) {
                Ok(result) => ok(&req.id, result),
                Err(error) => error.response(&req.id),
            })
        }
        _ => None,
    }
}

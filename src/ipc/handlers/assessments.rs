use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    get_required_f64, get_required_i64, get_required_str, persist, require_store_mut, to_json,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{Assessment, ScoreRecord, Store, CURRENT_SEMESTER};

fn assessments_list(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    Ok(json!({ "assessments": to_json(&store.data.course_assessments(&course_id))? }))
}

/// New assessments take the next id across ALL courses' assessments, a
/// hardcoded current-semester label, and one ungraded score record per
/// currently enrolled student.
fn assessments_add(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let course_id = get_required_str(params, "courseId")?;
    let title = get_required_str(params, "title")?;
    let kind = get_required_str(params, "type")?;
    let max_score = get_required_f64(params, "maxScore")?;
    if max_score <= 0.0 {
        return Err(HandlerErr::bad_params("maxScore must be positive"));
    }

    let enrolled: Vec<String> = store.data.enrolled_students(&course_id).to_vec();
    if enrolled.is_empty() {
        return Err(HandlerErr::new(
            "invalid_state",
            "course has no enrolled students",
        ));
    }

    let id = store.data.next_assessment_id();
    let scores = enrolled
        .iter()
        .map(|student_id| ScoreRecord {
            student_id: student_id.clone(),
            student_name: store
                .data
                .student(student_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            score: None,
        })
        .collect();
    let assessment = Assessment {
        id,
        title,
        kind,
        max_score,
        semester: CURRENT_SEMESTER.to_string(),
        scores,
    };
    store
        .data
        .assessments
        .entry(course_id)
        .or_default()
        .push(assessment.clone());
    persist(store)?;
    Ok(json!({ "assessment": to_json(&assessment)? }))
}

/// Overwrites one score cell in place. Locating the assessment scans every
/// course's list since assessment ids are global. Re-applying the same
/// value is an observable no-op.
fn scores_update(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let assessment_id = get_required_i64(params, "assessmentId")?;
    let score = match params.get("score") {
        None => return Err(HandlerErr::bad_params("missing score")),
        Some(v) if v.is_null() => None,
        Some(v) => match v.as_f64() {
            Some(n) => Some(n),
            None => return Err(HandlerErr::bad_params("score must be a number or null")),
        },
    };

    let Some(assessment) = store.data.find_assessment_mut(assessment_id) else {
        return Err(HandlerErr::new("not_found", "assessment not found"));
    };
    let Some(record) = assessment
        .scores
        .iter_mut()
        .find(|r| r.student_id == student_id)
    else {
        return Err(HandlerErr::new(
            "not_found",
            "no score record for student on assessment",
        ));
    };
    record.score = score;
    persist(store)?;
    Ok(json!({ "success": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = require_store_mut(state)?;
    match req.method.as_str() {
        "assessments.list" => assessments_list(store, &req.params),
        "assessments.add" => assessments_add(store, &req.params),
        "scores.update" => scores_update(store, &req.params),
        _ => unreachable!("routed method"),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.list" | "assessments.add" | "scores.update" => {
            Some(match dispatch(state, req) {
                Ok(result) => ok(&req.id, result),
                Err(error) => error.response(&req.id),
            })
        }
        _ => None,
    }
}

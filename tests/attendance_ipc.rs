
use serde_json::json;
use test_support::*;

fn open_fixture(
    prefix: &str,
) -> (
    std::process::Child,
    std::process::ChildStdin,
    std::io::BufReader<std::process::ChildStdout>,
) {
    let ws = temp_dir(prefix);
    write_snapshot(&ws, &campus_fixture());
    let (child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "open",
        "workspace.select",
        json!({ "path": ws.to_string_lossy() }),
    );
    (child, stdin, reader)
}

#[test]
fn summary_counts_present_and_late_as_attended() {
    let (mut child, mut stdin, mut reader) = open_fixture("campusd-att-summary");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.summary",
        json!({ "courseId": "CS101" }),
    );
    let rows = result["summary"].as_array().expect("summary");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["studentId"], json!("CS-001"));
    assert_eq!(rows[0]["studentName"], json!("Ada Lovelace"));
    // Present + Late out of 4 recorded days.
    assert_eq!(rows[0]["attendedClasses"], json!(2));
    assert_eq!(rows[0]["totalClassesHeld"], json!(4));

    // No records at all: empty summary, not an error.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.summary",
        json!({ "courseId": "MATH205" }),
    );
    assert_eq!(result["summary"].as_array().map(|a| a.len()), Some(0));

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn daily_returns_dated_rows_in_order() {
    let (mut child, mut stdin, mut reader) = open_fixture("campusd-att-daily");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.daily",
        json!({ "courseId": "CS101", "studentId": "CS-001" }),
    );
    let records = result["records"].as_array().expect("records");
    let dates: Vec<&str> = records
        .iter()
        .map(|r| r["date"].as_str().expect("date"))
        .collect();
    assert_eq!(
        dates,
        vec!["2024-03-04", "2024-03-05", "2024-03-06", "2024-03-07"]
    );
    assert_eq!(records[1]["status"], json!("Excused"));

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.daily",
        json!({ "courseId": "CS101", "studentId": "CS-002" }),
    );
    assert_eq!(result["records"].as_array().map(|a| a.len()), Some(0));

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn month_view_filters_on_calendar_month() {
    let (mut child, mut stdin, mut reader) = open_fixture("campusd-att-month");

    // Add one April cell so the March filter has something to exclude.
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.set",
        json!({ "courseId": "CS101", "studentId": "CS-001",
                "date": "2024-04-01", "status": "Present" }),
    );

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.month",
        json!({ "courseId": "CS101", "year": 2024, "month": 3 }),
    );
    let dates = result["attendance"]["CS-001"]
        .as_object()
        .expect("dates for CS-001");
    assert_eq!(dates.len(), 4);
    assert!(dates.keys().all(|d| d.starts_with("2024-03-")));

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.month",
        json!({ "courseId": "CS101", "year": 2024, "month": 4 }),
    );
    assert_eq!(
        result["attendance"]["CS-001"],
        json!({ "2024-04-01": "Present" })
    );

    // A month with no records produces an empty map, not an error.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.month",
        json!({ "courseId": "CS101", "year": 2023, "month": 1 }),
    );
    assert_eq!(result["attendance"], json!({}));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.month",
        json!({ "courseId": "CS101", "year": 2024, "month": 13 }),
    );
    assert_eq!(code, "bad_params");

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn set_upserts_a_cell_and_validates_inputs() {
    let (mut child, mut stdin, mut reader) = open_fixture("campusd-att-set");

    // Overwrite an existing cell.
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.set",
        json!({ "courseId": "CS101", "studentId": "CS-001",
                "date": "2024-03-07", "status": "Present" }),
    );
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.summary",
        json!({ "courseId": "CS101" }),
    );
    assert_eq!(result["summary"][0]["attendedClasses"], json!(3));
    assert_eq!(result["summary"][0]["totalClassesHeld"], json!(4));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.set",
        json!({ "courseId": "CS101", "studentId": "CS-001",
                "date": "07/03/2024", "status": "Present" }),
    );
    assert_eq!(code, "bad_params");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.set",
        json!({ "courseId": "CS101", "studentId": "CS-001",
                "date": "2024-03-07", "status": "Sleeping" }),
    );
    assert_eq!(code, "bad_params");

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn set_does_not_validate_course_or_student_references() {
    let (mut child, mut stdin, mut reader) = open_fixture("campusd-att-orphan");

    // Deliberately permissive: the cell lands and integrity.check flags it.
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.set",
        json!({ "courseId": "GHOST1", "studentId": "ZZ-999",
                "date": "2024-03-07", "status": "Present" }),
    );
    let report = request_ok(&mut stdin, &mut reader, "2", "integrity.check", json!({}));
    let orphans = report["orphanAttendance"].as_array().expect("orphans");
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0]["courseId"], json!("GHOST1"));

    drop(stdin);
    child.wait().expect("child exit");
}

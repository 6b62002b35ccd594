
use serde_json::json;
use test_support::*;

#[test]
fn health_works_before_any_workspace() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(result
        .get("version")
        .and_then(|v| v.as_str())
        .is_some_and(|v| !v.is_empty()));
    assert!(result.get("workspacePath").is_some_and(|v| v.is_null()));

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn unknown_method_maps_to_not_implemented() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(&mut stdin, &mut reader, "1", "nope.nothing", json!({}));
    assert_eq!(code, "not_implemented");

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn data_methods_require_a_workspace() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    for (i, method) in [
        "students.list",
        "courses.list",
        "dashboard.kpis",
        "analytics.overview",
        "integrity.check",
    ]
    .iter()
    .enumerate()
    {
        let code = request_err(&mut stdin, &mut reader, &i.to_string(), method, json!({}));
        assert_eq!(code, "no_workspace", "method {}", method);
    }

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn workspace_select_requires_path() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(&mut stdin, &mut reader, "1", "workspace.select", json!({}));
    assert_eq!(code, "bad_params");

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn fresh_workspace_starts_empty_and_initialized() {
    let ws = temp_dir("campusd-smoke-fresh");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": ws.to_string_lossy() }),
    );
    assert_eq!(result.get("initialized"), Some(&json!(true)));
    assert!(ws.join("campus.json").is_file());

    let students = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    assert_eq!(students["students"].as_array().map(|a| a.len()), Some(0));
    let courses = request_ok(&mut stdin, &mut reader, "3", "courses.list", json!({}));
    assert_eq!(courses["courses"].as_array().map(|a| a.len()), Some(0));

    let health = request_ok(&mut stdin, &mut reader, "4", "health", json!({}));
    assert_eq!(
        health.get("workspacePath").and_then(|v| v.as_str()),
        Some(ws.to_string_lossy().as_ref())
    );

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn seeded_workspace_has_demo_data() {
    let ws = temp_dir("campusd-smoke-seeded");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": ws.to_string_lossy(), "seedDemoData": true }),
    );

    let students = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    assert_eq!(students["students"].as_array().map(|a| a.len()), Some(50));
    let faculty = request_ok(&mut stdin, &mut reader, "3", "faculty.list", json!({}));
    assert_eq!(faculty["faculty"].as_array().map(|a| a.len()), Some(7));
    let courses = request_ok(&mut stdin, &mut reader, "4", "courses.list", json!({}));
    assert_eq!(courses["courses"].as_array().map(|a| a.len()), Some(11));
    // Admin, one user per faculty member, one per student.
    let users = request_ok(&mut stdin, &mut reader, "5", "users.list", json!({}));
    assert_eq!(users["users"].as_array().map(|a| a.len()), Some(58));

    drop(stdin);
    child.wait().expect("child exit");
}


use serde_json::json;
use test_support::*;

#[test]
fn export_then_import_restores_the_snapshot() {
    let ws_src = temp_dir("campusd-backup-src");
    let ws_dst = temp_dir("campusd-backup-dst");
    let bundle = temp_dir("campusd-backup-out").join("campus-backup.zip");
    write_snapshot(&ws_src, &campus_fixture());

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": ws_src.to_string_lossy() }),
    );

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(result["bundleFormat"], json!("campus-workspace-v1"));
    assert_eq!(result["entryCount"], json!(3));
    assert!(bundle.is_file());

    // Import into a different, empty workspace.
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({ "path": ws_dst.to_string_lossy() }),
    );
    let result = request_ok(&mut stdin, &mut reader, "4", "students.list", json!({}));
    assert_eq!(result["students"].as_array().map(|a| a.len()), Some(0));

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "backup.import",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(result["bundleFormatDetected"], json!("campus-workspace-v1"));

    // The store reloads from the restored snapshot immediately.
    let result = request_ok(&mut stdin, &mut reader, "6", "students.list", json!({}));
    assert_eq!(result["students"].as_array().map(|a| a.len()), Some(2));
    let kpis = request_ok(&mut stdin, &mut reader, "7", "dashboard.kpis", json!({}));
    assert_eq!(kpis["totalCourses"], json!(3));

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn import_accepts_a_bare_snapshot_file() {
    let ws_src = temp_dir("campusd-backup-bare-src");
    let ws_dst = temp_dir("campusd-backup-bare-dst");
    write_snapshot(&ws_src, &campus_fixture());

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": ws_dst.to_string_lossy() }),
    );

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "backup.import",
        json!({ "inPath": ws_src.join("campus.json").to_string_lossy() }),
    );
    assert_eq!(result["bundleFormatDetected"], json!("bare-snapshot"));

    let result = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(result["students"].as_array().map(|a| a.len()), Some(2));

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn backup_methods_require_a_workspace() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "backup.export",
        json!({ "outPath": "/tmp/never-written.zip" }),
    );
    assert_eq!(code, "no_workspace");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "backup.import",
        json!({ "inPath": "/tmp/never-read.zip" }),
    );
    assert_eq!(code, "no_workspace");

    drop(stdin);
    child.wait().expect("child exit");
}

#[test]
fn export_without_a_snapshot_fails_cleanly() {
    let ws = temp_dir("campusd-backup-missing");
    let bundle = ws.join("out.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": ws.to_string_lossy() }),
    );
    // Deleting the snapshot behind the daemon's back models a half-cleaned
    // workspace directory.
    std::fs::remove_file(ws.join("campus.json")).expect("remove snapshot");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(code, "backup_export_failed");

    drop(stdin);
    child.wait().expect("child exit");
}

mod test_support;

use serde_json::json;
use test_support::{request, request_err, send_line, spawn_sidecar, teacher_auth, temp_dir};

const PROTECTED: &[&str] = &[
    "auth.me",
    "profiles.list",
    "students.list",
    "students.create",
    "students.update",
    "students.delete",
    "assessments.list",
    "assessments.open",
    "assessments.create",
    "assessments.update",
    "assessments.markComplete",
    "assessments.delete",
    "ratings.upsert",
    "ratings.delete",
    "observations.list",
    "observations.create",
    "observations.delete",
    "reports.assessmentSummary",
    "reports.learningTargets",
    "reports.iepGoal",
    "features.list",
    "features.create",
    "features.updateStatus",
    "features.updateNotes",
    "features.delete",
    "backup.export",
];

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let dir = temp_dir("drdp-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&dir.join("drdp.sqlite3"));

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}), None);
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["version"], json!(env!("CARGO_PKG_VERSION")));

    for (i, method) in ["taxonomy.types", "taxonomy.domains", "taxonomy.levels"]
        .iter()
        .enumerate()
    {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("t{}", i),
            method,
            json!({ "type": "kindergarten" }),
            None,
        );
        assert_eq!(resp["ok"], json!(true), "{} -> {}", method, resp);
    }

    // Every protected method is routed: with empty params it fails on
    // validation, lookup or role, never as an unknown method.
    let auth = teacher_auth();
    for (i, method) in PROTECTED.iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("p{}", i),
            method,
            json!({}),
            Some(&auth),
        );
        if resp["ok"] == json!(false) {
            let code = resp["error"]["code"].as_str().unwrap_or("");
            assert_ne!(code, "not_implemented", "{} not routed", method);
            assert_ne!(code, "unauthenticated", "{} rejected auth", method);
        }
    }

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn protected_methods_require_identity() {
    let dir = temp_dir("drdp-router-auth");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&dir.join("drdp.sqlite3"));

    for (i, method) in PROTECTED.iter().enumerate() {
        let code = request_err(
            &mut stdin,
            &mut reader,
            &format!("u{}", i),
            method,
            json!({}),
            None,
        );
        assert_eq!(code, "unauthenticated", "{}", method);
    }

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unknown_methods_and_bad_json_are_reported() {
    let dir = temp_dir("drdp-router-unknown");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&dir.join("drdp.sqlite3"));

    let code = request_err(&mut stdin, &mut reader, "1", "classes.list", json!({}), None);
    assert_eq!(code, "not_implemented");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "classes.list",
        json!({}),
        Some(&teacher_auth()),
    );
    assert_eq!(code, "not_implemented");

    let resp = send_line(&mut stdin, &mut reader, "{not json");
    assert_eq!(resp["ok"], json!(false));
    assert_eq!(resp["error"]["code"], json!("bad_json"));

    // The loop keeps serving after a malformed line.
    let health = request(&mut stdin, &mut reader, "3", "health", json!({}), None);
    assert_eq!(health["ok"], json!(true));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}

#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub const ISSUER: &str = "https://drdp-test.us.auth0.com/";
pub const CLIENT_ID: &str = "drdp-test-client";

pub type Sidecar = (Child, ChildStdin, BufReader<ChildStdout>);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn sidecar_command(db_path: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_drdpd"));
    cmd.env("DRDP_DATABASE_PATH", db_path)
        .env("DRDP_IDENTITY_ISSUER", ISSUER)
        .env("DRDP_IDENTITY_CLIENT_ID", CLIENT_ID)
        .env_remove("DRDP_ROLES_CLAIM")
        .env_remove("DRDP_LOG");
    cmd
}

pub fn spawn_sidecar(db_path: &Path) -> Sidecar {
    let mut child = sidecar_command(db_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn drdpd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn teacher_auth() -> serde_json::Value {
    json!({
        "sub": "auth0|teacher-1",
        "email": "teacher@example.org",
        "name": "Terry Teacher",
        "iss": ISSUER,
        "aud": CLIENT_ID,
    })
}

pub fn admin_auth() -> serde_json::Value {
    json!({
        "sub": "auth0|admin-1",
        "email": "admin@example.org",
        "name": "Ada Admin",
        "iss": ISSUER,
        "aud": [CLIENT_ID, "https://drdp.app/api"],
        "https://drdp.app/roles": ["admin"],
    })
}

pub fn send_line(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, line: &str) -> serde_json::Value {
    writeln!(stdin, "{}", line).expect("write request");
    stdin.flush().expect("flush request");

    let mut resp = String::new();
    reader.read_line(&mut resp).expect("read response line");
    assert!(!resp.trim().is_empty(), "empty response for {}", line);
    serde_json::from_str(resp.trim()).expect("parse response json")
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    auth: Option<&serde_json::Value>,
) -> serde_json::Value {
    let mut payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    if let Some(a) = auth {
        payload["auth"] = a.clone();
    }
    let value = send_line(stdin, reader, &payload.to_string());
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

/// Calls `method` as the default teacher and returns `result`.
pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    request_ok_as(stdin, reader, id, method, params, &teacher_auth())
}

pub fn request_ok_as(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    auth: &serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params, Some(auth));
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Returns the error code of a failed response.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    auth: Option<&serde_json::Value>,
) -> String {
    let value = request(stdin, reader, id, method, params, auth);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
        .to_string()
}

pub fn str_field(v: &serde_json::Value, key: &str) -> String {
    v.get(key)
        .and_then(|x| x.as_str())
        .unwrap_or_else(|| panic!("missing {} in {}", key, v))
        .to_string()
}

pub fn create_student(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    first_name: &str,
    last_name: &str,
    grade: &str,
) -> String {
    let res = request_ok(
        stdin,
        reader,
        id,
        "students.create",
        json!({ "firstName": first_name, "lastName": last_name, "grade": grade }),
    );
    str_field(&res, "studentId")
}

pub fn create_assessment(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    student_id: &str,
    date: &str,
    period: &str,
) -> String {
    let res = request_ok(
        stdin,
        reader,
        id,
        "assessments.create",
        json!({ "studentId": student_id, "assessmentDate": date, "period": period }),
    );
    str_field(&res, "assessmentId")
}

pub fn upsert_rating(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    assessment_id: &str,
    measure_id: &str,
    level_id: &str,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        id,
        "ratings.upsert",
        json!({ "assessmentId": assessment_id, "measureId": measure_id, "levelId": level_id }),
    )
}

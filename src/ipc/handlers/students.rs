use crate::auth::AuthContext;
use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_str, patch_nullable_str, patch_object, patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::students::{self, NewStudent, StudentPatch};
use serde_json::json;

pub const METHODS: &[&str] = &[
    "students.list",
    "students.create",
    "students.update",
    "students.delete",
];

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match students::list(&state.db) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let first_name = match required_str(req, "firstName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let last_name = match required_str(req, "lastName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let grade = match required_str(req, "grade") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let class_name = match optional_str(req, "className") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let new = NewStudent {
        first_name,
        last_name,
        grade,
        class_name,
    };
    match students::create(&state.db, &new) {
        Ok(student) => ok(
            &req.id,
            json!({ "studentId": student.id, "student": student }),
        ),
        Err(e) => app_err(&req.id, &e),
    }
}

fn parse_patch(req: &Request) -> Result<StudentPatch, serde_json::Value> {
    let patch = patch_object(req, &["firstName", "lastName", "grade", "className"])?;
    Ok(StudentPatch {
        first_name: patch_str(req, patch, "firstName")?,
        last_name: patch_str(req, patch, "lastName")?,
        grade: patch_str(req, patch, "grade")?,
        class_name: patch_nullable_str(req, patch, "className")?,
    })
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch = match parse_patch(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match students::update(&state.db, &student_id, &patch) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match students::delete(&state.db, &student_id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => app_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, _ctx: &AuthContext, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.create" => Some(handle_create(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}

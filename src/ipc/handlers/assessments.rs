use crate::assessments::{self, AssessmentPatch, NewAssessment};
use crate::auth::AuthContext;
use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_str, patch_nullable_str, patch_object, patch_str, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub const METHODS: &[&str] = &[
    "assessments.list",
    "assessments.open",
    "assessments.create",
    "assessments.update",
    "assessments.markComplete",
    "assessments.delete",
];

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match optional_str(req, "studentId") {
        Ok(v) => v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        Err(e) => return e,
    };
    match assessments::list(&state.db, student_id.as_deref()) {
        Ok(items) => ok(&req.id, json!({ "assessments": items })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assessment_id = match required_str(req, "assessmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match assessments::open(&state.db, &assessment_id) {
        Ok(detail) => ok(&req.id, json!({ "assessment": detail })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn parse_new(req: &Request) -> Result<NewAssessment, serde_json::Value> {
    Ok(NewAssessment {
        student_id: required_str(req, "studentId")?,
        assessment_date: optional_str(req, "assessmentDate")?,
        period: required_str(req, "period")?,
        notes: optional_str(req, "notes")?,
        assessment_type: optional_str(req, "assessmentType")?,
    })
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match assessments::create(&state.db, &new) {
        Ok(assessment) => ok(
            &req.id,
            json!({ "assessmentId": assessment.id, "assessment": assessment }),
        ),
        Err(e) => app_err(&req.id, &e),
    }
}

fn parse_patch(req: &Request) -> Result<AssessmentPatch, serde_json::Value> {
    let patch = patch_object(req, &["assessmentDate", "period", "notes", "status"])?;
    Ok(AssessmentPatch {
        assessment_date: patch_str(req, patch, "assessmentDate")?,
        period: patch_str(req, patch, "period")?,
        notes: patch_nullable_str(req, patch, "notes")?,
        status: patch_str(req, patch, "status")?,
    })
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assessment_id = match required_str(req, "assessmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch = match parse_patch(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match assessments::update(&state.db, &assessment_id, &patch) {
        Ok(assessment) => ok(&req.id, json!({ "assessment": assessment })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_mark_complete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assessment_id = match required_str(req, "assessmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match assessments::mark_complete(&state.db, &assessment_id) {
        Ok(assessment) => ok(&req.id, json!({ "assessment": assessment })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assessment_id = match required_str(req, "assessmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match assessments::delete(&state.db, &assessment_id) {
        Ok(summary) => {
            tracing::info!(
                assessment_id = %assessment_id,
                ratings = summary.ratings_deleted,
                observations = summary.observations_deleted,
                "assessment deleted"
            );
            ok(&req.id, json!({ "ok": true, "deleted": summary }))
        }
        Err(e) => app_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, _ctx: &AuthContext, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.list" => Some(handle_list(state, req)),
        "assessments.open" => Some(handle_open(state, req)),
        "assessments.create" => Some(handle_create(state, req)),
        "assessments.update" => Some(handle_update(state, req)),
        "assessments.markComplete" => Some(handle_mark_complete(state, req)),
        "assessments.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}

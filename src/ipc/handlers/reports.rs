//! Report endpoints: load the assessment read model, then hand it to the
//! pure builders in `crate::reports`.

use crate::assessments::{self, AssessmentDetail};
use crate::auth::AuthContext;
use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::reports;
use serde_json::json;

pub const METHODS: &[&str] = &[
    "reports.assessmentSummary",
    "reports.learningTargets",
    "reports.iepGoal",
];

fn load_detail(state: &AppState, req: &Request) -> Result<AssessmentDetail, serde_json::Value> {
    let assessment_id = required_str(req, "assessmentId")?;
    assessments::open(&state.db, &assessment_id).map_err(|e| app_err(&req.id, &e))
}

fn timeframe(req: &Request, detail: &AssessmentDetail) -> Result<String, serde_json::Value> {
    Ok(optional_str(req, "timeframe")?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| reports::default_timeframe(detail)))
}

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let detail = match load_detail(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let summary = reports::summarize(&detail);
    ok(
        &req.id,
        json!({
            "student": detail.student,
            "summary": summary,
        }),
    )
}

fn handle_learning_targets(state: &mut AppState, req: &Request) -> serde_json::Value {
    let detail = match load_detail(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let timeframe = match timeframe(req, &detail) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let targets = reports::learning_targets(&detail, &timeframe);
    ok(
        &req.id,
        json!({
            "assessmentId": detail.assessment.id,
            "timeframe": timeframe,
            "targets": targets,
        }),
    )
}

fn handle_iep_goal(state: &mut AppState, req: &Request) -> serde_json::Value {
    let detail = match load_detail(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let timeframe = match timeframe(req, &detail) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let goal = reports::iep_goal(&detail, &timeframe);
    ok(
        &req.id,
        json!({
            "assessmentId": detail.assessment.id,
            "timeframe": timeframe,
            "goal": goal,
        }),
    )
}

pub fn try_handle(state: &mut AppState, _ctx: &AuthContext, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.assessmentSummary" => Some(handle_summary(state, req)),
        "reports.learningTargets" => Some(handle_learning_targets(state, req)),
        "reports.iepGoal" => Some(handle_iep_goal(state, req)),
        _ => None,
    }
}

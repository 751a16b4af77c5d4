use crate::auth::AuthContext;
use crate::features::{self, NewFeature};
use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub const METHODS: &[&str] = &[
    "features.list",
    "features.create",
    "features.updateStatus",
    "features.updateNotes",
    "features.delete",
];

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match features::list(&state.db) {
        Ok(features) => ok(&req.id, json!({ "features": features })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn parse_new(req: &Request) -> Result<NewFeature, serde_json::Value> {
    Ok(NewFeature {
        title: required_str(req, "title")?,
        description: optional_str(req, "description")?,
        status: optional_str(req, "status")?,
        notes: optional_str(req, "notes")?,
    })
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match features::create(&state.db, &new) {
        Ok(feature) => ok(
            &req.id,
            json!({ "featureId": feature.id, "feature": feature }),
        ),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_update_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let feature_id = match required_str(req, "featureId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let raw = match required_str(req, "status") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let status = match features::parse_status(&raw) {
        Ok(v) => v,
        Err(e) => return app_err(&req.id, &e),
    };
    match features::update_status(&state.db, &feature_id, status) {
        Ok(feature) => ok(&req.id, json!({ "feature": feature })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_update_notes(state: &mut AppState, req: &Request) -> serde_json::Value {
    let feature_id = match required_str(req, "featureId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    // Empty notes clear the field.
    let notes = match optional_str(req, "notes") {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    match features::update_notes(&state.db, &feature_id, &notes) {
        Ok(feature) => ok(&req.id, json!({ "feature": feature })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let feature_id = match required_str(req, "featureId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match features::delete(&state.db, &feature_id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => app_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, ctx: &AuthContext, req: &Request) -> Option<serde_json::Value> {
    if !METHODS.contains(&req.method.as_str()) {
        return None;
    }
    if let Err(e) = ctx.require_admin() {
        return Some(app_err(&req.id, &e));
    }
    match req.method.as_str() {
        "features.list" => Some(handle_list(state, req)),
        "features.create" => Some(handle_create(state, req)),
        "features.updateStatus" => Some(handle_update_status(state, req)),
        "features.updateNotes" => Some(handle_update_notes(state, req)),
        "features.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}

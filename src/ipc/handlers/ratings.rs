use crate::auth::AuthContext;
use crate::ipc::error::{app_err, ok};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::ratings::{self, RatingInput};
use serde_json::json;

pub const METHODS: &[&str] = &[
    "ratings.upsert",
    "ratings.delete",
    "observations.list",
    "observations.create",
    "observations.delete",
];

fn parse_input(req: &Request) -> Result<RatingInput, serde_json::Value> {
    Ok(RatingInput {
        assessment_id: required_str(req, "assessmentId")?,
        measure_id: required_str(req, "measureId")?,
        level_id: required_str(req, "levelId")?,
        notes: optional_str(req, "notes")?,
    })
}

/// Single attempt; a failed upsert is reported, never retried.
fn handle_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let input = match parse_input(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match ratings::upsert(&state.db, &input) {
        Ok(rating) => ok(
            &req.id,
            json!({ "ratingId": rating.id, "rating": rating }),
        ),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rating_id = match required_str(req, "ratingId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match ratings::delete(&state.db, &rating_id) {
        Ok(observations_deleted) => ok(
            &req.id,
            json!({ "ok": true, "observationsDeleted": observations_deleted }),
        ),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_observations_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rating_id = match required_str(req, "ratingId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match ratings::list_observations(&state.db, &rating_id) {
        Ok(observations) => ok(&req.id, json!({ "observations": observations })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_observations_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rating_id = match required_str(req, "ratingId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let observation_date = match optional_str(req, "observationDate") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let text = match optional_str(req, "text") {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    match ratings::add_observation(&state.db, &rating_id, observation_date.as_deref(), &text) {
        Ok(observation) => ok(
            &req.id,
            json!({ "observationId": observation.id, "observation": observation }),
        ),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_observations_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let observation_id = match required_str(req, "observationId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match ratings::delete_observation(&state.db, &observation_id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => app_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, _ctx: &AuthContext, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "ratings.upsert" => Some(handle_upsert(state, req)),
        "ratings.delete" => Some(handle_delete(state, req)),
        "observations.list" => Some(handle_observations_list(state, req)),
        "observations.create" => Some(handle_observations_create(state, req)),
        "observations.delete" => Some(handle_observations_delete(state, req)),
        _ => None,
    }
}

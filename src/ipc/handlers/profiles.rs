use crate::auth::{self, AuthContext};
use crate::ipc::error::{app_err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub const METHODS: &[&str] = &["auth.me", "profiles.list"];

fn handle_me(state: &mut AppState, ctx: &AuthContext, req: &Request) -> serde_json::Value {
    match auth::get_profile(&state.db, &ctx.subject) {
        Ok(profile) => ok(&req.id, json!({ "profile": profile })),
        Err(e) => app_err(&req.id, &e),
    }
}

fn handle_list(state: &mut AppState, ctx: &AuthContext, req: &Request) -> serde_json::Value {
    if let Err(e) = ctx.require_admin() {
        return app_err(&req.id, &e);
    }
    match auth::list_profiles(&state.db) {
        Ok(profiles) => ok(&req.id, json!({ "profiles": profiles })),
        Err(e) => app_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, ctx: &AuthContext, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.me" => Some(handle_me(state, ctx, req)),
        "profiles.list" => Some(handle_list(state, ctx, req)),
        _ => None,
    }
}

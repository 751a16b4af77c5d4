use super::handlers;
use super::types::{AppState, Request};
use crate::auth;
use crate::ipc::error::{app_err, err};

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    tracing::debug!(request_id = %req.id, method = %req.method, "dispatch");

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::taxonomy::try_handle(&req) {
        return resp;
    }

    if !handlers::is_protected(&req.method) {
        return err(
            &req.id,
            "not_implemented",
            format!("unknown method: {}", req.method),
            None,
        );
    }

    let ctx = match auth::authenticate(req.auth.as_ref(), &state.config.identity) {
        Ok(v) => v,
        Err(e) => return app_err(&req.id, &e),
    };
    if let Err(e) = auth::sync_profile(&state.db, &ctx) {
        return app_err(&req.id, &e);
    }

    if let Some(resp) = handlers::profiles::try_handle(state, &ctx, &req) {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, &ctx, &req) {
        return resp;
    }
    if let Some(resp) = handlers::assessments::try_handle(state, &ctx, &req) {
        return resp;
    }
    if let Some(resp) = handlers::ratings::try_handle(state, &ctx, &req) {
        return resp;
    }
    if let Some(resp) = handlers::reports::try_handle(state, &ctx, &req) {
        return resp;
    }
    if let Some(resp) = handlers::features::try_handle(state, &ctx, &req) {
        return resp;
    }
    if let Some(resp) = handlers::backup::try_handle(state, &ctx, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}

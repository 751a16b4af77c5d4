use crate::auth::AuthContext;
use crate::backup;
use crate::ipc::error::{app_err, err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

pub const METHODS: &[&str] = &["backup.export"];

fn handle_export(state: &mut AppState, ctx: &AuthContext, req: &Request) -> serde_json::Value {
    if let Err(e) = ctx.require_admin() {
        return app_err(&req.id, &e);
    }
    let out_path = match required_str(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    match backup::export_bundle(&state.db, &out_path) {
        Ok(summary) => {
            tracing::info!(
                path = %out_path.display(),
                bytes = summary.db_bytes,
                "backup exported"
            );
            ok(
                &req.id,
                json!({
                    "ok": true,
                    "outPath": out_path.to_string_lossy(),
                    "bundleFormat": summary.bundle_format,
                    "dbSha256": summary.db_sha256,
                    "dbBytes": summary.db_bytes,
                }),
            )
        }
        Err(e) => {
            tracing::warn!(path = %out_path.display(), "backup export failed: {:#}", e);
            err(&req.id, "io_failed", format!("{:#}", e), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, ctx: &AuthContext, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_export(state, ctx, req)),
        _ => None,
    }
}

use serde_json::{Map, Value};

use crate::ipc::error::err;
use crate::ipc::types::Request;

pub fn required_str(req: &Request, key: &str) -> Result<String, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Absent and `null` both read as `None`; any other non-string is rejected.
pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, Value> {
    match req.params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{} must be a string", key),
            None,
        )),
    }
}

/// `params.patch` as an object whose keys are all in `allowed`.
pub fn patch_object<'a>(req: &'a Request, allowed: &[&str]) -> Result<&'a Map<String, Value>, Value> {
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return Err(err(&req.id, "bad_params", "missing patch", None));
    };
    if let Some(unknown) = patch.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(err(
            &req.id,
            "bad_params",
            format!("unknown patch field: {}", unknown),
            Some(serde_json::json!({ "allowed": allowed })),
        ));
    }
    Ok(patch)
}

/// A patch field that must be a string when present.
pub fn patch_str(req: &Request, patch: &Map<String, Value>, key: &str) -> Result<Option<String>, Value> {
    match patch.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("patch.{} must be a string", key),
            None,
        )),
    }
}

/// A clearable patch field: `null` maps to `Some(None)`.
pub fn patch_nullable_str(
    req: &Request,
    patch: &Map<String, Value>,
    key: &str,
) -> Result<Option<Option<String>>, Value> {
    match patch.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("patch.{} must be a string or null", key),
            None,
        )),
    }
}

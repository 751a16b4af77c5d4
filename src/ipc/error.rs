use serde_json::{Map, Value};

use crate::error::AppError;

/// Every reply carries the request id and `ok`; exactly one of `result` or
/// `error` follows.
fn envelope(id: &str, outcome: Result<Value, Value>) -> Value {
    let mut body = Map::new();
    body.insert("id".into(), Value::from(id));
    match outcome {
        Ok(result) => {
            body.insert("ok".into(), Value::Bool(true));
            body.insert("result".into(), result);
        }
        Err(error) => {
            body.insert("ok".into(), Value::Bool(false));
            body.insert("error".into(), error);
        }
    }
    Value::Object(body)
}

pub fn ok(id: &str, result: Value) -> Value {
    envelope(id, Ok(result))
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    let mut error = Map::new();
    error.insert("code".into(), Value::from(code));
    error.insert("message".into(), Value::String(message.into()));
    if let Some(d) = details {
        error.insert("details".into(), d);
    }
    envelope(id, Err(Value::Object(error)))
}

pub fn app_err(id: &str, e: &AppError) -> Value {
    match e {
        AppError::Storage(_) | AppError::Collaborator(_) => {
            tracing::warn!(request_id = id, code = e.code(), "request failed: {}", e);
        }
        _ => {
            tracing::debug!(request_id = id, code = e.code(), "request rejected: {}", e);
        }
    }
    err(id, e.code(), e.to_string(), None)
}

use rusqlite::Connection;
use serde::Deserialize;

use crate::config::Config;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    /// Identity claims forwarded by the host; absent for anonymous callers.
    #[serde(default)]
    pub auth: Option<serde_json::Value>,
}

pub struct AppState {
    pub db: Connection,
    pub config: Config,
}

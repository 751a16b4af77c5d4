//! Identity claims forwarded by the host, role resolution and the cached
//! profile rows derived from them.

use crate::config::IdentityConfig;
use crate::db;
use crate::error::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who is making the current request. Built once per request and handed to
/// every handler.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
}

impl AuthContext {
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin role required".into()))
        }
    }
}

/// Fallback order: explicit `role` claim, then the namespaced roles array,
/// then teacher.
pub fn resolve_role(claims: &Claims, roles_claim: &str) -> Role {
    if let Some(explicit) = claims.role.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return if explicit.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Teacher
        };
    }
    let has_admin = claims
        .extra
        .get(roles_claim)
        .and_then(|v| v.as_array())
        .map(|roles| {
            roles
                .iter()
                .filter_map(|r| r.as_str())
                .any(|r| r.trim().eq_ignore_ascii_case("admin"))
        })
        .unwrap_or(false);
    if has_admin {
        Role::Admin
    } else {
        Role::Teacher
    }
}

fn same_issuer(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}

fn audience_matches(aud: &Value, client_id: &str) -> bool {
    match aud {
        Value::String(s) => s == client_id,
        Value::Array(items) => items.iter().any(|v| v.as_str() == Some(client_id)),
        _ => false,
    }
}

pub fn authenticate(raw: Option<&Value>, identity: &IdentityConfig) -> AppResult<AuthContext> {
    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        return Err(AppError::Unauthenticated("sign in required".into()));
    };
    let claims: Claims = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::Unauthenticated(format!("malformed identity claims: {}", e)))?;
    if claims.sub.trim().is_empty() {
        return Err(AppError::Unauthenticated("identity claims missing sub".into()));
    }
    if let Some(iss) = claims.iss.as_deref() {
        if !same_issuer(iss, &identity.issuer) {
            return Err(AppError::Unauthenticated(format!(
                "claims issued by unexpected issuer: {}",
                iss
            )));
        }
    }
    if let Some(aud) = claims.aud.as_ref() {
        if !audience_matches(aud, &identity.client_id) {
            return Err(AppError::Unauthenticated(
                "claims issued for a different client".into(),
            ));
        }
    }

    let role = resolve_role(&claims, &identity.roles_claim);
    Ok(AuthContext {
        subject: claims.sub.trim().to_string(),
        email: claims.email.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        name: claims.name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        role,
    })
}

/// Refresh the cached profile row from the current claims.
pub fn sync_profile(conn: &Connection, ctx: &AuthContext) -> AppResult<()> {
    let ts = db::now_ts();
    conn.execute(
        "INSERT INTO profiles(id, email, name, role, created_at, updated_at)
         VALUES(?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(id) DO UPDATE SET
           email = excluded.email,
           name = excluded.name,
           role = excluded.role,
           updated_at = excluded.updated_at",
        params![ctx.subject, ctx.email, ctx.name, ctx.role.as_str(), ts],
    )?;
    Ok(())
}

fn profile_json(row: &rusqlite::Row<'_>) -> rusqlite::Result<Value> {
    Ok(json!({
        "id": row.get::<_, String>(0)?,
        "email": row.get::<_, Option<String>>(1)?,
        "name": row.get::<_, Option<String>>(2)?,
        "role": row.get::<_, String>(3)?,
        "createdAt": row.get::<_, String>(4)?,
        "updatedAt": row.get::<_, String>(5)?,
    }))
}

pub fn get_profile(conn: &Connection, id: &str) -> AppResult<Value> {
    conn.query_row(
        "SELECT id, email, name, role, created_at, updated_at FROM profiles WHERE id = ?",
        [id],
        profile_json,
    )
    .optional()?
    .ok_or_else(|| AppError::not_found("profile"))
}

pub fn list_profiles(conn: &Connection) -> AppResult<Vec<Value>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, name, role, created_at, updated_at
         FROM profiles
         ORDER BY COALESCE(name, email, id)",
    )?;
    let rows = stmt
        .query_map([], profile_json)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

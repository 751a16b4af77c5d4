//! Admin checklist of product features and their implementation status.
//! Unrelated to assessment data.

use crate::db;
use crate::error::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    Yes,
    No,
    Planned,
}

impl FeatureStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "planned" => Some(Self::Planned),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Planned => "planned",
        }
    }
}

pub fn parse_status(raw: &str) -> AppResult<FeatureStatus> {
    FeatureStatus::parse(raw)
        .ok_or_else(|| AppError::validation("status must be one of: yes, no, planned"))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: FeatureStatus,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewFeature {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

fn feature_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Feature> {
    let raw_status: String = row.get(3)?;
    let status = FeatureStatus::parse(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unrecognized feature status: {}", raw_status).into(),
        )
    })?;
    Ok(Feature {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        notes: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, status, notes, created_at, updated_at FROM features";

pub fn list(conn: &Connection) -> AppResult<Vec<Feature>> {
    let sql = format!("{} ORDER BY created_at, rowid", SELECT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], feature_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, feature_id: &str) -> AppResult<Feature> {
    let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
    conn.query_row(&sql, [feature_id], feature_from_row)
        .optional()?
        .ok_or_else(|| AppError::not_found("feature"))
}

pub fn create(conn: &Connection, new: &NewFeature) -> AppResult<Feature> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title must not be empty"));
    }
    let status = match new.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => FeatureStatus::No,
    };
    let id = db::new_id();
    conn.execute(
        "INSERT INTO features(id, title, description, status, notes, created_at, updated_at)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            id,
            title,
            new.description.as_deref().map(str::trim).unwrap_or(""),
            status.as_str(),
            new.notes.as_deref().map(str::trim).unwrap_or(""),
            db::now_ts()
        ],
    )?;
    get(conn, &id)
}

fn touch(conn: &Connection, feature_id: &str, column: &str, value: &str) -> AppResult<Feature> {
    let sql = format!(
        "UPDATE features SET {} = ?1, updated_at = ?2 WHERE id = ?3",
        column
    );
    let n = conn.execute(&sql, params![value, db::now_ts(), feature_id])?;
    if n == 0 {
        return Err(AppError::not_found("feature"));
    }
    get(conn, feature_id)
}

pub fn update_status(conn: &Connection, feature_id: &str, status: FeatureStatus) -> AppResult<Feature> {
    touch(conn, feature_id, "status", status.as_str())
}

pub fn update_notes(conn: &Connection, feature_id: &str, notes: &str) -> AppResult<Feature> {
    touch(conn, feature_id, "notes", notes.trim())
}

pub fn delete(conn: &Connection, feature_id: &str) -> AppResult<()> {
    let n = conn.execute("DELETE FROM features WHERE id = ?", [feature_id])?;
    if n == 0 {
        return Err(AppError::not_found("feature"));
    }
    Ok(())
}

//! Per-measure ratings and their timestamped observations.
//!
//! A rating is unique per (assessment, measure). The uniqueness lives in the
//! schema and the write is a single `INSERT ... ON CONFLICT DO UPDATE`, so
//! concurrent submissions converge to one row (last write wins).

use crate::assessments::{self, parse_date};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::taxonomy::{self, AssessmentType};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: String,
    pub rating_id: String,
    pub observation_date: String,
    pub observation_text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub assessment_id: String,
    pub measure_id: String,
    pub measure_name: String,
    pub domain_id: String,
    pub developmental_level_id: String,
    pub level_name: String,
    pub level_ordinal: u8,
    pub observation_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Newest `observation_date` first.
    pub observations: Vec<Observation>,
}

#[derive(Debug, Clone)]
pub struct RatingInput {
    pub assessment_id: String,
    pub measure_id: String,
    pub level_id: String,
    pub notes: Option<String>,
}

struct RatingRow {
    id: String,
    assessment_id: String,
    measure_id: String,
    level_id: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
    assessment_type: String,
}

const SELECT_RATINGS: &str = "SELECT
       r.id, r.assessment_id, r.measure_id, r.developmental_level_id, r.observation_notes,
       r.created_at, r.updated_at, a.assessment_type
     FROM ratings r
     JOIN assessments a ON a.id = r.assessment_id";

fn rating_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RatingRow> {
    Ok(RatingRow {
        id: row.get(0)?,
        assessment_id: row.get(1)?,
        measure_id: row.get(2)?,
        level_id: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        assessment_type: row.get(7)?,
    })
}

fn observation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Observation> {
    Ok(Observation {
        id: row.get(0)?,
        rating_id: row.get(1)?,
        observation_date: row.get(2)?,
        observation_text: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn load_observations(conn: &Connection, rating_id: &str) -> AppResult<Vec<Observation>> {
    let mut stmt = conn.prepare(
        "SELECT id, rating_id, observation_date, observation_text, created_at
         FROM observations
         WHERE rating_id = ?
         ORDER BY observation_date DESC, created_at DESC, rowid DESC",
    )?;
    let rows = stmt
        .query_map([rating_id], observation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn hydrate(conn: &Connection, row: RatingRow) -> AppResult<Rating> {
    let kind = AssessmentType::parse(&row.assessment_type).ok_or_else(|| {
        AppError::Collaborator(format!(
            "unrecognized assessment type in storage: {}",
            row.assessment_type
        ))
    })?;
    let (domain, measure) = taxonomy::find_measure(kind, &row.measure_id).ok_or_else(|| {
        AppError::Collaborator(format!("rating references unknown measure {}", row.measure_id))
    })?;
    let level = taxonomy::find_level(kind, &row.level_id).ok_or_else(|| {
        AppError::Collaborator(format!("rating references unknown level {}", row.level_id))
    })?;
    let observations = load_observations(conn, &row.id)?;
    Ok(Rating {
        id: row.id,
        assessment_id: row.assessment_id,
        measure_id: measure.code.to_string(),
        measure_name: measure.name.to_string(),
        domain_id: domain.id.to_string(),
        developmental_level_id: level.id.to_string(),
        level_name: level.name.to_string(),
        level_ordinal: level.ordinal,
        observation_notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
        observations,
    })
}

pub fn get(conn: &Connection, rating_id: &str) -> AppResult<Rating> {
    let sql = format!("{} WHERE r.id = ?", SELECT_RATINGS);
    let row = conn
        .query_row(&sql, [rating_id], rating_row)
        .optional()?
        .ok_or_else(|| AppError::not_found("rating"))?;
    hydrate(conn, row)
}

/// Ratings of one assessment in the taxonomy's reference order.
pub fn list_for_assessment(
    conn: &Connection,
    assessment_id: &str,
    kind: AssessmentType,
) -> AppResult<Vec<Rating>> {
    let sql = format!("{} WHERE r.assessment_id = ?", SELECT_RATINGS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([assessment_id], rating_row)?
        .collect::<Result<Vec<_>, _>>()?;
    let mut ratings = rows
        .into_iter()
        .map(|r| hydrate(conn, r))
        .collect::<AppResult<Vec<_>>>()?;
    ratings.sort_by_key(|r| taxonomy::measure_position(kind, &r.measure_id).unwrap_or(usize::MAX));
    Ok(ratings)
}

pub fn upsert(conn: &Connection, input: &RatingInput) -> AppResult<Rating> {
    let assessment_id = input.assessment_id.trim();
    let assessment = assessments::get(conn, assessment_id)?;
    let kind = assessment.assessment_type;

    let Some((_, measure)) = taxonomy::find_measure(kind, &input.measure_id) else {
        return Err(AppError::validation(format!(
            "unknown measure {} for {}",
            input.measure_id.trim(),
            kind.as_str()
        )));
    };
    let Some(level) = taxonomy::find_level(kind, &input.level_id) else {
        return Err(AppError::validation(format!(
            "unknown developmental level {} for {}",
            input.level_id.trim(),
            kind.as_str()
        )));
    };
    let notes = input
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let ts = db::now_ts();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO ratings(
           id, assessment_id, measure_id, developmental_level_id, observation_notes,
           created_at, updated_at
         ) VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?6)
         ON CONFLICT(assessment_id, measure_id) DO UPDATE SET
           developmental_level_id = excluded.developmental_level_id,
           observation_notes = excluded.observation_notes,
           updated_at = excluded.updated_at",
        params![db::new_id(), assessment.id, measure.code, level.id, notes, ts],
    )?;
    tx.execute(
        "UPDATE assessments SET updated_at = ?1 WHERE id = ?2",
        params![ts, assessment.id],
    )?;
    tx.commit()?;

    let sql = format!("{} WHERE r.assessment_id = ? AND r.measure_id = ?", SELECT_RATINGS);
    let row = conn
        .query_row(&sql, params![assessment.id, measure.code], rating_row)
        .optional()?
        .ok_or_else(|| AppError::not_found("rating"))?;
    hydrate(conn, row)
}

pub fn delete(conn: &Connection, rating_id: &str) -> AppResult<usize> {
    let assessment_id: Option<String> = conn
        .query_row(
            "SELECT assessment_id FROM ratings WHERE id = ?",
            [rating_id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(assessment_id) = assessment_id else {
        return Err(AppError::not_found("rating"));
    };

    let tx = conn.unchecked_transaction()?;
    let observations_deleted =
        tx.execute("DELETE FROM observations WHERE rating_id = ?", [rating_id])?;
    tx.execute("DELETE FROM ratings WHERE id = ?", [rating_id])?;
    tx.execute(
        "UPDATE assessments SET updated_at = ?1 WHERE id = ?2",
        params![db::now_ts(), assessment_id],
    )?;
    tx.commit()?;
    Ok(observations_deleted)
}

fn ensure_rating_exists(conn: &Connection, rating_id: &str) -> AppResult<()> {
    conn.query_row("SELECT 1 FROM ratings WHERE id = ?", [rating_id], |_r| Ok(()))
        .optional()?
        .ok_or_else(|| AppError::not_found("rating"))
}

pub fn list_observations(conn: &Connection, rating_id: &str) -> AppResult<Vec<Observation>> {
    ensure_rating_exists(conn, rating_id)?;
    load_observations(conn, rating_id)
}

pub fn add_observation(
    conn: &Connection,
    rating_id: &str,
    observation_date: Option<&str>,
    text: &str,
) -> AppResult<Observation> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::validation("observation text must not be empty"));
    }
    let observation_date = match observation_date.map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_date(raw, "observationDate")?,
        _ => db::today(),
    };
    ensure_rating_exists(conn, rating_id)?;

    let id = db::new_id();
    conn.execute(
        "INSERT INTO observations(id, rating_id, observation_date, observation_text, created_at)
         VALUES(?1, ?2, ?3, ?4, ?5)",
        params![id, rating_id, observation_date, text, db::now_ts()],
    )?;
    conn.query_row(
        "SELECT id, rating_id, observation_date, observation_text, created_at
         FROM observations WHERE id = ?",
        [&id],
        observation_from_row,
    )
    .map_err(AppError::from)
}

/// The parent rating's level and notes are left untouched.
pub fn delete_observation(conn: &Connection, observation_id: &str) -> AppResult<()> {
    let n = conn.execute("DELETE FROM observations WHERE id = ?", [observation_id])?;
    if n == 0 {
        return Err(AppError::not_found("observation"));
    }
    Ok(())
}

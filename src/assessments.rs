//! Assessment lifecycle: create, read (with ratings and progress), update,
//! mark complete and delete.
//!
//! Completion is a teacher-asserted flag. `progress` is computed here on every
//! read and is never used to gate `mark_complete`.

use crate::db;
use crate::error::{AppError, AppResult};
use crate::ratings::{self, Rating};
use crate::students;
use crate::taxonomy::{self, AssessmentType};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub const UNKNOWN_STUDENT: &str = "Unknown Student";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    Fall,
    Winter,
    Spring,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fall" => Some(Self::Fall),
            "winter" => Some(Self::Winter),
            "spring" => Some(Self::Spring),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fall => "Fall",
            Self::Winter => "Winter",
            Self::Spring => "Spring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    InProgress,
    Complete,
}

impl Status {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_progress" | "in-progress" => Some(Self::InProgress),
            "complete" | "completed" => Some(Self::Complete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub rated_count: usize,
    pub total_measures: usize,
    pub percent_complete: f64,
}

impl Progress {
    pub fn compute(kind: AssessmentType, rated_count: usize) -> Self {
        let total_measures = taxonomy::total_measures(kind);
        let percent_complete = if total_measures == 0 {
            0.0
        } else {
            ((rated_count as f64 / total_measures as f64) * 1000.0).round() / 10.0
        };
        Self {
            rated_count,
            total_measures,
            percent_complete,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub student_id: String,
    pub assessment_type: AssessmentType,
    pub assessment_date: String,
    pub assessment_period: Period,
    pub status: Status,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub grade: Option<String>,
    pub class_name: Option<String>,
    pub missing: bool,
}

impl StudentSummary {
    fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: UNKNOWN_STUDENT.to_string(),
            first_name: None,
            grade: None,
            class_name: None,
            missing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentListItem {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub student: StudentSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub student: StudentSummary,
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub student_id: String,
    pub assessment_date: Option<String>,
    pub period: String,
    pub notes: Option<String>,
    pub assessment_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssessmentPatch {
    pub assessment_date: Option<String>,
    pub period: Option<String>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
    pub status: Option<String>,
}

/// Accepts `YYYY-MM-DD` and returns it normalized.
pub fn parse_date(raw: &str, field: &str) -> AppResult<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| AppError::validation(format!("{} must be a date (YYYY-MM-DD)", field)))
}

fn parse_period(raw: &str) -> AppResult<Period> {
    Period::parse(raw)
        .ok_or_else(|| AppError::validation("period must be one of: Fall, Winter, Spring"))
}

fn parse_status(raw: &str) -> AppResult<Status> {
    Status::parse(raw)
        .ok_or_else(|| AppError::validation("status must be one of: in_progress, complete"))
}

fn clean_notes(v: Option<&str>) -> Option<String> {
    v.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

struct AssessmentRow {
    id: String,
    student_id: String,
    assessment_type: String,
    assessment_date: String,
    assessment_period: String,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
    rated_count: i64,
    student_first: Option<String>,
    student_last: Option<String>,
    student_grade: Option<String>,
    student_class: Option<String>,
}

const SELECT_ROWS: &str = "SELECT
       a.id, a.student_id, a.assessment_type, a.assessment_date, a.assessment_period,
       a.status, a.notes, a.created_at, a.updated_at,
       (SELECT COUNT(*) FROM ratings r WHERE r.assessment_id = a.id) AS rated_count,
       s.first_name, s.last_name, s.grade, s.class_name
     FROM assessments a
     LEFT JOIN students s ON s.id = a.student_id";

fn row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssessmentRow> {
    Ok(AssessmentRow {
        id: row.get(0)?,
        student_id: row.get(1)?,
        assessment_type: row.get(2)?,
        assessment_date: row.get(3)?,
        assessment_period: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        rated_count: row.get(9)?,
        student_first: row.get(10)?,
        student_last: row.get(11)?,
        student_grade: row.get(12)?,
        student_class: row.get(13)?,
    })
}

fn stored(what: &str, value: &str) -> AppError {
    AppError::Collaborator(format!("unrecognized {} in storage: {}", what, value))
}

impl AssessmentRow {
    fn split(self) -> AppResult<(Assessment, StudentSummary)> {
        let kind = AssessmentType::parse(&self.assessment_type)
            .ok_or_else(|| stored("assessment type", &self.assessment_type))?;
        let period = Period::parse(&self.assessment_period)
            .ok_or_else(|| stored("assessment period", &self.assessment_period))?;
        let status =
            Status::parse(&self.status).ok_or_else(|| stored("assessment status", &self.status))?;

        let student = match (self.student_first, self.student_last) {
            (Some(first), Some(last)) => StudentSummary {
                id: self.student_id.clone(),
                display_name: students::display_name(&first, &last),
                first_name: Some(first),
                grade: self.student_grade,
                class_name: self.student_class,
                missing: false,
            },
            _ => StudentSummary::unknown(&self.student_id),
        };

        let assessment = Assessment {
            id: self.id,
            student_id: self.student_id,
            assessment_type: kind,
            assessment_date: self.assessment_date,
            assessment_period: period,
            status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            progress: Progress::compute(kind, self.rated_count.max(0) as usize),
        };
        Ok((assessment, student))
    }
}

fn load_row(conn: &Connection, assessment_id: &str) -> AppResult<Option<(Assessment, StudentSummary)>> {
    let sql = format!("{} WHERE a.id = ?", SELECT_ROWS);
    let row = conn
        .query_row(&sql, [assessment_id], row_from_sql)
        .optional()?;
    row.map(AssessmentRow::split).transpose()
}

pub fn get(conn: &Connection, assessment_id: &str) -> AppResult<Assessment> {
    load_row(conn, assessment_id)?
        .map(|(a, _)| a)
        .ok_or_else(|| AppError::not_found("assessment"))
}

/// Newest first. A dangling student reference renders as "Unknown Student".
pub fn list(conn: &Connection, student_id: Option<&str>) -> AppResult<Vec<AssessmentListItem>> {
    let order = "ORDER BY a.assessment_date DESC, a.created_at DESC, a.id";
    let rows = match student_id {
        Some(sid) => {
            let sql = format!("{} WHERE a.student_id = ? {}", SELECT_ROWS, order);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([sid], row_from_sql)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("{} {}", SELECT_ROWS, order);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], row_from_sql)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    rows.into_iter()
        .map(|r| {
            let (assessment, student) = r.split()?;
            Ok(AssessmentListItem {
                assessment,
                student,
            })
        })
        .collect()
}

pub fn open(conn: &Connection, assessment_id: &str) -> AppResult<AssessmentDetail> {
    let Some((mut assessment, student)) = load_row(conn, assessment_id)? else {
        return Err(AppError::not_found("assessment"));
    };
    let ratings = ratings::list_for_assessment(conn, &assessment.id, assessment.assessment_type)?;
    assessment.progress = Progress::compute(assessment.assessment_type, ratings.len());
    Ok(AssessmentDetail {
        assessment,
        student,
        ratings,
    })
}

pub fn create(conn: &Connection, new: &NewAssessment) -> AppResult<Assessment> {
    let student_id = new.student_id.trim();
    if student_id.is_empty() {
        return Err(AppError::validation("studentId is required"));
    }
    let Some(student) = students::get(conn, student_id)? else {
        return Err(AppError::validation(format!(
            "studentId does not reference an existing student: {}",
            student_id
        )));
    };
    let period = parse_period(&new.period)?;
    let assessment_date = match new.assessment_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_date(raw, "assessmentDate")?,
        _ => db::today(),
    };
    let kind = match new.assessment_type.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => AssessmentType::parse(raw).ok_or_else(|| {
            AppError::validation("assessmentType must be one of: preschool_tk, kindergarten")
        })?,
        _ => AssessmentType::for_grade(&student.grade),
    };

    let id = db::new_id();
    let ts = db::now_ts();
    conn.execute(
        "INSERT INTO assessments(
           id, student_id, assessment_type, assessment_date, assessment_period,
           status, notes, created_at, updated_at
         ) VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            id,
            student.id,
            kind.as_str(),
            assessment_date,
            period.as_str(),
            Status::InProgress.as_str(),
            clean_notes(new.notes.as_deref()),
            ts
        ],
    )?;
    get(conn, &id)
}

pub fn update(conn: &Connection, assessment_id: &str, patch: &AssessmentPatch) -> AppResult<Assessment> {
    let mut current = get(conn, assessment_id)?;
    if let Some(raw) = patch.assessment_date.as_deref() {
        current.assessment_date = parse_date(raw, "assessmentDate")?;
    }
    if let Some(raw) = patch.period.as_deref() {
        current.assessment_period = parse_period(raw)?;
    }
    if let Some(v) = patch.notes.as_ref() {
        current.notes = clean_notes(v.as_deref());
    }
    if let Some(raw) = patch.status.as_deref() {
        current.status = parse_status(raw)?;
    }

    conn.execute(
        "UPDATE assessments
         SET assessment_date = ?1, assessment_period = ?2, notes = ?3, status = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            current.assessment_date,
            current.assessment_period.as_str(),
            current.notes,
            current.status.as_str(),
            db::now_ts(),
            assessment_id
        ],
    )?;
    get(conn, assessment_id)
}

/// Sets `complete` regardless of how many measures are rated.
pub fn mark_complete(conn: &Connection, assessment_id: &str) -> AppResult<Assessment> {
    let n = conn.execute(
        "UPDATE assessments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![Status::Complete.as_str(), db::now_ts(), assessment_id],
    )?;
    if n == 0 {
        return Err(AppError::not_found("assessment"));
    }
    get(conn, assessment_id)
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub ratings_deleted: usize,
    pub observations_deleted: usize,
}

pub fn delete(conn: &Connection, assessment_id: &str) -> AppResult<DeleteSummary> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM assessments WHERE id = ?",
            [assessment_id],
            |_r| Ok(()),
        )
        .optional()?;
    if exists.is_none() {
        return Err(AppError::not_found("assessment"));
    }

    let tx = conn.unchecked_transaction()?;
    // Dependency order; the schema has no ON DELETE CASCADE.
    let observations_deleted = tx.execute(
        "DELETE FROM observations
         WHERE rating_id IN (SELECT id FROM ratings WHERE assessment_id = ?)",
        [assessment_id],
    )?;
    let ratings_deleted = tx.execute("DELETE FROM ratings WHERE assessment_id = ?", [assessment_id])?;
    tx.execute("DELETE FROM assessments WHERE id = ?", [assessment_id])?;
    tx.commit()?;

    Ok(DeleteSummary {
        ratings_deleted,
        observations_deleted,
    })
}

use crate::db;
use crate::error::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub grade: String,
    pub class_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub grade: String,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub grade: Option<String>,
    /// `Some(None)` clears the class.
    pub class_name: Option<Option<String>>,
}

pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}

const SELECT_COLUMNS: &str =
    "SELECT id, first_name, last_name, grade, class_name, created_at, updated_at FROM students";

fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    let first_name: String = row.get(1)?;
    let last_name: String = row.get(2)?;
    Ok(Student {
        id: row.get(0)?,
        display_name: display_name(&first_name, &last_name),
        first_name,
        last_name,
        grade: row.get(3)?,
        class_name: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn list(conn: &Connection) -> AppResult<Vec<Student>> {
    let sql = format!(
        "{} ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, id",
        SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], student_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, student_id: &str) -> AppResult<Option<Student>> {
    let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
    Ok(conn
        .query_row(&sql, [student_id], student_from_row)
        .optional()?)
}

fn require_text(value: &str, field: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    Ok(v.to_string())
}

pub fn create(conn: &Connection, new: &NewStudent) -> AppResult<Student> {
    let first_name = require_text(&new.first_name, "firstName")?;
    let last_name = require_text(&new.last_name, "lastName")?;
    let grade = require_text(&new.grade, "grade")?;
    let class_name = new
        .class_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let id = db::new_id();
    let ts = db::now_ts();
    conn.execute(
        "INSERT INTO students(id, first_name, last_name, grade, class_name, created_at, updated_at)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![id, first_name, last_name, grade, class_name, ts],
    )?;
    get(conn, &id)?.ok_or_else(|| AppError::not_found("student"))
}

pub fn update(conn: &Connection, student_id: &str, patch: &StudentPatch) -> AppResult<Student> {
    let Some(mut current) = get(conn, student_id)? else {
        return Err(AppError::not_found("student"));
    };
    if let Some(v) = patch.first_name.as_deref() {
        current.first_name = require_text(v, "firstName")?;
    }
    if let Some(v) = patch.last_name.as_deref() {
        current.last_name = require_text(v, "lastName")?;
    }
    if let Some(v) = patch.grade.as_deref() {
        current.grade = require_text(v, "grade")?;
    }
    if let Some(v) = patch.class_name.as_ref() {
        current.class_name = v
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    conn.execute(
        "UPDATE students
         SET first_name = ?1, last_name = ?2, grade = ?3, class_name = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            current.first_name,
            current.last_name,
            current.grade,
            current.class_name,
            db::now_ts(),
            student_id
        ],
    )?;
    get(conn, student_id)?.ok_or_else(|| AppError::not_found("student"))
}

/// Removes the student row only. Assessments keep their `student_id` and are
/// listed as "Unknown Student" afterwards.
pub fn delete(conn: &Connection, student_id: &str) -> AppResult<()> {
    let n = conn.execute("DELETE FROM students WHERE id = ?", [student_id])?;
    if n == 0 {
        return Err(AppError::not_found("student"));
    }
    Ok(())
}

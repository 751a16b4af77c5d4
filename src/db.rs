use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

pub fn open_db(db_path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.to_string_lossy()))?;
    }
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            grade TEXT NOT NULL,
            class_name TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_name ON students(last_name, first_name)",
        [],
    )?;

    // No foreign key on student_id: assessment history outlives the student row.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS assessments(
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            assessment_type TEXT NOT NULL,
            assessment_date TEXT NOT NULL,
            assessment_period TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'in_progress',
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assessments_student ON assessments(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ratings(
            id TEXT PRIMARY KEY,
            assessment_id TEXT NOT NULL,
            measure_id TEXT NOT NULL,
            developmental_level_id TEXT NOT NULL,
            observation_notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(assessment_id) REFERENCES assessments(id),
            UNIQUE(assessment_id, measure_id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ratings_assessment ON ratings(assessment_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS observations(
            id TEXT PRIMARY KEY,
            rating_id TEXT NOT NULL,
            observation_date TEXT NOT NULL,
            observation_text TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(rating_id) REFERENCES ratings(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_observations_rating ON observations(rating_id, observation_date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS features(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'no',
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles(
            id TEXT PRIMARY KEY,
            email TEXT,
            name TEXT,
            role TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// RFC 3339 UTC timestamp with millisecond precision so rows created within
/// the same second still sort by insertion.
pub fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

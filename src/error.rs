use thiserror::Error;

/// Failures surfaced to the caller as the `error` object of a response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("{0}")]
    Collaborator(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "bad_params",
            Self::NotFound(_) => "not_found",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::Storage(_) => "db_query_failed",
            Self::Collaborator(_) => "collaborator_unavailable",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

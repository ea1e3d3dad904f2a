use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{field} must not be empty")]
    InvalidInput { field: &'static str },

    #[error("Student with roll number {roll_number} already exists")]
    AlreadyExists { roll_number: String },

    #[error("{reason}")]
    InvalidGrade { reason: &'static str },

    #[error("Student with id {student_id} not found")]
    StudentNotFound { student_id: i64 },

    #[error("Student with roll number {roll_number} not found")]
    NotFound { roll_number: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    /// Stable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidInput { .. } => "invalid_input",
            StoreError::AlreadyExists { .. } => "already_exists",
            StoreError::InvalidGrade { .. } => "invalid_grade",
            StoreError::StudentNotFound { .. } => "student_not_found",
            StoreError::NotFound { .. } => "not_found",
            StoreError::Database(_) => "db_query_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

use thiserror::Error;

use crate::models::Weekday;

#[derive(Error, Debug)]
pub enum DutyError {
    #[error("unknown grade: {0:?}")]
    InvalidGrade(String),

    #[error("unknown weekday: {0:?}")]
    InvalidWeekday(String),

    #[error("malformed week: {0}")]
    InvalidWeek(String),

    #[error("student #{position} on {day} has an empty name")]
    EmptyStudentName { day: Weekday, position: usize },

    #[error("{0} must keep at least one student")]
    LastStudent(Weekday),

    #[error("no student {student:?} on {day}")]
    StudentNotFound { day: Weekday, student: String },

    #[error("lesson number must be positive, got {0}")]
    InvalidLessonNumber(u32),

    #[error("roster row {row}: {message}")]
    RosterRow { row: usize, message: String },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DutyError>;

pub mod clipboard;
pub mod error;
pub mod grade;
pub mod history;
pub mod logging;
pub mod models;
pub mod report;
pub mod roster;
pub mod schedule;
pub mod stats;
pub mod store;

pub use error::{DutyError, Result};
pub use grade::{classify, grade_to_number, Grade, GradeBand};
pub use history::{load_report_into_current, HistoryArchive, MAX_HISTORY};
pub use models::{Day, Student, Week, WeekEdit, WeekReport, Weekday};
pub use report::{generate_report_text, ReportOptions};
pub use schedule::{default_schedule, ScheduleStore};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use chrono::Local;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Week, WeekReport};
use crate::schedule::ScheduleStore;
use crate::store::{KeyValueStore, REPORT_HISTORY_KEY};

pub const MAX_HISTORY: usize = 50;

/// Archived week snapshots, newest first.
pub struct HistoryArchive<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryArchive<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Archives a copy of `week`, evicting the oldest entries past the cap.
    pub fn save_report(&self, week: &Week) -> Result<WeekReport> {
        let report = WeekReport {
            id: Uuid::new_v4().to_string(),
            created_at: Local::now().format("%d.%m.%Y").to_string(),
            days: week.clone(),
        };

        let mut history = self.list_history();
        history.insert(0, report.clone());
        if history.len() > MAX_HISTORY {
            let evicted = history.len() - MAX_HISTORY;
            history.truncate(MAX_HISTORY);
            debug!(evicted, "history at capacity, dropped oldest");
        }
        self.persist(&history)?;
        info!(id = %report.id, entries = history.len(), "saved week report");
        Ok(report)
    }

    /// Never fails: unreadable or malformed history reads as empty.
    pub fn list_history(&self) -> Vec<WeekReport> {
        let blob = match self.store.get(REPORT_HISTORY_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "could not read report history");
                return Vec::new();
            }
        };
        serde_json::from_str(&blob).unwrap_or_else(|err| {
            warn!(error = %err, "report history is malformed, treating as empty");
            Vec::new()
        })
    }

    pub fn find_report(&self, id: &str) -> Option<WeekReport> {
        self.list_history().into_iter().find(|r| r.id == id)
    }

    /// Unknown ids are a no-op.
    pub fn delete_report(&self, id: &str) -> Result<()> {
        let mut history = self.list_history();
        let before = history.len();
        history.retain(|r| r.id != id);
        if history.len() == before {
            debug!(id, "no report with this id, nothing to delete");
            return Ok(());
        }
        self.persist(&history)?;
        info!(id, "deleted week report");
        Ok(())
    }

    fn persist(&self, history: &[WeekReport]) -> Result<()> {
        let blob = serde_json::to_string(history)?;
        self.store.set(REPORT_HISTORY_KEY, &blob)
    }
}

/// Makes an archived week the editable current week.
pub fn load_report_into_current<S: KeyValueStore>(
    report: &WeekReport,
    schedule: &ScheduleStore<S>,
) -> Result<Week> {
    let week = report.days.clone();
    schedule.save_current_week(&week)?;
    info!(id = %report.id, created_at = %report.created_at, "loaded report into current week");
    Ok(week)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Grade;
    use crate::models::{WeekEdit, Weekday};
    use crate::schedule::default_schedule;
    use crate::store::{FileStore, MemoryStore};

    fn week_with_lesson(number: u32) -> Week {
        default_schedule()
            .apply(WeekEdit::SetLessonNumber { day: Weekday::Monday, number })
            .unwrap()
    }

    #[test]
    fn save_prepends_newest_first() {
        let kv = MemoryStore::new();
        let history = HistoryArchive::new(&kv);
        let first = history.save_report(&week_with_lesson(1)).unwrap();
        let second = history.save_report(&week_with_lesson(2)).unwrap();

        let entries = history.list_history();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
        assert_ne!(first.id, second.id);
        assert_eq!(entries[1].days, week_with_lesson(1));
    }

    #[test]
    fn caps_history_at_fifty() {
        let kv = MemoryStore::new();
        let history = HistoryArchive::new(&kv);
        let mut ids = Vec::new();
        for n in 1..=51 {
            ids.push(history.save_report(&week_with_lesson(n)).unwrap().id);
        }

        let entries = history.list_history();
        assert_eq!(entries.len(), MAX_HISTORY);
        assert_eq!(entries[0].id, ids[50]);
        assert_eq!(entries[0].days.day(Weekday::Monday).lesson_number, 51);
        assert!(entries.iter().all(|r| r.id != ids[0]));
        assert_eq!(entries[49].id, ids[1]);
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let kv = MemoryStore::new();
        let history = HistoryArchive::new(&kv);
        history.save_report(&week_with_lesson(3)).unwrap();
        let before = history.list_history();

        history.delete_report("missing").unwrap();
        assert_eq!(history.list_history(), before);
    }

    #[test]
    fn delete_removes_matching_entry() {
        let kv = MemoryStore::new();
        let history = HistoryArchive::new(&kv);
        let keep = history.save_report(&week_with_lesson(3)).unwrap();
        let gone = history.save_report(&week_with_lesson(4)).unwrap();

        history.delete_report(&gone.id).unwrap();
        let entries = history.list_history();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, keep.id);
        assert!(history.find_report(&gone.id).is_none());
    }

    #[test]
    fn corrupted_history_lists_empty() {
        let kv = MemoryStore::new();
        kv.set(REPORT_HISTORY_KEY, "[{\"id\": 5}").unwrap();
        let history = HistoryArchive::new(&kv);
        assert!(history.list_history().is_empty());

        history.save_report(&default_schedule()).unwrap();
        assert_eq!(history.list_history().len(), 1);
    }

    #[test]
    fn unreadable_history_lists_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report-history.json"), [0xff, 0xfe]).unwrap();
        let history = HistoryArchive::new(FileStore::new(dir.path()));
        assert!(history.list_history().is_empty());

        let report = history.save_report(&week_with_lesson(2)).unwrap();
        let entries = history.list_history();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], report);
    }

    #[test]
    fn history_json_uses_camel_case() {
        let kv = MemoryStore::new();
        let history = HistoryArchive::new(&kv);
        history.save_report(&default_schedule()).unwrap();
        let blob = kv.get(REPORT_HISTORY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert!(value[0]["createdAt"].is_string());
        assert_eq!(value[0]["days"][0]["day"], "ПН");
    }

    #[test]
    fn loading_report_makes_independent_current_week() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        let history = HistoryArchive::new(&kv);
        let graded = default_schedule()
            .apply(WeekEdit::SetGrade {
                day: Weekday::Wednesday,
                index: 0,
                grade: Grade::FourMinus,
            })
            .unwrap();
        let report = history.save_report(&graded).unwrap();

        load_report_into_current(&report, &schedule).unwrap();
        let current = schedule.load_current_week();
        assert_eq!(current, report.days);

        let edited = current
            .apply(WeekEdit::SetGrade {
                day: Weekday::Wednesday,
                index: 0,
                grade: Grade::Two,
            })
            .unwrap();
        schedule.save_current_week(&edited).unwrap();

        let stored = history.find_report(&report.id).unwrap();
        assert_eq!(stored.days, graded);
        assert_eq!(report.days, graded);
    }
}

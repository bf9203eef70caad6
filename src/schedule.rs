use tracing::{info, warn};

use crate::error::{DutyError, Result};
use crate::models::{Day, Student, Week, Weekday};
use crate::store::{KeyValueStore, CURRENT_WEEK_KEY, CUSTOM_SCHEDULE_KEY};

/// Built-in roster used until a custom one is saved.
pub fn default_schedule() -> Week {
    let days = vec![
        Day::new(
            Weekday::Monday,
            2,
            &["Игнатова Милана", "Кетова Анита", "Луданина Елена"],
        ),
        Day::new(
            Weekday::Tuesday,
            3,
            &["Макаров Федор", "Мамедов Амир", "Мелешко Дарья"],
        ),
        Day::new(
            Weekday::Wednesday,
            4,
            &["Напалков Назар", "Овсянникова София", "Пазынюк Максим"],
        ),
        Day::new(
            Weekday::Thursday,
            5,
            &["Попов Тимофей", "Пустоветова Дарья", "Руденко Кирилл"],
        ),
        Day::new(
            Weekday::Friday,
            6,
            &["Савицкий Николай", "Семёнов Матвей", "Хлебова Елизавета"],
        ),
    ];
    Week::from_trusted(days)
}

/// Owns the current week and the optional custom roster.
pub struct ScheduleStore<S> {
    store: S,
}

impl<S: KeyValueStore> ScheduleStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persisted current week, or the base roster with cleared grades.
    pub fn load_current_week(&self) -> Week {
        match self.read_week(CURRENT_WEEK_KEY) {
            Some(week) => week,
            None => self.load_base_schedule(),
        }
    }

    pub fn save_current_week(&self, week: &Week) -> Result<()> {
        let blob = serde_json::to_string(week)?;
        self.store.set(CURRENT_WEEK_KEY, &blob)
    }

    /// Custom roster if one is saved, else the default; grades always cleared.
    pub fn load_base_schedule(&self) -> Week {
        self.read_week(CUSTOM_SCHEDULE_KEY)
            .unwrap_or_else(default_schedule)
            .with_cleared_grades()
    }

    /// Stores a roster (trimmed names and lesson numbers) as the new base.
    pub fn save_custom_schedule(&self, week: &Week) -> Result<Week> {
        let roster = clean_roster(week)?;
        let blob = serde_json::to_string(&roster)?;
        self.store.set(CUSTOM_SCHEDULE_KEY, &blob)?;
        info!(students = roster.students().count(), "saved custom roster");
        Ok(roster)
    }

    /// Saves the roster and restarts the current week from it.
    pub fn apply_custom_schedule(&self, week: &Week) -> Result<Week> {
        let roster = self.save_custom_schedule(week)?;
        self.save_current_week(&roster)?;
        Ok(roster)
    }

    pub fn reset_schedule(&self) -> Result<()> {
        self.store.remove(CUSTOM_SCHEDULE_KEY)?;
        info!("custom roster removed, default roster restored");
        Ok(())
    }

    /// Clears every current grade; archived history is untouched.
    pub fn reset_grades(&self) -> Result<Week> {
        let fresh = self.load_base_schedule();
        self.save_current_week(&fresh)?;
        info!("current grades cleared");
        Ok(fresh)
    }

    fn read_week(&self, key: &str) -> Option<Week> {
        let blob = match self.store.get(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "could not read stored week, using default");
                return None;
            }
        };
        match serde_json::from_str::<Week>(&blob) {
            Ok(week) => Some(week),
            Err(err) => {
                warn!(key, error = %err, "stored week is malformed, using default");
                None
            }
        }
    }
}

fn clean_roster(week: &Week) -> Result<Week> {
    let mut days = Vec::with_capacity(week.days().len());
    for day in week.days() {
        let mut students = Vec::with_capacity(day.students.len());
        for (index, student) in day.students.iter().enumerate() {
            let name = student.name.trim();
            if name.is_empty() {
                return Err(DutyError::EmptyStudentName {
                    day: day.label,
                    position: index + 1,
                });
            }
            students.push(Student::new(name));
        }
        days.push(Day {
            label: day.label,
            lesson_number: day.lesson_number,
            students,
        });
    }
    Week::new(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Grade;
    use crate::models::WeekEdit;
    use crate::store::{FileStore, MemoryStore};

    fn graded_week() -> Week {
        default_schedule()
            .apply(WeekEdit::SetGrade {
                day: Weekday::Monday,
                index: 0,
                grade: Grade::Five,
            })
            .unwrap()
            .apply(WeekEdit::SetGrade {
                day: Weekday::Thursday,
                index: 2,
                grade: Grade::ThreeMinus,
            })
            .unwrap()
    }

    #[test]
    fn empty_store_yields_default_roster() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        assert_eq!(schedule.load_current_week(), default_schedule());
    }

    #[test]
    fn current_week_round_trips() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        let week = graded_week();
        schedule.save_current_week(&week).unwrap();
        assert_eq!(schedule.load_current_week(), week);
    }

    #[test]
    fn malformed_current_week_falls_back_and_is_overwritten() {
        let kv = MemoryStore::new();
        kv.set(CURRENT_WEEK_KEY, "{not json").unwrap();
        let schedule = ScheduleStore::new(&kv);
        assert_eq!(schedule.load_current_week(), default_schedule());

        let week = graded_week();
        schedule.save_current_week(&week).unwrap();
        assert_eq!(schedule.load_current_week(), week);
    }

    #[test]
    fn unreadable_current_week_falls_back_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("current-week.json"), [0xff, 0xfe]).unwrap();
        let schedule = ScheduleStore::new(FileStore::new(dir.path()));
        assert_eq!(schedule.load_current_week(), default_schedule());

        let week = graded_week();
        schedule.save_current_week(&week).unwrap();
        assert_eq!(schedule.load_current_week(), week);
    }

    #[test]
    fn structurally_invalid_week_falls_back() {
        let kv = MemoryStore::new();
        kv.set(CURRENT_WEEK_KEY, r#"[{"day":"ПН","number":1,"students":[]}]"#)
            .unwrap();
        kv.set(
            CUSTOM_SCHEDULE_KEY,
            r#"[{"day":"ПН","number":1,"students":[{"name":"A","grade":"9"}]}]"#,
        )
        .unwrap();
        let schedule = ScheduleStore::new(&kv);
        assert_eq!(schedule.load_current_week(), default_schedule());
    }

    #[test]
    fn custom_roster_replaces_default_without_grades() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        let custom = graded_week()
            .apply(WeekEdit::RenameStudent {
                day: Weekday::Monday,
                index: 1,
                name: "  Орлова Вера ".to_string(),
            })
            .unwrap();

        let saved = schedule.save_custom_schedule(&custom).unwrap();
        assert_eq!(saved.day(Weekday::Monday).students[1].name, "Орлова Вера");

        let base = schedule.load_base_schedule();
        assert_eq!(base, saved);
        assert!(base.students().all(|s| s.grade == Grade::Ungraded));
    }

    #[test]
    fn empty_name_rejects_roster_save() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        let custom = default_schedule()
            .apply(WeekEdit::AddStudent {
                day: Weekday::Wednesday,
                name: "   ".to_string(),
            })
            .unwrap();

        let err = schedule.save_custom_schedule(&custom).unwrap_err();
        assert!(matches!(
            err,
            DutyError::EmptyStudentName {
                day: Weekday::Wednesday,
                position: 4
            }
        ));
        assert_eq!(kv.get(CUSTOM_SCHEDULE_KEY).unwrap(), None);
    }

    #[test]
    fn reset_schedule_restores_default() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        let custom = default_schedule()
            .apply(WeekEdit::SetLessonNumber { day: Weekday::Tuesday, number: 8 })
            .unwrap();
        schedule.save_custom_schedule(&custom).unwrap();
        assert_ne!(schedule.load_base_schedule(), default_schedule());

        schedule.reset_schedule().unwrap();
        assert_eq!(schedule.load_base_schedule(), default_schedule());
        schedule.reset_schedule().unwrap();
    }

    #[test]
    fn apply_custom_schedule_restarts_current_week() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        schedule.save_current_week(&graded_week()).unwrap();

        let custom = default_schedule()
            .apply(WeekEdit::AddStudent {
                day: Weekday::Friday,
                name: "Юдин Лев".to_string(),
            })
            .unwrap();
        let roster = schedule.apply_custom_schedule(&custom).unwrap();

        let current = schedule.load_current_week();
        assert_eq!(current, roster);
        assert_eq!(current.day(Weekday::Friday).students.len(), 4);
    }

    #[test]
    fn reset_grades_uses_base_schedule() {
        let kv = MemoryStore::new();
        let schedule = ScheduleStore::new(&kv);
        schedule.save_current_week(&graded_week()).unwrap();

        let fresh = schedule.reset_grades().unwrap();
        assert_eq!(fresh, default_schedule());
        assert_eq!(schedule.load_current_week(), default_schedule());
    }
}

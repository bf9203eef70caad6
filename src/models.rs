use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DutyError, Result};
use crate::grade::Grade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "ПН")]
    Monday,
    #[serde(rename = "ВТ")]
    Tuesday,
    #[serde(rename = "СР")]
    Wednesday,
    #[serde(rename = "ЧТ")]
    Thursday,
    #[serde(rename = "ПТ")]
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "ПН",
            Weekday::Tuesday => "ВТ",
            Weekday::Wednesday => "СР",
            Weekday::Thursday => "ЧТ",
            Weekday::Friday => "ПТ",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Weekday::Monday => "Понедельник",
            Weekday::Tuesday => "Вторник",
            Weekday::Wednesday => "Среда",
            Weekday::Thursday => "Четверг",
            Weekday::Friday => "Пятница",
        }
    }

    fn english(self) -> (&'static str, &'static str) {
        match self {
            Weekday::Monday => ("mon", "monday"),
            Weekday::Tuesday => ("tue", "tuesday"),
            Weekday::Wednesday => ("wed", "wednesday"),
            Weekday::Thursday => ("thu", "thursday"),
            Weekday::Friday => ("fri", "friday"),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the Russian labels and names in any case, plus `mon`/`monday` style English.
impl FromStr for Weekday {
    type Err = DutyError;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_lowercase();
        Weekday::ALL
            .iter()
            .copied()
            .find(|day| {
                let (short, long) = day.english();
                day.label().to_lowercase() == wanted
                    || day.full_name().to_lowercase() == wanted
                    || wanted == short
                    || wanted == long
            })
            .ok_or_else(|| DutyError::InvalidWeekday(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    #[serde(default)]
    pub grade: Grade,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grade: Grade::Ungraded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    #[serde(rename = "day")]
    pub label: Weekday,
    #[serde(rename = "number")]
    pub lesson_number: u32,
    pub students: Vec<Student>,
}

impl Day {
    pub fn new(label: Weekday, lesson_number: u32, names: &[&str]) -> Self {
        Self {
            label,
            lesson_number,
            students: names.iter().map(|name| Student::new(*name)).collect(),
        }
    }
}

/// Five duty days in Mon-Fri order. Only constructed through validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Day>", into = "Vec<Day>")]
pub struct Week {
    days: Vec<Day>,
}

/// A targeted change to one day of a week.
#[derive(Debug, Clone, PartialEq)]
pub enum WeekEdit {
    AddStudent { day: Weekday, name: String },
    RemoveStudent { day: Weekday, index: usize },
    RenameStudent { day: Weekday, index: usize, name: String },
    SetLessonNumber { day: Weekday, number: u32 },
    SetGrade { day: Weekday, index: usize, grade: Grade },
}

impl Week {
    pub fn new(days: Vec<Day>) -> Result<Self> {
        if days.len() != Weekday::ALL.len() {
            return Err(DutyError::InvalidWeek(format!(
                "expected {} days, found {}",
                Weekday::ALL.len(),
                days.len()
            )));
        }
        for (position, (day, expected)) in days.iter().zip(Weekday::ALL).enumerate() {
            if day.label != expected {
                return Err(DutyError::InvalidWeek(format!(
                    "expected {} at position {}, found {}",
                    expected,
                    position + 1,
                    day.label
                )));
            }
            if day.lesson_number == 0 {
                return Err(DutyError::InvalidWeek(format!(
                    "{} has lesson number 0",
                    day.label
                )));
            }
            if day.students.is_empty() {
                return Err(DutyError::InvalidWeek(format!(
                    "{} has no students",
                    day.label
                )));
            }
        }
        Ok(Self { days })
    }

    /// For rosters that are well formed by construction.
    pub(crate) fn from_trusted(days: Vec<Day>) -> Self {
        debug_assert!(Week::new(days.clone()).is_ok());
        Self { days }
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn into_days(self) -> Vec<Day> {
        self.days
    }

    pub fn day(&self, label: Weekday) -> &Day {
        &self.days[Self::slot(label)]
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.days.iter().flat_map(|day| day.students.iter())
    }

    pub fn with_cleared_grades(&self) -> Week {
        let mut week = self.clone();
        for student in week.days.iter_mut().flat_map(|d| d.students.iter_mut()) {
            student.grade = Grade::Ungraded;
        }
        week
    }

    /// Resolves a student by 1-based position or by exact (trimmed) name.
    pub fn find_student(&self, label: Weekday, key: &str) -> Result<usize> {
        let day = self.day(label);
        let key = key.trim();
        if let Ok(position) = key.parse::<usize>() {
            if (1..=day.students.len()).contains(&position) {
                return Ok(position - 1);
            }
        }
        day.students
            .iter()
            .position(|s| s.name.trim() == key)
            .ok_or_else(|| DutyError::StudentNotFound {
                day: label,
                student: key.to_string(),
            })
    }

    /// Returns a new week with only the targeted day changed.
    pub fn apply(&self, edit: WeekEdit) -> Result<Week> {
        let mut week = self.clone();
        match edit {
            WeekEdit::AddStudent { day, name } => {
                week.day_mut(day).students.push(Student::new(name));
            }
            WeekEdit::RemoveStudent { day, index } => {
                let target = week.day_mut(day);
                check_index(target, index)?;
                if target.students.len() == 1 {
                    return Err(DutyError::LastStudent(day));
                }
                target.students.remove(index);
            }
            WeekEdit::RenameStudent { day, index, name } => {
                let target = week.day_mut(day);
                check_index(target, index)?;
                target.students[index].name = name;
            }
            WeekEdit::SetLessonNumber { day, number } => {
                if number == 0 {
                    return Err(DutyError::InvalidLessonNumber(number));
                }
                week.day_mut(day).lesson_number = number;
            }
            WeekEdit::SetGrade { day, index, grade } => {
                let target = week.day_mut(day);
                check_index(target, index)?;
                target.students[index].grade = grade;
            }
        }
        Ok(week)
    }

    fn day_mut(&mut self, label: Weekday) -> &mut Day {
        &mut self.days[Self::slot(label)]
    }

    fn slot(label: Weekday) -> usize {
        label as usize
    }
}

fn check_index(day: &Day, index: usize) -> Result<()> {
    if index < day.students.len() {
        Ok(())
    } else {
        Err(DutyError::StudentNotFound {
            day: day.label,
            student: format!("#{}", index + 1),
        })
    }
}

impl TryFrom<Vec<Day>> for Week {
    type Error = DutyError;

    fn try_from(days: Vec<Day>) -> Result<Self> {
        Week::new(days)
    }
}

impl From<Week> for Vec<Day> {
    fn from(week: Week) -> Self {
        week.days
    }
}

/// An archived snapshot of a week. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekReport {
    pub id: String,
    pub created_at: String,
    pub days: Week,
}

impl WeekReport {
    pub fn graded_count(&self) -> usize {
        self.days.students().filter(|s| s.grade.is_graded()).count()
    }

    pub fn student_count(&self) -> usize {
        self.days.students().count()
    }
}

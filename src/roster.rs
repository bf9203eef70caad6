use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DutyError, Result};
use crate::models::{Day, Student, Week, Weekday};

#[derive(Debug, Deserialize)]
struct RosterRow {
    day: String,
    lesson: u32,
    name: String,
}

#[derive(Debug, Serialize)]
struct GradeRow<'a> {
    day: &'a str,
    lesson: u32,
    name: &'a str,
    grade: &'a str,
    score: f64,
}

/// Reads `day,lesson,name` rows into a roster. Every weekday must appear.
pub fn import_roster_csv(csv_path: &Path) -> Result<Week> {
    let reader = csv::Reader::from_path(csv_path)?;
    let week = read_roster(reader)?;
    info!(path = %csv_path.display(), students = week.students().count(), "imported roster");
    Ok(week)
}

pub fn read_roster<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Week> {
    let mut days: BTreeMap<Weekday, (u32, Vec<Student>)> = BTreeMap::new();

    for (index, result) in reader.deserialize::<RosterRow>().enumerate() {
        // header is line 1
        let row_number = index + 2;
        let row = result?;
        let label: Weekday = row.day.parse().map_err(|_| DutyError::RosterRow {
            row: row_number,
            message: format!("unknown day {:?}", row.day),
        })?;
        if row.lesson == 0 {
            return Err(DutyError::RosterRow {
                row: row_number,
                message: "lesson number must be positive".to_string(),
            });
        }
        let entry = days.entry(label).or_insert_with(|| (row.lesson, Vec::new()));
        if entry.0 != row.lesson {
            return Err(DutyError::RosterRow {
                row: row_number,
                message: format!(
                    "{} already has lesson {}, row says {}",
                    label, entry.0, row.lesson
                ),
            });
        }
        entry.1.push(Student::new(row.name.trim()));
    }

    let mut ordered = Vec::with_capacity(Weekday::ALL.len());
    for label in Weekday::ALL {
        let (lesson_number, students) = days.remove(&label).ok_or_else(|| {
            DutyError::InvalidWeek(format!("roster has no rows for {label}"))
        })?;
        ordered.push(Day {
            label,
            lesson_number,
            students,
        });
    }
    Week::new(ordered)
}

/// Writes `day,lesson,name,grade,score` rows for every student.
pub fn write_grades_csv<W: io::Write>(week: &Week, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for day in week.days() {
        for student in &day.students {
            csv_writer.serialize(GradeRow {
                day: day.label.label(),
                lesson: day.lesson_number,
                name: &student.name,
                grade: student.grade.as_str(),
                score: student.grade.to_number(),
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

use crate::grade::GradeBand;
use crate::models::{Day, Student, Weekday};

#[derive(Debug, Clone, PartialEq)]
pub struct DayAverage {
    pub day: Weekday,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekStats {
    pub graded: usize,
    pub total: usize,
    pub average: Option<f64>,
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub best: Option<Student>,
    pub per_day: Vec<DayAverage>,
}

/// Names of graded students per band, in iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

pub fn bucket_students<'a>(students: impl IntoIterator<Item = &'a Student>) -> Buckets {
    let mut buckets = Buckets::default();
    for student in students {
        let target = match student.grade.classify() {
            GradeBand::High => &mut buckets.high,
            GradeBand::Medium => &mut buckets.medium,
            GradeBand::Low => &mut buckets.low,
            GradeBand::None => continue,
        };
        target.push(student.name.clone());
    }
    buckets
}

/// Highest-scoring graded student. On equal scores the earlier student is kept.
pub fn best_student<'a>(students: impl IntoIterator<Item = &'a Student>) -> Option<&'a Student> {
    students
        .into_iter()
        .filter(|s| s.grade.is_graded())
        .reduce(|best, next| {
            if best.grade.to_number() >= next.grade.to_number() {
                best
            } else {
                next
            }
        })
}

fn average<'a>(students: impl IntoIterator<Item = &'a Student>) -> Option<f64> {
    let (sum, count) = students
        .into_iter()
        .filter(|s| s.grade.is_graded())
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.grade.to_number(), count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn week_stats(days: &[Day]) -> WeekStats {
    let students = || days.iter().flat_map(|d| d.students.iter());
    let buckets = bucket_students(students());

    WeekStats {
        graded: students().filter(|s| s.grade.is_graded()).count(),
        total: students().count(),
        average: average(students()),
        high: buckets.high,
        medium: buckets.medium,
        low: buckets.low,
        best: best_student(students()).cloned(),
        per_day: days
            .iter()
            .map(|d| DayAverage {
                day: d.label,
                average: average(&d.students).unwrap_or(0.0),
            })
            .collect(),
    }
}

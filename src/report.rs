use std::collections::BTreeSet;
use std::fmt::Write;

use crate::models::{Day, Week, Weekday};
use crate::stats;

const UNGRADED_PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub include_days: BTreeSet<Weekday>,
    pub include_stats: bool,
    pub include_best: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_days: Weekday::ALL.into_iter().collect(),
            include_stats: true,
            include_best: true,
        }
    }
}

/// Renders the shareable weekly text. Pure: same input, same output.
pub fn generate_report_text(week: &Week, options: &ReportOptions) -> String {
    let days: Vec<&Day> = week
        .days()
        .iter()
        .filter(|d| options.include_days.contains(&d.label))
        .collect();

    let mut output = String::new();
    let _ = writeln!(output, "*Оценки по дежурству за неделю*");
    let _ = writeln!(output);

    for day in &days {
        let students = day
            .students
            .iter()
            .map(|s| {
                let grade = if s.grade.is_graded() {
                    s.grade.as_str()
                } else {
                    UNGRADED_PLACEHOLDER
                };
                format!("{} {}", s.name, grade)
            })
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(output, "{}({}): {}.", day.label, day.lesson_number, students);
        let _ = writeln!(output);
    }

    if !options.include_stats {
        return output;
    }

    let students = || days.iter().flat_map(|d| d.students.iter());
    let buckets = stats::bucket_students(students());

    let _ = writeln!(output);
    let _ = writeln!(output, "Общая статистика:");
    if !buckets.high.is_empty() {
        let _ = writeln!(
            output,
            "- Высокие оценки (5 или 5+): {}.",
            buckets.high.join(", ")
        );
        let _ = writeln!(output);
    }
    if !buckets.medium.is_empty() {
        let _ = writeln!(output, "- Средние оценки (4 или 4+):");
        let _ = writeln!(output, "{}.", buckets.medium.join(", "));
    }
    if !buckets.low.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "- Низкие оценки (ниже 4): {}.",
            buckets.low.join(", ")
        );
    }

    if options.include_best {
        if let Some(best) = stats::best_student(students()) {
            let _ = writeln!(output);
            let _ = write!(output, "Лучший дежурный за неделю 👑: {}.", best.name);
        }
    }

    output
}

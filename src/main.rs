use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use duty_grades::clipboard::{self, CommandClipboard, CopyOutcome, FileClipboard};
use duty_grades::roster;
use duty_grades::stats;
use duty_grades::{
    generate_report_text, load_report_into_current, logging, FileStore, Grade, HistoryArchive,
    ReportOptions, ScheduleStore, Week, WeekEdit, WeekReport, Weekday,
};

#[derive(Parser)]
#[command(name = "duty-grades")]
#[command(about = "Weekly classroom duty grades: entry, statistics, reports and history", long_about = None)]
struct Cli {
    /// Directory holding the stored week, roster and history
    #[arg(long, env = "DUTY_DATA_DIR", default_value = ".duty-grades", global = true)]
    data_dir: PathBuf,

    /// Program that receives report text on stdin when copying
    #[arg(
        long,
        env = "DUTY_CLIPBOARD_CMD",
        default_value = "xclip -selection clipboard",
        global = true
    )]
    clipboard_cmd: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current week
    Show {
        #[arg(long)]
        day: Option<Weekday>,
    },
    /// Set a grade; an empty grade clears it
    Grade {
        day: Weekday,
        /// 1-based position or exact name
        student: String,
        grade: Grade,
    },
    /// Print statistics for the current week
    Stats,
    /// Print the shareable report text
    Report {
        /// Comma-separated days to include, e.g. ПН,СР
        #[arg(long, value_delimiter = ',')]
        days: Vec<Weekday>,
        #[arg(long)]
        no_stats: bool,
        #[arg(long)]
        no_best: bool,
        /// Copy the text to the clipboard
        #[arg(long)]
        copy: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Archive the current week in history
    Save,
    /// Clear all current grades
    ResetGrades,
    /// Export the current week as CSV
    Export {
        #[arg(long, default_value = "grades.csv")]
        out: PathBuf,
    },
    /// Browse archived weeks
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Edit the base roster
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Show { id: String },
    Copy { id: String },
    Load { id: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum RosterAction {
    Show,
    Add { day: Weekday, name: String },
    Remove { day: Weekday, student: String },
    Rename { day: Weekday, student: String, name: String },
    Lesson { day: Weekday, number: u32 },
    /// Replace the roster from a day,lesson,name CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Return to the built-in roster
    Reset,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let store = FileStore::new(&cli.data_dir);
    let schedule = ScheduleStore::new(&store);
    let history = HistoryArchive::new(&store);

    match cli.command {
        Commands::Show { day } => {
            let week = schedule.load_current_week();
            print_week(&week, day);
        }
        Commands::Grade {
            day,
            student,
            grade,
        } => {
            let week = schedule.load_current_week();
            let index = week.find_student(day, &student)?;
            let week = week.apply(WeekEdit::SetGrade { day, index, grade })?;
            schedule
                .save_current_week(&week)
                .context("failed to save current week")?;
            let name = &week.day(day).students[index].name;
            println!("{day}: {name} -> {}", display_grade(grade));
        }
        Commands::Stats => {
            let week = schedule.load_current_week();
            print_stats(&week);
        }
        Commands::Report {
            days,
            no_stats,
            no_best,
            copy,
            out,
        } => {
            let week = schedule.load_current_week();
            let mut options = ReportOptions {
                include_stats: !no_stats,
                include_best: !no_best,
                ..ReportOptions::default()
            };
            if !days.is_empty() {
                options.include_days = days.into_iter().collect::<BTreeSet<_>>();
            }
            let text = generate_report_text(&week, &options);

            if let Some(path) = out {
                std::fs::write(&path, &text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Report written to {}.", path.display());
            } else {
                println!("{text}");
            }
            if copy {
                copy_text(&cli.clipboard_cmd, &store, &text);
            }
        }
        Commands::Save => {
            let week = schedule.load_current_week();
            let report = history.save_report(&week)?;
            println!("Saved report {} ({}).", report.id, report.created_at);
        }
        Commands::ResetGrades => {
            schedule.reset_grades()?;
            println!("All current grades cleared. History is unchanged.");
        }
        Commands::Export { out } => {
            let week = schedule.load_current_week();
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            roster::write_grades_csv(&week, file)?;
            println!("Grades written to {}.", out.display());
        }
        Commands::History { action } => match action {
            HistoryAction::List => {
                let entries = history.list_history();
                if entries.is_empty() {
                    println!("No saved reports.");
                    return Ok(());
                }
                for report in entries {
                    println!(
                        "- {} {} graded {} of {}",
                        report.id,
                        report.created_at,
                        report.graded_count(),
                        report.student_count()
                    );
                }
            }
            HistoryAction::Show { id } => {
                let report = find_report(&history, &id)?;
                println!("{}", generate_report_text(&report.days, &ReportOptions::default()));
            }
            HistoryAction::Copy { id } => {
                let report = find_report(&history, &id)?;
                let text = generate_report_text(&report.days, &ReportOptions::default());
                copy_text(&cli.clipboard_cmd, &store, &text);
            }
            HistoryAction::Load { id } => {
                let report = find_report(&history, &id)?;
                load_report_into_current(&report, &schedule)?;
                println!("Report from {} is now the current week.", report.created_at);
            }
            HistoryAction::Delete { id } => {
                history.delete_report(&id)?;
                println!("Deleted {id}.");
            }
        },
        Commands::Roster { action } => {
            let base = schedule.load_base_schedule();
            let edited = match action {
                RosterAction::Show => {
                    print_week(&base, None);
                    return Ok(());
                }
                RosterAction::Reset => {
                    schedule.reset_schedule()?;
                    let fresh = schedule.reset_grades()?;
                    println!("Built-in roster restored.");
                    print_week(&fresh, None);
                    return Ok(());
                }
                RosterAction::Import { csv } => roster::import_roster_csv(&csv)
                    .with_context(|| format!("failed to import {}", csv.display()))?,
                RosterAction::Add { day, name } => {
                    base.apply(WeekEdit::AddStudent { day, name })?
                }
                RosterAction::Remove { day, student } => {
                    let index = base.find_student(day, &student)?;
                    base.apply(WeekEdit::RemoveStudent { day, index })?
                }
                RosterAction::Rename { day, student, name } => {
                    let index = base.find_student(day, &student)?;
                    base.apply(WeekEdit::RenameStudent { day, index, name })?
                }
                RosterAction::Lesson { day, number } => {
                    base.apply(WeekEdit::SetLessonNumber { day, number })?
                }
            };
            let roster = schedule
                .apply_custom_schedule(&edited)
                .context("roster was not saved")?;
            println!("Roster updated; current grades were cleared.");
            print_week(&roster, None);
        }
    }

    Ok(())
}

fn find_report(
    history: &HistoryArchive<&FileStore>,
    id: &str,
) -> anyhow::Result<WeekReport> {
    history
        .find_report(id)
        .with_context(|| format!("no saved report with id {id}"))
}

fn copy_text(clipboard_cmd: &str, store: &FileStore, text: &str) {
    let fallback = FileClipboard::new(store.root().join("clipboard.txt"));
    let outcome = match CommandClipboard::from_command_line(clipboard_cmd) {
        Ok(primary) => clipboard::copy_with_fallback(text, &primary, &fallback),
        Err(err) => {
            tracing::warn!(error = %err, "no clipboard command configured");
            clipboard::copy_with_fallback(text, &fallback, &fallback)
        }
    };
    match outcome {
        CopyOutcome::Primary => println!("Copied to clipboard."),
        CopyOutcome::Fallback(target) => println!("Clipboard unavailable, text saved to {target}."),
        CopyOutcome::Failed(reason) => println!("Could not copy the report: {reason}"),
    }
}

fn display_grade(grade: Grade) -> &'static str {
    if grade.is_graded() {
        grade.as_str()
    } else {
        "—"
    }
}

fn print_week(week: &Week, only: Option<Weekday>) {
    for day in week.days() {
        if only.is_some_and(|wanted| wanted != day.label) {
            continue;
        }
        println!("{} ({}), lesson {}", day.label, day.label.full_name(), day.lesson_number);
        for (position, student) in day.students.iter().enumerate() {
            println!("  {}. {} {}", position + 1, student.name, display_grade(student.grade));
        }
    }
}

fn print_stats(week: &Week) {
    let summary = stats::week_stats(week.days());
    println!("Graded {} of {}", summary.graded, summary.total);
    match summary.average {
        Some(avg) => println!("Average {avg:.2}"),
        None => println!("Average —"),
    }
    match &summary.best {
        Some(best) => println!("Best {} ({})", best.name, best.grade),
        None => println!("Best —"),
    }
    println!("Average by day:");
    for day in &summary.per_day {
        println!("- {}: {:.2}", day.day, day.average);
    }
    for (title, names) in [
        ("High (5-, 5, 5+)", &summary.high),
        ("Medium (4-, 4, 4+)", &summary.medium),
        ("Low (below 4)", &summary.low),
    ] {
        if !names.is_empty() {
            println!("{title}: {}", names.join(", "));
        }
    }
}

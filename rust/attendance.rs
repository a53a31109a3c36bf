use crate::error::AttendanceError;
use crate::models::{AttendanceRecord, AttendanceSummary, CourseKind};

const BOLD_WHITE: &str = "\x1b[1;97m";
const RED: &str = "\x1b[38;2;255;0;0m";
const RESET: &str = "\x1b[0m";

/// Absence hours allowed per credit hour. Labs have three contact hours per
/// credit, so their allowance is three times larger.
const THEORY_HOURS_PER_CREDIT: f64 = 4.0;
const LAB_HOURS_PER_CREDIT: f64 = 12.0;

pub fn course_kind(subject: &str) -> CourseKind {
    match subject.split_whitespace().last() {
        Some("Lab") => CourseKind::Lab,
        _ => CourseKind::Theory,
    }
}

pub fn summarize(record: &AttendanceRecord) -> Result<AttendanceSummary, AttendanceError> {
    let credits = record.credits;
    if !credits.is_finite() || credits <= 0.0 {
        return Err(AttendanceError::InvalidCredits {
            subject: record.subject.clone(),
            credits,
        });
    }

    let kind = course_kind(&record.subject);
    let max_absences = match kind {
        CourseKind::Lab => credits * LAB_HOURS_PER_CREDIT,
        CourseKind::Theory => credits * THEORY_HOURS_PER_CREDIT,
    };
    let remaining_absences = max_absences - record.absences;

    // A theory session lasts credits / 2 hours, a lab session credits * 3.
    let to_classes = |hours: f64| match kind {
        CourseKind::Lab => hours / (credits * 3.0),
        CourseKind::Theory => hours / credits * 2.0,
    };

    tracing::debug!(subject = %record.subject, ?kind, max_absences, remaining_absences, "Attendance quota");
    Ok(AttendanceSummary {
        subject: record.subject.trim().to_string(),
        kind,
        max_absences,
        remaining_absences,
        remaining_classes: to_classes(remaining_absences),
        max_classes: to_classes(max_absences),
    })
}

pub fn summarize_all(records: &[AttendanceRecord]) -> Result<Vec<AttendanceSummary>, AttendanceError> {
    records.iter().map(summarize).collect()
}

fn format_count(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}

pub fn render(summaries: &[AttendanceSummary], colored: bool) -> String {
    let mut out = String::new();
    for summary in summaries {
        let counts = format!(
            "{}/{}",
            format_count(summary.remaining_classes),
            format_count(summary.max_classes)
        );
        let line = if !colored {
            format!("{}: {}", summary.subject, counts)
        } else if summary.remaining_absences < 0.0 {
            format!("{}{}{}: {}{}{}", BOLD_WHITE, summary.subject, RESET, RED, counts, RESET)
        } else {
            format!("{}{}{}: {}", BOLD_WHITE, summary.subject, RESET, counts)
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

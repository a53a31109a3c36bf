use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DateParseError;
use crate::models::{ClassifiedDeadline, DeadlineRecord, Shade, Tier};

pub const DUE_DATE_FORMAT: &str = "%d %B %Y";

/// chrono alone also takes "Jul" for "%B" and lets the separators collapse.
static DUE_DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\d{1,2}\s+(January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}$",
    )
    .unwrap()
});

pub fn parse_due_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    if !DUE_DATE_SHAPE.is_match(trimmed) {
        return Err(DateParseError {
            input: raw.to_string(),
            source: None,
        });
    }
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT).map_err(|source| DateParseError {
        input: raw.to_string(),
        source: Some(source),
    })
}

/// Tier, shade and push priority for a deadline `days_left` days away.
/// Overdue rows still listed by the portal get the least urgent bucket.
pub fn bucket(days_left: i64) -> (Tier, Shade, u8) {
    match days_left {
        0 => (Tier::DueToday, Shade::Red, 5),
        1..=4 => {
            let shades = [Shade::YellowBright, Shade::YellowMedium, Shade::YellowDark];
            let idx = (days_left - 1).min(2) as usize;
            (Tier::DueSoon, shades[idx], 4)
        }
        5..=7 => (Tier::DueLater, Shade::GreenBright, 3),
        8..=14 => (Tier::DueLater, Shade::GreenMedium, 3),
        _ => (Tier::DueLater, Shade::GreenDark, 2),
    }
}

pub fn classify_record(record: &DeadlineRecord, today: NaiveDate) -> Result<ClassifiedDeadline, DateParseError> {
    let due_date = parse_due_date(&record.due)?;
    let days_left = (due_date - today).num_days();
    let (tier, shade, notify_priority) = bucket(days_left);
    let item = ClassifiedDeadline {
        subject: record.subject.clone(),
        assignment: record.assignment.trim().to_string(),
        due_date,
        days_left,
        submitted: record.submitted,
        extended: record.extended,
        tier,
        shade,
        notify_priority,
    };
    tracing::debug!(
        subject = %item.subject,
        days_left,
        tier = ?item.tier,
        color_rank = item.color_rank(),
        priority = notify_priority,
        "Classified deadline"
    );
    Ok(item)
}

/// Classifies a whole batch against one reference date, sorted by due date.
/// The first unparseable date aborts the batch.
pub fn classify(records: &[DeadlineRecord], today: NaiveDate) -> Result<Vec<ClassifiedDeadline>, DateParseError> {
    let mut classified = records
        .iter()
        .map(|record| classify_record(record, today))
        .collect::<Result<Vec<_>, _>>()?;
    classified.sort_by_key(|item| item.due_date);
    Ok(classified)
}

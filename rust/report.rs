use chrono::{Datelike, NaiveDate};

use crate::classifier::parse_due_date;
use crate::models::{ClassifiedDeadline, DeadlineRecord, Notification, NotificationLevel, Shade, Tier};
use crate::subjects::Abbreviations;

const SECTIONS: [Tier; 3] = [Tier::DueToday, Tier::DueSoon, Tier::DueLater];

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub abbreviate: bool,
    pub colored: bool,
}

/// Who gets pushed about what.
#[derive(Debug, Clone, Copy)]
pub struct NotifyPolicy {
    pub level: NotificationLevel,
    pub notify_submitted: bool,
    pub channels_enabled: bool,
}

impl NotifyPolicy {
    pub fn should_notify(&self, item: &ClassifiedDeadline) -> bool {
        self.channels_enabled && self.level.allows(item.days_left) && (!item.submitted || self.notify_submitted)
    }
}

fn days_status(days_left: i64) -> String {
    match days_left {
        0 => " (Due Today)".to_string(),
        1 => " (1 Day Left)".to_string(),
        -1 => " (1 Day Overdue)".to_string(),
        d if d > 0 => format!(" ({} Days Left)", d),
        d => format!(" ({} Days Overdue)", -d),
    }
}

/// Uncolored display line, also used as the push notification body.
pub fn plain_line(item: &ClassifiedDeadline, abbreviations: &Abbreviations, abbreviate: bool) -> String {
    let subject = if abbreviate {
        abbreviations.shorten(&item.subject)
    } else {
        item.subject.clone()
    };

    let mut line = subject;
    if !item.assignment.is_empty() {
        line.push_str(" - ");
        line.push_str(&item.assignment);
    }
    line.push_str(&format!(" - {}", item.due_date.format("%-d %B")));
    line.push_str(&days_status(item.days_left));
    if item.submitted {
        line.push_str(" (Submitted)");
    }
    if item.extended {
        line.push_str(" (Extended)");
    }
    line
}

pub fn render_line(item: &ClassifiedDeadline, abbreviations: &Abbreviations, options: RenderOptions) -> String {
    let line = plain_line(item, abbreviations, options.abbreviate);
    if options.colored {
        format!("{}{}{}", item.shade.ansi(), line, Shade::RESET)
    } else {
        line
    }
}

/// Sectioned report. Expects `items` already sorted by due date.
pub fn render_sections(items: &[ClassifiedDeadline], abbreviations: &Abbreviations, options: RenderOptions) -> String {
    let mut out = String::new();
    for tier in SECTIONS {
        let lines: Vec<_> = items
            .iter()
            .filter(|item| item.tier == tier)
            .map(|item| render_line(item, abbreviations, options))
            .collect();
        if lines.is_empty() {
            continue;
        }
        out.push_str(&format!("=== {} ===\n", tier.heading()));
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn notification_queue(
    items: &[ClassifiedDeadline],
    policy: &NotifyPolicy,
    abbreviations: &Abbreviations,
    abbreviate: bool,
) -> Vec<Notification> {
    items
        .iter()
        .filter(|item| policy.should_notify(item))
        .map(|item| Notification {
            title: item.tier.notification_title().to_string(),
            message: plain_line(item, abbreviations, abbreviate),
            priority: item.notify_priority,
        })
        .collect()
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn short_date(date: NaiveDate) -> String {
    format!("{}{} {}", date.day(), ordinal_suffix(date.day()), date.format("%b"))
}

/// One line per record, soonest first. Rows with an unreadable date keep
/// their raw text and go to the end in scrape order.
pub fn render_condensed(records: &[DeadlineRecord], abbreviations: &Abbreviations) -> String {
    let mut dated = Vec::new();
    let mut undated = Vec::new();
    for record in records {
        let subject = abbreviations.shorten(&record.subject);
        match parse_due_date(&record.due) {
            Ok(date) => dated.push((date, format!("{} - {}", subject, short_date(date)))),
            Err(err) => {
                tracing::warn!(subject = %record.subject, error = %err, "Keeping deadline with unreadable date");
                undated.push(format!("{} - {}", subject, record.due.trim()));
            }
        }
    }
    dated.sort_by_key(|(date, _)| *date);

    let mut out = String::new();
    for line in dated.into_iter().map(|(_, line)| line).chain(undated) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::classifier::{bucket, classify};

    const PLAIN: RenderOptions = RenderOptions {
        abbreviate: false,
        colored: false,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    fn item(subject: &str, days_left: i64, submitted: bool, extended: bool) -> ClassifiedDeadline {
        let (tier, shade, notify_priority) = bucket(days_left);
        ClassifiedDeadline {
            subject: subject.to_string(),
            assignment: String::new(),
            due_date: today() + chrono::Duration::days(days_left),
            days_left,
            submitted,
            extended,
            tier,
            shade,
            notify_priority,
        }
    }

    fn record(subject: &str, due: &str) -> DeadlineRecord {
        DeadlineRecord {
            subject: subject.to_string(),
            assignment: String::new(),
            due: due.to_string(),
            submitted: false,
            extended: false,
        }
    }

    fn policy(level: NotificationLevel, notify_submitted: bool, channels_enabled: bool) -> NotifyPolicy {
        NotifyPolicy {
            level,
            notify_submitted,
            channels_enabled,
        }
    }

    #[test]
    fn due_today_marker_only_on_day_zero() {
        let abbreviations = Abbreviations::default();
        for days in -20..=20 {
            let line = plain_line(&item("OS", days, false, false), &abbreviations, false);
            assert_eq!(line.contains("(Due Today)"), days == 0, "days_left = {}", days);
        }
    }

    #[test]
    fn line_layout() {
        let abbreviations = Abbreviations::default();
        let mut assignment = item("Operating Systems", 3, false, false);
        assignment.assignment = "Assignment 2".to_string();
        assert_eq!(
            plain_line(&assignment, &abbreviations, false),
            "Operating Systems - Assignment 2 - 23 July (3 Days Left)"
        );
        assert_eq!(
            plain_line(&assignment, &abbreviations, true),
            "OS - Assignment 2 - 23 July (3 Days Left)"
        );
        assert_eq!(
            plain_line(&item("CN", 1, false, false), &abbreviations, false),
            "CN - 21 July (1 Day Left)"
        );
        assert_eq!(
            plain_line(&item("CN", -3, false, false), &abbreviations, false),
            "CN - 17 July (3 Days Overdue)"
        );
    }

    #[test]
    fn submitted_and_extended_markers_are_independent() {
        let abbreviations = Abbreviations::default();
        let both = plain_line(&item("OS", 0, true, true), &abbreviations, false);
        assert_eq!(both, "OS - 20 July (Due Today) (Submitted) (Extended)");

        let submitted_only = plain_line(&item("OS", 0, true, false), &abbreviations, false);
        assert!(submitted_only.contains("(Submitted)"));
        assert!(!submitted_only.contains("(Extended)"));

        let extended_only = plain_line(&item("OS", 0, false, true), &abbreviations, false);
        assert!(!extended_only.contains("(Submitted)"));
        assert!(extended_only.contains("(Extended)"));
    }

    #[test]
    fn colored_lines_are_wrapped_in_their_shade() {
        let abbreviations = Abbreviations::default();
        let options = RenderOptions {
            abbreviate: false,
            colored: true,
        };
        let line = render_line(&item("OS", 0, false, false), &abbreviations, options);
        assert_eq!(line, format!("{}OS - 20 July (Due Today){}", Shade::Red.ansi(), Shade::RESET));
        let later = render_line(&item("OS", 20, false, false), &abbreviations, options);
        assert!(later.starts_with(Shade::GreenDark.ansi()));
    }

    #[test]
    fn sections_in_fixed_order_without_empty_ones() {
        let abbreviations = Abbreviations::default();
        let records = [
            record("CN", "30 July 2025"),
            record("OS", "20 July 2025"),
            record("AI", "10 August 2025"),
        ];
        let items = classify(&records, today()).unwrap();
        let out = render_sections(&items, &abbreviations, PLAIN);
        assert_eq!(
            out,
            "=== Due Today ===\n\
             OS - 20 July (Due Today)\n\
             \n\
             === Due After 4 Days ===\n\
             CN - 30 July (10 Days Left)\n\
             AI - 10 August (21 Days Left)\n\
             \n"
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_sections(&[], &Abbreviations::default(), PLAIN), "");
    }

    #[test]
    fn eligibility_matrix() {
        let levels = [
            NotificationLevel::Today,
            NotificationLevel::FourDays,
            NotificationLevel::Week,
            NotificationLevel::Fortnight,
            NotificationLevel::Always,
        ];
        for days_left in [-2, 0, 3, 4, 6, 10, 14, 30] {
            for level in levels {
                for submitted in [false, true] {
                    for notify_submitted in [false, true] {
                        for channels_enabled in [false, true] {
                            let candidate = item("OS", days_left, submitted, false);
                            let expected = channels_enabled
                                && level.threshold().map_or(true, |max| days_left <= max)
                                && (!submitted || notify_submitted);
                            let rule = policy(level, notify_submitted, channels_enabled);
                            assert_eq!(rule.should_notify(&candidate), expected);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn due_today_unsubmitted_is_shown_and_queued() {
        let abbreviations = Abbreviations::default();
        let items = vec![item("OS", 0, false, false)];
        let out = render_sections(&items, &abbreviations, PLAIN);
        assert!(out.starts_with("=== Due Today ===\nOS - 20 July (Due Today)\n"));

        let queue = notification_queue(&items, &policy(NotificationLevel::FourDays, false, true), &abbreviations, false);
        assert_eq!(
            queue,
            vec![Notification {
                title: "Assignment Due Today".to_string(),
                message: "OS - 20 July (Due Today)".to_string(),
                priority: 5,
            }]
        );
    }

    #[test]
    fn due_today_submitted_is_shown_but_not_queued() {
        let abbreviations = Abbreviations::default();
        let items = vec![item("OS", 0, true, false)];
        let out = render_sections(&items, &abbreviations, PLAIN);
        assert!(out.contains("=== Due Today ===\nOS - 20 July (Due Today) (Submitted)\n"));
        let queue = notification_queue(&items, &policy(NotificationLevel::FourDays, false, true), &abbreviations, false);
        assert!(queue.is_empty());
    }

    #[test]
    fn ten_days_out_is_later_and_quiet_up_to_a_week() {
        let abbreviations = Abbreviations::default();
        let items = vec![item("OS", 10, false, false)];
        let out = render_sections(&items, &abbreviations, PLAIN);
        assert!(out.starts_with("=== Due After 4 Days ===\n"));
        for level in [NotificationLevel::Today, NotificationLevel::FourDays, NotificationLevel::Week] {
            assert!(notification_queue(&items, &policy(level, true, true), &abbreviations, false).is_empty());
        }
        let queue = notification_queue(&items, &policy(NotificationLevel::Fortnight, false, true), &abbreviations, false);
        assert_eq!(queue[0].priority, 3);
        assert_eq!(queue[0].title, "Upcoming Assignment");
    }

    #[test]
    fn queue_messages_carry_no_color_codes() {
        let abbreviations = Abbreviations::default();
        let items = vec![item("OS", 2, false, false)];
        let queue = notification_queue(&items, &policy(NotificationLevel::Always, false, true), &abbreviations, false);
        assert!(!queue[0].message.contains('\x1b'));
        assert_eq!(queue[0].priority, 4);
    }

    #[test]
    fn ordinal_suffixes() {
        let cases = [(1, "st"), (2, "nd"), (3, "rd"), (4, "th"), (11, "th"), (12, "th"), (13, "th"), (21, "st"), (22, "nd"), (23, "rd"), (31, "st")];
        for (day, suffix) in cases {
            assert_eq!(ordinal_suffix(day), suffix, "day {}", day);
        }
    }

    #[test]
    fn condensed_list_sorted_with_bad_dates_last() {
        let abbreviations = Abbreviations::default();
        let records = [
            record("Computer Networks", "2 August 2025"),
            record("Operating Systems", "next week"),
            record("Islamic Studies", "21 July 2025"),
            record("History", "??"),
            record("Artificial Intelligence", "2 August 2025"),
        ];
        assert_eq!(
            render_condensed(&records, &abbreviations),
            "Islamic Studies - 21st Jul\n\
             CN - 2nd Aug\n\
             AI - 2nd Aug\n\
             OS - next week\n\
             History - ??\n"
        );
    }

    #[test]
    fn abbreviated_month_counts_as_unreadable() {
        let abbreviations = Abbreviations::default();
        let records = [
            record("Operating Systems", "24 Jul 2025"),
            record("Computer Networks", "30 July 2025"),
            record("Linear Algebra", "24July 2025"),
        ];
        assert_eq!(
            render_condensed(&records, &abbreviations),
            "CN - 30th Jul\n\
             OS - 24 Jul 2025\n\
             LA - 24July 2025\n"
        );
    }
}

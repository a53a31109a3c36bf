use chrono::NaiveDate;
use serde::Deserialize;

/// One assignment row as handed over by the portal scraper.
#[derive(Debug, Clone, Deserialize)]
pub struct DeadlineRecord {
    pub subject: String,
    #[serde(default)]
    pub assignment: String,
    /// Due date exactly as shown on the portal, e.g. "24 July 2025".
    pub due: String,
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub extended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    DueToday,
    DueSoon,
    DueLater,
}

impl Tier {
    pub fn heading(self) -> &'static str {
        match self {
            Tier::DueToday => "Due Today",
            Tier::DueSoon => "Due Within the Next 4 Days",
            Tier::DueLater => "Due After 4 Days",
        }
    }

    pub fn notification_title(self) -> &'static str {
        match self {
            Tier::DueToday => "Assignment Due Today",
            Tier::DueSoon => "Assignment Due Soon",
            Tier::DueLater => "Upcoming Assignment",
        }
    }
}

/// Terminal shade of a rendered line, ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Shade {
    Red,
    YellowBright,
    YellowMedium,
    YellowDark,
    GreenBright,
    GreenMedium,
    GreenDark,
}

impl Shade {
    pub const RESET: &'static str = "\x1b[0m";

    pub fn ansi(self) -> &'static str {
        match self {
            Shade::Red => "\x1b[38;2;255;0;0m",
            Shade::YellowBright => "\x1b[38;2;251;255;0m",
            Shade::YellowMedium => "\x1b[38;2;255;241;49m",
            Shade::YellowDark => "\x1b[38;2;245;228;0m",
            Shade::GreenBright => "\x1b[38;2;25;189;25m",
            Shade::GreenMedium => "\x1b[38;2;12;131;12m",
            Shade::GreenDark => "\x1b[38;2;9;92;9m",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifiedDeadline {
    pub subject: String,
    pub assignment: String,
    pub due_date: NaiveDate,
    pub days_left: i64,
    pub submitted: bool,
    pub extended: bool,
    pub tier: Tier,
    pub shade: Shade,
    pub notify_priority: u8,
}

impl ClassifiedDeadline {
    /// Position of the shade inside its tier, 0 being the most urgent.
    pub fn color_rank(&self) -> u8 {
        match self.shade {
            Shade::Red | Shade::YellowBright | Shade::GreenBright => 0,
            Shade::YellowMedium | Shade::GreenMedium => 1,
            Shade::YellowDark | Shade::GreenDark => 2,
        }
    }
}

/// How many days ahead of a deadline push notifications are still sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationLevel {
    #[default]
    Today,
    FourDays,
    Week,
    Fortnight,
    Always,
}

impl NotificationLevel {
    pub fn threshold(self) -> Option<i64> {
        match self {
            NotificationLevel::Today => Some(0),
            NotificationLevel::FourDays => Some(4),
            NotificationLevel::Week => Some(7),
            NotificationLevel::Fortnight => Some(14),
            NotificationLevel::Always => None,
        }
    }

    pub fn allows(self, days_left: i64) -> bool {
        self.threshold().map_or(true, |max| days_left <= max)
    }
}

impl TryFrom<u8> for NotificationLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NotificationLevel::Today),
            1 => Ok(NotificationLevel::FourDays),
            2 => Ok(NotificationLevel::Week),
            3 => Ok(NotificationLevel::Fortnight),
            4 => Ok(NotificationLevel::Always),
            other => Err(format!("expected a level between 0 and 4, got {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub priority: u8,
}

/// One course row from the CMS attendance page.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRecord {
    pub subject: String,
    pub credits: f64,
    /// Absent contact hours so far.
    pub absences: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseKind {
    Theory,
    Lab,
}

#[derive(Debug, Clone)]
pub struct AttendanceSummary {
    pub subject: String,
    pub kind: CourseKind,
    pub max_absences: f64,
    pub remaining_absences: f64,
    pub remaining_classes: f64,
    pub max_classes: f64,
}

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::NotificationLevel;
use crate::notify::DEFAULT_NTFY_SERVER;
use crate::subjects;

const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 5;

/// Blank values count as unset.
fn lookup_trimmed<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Input and output locations shared by every subcommand. Command-line flags
/// are layered on top in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub deadlines_file: Option<PathBuf>,
    pub attendance_file: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            deadlines_file: lookup_trimmed(&lookup, "DEADLINES_FILE").map(PathBuf::from),
            attendance_file: lookup_trimmed(&lookup, "ATTENDANCE_FILE").map(PathBuf::from),
            download_dir: lookup_trimmed(&lookup, "DOWNLOAD_DIR").map(PathBuf::from),
        })
    }

    pub fn require_deadlines_file(&self) -> Result<PathBuf, ConfigError> {
        self.deadlines_file.clone().ok_or(ConfigError::Missing("DEADLINES_FILE"))
    }

    pub fn require_attendance_file(&self) -> Result<PathBuf, ConfigError> {
        self.attendance_file.clone().ok_or(ConfigError::Missing("ATTENDANCE_FILE"))
    }

    pub fn require_download_dir(&self) -> Result<PathBuf, ConfigError> {
        self.download_dir.clone().ok_or(ConfigError::Missing("DOWNLOAD_DIR"))
    }
}

/// Report and push settings, loaded by the `deadlines` command only.
#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub level: NotificationLevel,
    pub notify_submitted: bool,
    pub kde_device: Option<String>,
    pub ntfy_topic: Option<String>,
    pub ntfy_server: String,
    pub notify_timeout: Duration,
    pub abbreviations: Vec<(String, String)>,
}

impl NotifySettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup_trimmed(&lookup, name);

        let level = match get("NOTIFICATION_LEVEL") {
            Some(raw) => parse_level(&raw).map_err(|reason| ConfigError::Invalid {
                name: "NOTIFICATION_LEVEL",
                value: raw,
                reason,
            })?,
            None => NotificationLevel::default(),
        };

        let notify_submitted = match get("NOTIFY_SUBMITTED") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "NOTIFY_SUBMITTED",
                value: raw,
                reason: "expected true or false".to_string(),
            })?,
            None => false,
        };

        let notify_timeout = match get("NOTIFY_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "NOTIFY_TIMEOUT_SECS",
                        value: raw,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        };

        let abbreviations = match get("SUBJECT_ABBREVIATIONS") {
            Some(raw) => subjects::parse_entries(&raw).map_err(|reason| ConfigError::Invalid {
                name: "SUBJECT_ABBREVIATIONS",
                value: raw,
                reason,
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            level,
            notify_submitted,
            kde_device: get("KDE_DEVICE_ID"),
            ntfy_topic: get("NTFY_TOPIC"),
            ntfy_server: get("NTFY_SERVER").unwrap_or_else(|| DEFAULT_NTFY_SERVER.to_string()),
            notify_timeout,
            abbreviations,
        })
    }

    pub fn channels_enabled(&self) -> bool {
        self.kde_device.is_some() || self.ntfy_topic.is_some()
    }
}

pub fn parse_level(raw: &str) -> Result<NotificationLevel, String> {
    let value = raw
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("expected a level between 0 and 4, got {:?}", raw))?;
    NotificationLevel::try_from(value)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

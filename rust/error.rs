use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment, .env file, or on the command line")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
#[error("invalid due date {input:?}, expected \"day month year\" such as \"24 July 2025\"")]
pub struct DateParseError {
    pub input: String,
    #[source]
    pub source: Option<chrono::ParseError>,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed records in {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum NotificationSendError {
    #[error("failed to launch {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("request failed")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("course {subject:?} has invalid credit hours {credits}")]
    InvalidCredits { subject: String, credits: f64 },
}

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::NotificationSendError;
use crate::models::Notification;

pub const DEFAULT_KDE_PROGRAM: &str = "kdeconnect-cli";
pub const DEFAULT_NTFY_SERVER: &str = "https://ntfy.sh";

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> String;

    async fn send(&self, notification: &Notification) -> Result<(), NotificationSendError>;
}

/// Pings a paired phone through `kdeconnect-cli`.
pub struct KdeConnect {
    device: String,
    program: String,
    timeout: Duration,
}

impl KdeConnect {
    pub fn new(device: impl Into<String>, timeout: Duration) -> Self {
        Self {
            device: device.into(),
            program: DEFAULT_KDE_PROGRAM.to_string(),
            timeout,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl Notifier for KdeConnect {
    fn name(&self) -> String {
        format!("kdeconnect:{}", self.device)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationSendError> {
        let mut command = Command::new(&self.program);
        command
            .arg("--device")
            .arg(&self.device)
            .arg("--ping-msg")
            .arg(&notification.message)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| NotificationSendError::Timeout(self.timeout))?
            .map_err(|source| NotificationSendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(NotificationSendError::ExitStatus {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Publishes to an ntfy topic.
pub struct Ntfy {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl Ntfy {
    pub fn new(server: &str, topic: &str, timeout: Duration) -> Result<Self, NotificationSendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: format!("{}/{}", server.trim_end_matches('/'), topic.trim_matches('/')),
            timeout,
        })
    }
}

#[async_trait]
impl Notifier for Ntfy {
    fn name(&self) -> String {
        format!("ntfy:{}", self.url)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationSendError> {
        let resp = self
            .http
            .post(&self.url)
            .header("Title", &notification.title)
            .header("Priority", notification.priority.to_string())
            .body(notification.message.clone())
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    NotificationSendError::Timeout(self.timeout)
                } else {
                    NotificationSendError::Http(err)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotificationSendError::Rejected { status, body });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends every queued notification through every channel, one at a time.
/// A failed send is logged and skipped.
pub async fn dispatch(channels: &[Box<dyn Notifier>], queue: &[Notification]) -> DispatchReport {
    let mut report = DispatchReport::default();
    if queue.is_empty() {
        tracing::info!("No deadlines to notify about");
        return report;
    }

    for channel in channels {
        let channel_name = channel.name();
        tracing::info!(channel = %channel_name, count = queue.len(), "Sending notifications");
        for notification in queue {
            match channel.send(notification).await {
                Ok(()) => {
                    report.sent += 1;
                    tracing::debug!(channel = %channel_name, message = %notification.message, "Notification sent");
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::error!(
                        channel = %channel_name,
                        message = %notification.message,
                        error = %err,
                        "Failed to send notification"
                    );
                }
            }
        }
    }

    tracing::info!(sent = report.sent, failed = report.failed, "Notification dispatch finished");
    report
}

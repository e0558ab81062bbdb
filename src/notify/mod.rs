//! Best-effort release notifications.
//!
//! Delivery problems are logged and swallowed: a notification can never
//! change the outcome of a release.

use crate::config::SlackCredentials;
use crate::error::NotifyError;
use crate::upload::UploadMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slack Web API endpoint for posting messages
pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What happened to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// No channel configured, nothing sent
    Skipped,
    /// Message accepted by the channel
    Delivered,
    /// Delivery attempted and failed
    Failed,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    markdown_text: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts completion messages to a Slack channel
#[derive(Debug, Clone)]
pub struct Notifier {
    credentials: Option<SlackCredentials>,
    endpoint: String,
}

impl Notifier {
    /// Create a notifier; `None` credentials disable it
    pub fn new(credentials: Option<SlackCredentials>) -> Self {
        Self {
            credentials,
            endpoint: SLACK_POST_MESSAGE_URL.to_string(),
        }
    }

    /// Override the API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Whether a channel is configured
    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Send `message`, never failing.
    ///
    /// Without credentials this returns [`NotifyOutcome::Skipped`] without
    /// any network access.
    pub async fn notify(&self, message: &str) -> NotifyOutcome {
        let Some(credentials) = &self.credentials else {
            log::debug!("No notification channel configured, skipping");
            return NotifyOutcome::Skipped;
        };

        match self.deliver(credentials, message).await {
            Ok(()) => {
                log::info!("Posted release notification to {}", credentials.channel_id);
                NotifyOutcome::Delivered
            }
            Err(e) => {
                log::warn!("{e}");
                NotifyOutcome::Failed
            }
        }
    }

    async fn deliver(&self, credentials: &SlackCredentials, message: &str) -> Result<(), NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let response = client
            .post(&self.endpoint)
            .bearer_auth(&credentials.token)
            .json(&PostMessage {
                channel: &credentials.channel_id,
                markdown_text: message,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: PostMessageResponse = response.json().await?;
        if body.ok {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                reason: body.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// Completion message posted after a successful release
pub fn completion_message(version: &str, elapsed: Duration, mode: UploadMode) -> String {
    format!(
        ":tada::godot: Created and uploaded version *{version}* to Steam.\n\
         Make sure to mark the build as latest in the Steamworks API to make it public.\n\
         Exporting and packaging took {:.1}s ({mode}).",
        elapsed.as_secs_f64()
    )
}

//! Notification dispatch to Zoho Cliq
//!
//! Two delivery paths: a POST to a pre-shared incoming-webhook URL, or a
//! channel message through the OAuth API. When both credentials are
//! supplied the webhook wins. Requests are ephemeral; nothing here touches
//! the database.

use crate::error::ApiError;
use crate::services::cliq::CliqClient;
use chrono::Utc;
use focusflow_shared::types::{NotificationType, NotifyOutcome};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

/// A single notification to deliver, with metadata already enriched by the
/// route handler
#[derive(Debug, Clone)]
pub struct CliqNotification {
    pub webhook_url: Option<String>,
    pub access_token: Option<String>,
    pub channel_id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub notification_type: NotificationType,
    pub metadata: Map<String, Value>,
}

/// Rich-card payload for the webhook path
#[derive(Debug, Clone, Serialize)]
pub struct CliqMessage {
    pub card: CliqCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct CliqCard {
    pub theme: String,
    pub title: String,
    pub sections: Vec<CardSection>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardSection {
    pub widgets: Vec<CardWidget>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardWidget {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Notification dispatch service
pub struct NotificationService;

impl NotificationService {
    /// Send a notification using whichever delivery path is configured
    ///
    /// Priority: webhookUrl over accessToken+channelId.
    pub async fn send(
        http: &reqwest::Client,
        cliq: &CliqClient,
        note: &CliqNotification,
    ) -> Result<NotifyOutcome, ApiError> {
        if let Some(url) = &note.webhook_url {
            return Self::send_via_webhook(http, url, note).await;
        }

        if let (Some(token), Some(channel)) = (&note.access_token, &note.channel_id) {
            return Self::send_via_oauth(cliq, token, channel, note).await;
        }

        Err(ApiError::Validation(
            "Either webhookUrl, or (accessToken and channelId) must be provided".to_string(),
        ))
    }

    /// POST the formatted card to an incoming-webhook URL
    async fn send_via_webhook(
        http: &reqwest::Client,
        webhook_url: &str,
        note: &CliqNotification,
    ) -> Result<NotifyOutcome, ApiError> {
        if webhook_url.is_empty() {
            return Err(ApiError::Validation(
                "Webhook URL is required for webhook notifications".to_string(),
            ));
        }
        if !webhook_url.starts_with("https://") {
            // Surfaces as a 500 with the delivery prefix, matching what
            // callers of this endpoint already handle
            return Err(ApiError::Delivery(
                "Webhook notification failed: Webhook URL must be a valid HTTPS URL".to_string(),
            ));
        }

        let payload = Self::format_cliq_message(
            note.title.as_deref(),
            note.message.as_deref(),
            note.notification_type,
            &note.metadata,
        );

        info!(
            webhook_url = %truncate(webhook_url, 50),
            kind = ?note.notification_type,
            "Sending notification via webhook"
        );

        let response = http
            .post(webhook_url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                error!("Failed to send webhook notification: {}", e);
                ApiError::Delivery(format!("Webhook notification failed: {}", e))
            })?;

        let status = response.status().as_u16();
        let data = response.json::<Value>().await.unwrap_or(Value::Null);

        info!(status, "Webhook notification sent successfully");

        Ok(NotifyOutcome {
            success: true,
            method: "webhook".to_string(),
            status: Some(status),
            channel_id: None,
            data,
        })
    }

    /// Send a plain-text message to a channel via the OAuth API
    ///
    /// The card format is not guaranteed to be supported by the
    /// channel-message call, so a "{title}: {message}" fallback is sent.
    async fn send_via_oauth(
        cliq: &CliqClient,
        access_token: &str,
        channel_id: &str,
        note: &CliqNotification,
    ) -> Result<NotifyOutcome, ApiError> {
        if access_token.is_empty() {
            return Err(ApiError::Validation(
                "Access token is required for OAuth notifications".to_string(),
            ));
        }
        if channel_id.is_empty() {
            return Err(ApiError::Validation(
                "Channel ID is required for OAuth notifications".to_string(),
            ));
        }

        let text = format!(
            "{}: {}",
            note.title.as_deref().unwrap_or("FocusFlow"),
            note.message.as_deref().unwrap_or_default()
        );

        info!(channel_id, "Sending notification via OAuth");

        let data = cliq
            .send_channel_message(access_token, channel_id, &text)
            .await
            .map_err(|e| {
                error!(channel_id, "Failed to send OAuth notification: {}", e);
                ApiError::Delivery(format!("OAuth notification failed: {}", e))
            })?;

        info!(channel_id, "OAuth notification sent successfully");

        Ok(NotifyOutcome {
            success: true,
            method: "oauth".to_string(),
            status: None,
            channel_id: Some(channel_id.to_string()),
            data,
        })
    }

    /// Build the rich-card payload
    ///
    /// Pure function: the input metadata is cloned, never mutated. The
    /// echo always carries a server timestamp and the fixed source tag.
    pub fn format_cliq_message(
        title: Option<&str>,
        message: Option<&str>,
        kind: NotificationType,
        metadata: &Map<String, Value>,
    ) -> CliqMessage {
        let mut meta = metadata.clone();
        meta.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        meta.insert("source".to_string(), Value::String("FocusFlow".to_string()));

        CliqMessage {
            card: CliqCard {
                theme: "modern".to_string(),
                title: format!("{} {}", kind.emoji(), title.unwrap_or("FocusFlow Notification")),
                sections: vec![CardSection {
                    widgets: vec![CardWidget {
                        kind: "text".to_string(),
                        text: message.unwrap_or("No message provided").to_string(),
                    }],
                }],
                metadata: meta,
            },
        }
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let head: String = value.chars().take(max).collect();
        format!("{}...", head)
    }
}

//! Notification routes
//!
//! POST /notify/cliq relays a notification to Zoho Cliq via webhook or
//! OAuth. Authentication is optional: a webhook URL is itself a
//! credential, but when a bearer token is present the user id is recorded
//! in the card metadata.

use crate::auth::OptionalAuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::services::{CliqNotification, NotificationService};
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use focusflow_shared::types::{ApiResponse, NotifyOutcome, NotifyRequest};
use serde_json::Value;
use tracing::info;

/// Create notification routes
pub fn notify_routes() -> Router<AppState> {
    Router::new().route("/cliq", post(send_cliq_notification))
}

/// Send a notification to Zoho Cliq
///
/// POST /notify/cliq
async fn send_cliq_notification(
    State(state): State<AppState>,
    OptionalAuthUser(auth_user): OptionalAuthUser,
    ValidatedJson(req): ValidatedJson<NotifyRequest>,
) -> ApiResult<Json<ApiResponse<NotifyOutcome>>> {
    if req.title.is_none() && req.message.is_none() {
        return Err(ApiError::Validation(
            "Either title or message is required".to_string(),
        ));
    }

    let has_oauth_credentials = req.access_token.is_some() && req.channel_id.is_some();
    if req.webhook_url.is_none() && !has_oauth_credentials {
        return Err(ApiError::Validation(
            "Either webhookUrl, or (accessToken and channelId) is required".to_string(),
        ));
    }

    let mut metadata = req.metadata.unwrap_or_default();
    if let Some(user) = &auth_user {
        metadata.insert(
            "userId".to_string(),
            Value::String(user.user_id.to_string()),
        );
    }
    metadata.insert(
        "timestamp".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );

    let note = CliqNotification {
        webhook_url: req.webhook_url,
        access_token: req.access_token,
        channel_id: req.channel_id,
        title: req.title,
        message: req.message,
        notification_type: req.notification_type,
        metadata,
    };

    let outcome = NotificationService::send(state.http(), state.cliq(), &note).await?;

    info!(
        method = %outcome.method,
        user_id = ?auth_user.as_ref().map(|u| u.user_id),
        "Notification sent successfully"
    );

    Ok(Json(ApiResponse::with_message(
        outcome,
        "Notification sent successfully",
    )))
}

//! API request and response types
//!
//! The wire format is camelCase throughout; the dashboard consumes these
//! payloads as-is. Request types derive [`validator::Validate`] so the
//! backend can reject malformed bodies at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Envelope for successful responses: `{"success": true, ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// A bare `{"success": true, "message": ...}` response with no data
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom(function = crate::validation::validate_username))]
    pub username: String,
    #[validate(custom(function = crate::validation::validate_password))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "firstName must be 1-255 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "lastName must be 1-255 characters"))]
    pub last_name: Option<String>,
}

/// Login request; the identifier may be an email address or a username
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "emailOrUsername is required"))]
    pub email_or_username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refreshToken is required"))]
    pub refresh_token: String,
}

/// Password reset initiation
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset completion
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    #[validate(custom(function = crate::validation::validate_password))]
    pub password: String,
}

/// Password change for an authenticated user
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "currentPassword is required"))]
    pub current_password: String,
    #[validate(custom(function = crate::validation::validate_password))]
    pub new_password: String,
}

/// Profile update; absent fields are left untouched
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "firstName must be 1-255 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "lastName must be 1-255 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Registration response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub user_id: String,
    pub email: String,
    pub username: String,
}

/// The subset of a user record safe to return to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Access/refresh token pair issued on login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: PublicUser,
    pub tokens: TokenPair,
}

/// Refresh response payload; the refresh token itself is not rotated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub access_token: String,
}

// ============================================================================
// Notifications
// ============================================================================

/// Notification severity/category; drives the emoji on the formatted card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Error,
    Warning,
    #[default]
    Info,
    Focus,
}

impl NotificationType {
    pub fn emoji(&self) -> &'static str {
        match self {
            NotificationType::Success => "✅",
            NotificationType::Error => "❌",
            NotificationType::Warning => "⚠️",
            NotificationType::Info => "ℹ️",
            NotificationType::Focus => "🎯",
        }
    }
}

/// Notification dispatch request
///
/// Exactly one delivery path must be present: `webhookUrl`, or
/// `accessToken` + `channelId`. At least one of `title`/`message` is
/// required. Both rules are enforced by the route handler.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[validate(url(message = "webhookUrl must be a valid URL"))]
    pub webhook_url: Option<String>,
    pub access_token: Option<String>,
    pub channel_id: Option<String>,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "message must be 1-2000 characters"))]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    pub metadata: Option<Map<String, Value>>,
}

/// Delivery outcome returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyOutcome {
    pub success: bool,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_type_parses_lowercase() {
        let kind: NotificationType = serde_json::from_value(json!("focus")).unwrap();
        assert_eq!(kind, NotificationType::Focus);
        assert_eq!(kind.emoji(), "🎯");
    }

    #[test]
    fn notification_type_rejects_unknown_values() {
        let result: Result<NotificationType, _> = serde_json::from_value(json!("urgent"));
        assert!(result.is_err());
    }

    #[test]
    fn notify_request_defaults_type_to_info() {
        let req: NotifyRequest = serde_json::from_value(json!({
            "webhookUrl": "https://cliq.zoho.com/incomingwebhook/abc",
            "title": "Hi"
        }))
        .unwrap();
        assert_eq!(req.notification_type, NotificationType::Info);
        assert!(req.metadata.is_none());
    }

    #[test]
    fn notify_request_rejects_non_object_metadata() {
        let result: Result<NotifyRequest, _> = serde_json::from_value(json!({
            "webhookUrl": "https://cliq.zoho.com/incomingwebhook/abc",
            "title": "Hi",
            "metadata": "not-an-object"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn register_request_reads_camel_case_fields() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "email": "a@example.com",
            "username": "alice",
            "password": "Password123",
            "firstName": "Alice",
            "lastName": "Smith"
        }))
        .unwrap();
        assert_eq!(req.first_name.as_deref(), Some("Alice"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn register_request_validates_username_and_password() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "email": "a@example.com",
            "username": "ab",
            "password": "short"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn envelope_skips_absent_fields() {
        let body = serde_json::to_value(ApiResponse::<Value>::message_only("ok")).unwrap();
        assert_eq!(body, json!({"success": true, "message": "ok"}));
    }
}

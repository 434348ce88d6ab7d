//! Request body extraction with validation
//!
//! [`ValidatedJson`] deserializes a request body into its typed shape and
//! runs the type's [`validator::Validate`] rules. Both failure modes
//! surface as 400s in the standard error envelope before a handler runs.

use crate::error::ApiError;
use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON body that has passed shape and field validation
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::Validation(flatten_errors(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// Collapse field errors into a single "field: message" summary
fn flatten_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string());
            format!("{}: {}", field, detail)
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;
    use focusflow_shared::types::LoginRequest;
    use tower::ServiceExt;

    async fn echo(ValidatedJson(req): ValidatedJson<LoginRequest>) -> String {
        req.email_or_username
    }

    fn test_app() -> Router {
        Router::new().route("/login", post(echo))
    }

    async fn post_json(app: Router, body: &str) -> StatusCode {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/login")
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn missing_field_is_a_400() {
        let status = post_json(test_app(), r#"{"password": "x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_field_is_a_400() {
        let status =
            post_json(test_app(), r#"{"emailOrUsername": "", "password": "x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_a_400() {
        let status = post_json(test_app(), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let status =
            post_json(test_app(), r#"{"emailOrUsername": "a@b.co", "password": "x"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn flattened_errors_name_the_field() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"emailOrUsername": "", "password": "x"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let message = flatten_errors(&errors);
        assert!(message.contains("email_or_username"));

        let response = ApiError::Validation(message).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Integration tests for authentication endpoints
//!
//! Run with a test database configured:
//! `TEST_DATABASE_URL=... cargo test -- --ignored`

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

fn unique_user(prefix: &str) -> (String, String) {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    (
        format!("{}_{}@example.com", prefix, &tag[..12]),
        format!("{}_{}", prefix, &tag[..12]),
    )
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("register");

    let body = json!({
        "email": email,
        "username": username,
        "password": "SecurePassword123",
        "firstName": "Test",
        "lastName": "User"
    });

    let (status, response) = app.post("/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);

    let response: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["success"], true);
    assert!(!response["data"]["userId"].as_str().unwrap().is_empty());
    assert_eq!(response["data"]["email"], email);
    assert_eq!(response["data"]["username"], username);
    // The password never appears in any response payload
    assert!(!response.to_string().contains("SecurePassword123"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email_conflict() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("dup_email");

    let body = json!({
        "email": email,
        "username": username,
        "password": "SecurePassword123"
    });
    let (status, _) = app.post("/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same email, different username
    let body = json!({
        "email": email,
        "username": format!("{}_b", username),
        "password": "SecurePassword123"
    });
    let (status, response) = app.post("/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let response: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["success"], false);
    assert!(response["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_username_conflict() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("dup_name");

    let body = json!({
        "email": email,
        "username": username,
        "password": "SecurePassword123"
    });
    let (status, _) = app.post("/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same username, different email
    let body = json!({
        "email": format!("b_{}", email),
        "username": username,
        "password": "SecurePassword123"
    });
    let (status, response) = app.post("/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let response: Value = serde_json::from_str(&response).unwrap();
    assert!(response["error"].as_str().unwrap().contains("already taken"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_email_uniqueness_is_case_insensitive() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("case");

    let body = json!({
        "email": email,
        "username": username,
        "password": "SecurePassword123"
    });
    let (status, _) = app.post("/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let body = json!({
        "email": email.to_uppercase(),
        "username": format!("{}_b", username),
        "password": "SecurePassword123"
    });
    let (status, _) = app.post("/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_registration_only_one_succeeds() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("race");

    let body = json!({
        "email": email,
        "username": username,
        "password": "SecurePassword123"
    })
    .to_string();

    // Both requests pass the existence pre-check window; the unique
    // constraint must still reject one of them.
    let (first, second) = tokio::join!(
        app.post("/auth/register", &body),
        app.post("/auth/register", &body),
    );

    let statuses = [first.0, second.0];
    assert!(statuses.contains(&StatusCode::CREATED));
    assert!(statuses.contains(&StatusCode::CONFLICT));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_with_email_and_with_username() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("login");
    let password = "LoginPassword123";

    let body = json!({
        "email": email,
        "username": username,
        "password": password
    });
    app.post("/auth/register", &body.to_string()).await;

    for identifier in [email.as_str(), username.as_str()] {
        let body = json!({
            "emailOrUsername": identifier,
            "password": password
        });
        let (status, response) = app.post("/auth/login", &body.to_string()).await;

        assert_eq!(status, StatusCode::OK, "login with {}", identifier);
        let response: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["success"], true);
        assert!(!response["data"]["tokens"]["accessToken"]
            .as_str()
            .unwrap()
            .is_empty());
        assert!(!response["data"]["tokens"]["refreshToken"]
            .as_str()
            .unwrap()
            .is_empty());
        assert_eq!(response["data"]["user"]["email"], email);
        assert!(response["data"]["user"].get("password").is_none());
        assert!(response["data"]["user"].get("passwordHash").is_none());
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_bad_credentials_are_indistinguishable() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("creds");

    let body = json!({
        "email": email,
        "username": username,
        "password": "CorrectPassword123"
    });
    app.post("/auth/register", &body.to_string()).await;

    // Wrong password for an existing account
    let body = json!({"emailOrUsername": email, "password": "WrongPassword123"});
    let (status_wrong, response_wrong) = app.post("/auth/login", &body.to_string()).await;

    // Unknown identifier
    let body = json!({"emailOrUsername": "nonexistent@example.com", "password": "AnyPassword123"});
    let (status_unknown, response_unknown) = app.post("/auth/login", &body.to_string()).await;

    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);

    let wrong: Value = serde_json::from_str(&response_wrong).unwrap();
    let unknown: Value = serde_json::from_str(&response_unknown).unwrap();
    assert_eq!(wrong["error"], unknown["error"]);
    assert!(wrong["error"].as_str().unwrap().contains("Invalid credentials"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_mints_access_token_only() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("refresh");
    let password = "RefreshPassword123";

    let body = json!({"email": email, "username": username, "password": password});
    app.post("/auth/register", &body.to_string()).await;

    let body = json!({"emailOrUsername": email, "password": password});
    let (_, response) = app.post("/auth/login", &body.to_string()).await;
    let response: Value = serde_json::from_str(&response).unwrap();
    let refresh_token = response["data"]["tokens"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    let body = json!({"refreshToken": refresh_token});
    let (status, response) = app.post("/auth/refresh", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&response).unwrap();
    let access_token = response["data"]["accessToken"].as_str().unwrap();
    assert!(!access_token.is_empty());
    // No rotation: the response carries no new refresh token
    assert!(response["data"].get("refreshToken").is_none());

    // The minted access token grants profile access
    let (status, _) = app.get_auth("/auth/profile", access_token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_with_invalid_token_returns_401() {
    let app = common::TestApp::new().await;

    let body = json!({"refreshToken": "invalid-token"});
    let (status, _) = app.post("/auth/refresh", &body.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_access_token_cannot_be_used_as_refresh_token() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("mixup");
    let password = "MixupPassword123";

    let body = json!({"email": email, "username": username, "password": password});
    app.post("/auth/register", &body.to_string()).await;

    let body = json!({"emailOrUsername": email, "password": password});
    let (_, response) = app.post("/auth/login", &body.to_string()).await;
    let response: Value = serde_json::from_str(&response).unwrap();
    let access_token = response["data"]["tokens"]["accessToken"].as_str().unwrap();

    let body = json!({"refreshToken": access_token});
    let (status, _) = app.post("/auth/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_revokes_refresh_token() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("logout");
    let password = "LogoutPassword123";

    let body = json!({"email": email, "username": username, "password": password});
    app.post("/auth/register", &body.to_string()).await;

    let body = json!({"emailOrUsername": email, "password": password});
    let (_, response) = app.post("/auth/login", &body.to_string()).await;
    let response: Value = serde_json::from_str(&response).unwrap();
    let access_token = response["data"]["tokens"]["accessToken"]
        .as_str()
        .unwrap()
        .to_string();
    let refresh_token = response["data"]["tokens"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    // Token issuance and revocation are stamped at second granularity
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let (status, _) = app.post_auth("/auth/logout", "", &access_token).await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({"refreshToken": refresh_token});
    let (status, response) = app.post("/auth/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let response: Value = serde_json::from_str(&response).unwrap();
    assert!(response["error"].as_str().unwrap().contains("revoked"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_without_token_returns_401() {
    let app = common::TestApp::new().await;

    let (status, _) = app.post("/auth/logout", "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_forgot_password_is_uniform_for_unknown_emails() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("forgot");

    let body = json!({"email": email, "username": username, "password": "ForgotPassword123"});
    app.post("/auth/register", &body.to_string()).await;

    let known = json!({"email": email});
    let (status_known, body_known) = app.post("/auth/forgot-password", &known.to_string()).await;

    let unknown = json!({"email": "noone@example.com"});
    let (status_unknown, body_unknown) =
        app.post("/auth/forgot-password", &unknown.to_string()).await;

    assert_eq!(status_known, StatusCode::OK);
    assert_eq!(status_unknown, StatusCode::OK);
    assert_eq!(body_known, body_unknown);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_reset_password_with_service_minted_token() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("reset");

    let body = json!({"email": email, "username": username, "password": "OriginalPassword123"});
    let (_, response) = app.post("/auth/register", &body.to_string()).await;
    let response: Value = serde_json::from_str(&response).unwrap();
    let user_id: uuid::Uuid = response["data"]["userId"].as_str().unwrap().parse().unwrap();

    // Mint the reset token the same way forgot_password does
    let reset_token = app.state.jwt().generate_reset_token(user_id).unwrap();

    let body = json!({"token": reset_token, "password": "BrandNewPassword123"});
    let (status, _) = app.post("/auth/reset-password", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works; new one does
    let body = json!({"emailOrUsername": email, "password": "OriginalPassword123"});
    let (status, _) = app.post("/auth/login", &body.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let body = json!({"emailOrUsername": email, "password": "BrandNewPassword123"});
    let (status, _) = app.post("/auth/login", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_reset_password_rejects_access_token() {
    let app = common::TestApp::new().await;
    let (email, username) = unique_user("reset_bad");

    let body = json!({"email": email, "username": username, "password": "OriginalPassword123"});
    let (_, response) = app.post("/auth/register", &body.to_string()).await;
    let response: Value = serde_json::from_str(&response).unwrap();
    let user_id: uuid::Uuid = response["data"]["userId"].as_str().unwrap().parse().unwrap();

    // An access token is not a reset token
    let access_token = app.state.jwt().generate_access_token(user_id).unwrap();

    let body = json!({"token": access_token, "password": "BrandNewPassword123"});
    let (status, _) = app.post("/auth/reset-password", &body.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

//! Authentication routes
//!
//! Registration, login, token refresh, logout, profile access and the
//! password reset flow. The public entry points sit behind the stricter
//! auth rate limit; profile routes are protected by the bearer-token
//! extractor instead.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth_rate_limit;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use focusflow_shared::types::{
    ApiResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginData, LoginRequest,
    PublicUser, RefreshData, RefreshTokenRequest, RegisterRequest, RegisteredUser,
    ResetPasswordRequest, UpdateProfileRequest,
};
use serde_json::Value;

/// Create auth routes
pub fn auth_routes(state: AppState) -> Router<AppState> {
    // Public entry points carry the stricter limit
    let limited = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .layer(middleware::from_fn_with_state(state, auth_rate_limit));

    Router::new()
        .merge(limited)
        .route("/reset-password", post(reset_password))
        .route("/change-password", post(change_password))
        .route("/logout", post(logout))
        .route(
            "/profile",
            get(get_profile).put(update_profile).patch(update_profile),
        )
        .route("/me", get(get_profile).patch(update_profile))
}

/// Register a new user
///
/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RegisteredUser>>)> {
    let user = UserService::register(&state.db, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User registered successfully")),
    ))
}

/// Login with email or username
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginData>>> {
    let data =
        UserService::login(&state.db, state.jwt(), &req.email_or_username, &req.password).await?;
    Ok(Json(ApiResponse::new(data)))
}

/// Mint a new access token; the refresh token is not rotated
///
/// POST /auth/refresh
async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<Json<ApiResponse<RefreshData>>> {
    let access_token =
        UserService::refresh_access_token(&state.db, state.jwt(), &req.refresh_token).await?;
    Ok(Json(ApiResponse::new(RefreshData { access_token })))
}

/// End the session; refresh tokens issued before now stop working
///
/// POST /auth/logout (requires authentication)
async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<ApiResponse<Value>>> {
    UserService::logout(&state.db, auth_user.user_id).await?;
    Ok(Json(ApiResponse::message_only("Logged out successfully")))
}

/// Get current user profile
///
/// GET /auth/profile, GET /auth/me (requires authentication)
async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    let profile = UserService::get_profile(&state.db, auth_user.user_id).await?;
    Ok(Json(ApiResponse::new(profile)))
}

/// Update whitelisted profile fields
///
/// PUT/PATCH /auth/profile, PATCH /auth/me (requires authentication)
async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    let profile = UserService::update_profile(&state.db, auth_user.user_id, &req).await?;
    Ok(Json(ApiResponse::new(profile)))
}

/// Start a password reset
///
/// POST /auth/forgot-password
///
/// Responds identically whether or not the account exists.
async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    UserService::forgot_password(&state.db, state.jwt(), &req.email).await?;
    Ok(Json(ApiResponse::message_only(
        "If that account exists, a password reset has been initiated",
    )))
}

/// Complete a password reset
///
/// POST /auth/reset-password
async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    UserService::reset_password(&state.db, state.jwt(), &req.token, &req.password).await?;
    Ok(Json(ApiResponse::message_only("Password has been reset")))
}

/// Change the password of the authenticated user
///
/// POST /auth/change-password (requires authentication)
async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    UserService::change_password(
        &state.db,
        auth_user.user_id,
        &req.current_password,
        &req.new_password,
    )
    .await?;
    Ok(Json(ApiResponse::message_only("Password changed successfully")))
}

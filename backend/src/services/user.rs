//! User service for authentication and account management
//!
//! Registration, login, token refresh, profile access and the password
//! reset flow. Password hashing and verification run on the blocking
//! thread pool; token operations use the pre-computed keys in AppState.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{NewUser, UniqueField, UpdateUserProfile, UserRecord, UserRepository};
use focusflow_shared::types::{LoginData, PublicUser, RegisterRequest, RegisteredUser, TokenPair, UpdateProfileRequest};
use focusflow_shared::validation::normalize_email;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::ValidateEmail;

const EMAIL_CONFLICT: &str = "An account with this email already exists";
const USERNAME_CONFLICT: &str = "This username is already taken";

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

/// Map a failed insert/update to the canonical conflict error, or pass the
/// database error through
fn conflict_or_db(err: sqlx::Error) -> ApiError {
    match UserRepository::unique_violation(&err) {
        Some(UniqueField::Email) => ApiError::Conflict(EMAIL_CONFLICT.to_string()),
        Some(UniqueField::Username) => ApiError::Conflict(USERNAME_CONFLICT.to_string()),
        None => ApiError::Database(err),
    }
}

/// User service for authentication operations
pub struct UserService;

impl UserService {
    fn public(user: &UserRecord) -> PublicUser {
        PublicUser {
            id: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: user.created_at,
        }
    }

    /// Register a new user
    ///
    /// The existence pre-checks produce the friendlier error; the unique
    /// constraints remain the authoritative guarantee when two
    /// registrations race.
    pub async fn register(pool: &PgPool, req: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
        let email = normalize_email(&req.email);
        if !email.validate_email() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }

        if UserRepository::email_exists(pool, &email).await? {
            return Err(ApiError::Conflict(EMAIL_CONFLICT.to_string()));
        }
        if UserRepository::username_exists(pool, &req.username).await? {
            return Err(ApiError::Conflict(USERNAME_CONFLICT.to_string()));
        }

        // Hash on the blocking thread pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(req.password.clone())
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(
            pool,
            NewUser {
                email: &email,
                username: &req.username,
                password_hash: &password_hash,
                first_name: req.first_name.as_deref(),
                last_name: req.last_name.as_deref(),
            },
        )
        .await
        .map_err(conflict_or_db)?;

        info!(user_id = %user.id, "User registered");

        Ok(RegisteredUser {
            user_id: user.id.to_string(),
            email: user.email,
            username: user.username,
        })
    }

    /// Look up a user by email or username and verify the password
    ///
    /// Unknown identifier and wrong password are deliberately the same
    /// error, so callers cannot probe which accounts exist.
    pub async fn authenticate(
        pool: &PgPool,
        identifier: &str,
        password: &str,
    ) -> Result<UserRecord, ApiError> {
        let user = if identifier.contains('@') {
            UserRepository::find_by_email(pool, &normalize_email(identifier)).await?
        } else {
            UserRepository::find_by_username(pool, identifier).await?
        };

        let user = user.ok_or_else(invalid_credentials)?;

        let valid =
            PasswordService::verify_async(password.to_string(), user.password_hash.clone())
                .await
                .map_err(ApiError::Internal)?;

        if !valid {
            return Err(invalid_credentials());
        }

        Ok(user)
    }

    /// Authenticate and issue a token pair
    pub async fn login(
        pool: &PgPool,
        jwt: &JwtService,
        identifier: &str,
        password: &str,
    ) -> Result<LoginData, ApiError> {
        let user = Self::authenticate(pool, identifier, password).await?;

        let tokens = TokenPair {
            access_token: jwt
                .generate_access_token(user.id)
                .map_err(ApiError::Internal)?,
            refresh_token: jwt
                .generate_refresh_token(user.id)
                .map_err(ApiError::Internal)?,
        };

        info!(user_id = %user.id, "User logged in");

        Ok(LoginData {
            user: Self::public(&user),
            tokens,
        })
    }

    /// Mint a new access token from a refresh token
    ///
    /// The refresh token itself is not rotated. Tokens issued before the
    /// user's revocation stamp (logout) are rejected.
    pub async fn refresh_access_token(
        pool: &PgPool,
        jwt: &JwtService,
        refresh_token: &str,
    ) -> Result<String, ApiError> {
        let claims = jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

        if let Some(boundary) = user.token_invalid_before {
            if claims.iat < boundary.timestamp() {
                return Err(ApiError::Unauthorized(
                    "Refresh token has been revoked".to_string(),
                ));
            }
        }

        jwt.generate_access_token(user.id).map_err(ApiError::Internal)
    }

    /// Record a logout by stamping the revocation boundary
    pub async fn logout(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
        UserRepository::invalidate_tokens(pool, user_id).await?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Get user profile
    pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<PublicUser, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(Self::public(&user))
    }

    /// Update profile fields
    pub async fn update_profile(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<PublicUser, ApiError> {
        let email = match &req.email {
            Some(raw) => {
                let email = normalize_email(raw);
                if let Some(existing) = UserRepository::find_by_email(pool, &email).await? {
                    if existing.id != user_id {
                        return Err(ApiError::Conflict(EMAIL_CONFLICT.to_string()));
                    }
                }
                Some(email)
            }
            None => None,
        };

        let updates = UpdateUserProfile {
            email,
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
        };

        let user = UserRepository::update_profile(pool, user_id, updates)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => ApiError::NotFound("User not found".to_string()),
                other => conflict_or_db(other),
            })?;

        Ok(Self::public(&user))
    }

    /// Start a password reset
    ///
    /// Always succeeds from the caller's perspective so the endpoint does
    /// not reveal which emails have accounts. There is no mail transport;
    /// the reset token goes to the operator log.
    pub async fn forgot_password(
        pool: &PgPool,
        jwt: &JwtService,
        email: &str,
    ) -> Result<(), ApiError> {
        let email = normalize_email(email);
        if let Some(user) = UserRepository::find_by_email(pool, &email).await? {
            let token = jwt
                .generate_reset_token(user.id)
                .map_err(ApiError::Internal)?;
            info!(user_id = %user.id, reset_token = %token, "Password reset requested");
        }
        Ok(())
    }

    /// Complete a password reset with a token from `forgot_password`
    pub async fn reset_password(
        pool: &PgPool,
        jwt: &JwtService,
        token: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let claims = jwt
            .validate_reset_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired reset token".to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired reset token".to_string()))?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired reset token".to_string()))?;

        let password_hash = PasswordService::hash_async(new_password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        UserRepository::update_password(pool, user.id, &password_hash).await?;
        info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    /// Change the password of an authenticated user
    pub async fn change_password(
        pool: &PgPool,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let valid = PasswordService::verify_async(
            current_password.to_string(),
            user.password_hash.clone(),
        )
        .await
        .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = PasswordService::hash_async(new_password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        UserRepository::update_password(pool, user.id, &password_hash).await?;
        Ok(())
    }
}

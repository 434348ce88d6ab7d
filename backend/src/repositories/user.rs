//! User repository for database operations
//!
//! Email and username uniqueness is enforced by the `users_email_key` and
//! `users_username_key` constraints; [`UserRepository::unique_violation`]
//! maps a constraint failure back to the offending field so the service
//! layer can answer with the right conflict message even when two
//! registrations race past the existence pre-checks.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Refresh tokens issued before this instant are revoked (logout)
    pub token_invalid_before: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user; the email is already normalized and the
/// password already hashed
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

/// Input for updating profile fields; None leaves a column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateUserProfile {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Which unique constraint a database error violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

const USER_COLUMNS: &str = "id, email, username, password_hash, first_name, last_name, \
                            token_invalid_before, created_at, updated_at";

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, user: NewUser<'_>) -> Result<UserRecord, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user.email)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .fetch_one(pool)
        .await
    }

    /// Find user by (lowercased) email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#,
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Find user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1
            "#,
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Check if an email is taken
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Check if a username is taken
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)
            "#,
        )
        .bind(username)
        .fetch_one(pool)
        .await
    }

    /// Update profile fields
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        updates: UpdateUserProfile,
    ) -> Result<UserRecord, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(updates.email)
        .bind(updates.first_name)
        .bind(updates.last_name)
        .fetch_one(pool)
        .await
    }

    /// Replace the stored password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Stamp the revocation boundary; refresh tokens issued before now are
    /// rejected from here on
    pub async fn invalidate_tokens(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users SET token_invalid_before = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Map a unique-constraint violation back to the conflicting field
    pub fn unique_violation(err: &sqlx::Error) -> Option<UniqueField> {
        match err {
            sqlx::Error::Database(db_err) => match db_err.constraint() {
                Some("users_email_key") => Some(UniqueField::Email),
                Some("users_username_key") => Some(UniqueField::Username),
                _ => None,
            },
            _ => None,
        }
    }
}

//! User domain models and DTOs.
//!
//! [`User`] is the persisted entity and is never serialized directly; the
//! API exposes it as [`UserResponse`], which omits the password hash.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Role attribute carried by a user and embedded in its tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user account as stored in the `users` table.
#[derive(FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    /// Unique, immutable login name.
    pub username: String,
    /// bcrypt hash; the plaintext password is never stored.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a new, not yet persisted user with a fresh id.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public representation of a user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Letters, digits, `_`, `-` and `.` only.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("username_charset");
        error.message =
            Some("username may only contain letters, digits, '_', '-' and '.'".into());
        Err(error)
    }
}

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Byte length, not character count, is what bcrypt truncates on.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() <= MAX_PASSWORD_BYTES {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_length");
        error.message = Some(
            format!("password must be at most {} bytes", MAX_PASSWORD_BYTES).into(),
        );
        Err(error)
    }
}

/// Self-registration request. New accounts always get [`Role::User`].
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 50, message = "username must be between 3 and 50 characters"),
        custom(function = "validate_username")
    )]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(
        length(min = 1, message = "password is required"),
        custom(function = "validate_password")
    )]
    #[schema(example = "P@ss1")]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,
}

/// Partial update. The username cannot be changed.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "first_name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "last_name must not be empty"))]
    pub last_name: Option<String>,
    #[validate(
        length(min = 1, message = "password must not be empty"),
        custom(function = "validate_password")
    )]
    pub password: Option<String>,
    /// Only administrators may change roles.
    pub role: Option<Role>,
}

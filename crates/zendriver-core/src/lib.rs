//! # ZenDriver Core
//!
//! Foundational types shared by every ZenDriver crate:
//!
//! - [`errors`]: [`AppError`] and its HTTP response conversion
//! - [`password`]: bcrypt password hashing and verification

pub mod errors;
pub mod password;

pub use errors::{AppError, ErrorKind, ErrorResponse, InternalErrorDetail};
pub use password::{hash_password_with_cost, verify_password};

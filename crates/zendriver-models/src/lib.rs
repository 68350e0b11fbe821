//! # ZenDriver Models
//!
//! Domain entities and request/response DTOs.
//!
//! - [`users`]: the [`User`] entity, [`Role`], and user management DTOs
//! - [`auth`]: sign-in request and response

pub mod auth;
pub mod users;

pub use auth::{AuthenticateResponse, LoginRequest, MessageResponse};
pub use users::{RegisterRequest, Role, UpdateUserRequest, User, UserResponse};

//! Request middleware and extractors.
//!
//! - [`auth`]: resolves the bearer token into an [`auth::AuthContext`]
//! - [`policy`]: owner and role based authorization over resources
//! - [`error_handler`]: uniform JSON errors, internal error logging, panics
//!
//! # Request flow
//!
//! 1. `error_handler` wraps everything below it
//! 2. `jwt_middleware` records the caller (or why there is none)
//! 3. Handlers that need a caller take [`auth::AuthUser`]
//! 4. Handlers check a [`policy::Policy`] against the loaded resource

pub mod auth;
pub mod error_handler;
pub mod policy;

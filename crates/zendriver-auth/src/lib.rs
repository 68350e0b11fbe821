//! # ZenDriver Auth
//!
//! Token handling for the ZenDriver API.
//!
//! - [`claims`]: the [`Claims`] carried by every access token
//! - [`jwt`]: [`JwtHandler`], which issues and validates HS256 tokens
//!
//! The signing secret is supplied through [`zendriver_config::JwtConfig`]
//! when the handler is constructed; nothing is read from global state.

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{IssuedToken, JwtHandler, TokenError};

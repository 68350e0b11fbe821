//! Bearer token authentication.
//!
//! [`jwt_middleware`] runs on every request. It never rejects anything on
//! its own: it resolves the caller and records the outcome in the request
//! extensions, either as an [`AuthContext`] or as an [`Unauthenticated`]
//! reason. Handlers that need a caller take the [`AuthUser`] extractor,
//! which turns a missing context into a 401.
//!
//! The user is reloaded from the repository on every request, so a deleted
//! account is rejected even while its token has not expired, and role
//! checks see the current role rather than the one baked into the token.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;
use uuid::Uuid;
use zendriver_auth::{Claims, JwtHandler, TokenError};
use zendriver_core::AppError;
use zendriver_models::{Role, User};

use crate::metrics::track_jwt_validation;
use crate::repository::UserRepository;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    /// Stored record, loaded for this request.
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}

/// Why a request carries no [`AuthContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unauthenticated {
    MissingToken,
    MalformedHeader,
    InvalidToken,
    ExpiredToken,
    UnknownUser,
}

impl Unauthenticated {
    pub fn message(self) -> &'static str {
        match self {
            Unauthenticated::MissingToken => "Missing authorization header",
            Unauthenticated::MalformedHeader => "Invalid authorization header format",
            Unauthenticated::InvalidToken => "Invalid token",
            Unauthenticated::ExpiredToken => "Token has expired",
            Unauthenticated::UnknownUser => "User no longer exists",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Authentication {
    Authenticated(AuthContext),
    Unauthenticated(Unauthenticated),
}

/// Resolves the caller from the `Authorization` header.
///
/// Only repository failures are errors; every kind of bad credential is an
/// [`Authentication::Unauthenticated`] outcome.
pub async fn authenticate(
    headers: &HeaderMap,
    jwt: &JwtHandler,
    users: &dyn UserRepository,
) -> Result<Authentication, AppError> {
    let bearer = match headers.typed_try_get::<Authorization<Bearer>>() {
        Ok(Some(Authorization(bearer))) => bearer,
        Ok(None) => return Ok(Authentication::Unauthenticated(Unauthenticated::MissingToken)),
        Err(_) => {
            return Ok(Authentication::Unauthenticated(
                Unauthenticated::MalformedHeader,
            ));
        }
    };

    let claims = match jwt.validate(bearer.token()) {
        Ok(claims) => {
            track_jwt_validation("valid");
            claims
        }
        Err(TokenError::Expired) => {
            track_jwt_validation("expired");
            return Ok(Authentication::Unauthenticated(Unauthenticated::ExpiredToken));
        }
        Err(e) => {
            track_jwt_validation("invalid");
            debug!(error = %e, "rejected bearer token");
            return Ok(Authentication::Unauthenticated(Unauthenticated::InvalidToken));
        }
    };

    let Ok(user_id) = claims.user_id() else {
        return Ok(Authentication::Unauthenticated(Unauthenticated::InvalidToken));
    };

    match users.find_by_id(user_id).await? {
        Some(user) => Ok(Authentication::Authenticated(AuthContext { claims, user })),
        None => {
            debug!(user_id = %user_id, "token subject no longer exists");
            Ok(Authentication::Unauthenticated(Unauthenticated::UnknownUser))
        }
    }
}

pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let outcome = authenticate(req.headers(), &state.jwt, state.users.as_ref()).await?;
    match outcome {
        Authentication::Authenticated(context) => {
            req.extensions_mut().insert(context);
        }
        Authentication::Unauthenticated(reason) => {
            req.extensions_mut().insert(reason);
        }
    }

    Ok(next.run(req).await)
}

/// Extractor for handlers that require an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<AuthContext>() {
            return Ok(AuthUser(context.clone()));
        }

        let reason = parts
            .extensions
            .get::<Unauthenticated>()
            .copied()
            .unwrap_or(Unauthenticated::MissingToken);

        Err(AppError::unauthorized(reason.message()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header};
    use chrono::{Duration, Utc};
    use zendriver_config::JwtConfig;

    use super::*;
    use crate::repository::InMemoryUserRepository;

    fn handler() -> JwtHandler {
        JwtHandler::new(&JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            token_lifetime: 3600,
            issuer: None,
        })
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn seeded() -> (InMemoryUserRepository, User) {
        let repo = InMemoryUserRepository::new();
        let alice = User::new("alice", "$2b$04$hash", "Alice", "Liddell", Role::User);
        repo.add(&alice).await.unwrap();
        (repo, alice)
    }

    fn reason(outcome: Authentication) -> Option<Unauthenticated> {
        match outcome {
            Authentication::Authenticated(_) => None,
            Authentication::Unauthenticated(reason) => Some(reason),
        }
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let jwt = handler();
        let (repo, alice) = seeded().await;
        let token = jwt.issue(&alice).unwrap().token;

        let outcome = authenticate(&headers(&format!("Bearer {}", token)), &jwt, &repo)
            .await
            .unwrap();

        match outcome {
            Authentication::Authenticated(context) => assert_eq!(context.user_id(), alice.id),
            other => panic!("expected authenticated caller, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_and_malformed_headers() {
        let jwt = handler();
        let (repo, _) = seeded().await;

        let missing = authenticate(&HeaderMap::new(), &jwt, &repo).await.unwrap();
        assert_eq!(reason(missing), Some(Unauthenticated::MissingToken));

        let basic = authenticate(&headers("Basic YWxpY2U6c2VjcmV0"), &jwt, &repo)
            .await
            .unwrap();
        assert_eq!(reason(basic), Some(Unauthenticated::MalformedHeader));
    }

    #[tokio::test]
    async fn test_expired_and_invalid_tokens() {
        let jwt = handler();
        let (repo, alice) = seeded().await;

        let expired = jwt
            .issue_at(&alice, Utc::now() - Duration::hours(2))
            .unwrap()
            .token;
        let outcome = authenticate(&headers(&format!("Bearer {}", expired)), &jwt, &repo)
            .await
            .unwrap();
        assert_eq!(reason(outcome), Some(Unauthenticated::ExpiredToken));

        let outcome = authenticate(&headers("Bearer not.a.token"), &jwt, &repo)
            .await
            .unwrap();
        assert_eq!(reason(outcome), Some(Unauthenticated::InvalidToken));
    }

    #[tokio::test]
    async fn test_deleted_user_is_unknown() {
        let jwt = handler();
        let (repo, alice) = seeded().await;
        let token = jwt.issue(&alice).unwrap().token;
        repo.remove(&alice).await.unwrap();

        let outcome = authenticate(&headers(&format!("Bearer {}", token)), &jwt, &repo)
            .await
            .unwrap();
        assert_eq!(reason(outcome), Some(Unauthenticated::UnknownUser));
    }
}

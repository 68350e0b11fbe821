//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zendriver_models::Role;

use crate::jwt::TokenError;

/// Claims embedded in every access token.
///
/// - `sub`: user id
/// - `username`: login name at issue time
/// - `role`: role at issue time; later role changes are not reflected
/// - `iat` / `exp`: issued-at and expiry, Unix seconds
/// - `iss`: issuer, present when configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| TokenError::Invalid("subject is not a user id".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: "alice".to_string(),
            role: Role::Admin,
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            iss: None,
        }
    }

    #[test]
    fn test_claims_serialize() {
        let serialized = serde_json::to_string(&sample("user-id-123")).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""role":"admin""#));
        assert!(!serialized.contains("iss"));
    }

    #[test]
    fn test_claims_deserialize_without_issuer() {
        let json = r#"{"sub":"abc","username":"bob","role":"user","iat":10,"exp":20}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, None);
    }

    #[test]
    fn test_user_id_parses_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(sample(&id.to_string()).user_id().unwrap(), id);
        assert!(sample("not-a-uuid").user_id().is_err());
    }
}

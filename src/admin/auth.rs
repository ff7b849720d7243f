//! Admin identity check.
//!
//! A caller is an administrator only when both hold:
//! - the bearer credential verifies and names a user id, and
//! - that user's stored record has `is_admin` set and the same email
//!   (case-insensitive) as the credential claims.
//!
//! Every other outcome means "not admin". The distinct variants exist for
//! logs and metrics only.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use tracing::debug;

use super::token::{CredentialVerifier, TokenError};
use super::users::UserDirectory;
use crate::observability::metrics;

/// A verified administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCheck {
    Verified(AdminIdentity),
    MissingCredential,
    InvalidCredential,
    ExpiredCredential,
    LookupFailed,
    UnknownUser,
    NotAdmin,
    IdentityMismatch,
}

impl AdminCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, AdminCheck::Verified(_))
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            AdminCheck::Verified(_) => "verified",
            AdminCheck::MissingCredential => "missing_credential",
            AdminCheck::InvalidCredential => "invalid_credential",
            AdminCheck::ExpiredCredential => "expired_credential",
            AdminCheck::LookupFailed => "lookup_failed",
            AdminCheck::UnknownUser => "unknown_user",
            AdminCheck::NotAdmin => "not_admin",
            AdminCheck::IdentityMismatch => "identity_mismatch",
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[derive(Clone)]
pub struct AdminIdentityCheck {
    verifier: Arc<dyn CredentialVerifier>,
    users: Arc<dyn UserDirectory>,
}

impl AdminIdentityCheck {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, users: Arc<dyn UserDirectory>) -> Self {
        Self { verifier, users }
    }

    pub async fn check(&self, headers: &HeaderMap) -> AdminCheck {
        let result = self.evaluate(headers).await;
        if !result.is_verified() {
            debug!(outcome = result.outcome(), "Admin check failed");
        }
        metrics::record_admin_check(result.outcome());
        result
    }

    /// Boundary form: anything short of `Verified` is `false`.
    pub async fn is_admin_request(&self, headers: &HeaderMap) -> bool {
        self.check(headers).await.is_verified()
    }

    async fn evaluate(&self, headers: &HeaderMap) -> AdminCheck {
        let Some(token) = bearer_token(headers) else {
            return AdminCheck::MissingCredential;
        };

        let claims = match self.verifier.verify(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => return AdminCheck::ExpiredCredential,
            Err(_) => return AdminCheck::InvalidCredential,
        };
        let Some(user_id) = claims.user_id() else {
            return AdminCheck::InvalidCredential;
        };

        let record = match self.users.find_by_id(user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return AdminCheck::UnknownUser,
            Err(e) => {
                debug!(error = %e, user_id, "User lookup failed");
                return AdminCheck::LookupFailed;
            }
        };

        if !record.is_admin {
            return AdminCheck::NotAdmin;
        }
        if !record.email.eq_ignore_ascii_case(claims.email.trim()) {
            return AdminCheck::IdentityMismatch;
        }

        AdminCheck::Verified(AdminIdentity {
            user_id: record.id,
            email: record.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::token::JwtVerifier;
    use crate::admin::users::UserRecord;
    use crate::error::{GatewayError, Result};
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    struct StaticUsers(HashMap<i64, UserRecord>);

    #[async_trait]
    impl UserDirectory for StaticUsers {
        async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
            Ok(self.0.get(&id).cloned())
        }
    }

    struct BrokenUsers;

    #[async_trait]
    impl UserDirectory for BrokenUsers {
        async fn find_by_id(&self, _id: i64) -> Result<Option<UserRecord>> {
            Err(GatewayError::Io(std::io::Error::other("database offline")))
        }
    }

    fn users() -> Arc<dyn UserDirectory> {
        let mut map = HashMap::new();
        map.insert(
            1,
            UserRecord {
                id: 1,
                email: "Admin@Example.com".to_string(),
                is_admin: true,
            },
        );
        map.insert(
            2,
            UserRecord {
                id: 2,
                email: "seller@example.com".to_string(),
                is_admin: false,
            },
        );
        Arc::new(StaticUsers(map))
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn check_with(users: Arc<dyn UserDirectory>) -> AdminIdentityCheck {
        AdminIdentityCheck::new(Arc::new(JwtVerifier::new(SECRET)), users)
    }

    #[tokio::test]
    async fn test_verified_admin_email_case_insensitive() {
        let token = JwtVerifier::new(SECRET).issue(1, "admin@example.com", 1).unwrap();
        let result = check_with(users()).check(&headers_with(&token)).await;
        assert_eq!(
            result,
            AdminCheck::Verified(AdminIdentity {
                user_id: 1,
                email: "Admin@Example.com".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_missing_and_malformed_headers() {
        let check = check_with(users());
        assert_eq!(check.check(&HeaderMap::new()).await, AdminCheck::MissingCredential);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(check.check(&headers).await, AdminCheck::MissingCredential);

        assert_eq!(
            check.check(&headers_with("garbage")).await,
            AdminCheck::InvalidCredential
        );
    }

    #[tokio::test]
    async fn test_expired_credential() {
        let token = JwtVerifier::new(SECRET).issue(1, "admin@example.com", -1).unwrap();
        let check = check_with(users());
        assert_eq!(
            check.check(&headers_with(&token)).await,
            AdminCheck::ExpiredCredential
        );
        assert!(!check.is_admin_request(&headers_with(&token)).await);
    }

    #[tokio::test]
    async fn test_non_admin_and_unknown_user() {
        let verifier = JwtVerifier::new(SECRET);
        let check = check_with(users());

        let seller = verifier.issue(2, "seller@example.com", 1).unwrap();
        assert_eq!(check.check(&headers_with(&seller)).await, AdminCheck::NotAdmin);

        let ghost = verifier.issue(99, "ghost@example.com", 1).unwrap();
        assert_eq!(check.check(&headers_with(&ghost)).await, AdminCheck::UnknownUser);
    }

    #[tokio::test]
    async fn test_email_mismatch_is_rejected() {
        let token = JwtVerifier::new(SECRET).issue(1, "old-address@example.com", 1).unwrap();
        let check = check_with(users());
        assert_eq!(
            check.check(&headers_with(&token)).await,
            AdminCheck::IdentityMismatch
        );
    }

    #[tokio::test]
    async fn test_non_numeric_subject() {
        let verifier = JwtVerifier::new(SECRET);
        let token = verifier
            .sign(&crate::admin::token::Claims {
                sub: "abc".to_string(),
                email: "admin@example.com".to_string(),
                exp: (chrono::Utc::now().timestamp() + 3600) as usize,
                iat: chrono::Utc::now().timestamp() as usize,
            })
            .unwrap();
        assert_eq!(
            check_with(users()).check(&headers_with(&token)).await,
            AdminCheck::InvalidCredential
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_closed() {
        let token = JwtVerifier::new(SECRET).issue(1, "admin@example.com", 1).unwrap();
        let check = check_with(Arc::new(BrokenUsers));
        assert_eq!(check.check(&headers_with(&token)).await, AdminCheck::LookupFailed);
        assert!(!check.is_admin_request(&headers_with(&token)).await);
    }
}

//! Per-session identity passed explicitly into every store operation.
//!
//! The original client kept the signed-in user and access token in ambient
//! application state; here both travel in a [`SessionContext`] argument so
//! callers, tests, and concurrent sessions stay independent.

use serde::{Deserialize, Serialize};

/// Authenticated user identifier (the auth provider's subject id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        UserId(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity and credentials for one signed-in session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: UserId,
    /// Bearer token for the hosted backend. Absent in local/test setups,
    /// where the store falls back to its service key.
    pub access_token: Option<String>,
}

impl SessionContext {
    /// Context for a user without an access token.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            access_token: None,
        }
    }

    /// Attach the access token obtained at sign-in.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_round_trip() {
        let id = UserId::new("user-123");
        assert_eq!(id.value(), "user-123");
        assert_eq!(id.to_string(), "user-123");
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let id = UserId::new("user-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-123\"");
    }

    #[test]
    fn test_context_token_builder() {
        let ctx = SessionContext::new(UserId::new("user-123"));
        assert!(ctx.access_token.is_none());

        let ctx = ctx.with_access_token("jwt-token");
        assert_eq!(ctx.access_token.as_deref(), Some("jwt-token"));
    }
}

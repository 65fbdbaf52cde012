//! Credential provider for the streaming engine.
//!
//! Token issuance and refresh live outside the playback core; it only asks
//! for a currently valid access token when an engine connects.

use async_trait::async_trait;

use crate::error::Result;

/// Supplies access tokens for the streaming provider.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a valid access token for `user_id`, or `None` when the user
    /// has no linked account or the refresh failed.
    async fn get_valid_access_token(&self, user_id: &str) -> Result<Option<String>>;
}

/// Token provider that always returns the same value. Useful for hosts that
/// manage refresh themselves and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn empty() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn get_valid_access_token(&self, _user_id: &str) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

//! Bearer-token identity resolution.
//!
//! Identity never blocks a prediction: a missing header, a malformed header,
//! a rejected token, an unreachable provider and a provider slower than the
//! resolver's timeout all resolve to anonymous.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::StoreError;

/// The caller a request is attributed to. Built once per request, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub user_id: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a bearer token for a user id. `StoreError::Unauthorized` when rejected.
    async fn verify_token(&self, token: &str) -> Result<String, StoreError>;
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps an optional provider. Without one every request is anonymous.
#[derive(Clone)]
pub struct IdentityResolver {
    provider: Option<Arc<dyn IdentityProvider>>,
    timeout: Duration,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider: Some(provider), timeout: DEFAULT_IDENTITY_TIMEOUT }
    }

    pub fn anonymous() -> Self {
        Self { provider: None, timeout: DEFAULT_IDENTITY_TIMEOUT }
    }

    /// Upper bound on one provider lookup.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve an `Authorization` header value, degrading every failure to `None`.
    pub async fn resolve(&self, authorization: Option<&str>) -> Option<IdentityContext> {
        let token = authorization.and_then(parse_bearer)?;
        self.verify(token).await.ok()
    }

    /// Like `resolve`, but keeps the failure so strictly-scoped endpoints can reject.
    pub async fn verify(&self, token: &str) -> Result<IdentityContext, StoreError> {
        let provider = self.provider.as_ref().ok_or(StoreError::NotConfigured)?;
        let verified = tokio::time::timeout(self.timeout, provider.verify_token(token))
            .await
            .unwrap_or(Err(StoreError::Timeout(self.timeout)));
        match verified {
            Ok(user_id) => {
                debug!(%user_id, "Bearer token verified");
                Ok(IdentityContext { user_id })
            }
            Err(StoreError::Unauthorized) => {
                debug!("Bearer token rejected by identity provider");
                Err(StoreError::Unauthorized)
            }
            Err(e) => {
                warn!("Identity provider unavailable: {e}");
                Err(e)
            }
        }
    }
}

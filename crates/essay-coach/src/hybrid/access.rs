use std::collections::HashSet;
use std::sync::Arc;

use crate::config::AccessConfig;

/// Boolean entitlement check consulted before an evaluation runs.
pub trait AccessGate: Send + Sync {
    fn has_access(&self, authorization: Option<&str>) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl AccessGate for OpenAccess {
    fn has_access(&self, _authorization: Option<&str>) -> bool {
        true
    }
}

/// Accepts `Authorization: Bearer <token>` for any configured token.
#[derive(Clone, Default)]
pub struct StaticTokenGate {
    tokens: HashSet<String>,
}

impl StaticTokenGate {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|token: &String| !token.is_empty())
                .collect(),
        }
    }

    /// Open access when no tokens are configured.
    pub fn from_config(config: &AccessConfig) -> Arc<dyn AccessGate> {
        if config.tokens.is_empty() {
            Arc::new(OpenAccess)
        } else {
            Arc::new(Self::new(config.tokens.iter().cloned()))
        }
    }
}

impl AccessGate for StaticTokenGate {
    fn has_access(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(|value| value.trim().strip_prefix("Bearer "))
            .map(str::trim)
            .is_some_and(|token| self.tokens.contains(token))
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client configuration

use std::time::Duration;

/// Which certificates of the presented chain may satisfy a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinScope {
    /// Only the leaf (end-entity) certificate
    #[default]
    Leaf,
    /// The leaf or any intermediate the server sent
    Chain,
}

/// How many `Set-Cookie` response headers update the jar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetCookiePolicy {
    /// Only the first `Set-Cookie` header line
    FirstOnly,
    /// Every `Set-Cookie` header line, in arrival order
    #[default]
    All,
}

/// Configuration shared by every request made through one client
#[derive(Debug, Clone)]
pub struct PinchConfig {
    /// User agent sent unless the request carries its own
    pub user_agent: Option<String>,
    /// Timeout applied when a request does not specify one
    pub default_timeout: Option<Duration>,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Pin matching granularity
    pub pin_scope: PinScope,
    /// Set-Cookie handling
    pub set_cookie_policy: SetCookiePolicy,
    /// Reuse trust contexts across requests with the same pin set
    pub cache_trust_contexts: bool,
    /// Extensions tried when a bundled certificate name has none
    pub certificate_extensions: Vec<String>,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("pinch/{}", crate::VERSION)),
            default_timeout: None,
            max_redirects: 10,
            pin_scope: PinScope::default(),
            set_cookie_policy: SetCookiePolicy::default(),
            cache_trust_contexts: true,
            certificate_extensions: ["cer", "pem", "der", "crt"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl PinchConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Do not send a user agent
    pub fn no_user_agent(mut self) -> Self {
        self.user_agent = None;
        self
    }

    /// Set default timeout
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Set max redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set pin scope
    pub fn pin_scope(mut self, scope: PinScope) -> Self {
        self.pin_scope = scope;
        self
    }

    /// Set Set-Cookie policy
    pub fn set_cookie_policy(mut self, policy: SetCookiePolicy) -> Self {
        self.set_cookie_policy = policy;
        self
    }

    /// Enable/disable trust context caching
    pub fn cache_trust_contexts(mut self, enabled: bool) -> Self {
        self.cache_trust_contexts = enabled;
        self
    }

    /// Replace the certificate extension fallbacks
    pub fn certificate_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.certificate_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PinchConfig::default();
        assert_eq!(config.pin_scope, PinScope::Leaf);
        assert_eq!(config.set_cookie_policy, SetCookiePolicy::All);
        assert!(config.default_timeout.is_none());
        assert!(config.cache_trust_contexts);
        assert!(config.certificate_extensions.iter().any(|e| e == "cer"));
    }

    #[test]
    fn test_builder() {
        let config = PinchConfig::new()
            .no_user_agent()
            .default_timeout(Duration::from_secs(5))
            .pin_scope(PinScope::Chain)
            .certificate_extensions(["pem"]);

        assert!(config.user_agent.is_none());
        assert_eq!(config.default_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.pin_scope, PinScope::Chain);
        assert_eq!(config.certificate_extensions, vec!["pem".to_string()]);
    }
}

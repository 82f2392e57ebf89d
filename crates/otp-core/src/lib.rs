//! # OTP Core
//!
//! Core contract for the otpkit OTP delivery gateway.
//!
//! A delivery channel (SMS, e-mail, ...) is a [`Provider`]. The gateway never
//! names a concrete adapter type: it builds providers through a
//! [`ProviderFactory`] from serialized configuration and keeps them in a
//! [`ProviderRegistry`] as `Arc<dyn Provider>`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use otp_core::{Provider, ProviderRegistry};
//!
//! let registry = ProviderRegistry::new().with(sms_provider);
//! let sms = registry.get("solsms").unwrap();
//! sms.validate_address("+919876543210")?;
//! sms.push("+919876543210", "", b"Your code is 123456").await?;
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;

/// Errors a provider hands back to the gateway.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// Malformed or incomplete provider configuration
    #[error("config error: {0}")]
    Config(String),
    /// Address rejected by the provider's validation
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Vendor could not be reached (connect failure, timeout, broken body)
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
    /// Vendor answered but reported a failure; holds the raw vendor response
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl OtpError {
    /// Whether the gateway may reasonably retry the same send later.
    ///
    /// Only transport failures qualify. Providers never retry on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OtpError::Transport(_))
    }
}

/// A delivery channel registered with the gateway.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider key, e.g. "solsms".
    fn id(&self) -> &'static str;

    /// Human readable channel label, e.g. "SMS".
    fn channel_name(&self) -> &'static str;

    /// Help text shown to the user after a code has been sent.
    fn channel_desc(&self) -> String;

    /// Name of the address the user has to supply, e.g. "Mobile number".
    fn address_name(&self) -> &'static str;

    /// Prompt shown when asking the user for the address.
    fn address_desc(&self) -> &'static str;

    /// Checks that `address` looks like something this channel can deliver to.
    fn validate_address(&self, address: &str) -> Result<(), OtpError>;

    /// Delivers `body` to `address`. Channels without a subject ignore it.
    async fn push(&self, address: &str, subject: &str, body: &[u8]) -> Result<(), OtpError>;

    /// Maximum address length, `None` when the channel does not cap it.
    fn max_address_len(&self) -> Option<usize>;

    /// Maximum length of the OTP value.
    fn max_otp_len(&self) -> usize;

    /// Maximum message body size in bytes.
    fn max_body_len(&self) -> usize;
}

/// Construction entry point the gateway calls once per provider at startup.
pub type ProviderFactory = fn(&[u8]) -> Result<Arc<dyn Provider>, OtpError>;

/// Runtime registry so the gateway can hold any combination of providers.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    map: Arc<HashMap<&'static str, Arc<dyn Provider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            map: Arc::new(HashMap::new()),
        }
    }

    /// Registers `provider` under its id, replacing any earlier one with the same id.
    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        let mut m = (*self.map).clone();
        m.insert(provider.id(), provider);
        self.map = Arc::new(m);
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Provider>> {
        self.map.get(id).cloned()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.map.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(&'static str);

    #[async_trait]
    impl Provider for Stub {
        fn id(&self) -> &'static str {
            self.0
        }
        fn channel_name(&self) -> &'static str {
            "Stub"
        }
        fn channel_desc(&self) -> String {
            String::new()
        }
        fn address_name(&self) -> &'static str {
            "Address"
        }
        fn address_desc(&self) -> &'static str {
            "Any address"
        }
        fn validate_address(&self, address: &str) -> Result<(), OtpError> {
            if address.is_empty() {
                return Err(OtpError::InvalidAddress("empty".into()));
            }
            Ok(())
        }
        async fn push(&self, _: &str, _: &str, _: &[u8]) -> Result<(), OtpError> {
            Ok(())
        }
        fn max_address_len(&self) -> Option<usize> {
            None
        }
        fn max_otp_len(&self) -> usize {
            6
        }
        fn max_body_len(&self) -> usize {
            140
        }
    }

    #[test]
    fn registry_lookup() {
        let registry = ProviderRegistry::new()
            .with(Arc::new(Stub("b")))
            .with(Arc::new(Stub("a")));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec!["a", "b"]);
        assert!(registry.get("a").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn registry_replaces_same_id() {
        let registry = ProviderRegistry::new()
            .with(Arc::new(Stub("a")))
            .with(Arc::new(Stub("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clones_share_providers() {
        let registry = ProviderRegistry::new().with(Arc::new(Stub("a")));
        let clone = registry.clone();
        let first = registry.get("a").unwrap();
        let second = clone.get("a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn dyn_provider_is_usable() {
        let provider: Arc<dyn Provider> = Arc::new(Stub("a"));
        assert!(provider.validate_address("").is_err());
        assert!(provider.push("x", "", b"hi").await.is_ok());
    }

    #[test]
    fn only_transport_is_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert!(OtpError::Transport(Box::new(io)).is_retryable());
        assert!(!OtpError::Delivery("responsecode 401".into()).is_retryable());
        assert!(!OtpError::Config("missing".into()).is_retryable());
        assert!(!OtpError::InvalidAddress("x".into()).is_retryable());
    }
}

//! # Solsms OTP Provider
//!
//! SMS channel for otpkit backed by the Kaleyra / Solutions Infini bulk-SMS
//! HTTP APIs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use otp_core::Provider;
//! use otp_solsms::SolsmsProvider;
//!
//! let sms = SolsmsProvider::new(br#"{"APIKey": "key", "Sender": "ACMEOT"}"#)?;
//! sms.validate_address("+919876543210")?;
//! sms.push("+919876543210", "", b"Your code is 123456").await?;
//! ```

mod profile;

pub use profile::VendorProfile;

use async_trait::async_trait;
use otp_core::{OtpError, Provider};
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;
use url::form_urlencoded::byte_serialize;

const CHANNEL_NAME: &str = "SMS";
const ADDRESS_NAME: &str = "Mobile number";
const MAX_OTP_LEN: usize = 6;
const MAX_BODY_LEN: usize = 140;
const DEFAULT_TIMEOUT_SECS: u64 = 5;

// Unanchored: any run of 8-15 digits, optionally behind a '+', passes.
static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?[0-9]{8,15}").expect("phone number pattern is valid")
});

/// Provider configuration as handed over by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SolsmsConfig {
    /// Optional API endpoint; the vendor default is used when empty.
    #[serde(rename = "RootURL", alias = "rooturl", alias = "root_url", default)]
    pub root_url: String,
    #[serde(rename = "APIKey", alias = "apikey", alias = "api_key", default)]
    pub api_key: String,
    /// Sender id shown on the handset.
    #[serde(rename = "Sender", alias = "sender", default)]
    pub sender: String,
    /// HTTP timeout in seconds, 0 means the default of 5.
    #[serde(rename = "Timeout", alias = "timeout", default)]
    pub timeout: u64,
    /// Accepted for compatibility; the client always keeps one idle connection per host.
    #[serde(rename = "MaxIdleConns", alias = "maxidleconns", alias = "max_idle_conns", default)]
    pub max_idle_conns: u32,
}

impl SolsmsConfig {
    /// Parses a JSON configuration blob.
    pub fn from_json(raw: &[u8]) -> Result<Self, OtpError> {
        serde_json::from_slice(raw)
            .map_err(|e| OtpError::Config(format!("invalid provider config: {}", e)))
    }
}

/// SMS provider speaking one vendor's bulk-SMS API.
#[derive(Debug, Clone)]
pub struct SolsmsProvider {
    config: SolsmsConfig,
    profile: VendorProfile,
    endpoint: reqwest::Url,
    timeout: Duration,
    http: reqwest::Client,
}

impl SolsmsProvider {
    /// Builds a Kaleyra provider from a JSON configuration blob.
    pub fn new(raw: &[u8]) -> Result<Self, OtpError> {
        Self::with_profile(raw, VendorProfile::KALEYRA)
    }

    /// Builds a provider for `profile` from a JSON configuration blob.
    pub fn with_profile(raw: &[u8], profile: VendorProfile) -> Result<Self, OtpError> {
        Self::from_config(SolsmsConfig::from_json(raw)?, profile)
    }

    pub fn from_config(mut config: SolsmsConfig, profile: VendorProfile) -> Result<Self, OtpError> {
        if config.api_key.is_empty() || config.sender.is_empty() {
            return Err(OtpError::Config("invalid APIKey or Sender".into()));
        }
        if config.root_url.is_empty() {
            config.root_url = profile.default_url.to_string();
        }
        let endpoint = reqwest::Url::parse(&config.root_url)
            .map_err(|e| OtpError::Config(format!("invalid RootURL {:?}: {}", config.root_url, e)))?;

        let secs = if config.timeout == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            config.timeout
        };
        let timeout = Duration::from_secs(secs);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| OtpError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            config,
            profile,
            endpoint,
            timeout,
            http,
        })
    }

    /// Endpoint every push is posted to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    pub fn config(&self) -> &SolsmsConfig {
        &self.config
    }

    /// URL-encoded form for one send. The message bytes are percent-encoded
    /// as-is, so bodies that are not UTF-8 reach the vendor unchanged.
    fn form(&self, to: &str, message: &[u8]) -> String {
        let (field, value) = self.profile.discriminator;
        let pairs: [(&str, &[u8]); 5] = [
            (field, value.as_bytes()),
            (self.profile.key_field, self.config.api_key.as_bytes()),
            ("sender", self.config.sender.as_bytes()),
            ("to", to.as_bytes()),
            ("message", message),
        ];
        pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    byte_serialize(k.as_bytes()).collect::<String>(),
                    byte_serialize(v).collect::<String>()
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Kaleyra constructor in the gateway's factory shape.
pub fn new_provider(raw: &[u8]) -> Result<Arc<dyn Provider>, OtpError> {
    Ok(Arc::new(SolsmsProvider::new(raw)?))
}

/// Solutions Infini constructor in the gateway's factory shape.
pub fn new_legacy_provider(raw: &[u8]) -> Result<Arc<dyn Provider>, OtpError> {
    Ok(Arc::new(SolsmsProvider::with_profile(
        raw,
        VendorProfile::SOLUTIONS_INFINI,
    )?))
}

#[async_trait]
impl Provider for SolsmsProvider {
    fn id(&self) -> &'static str {
        self.profile.provider_id
    }

    fn channel_name(&self) -> &'static str {
        CHANNEL_NAME
    }

    fn channel_desc(&self) -> String {
        format!(
            "We've sent a {} digit code in an SMS to your mobile. \
             Enter it here to verify your mobile number.",
            MAX_OTP_LEN
        )
    }

    fn address_name(&self) -> &'static str {
        ADDRESS_NAME
    }

    fn address_desc(&self) -> &'static str {
        self.profile.address_desc
    }

    fn validate_address(&self, address: &str) -> Result<(), OtpError> {
        if !PHONE_NUMBER.is_match(address) {
            return Err(OtpError::InvalidAddress("invalid mobile number".into()));
        }
        Ok(())
    }

    async fn push(&self, address: &str, _subject: &str, body: &[u8]) -> Result<(), OtpError> {
        debug!(provider = self.id(), "sending OTP SMS");

        let res = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(self.form(address, body))
            .send()
            .await
            .map_err(|e| OtpError::Transport(Box::new(e)))?;

        let status = res.status();
        let raw = res
            .bytes()
            .await
            .map_err(|e| OtpError::Transport(Box::new(e)))?;
        let text = String::from_utf8_lossy(&raw);

        if !text.contains(self.profile.success_marker) {
            debug!(provider = self.id(), %status, "vendor rejected OTP SMS");
            return Err(OtpError::Delivery(text.into_owned()));
        }

        debug!(provider = self.id(), %status, "OTP SMS accepted");
        Ok(())
    }

    fn max_address_len(&self) -> Option<usize> {
        self.profile.max_address_len
    }

    fn max_otp_len(&self) -> usize {
        MAX_OTP_LEN
    }

    fn max_body_len(&self) -> usize {
        MAX_BODY_LEN
    }
}

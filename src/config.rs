use config::{Config, ConfigError, Environment, File, FileFormat};
use otp_core::{OtpError, ProviderRegistry};
use otp_solsms::{SolsmsConfig, SolsmsProvider, VendorProfile};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tracing::info;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Delivery providers configuration
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: json, pretty or compact (default: compact)
    pub format: String,
}

/// Delivery providers configuration. Unset providers are not registered.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    /// Kaleyra SMS
    pub solsms: Option<SolsmsConfig>,
    /// Solutions Infini SMS
    pub solsms_legacy: Option<SolsmsConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // gitignored
            .add_source(File::with_name("config/local").required(false))
            // e.g. OTPKIT__PROVIDERS__SOLSMS__APIKEY
            .add_source(Environment::with_prefix("OTPKIT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Load configuration from a TOML document layered over the defaults
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Construct every configured provider and register it by id.
    pub fn build_registry(&self) -> Result<ProviderRegistry, OtpError> {
        let mut registry = ProviderRegistry::new();
        let configured = [
            (&self.providers.solsms, VendorProfile::KALEYRA),
            (&self.providers.solsms_legacy, VendorProfile::SOLUTIONS_INFINI),
        ];
        for (cfg, profile) in configured {
            let Some(cfg) = cfg else { continue };
            let provider =
                SolsmsProvider::from_config(cfg.clone(), profile).map_err(|e| match e {
                    OtpError::Config(msg) => {
                        OtpError::Config(format!("{}: {}", profile.provider_id, msg))
                    }
                    other => other,
                })?;
            info!(
                provider = profile.provider_id,
                endpoint = provider.endpoint(),
                "registered OTP provider"
            );
            registry = registry.with(Arc::new(provider));
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "compact");
        assert!(config.providers.solsms.is_none());
        assert!(config.build_registry().unwrap().is_empty());
    }

    #[test]
    fn providers_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [providers.solsms]
            APIKey = "key"
            Sender = "ACMEOT"
            Timeout = 3

            [providers.solsms_legacy]
            RootURL = "http://sms.internal/api"
            APIKey = "working-key"
            Sender = "ACMEOT"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "debug");

        let solsms = config.providers.solsms.as_ref().unwrap();
        assert_eq!(solsms.api_key, "key");
        assert_eq!(solsms.timeout, 3);

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.ids(), vec!["solsms", "solsms-legacy"]);
        assert_eq!(registry.get("solsms").unwrap().max_address_len(), Some(10));
        assert_eq!(registry.get("solsms-legacy").unwrap().max_address_len(), None);
    }

    #[test]
    fn incomplete_provider_fails_registry() {
        let config = AppConfig::from_toml(
            r#"
            [providers.solsms]
            APIKey = "key"
            "#,
        )
        .unwrap();
        let err = config.build_registry().unwrap_err();
        assert!(matches!(err, OtpError::Config(ref msg) if msg.starts_with("solsms:")));
        assert_eq!(
            err.to_string(),
            "config error: solsms: invalid APIKey or Sender"
        );
    }

    #[test]
    fn providers_from_environment() {
        let vars = [
            ("OTPKIT__PROVIDERS__SOLSMS__APIKEY", "env-key"),
            ("OTPKIT__PROVIDERS__SOLSMS__SENDER", "ACMEOT"),
            ("OTPKIT__PROVIDERS__SOLSMS__TIMEOUT", "7"),
        ];
        // No other test in this crate touches the OTPKIT__ namespace.
        for (key, value) in vars {
            unsafe { env::set_var(key, value) };
        }
        let loaded = AppConfig::load();
        for (key, _) in vars {
            unsafe { env::remove_var(key) };
        }

        let config = loaded.unwrap();
        let solsms = config.providers.solsms.as_ref().unwrap();
        assert_eq!(solsms.api_key, "env-key");
        assert_eq!(solsms.sender, "ACMEOT");
        assert_eq!(solsms.timeout, 7);

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.ids(), vec!["solsms"]);
    }
}

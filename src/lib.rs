//! # OTP Kit
//!
//! Gateway-side wiring for one-time-passcode delivery providers.
//!
//! ## Features
//!
//! - **Provider contract**: every channel implements [`otp_core::Provider`]
//! - **SMS via bulk-SMS APIs**: Kaleyra and Solutions Infini through `otp-solsms`
//! - **Layered configuration**: defaults, config files and `OTPKIT__*` environment variables
//! - **Structured logging**: `tracing` with compact, pretty or JSON output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use otpkit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     init_logging(&config.logging)?;
//!
//!     let registry = config.build_registry()?;
//!     let sms = registry.get("solsms").ok_or("solsms not configured")?;
//!
//!     sms.validate_address("+919876543210")?;
//!     sms.push("+919876543210", "", b"Your code is 123456").await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;

pub use crate::config::*;
pub use crate::logging::init_logging;

/// Common imports for OTP Kit usage
pub mod prelude {
    pub use crate::config::{AppConfig, LoggingConfig, ProvidersConfig};
    pub use crate::logging::init_logging;
    pub use otp_core::*;
    pub use otp_solsms::{SolsmsConfig, SolsmsProvider, VendorProfile};
}

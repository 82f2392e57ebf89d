//! Send a verification code through a configured provider.
//!
//! Providers come from `config/*.toml` or `OTPKIT__PROVIDERS__...` variables.
use otpkit::prelude::*;

use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let provider_id = arg_or_env("--provider", "OTP_PROVIDER")?;
    let to = arg_or_env("--to", "OTP_TO")?;
    let code = arg_or_env("--code", "OTP_CODE")?;

    let registry = config.build_registry()?;
    let provider = registry
        .get(&provider_id)
        .ok_or_else(|| format!("provider {} is not configured", provider_id))?;

    provider.validate_address(&to)?;
    if code.len() > provider.max_otp_len() {
        return Err(format!("code longer than {} characters", provider.max_otp_len()).into());
    }

    let body = format!("Your verification code is {}", code);
    provider.push(&to, "", body.as_bytes()).await?;
    println!("Sent via {} ({})", provider.id(), provider.channel_name());
    println!("{}", provider.channel_desc());
    Ok(())
}

/// Value following `flag` on the command line, else the `env_key` variable.
fn arg_or_env(flag: &str, env_key: &str) -> Result<String, String> {
    let mut args = env::args().skip_while(|a| a != flag).skip(1);
    if let Some(value) = args.next() {
        return Ok(value);
    }
    env::var(env_key).map_err(|_| format!("missing {} (or env {})", flag, env_key))
}

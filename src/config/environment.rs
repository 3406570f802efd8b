//! Startup environment validation

use alloy::primitives::Address;
use std::str::FromStr;
use tracing::info;
use crate::errors::{BotError, BotResult};
use super::Config;

/// Validates credentials required for live submission. Failures here are
/// fatal: the process must exit before any scanning begins.
pub fn validate_environment(config: &Config) -> BotResult<()> {
    let rpc = config
        .rpc_endpoint
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BotError::Environment {
            reason: "RPC_ENDPOINT is not set".to_string(),
        })?;

    if !rpc.starts_with("http://") && !rpc.starts_with("https://") && !rpc.starts_with("wss://") {
        return Err(BotError::Environment {
            reason: format!("RPC_ENDPOINT is not a valid endpoint URL: {}", rpc),
        });
    }

    let key = config
        .private_key
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BotError::Environment {
            reason: "PRIVATE_KEY is not set".to_string(),
        })?;

    let key = key.strip_prefix("0x").unwrap_or(key);
    if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BotError::Environment {
            reason: "PRIVATE_KEY is not a 32-byte hex string".to_string(),
        });
    }

    let wallet = config
        .wallet_address
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BotError::Environment {
            reason: "WALLET_ADDRESS is not set".to_string(),
        })?;

    Address::from_str(wallet).map_err(|_| BotError::Environment {
        reason: format!("WALLET_ADDRESS is not a valid address: {}", wallet),
    })?;

    info!("Environment validation successful");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_config() -> Config {
        Config {
            rpc_endpoint: Some("https://polygon-mainnet.g.alchemy.com/v2/test".to_string()),
            private_key: Some("a".repeat(64)),
            wallet_address: Some("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270".to_string()),
            ..Config::load()
        }
    }

    #[test]
    fn accepts_complete_environment() {
        assert!(validate_environment(&live_config()).is_ok());
    }

    #[test]
    fn rejects_missing_rpc_endpoint() {
        let config = Config {
            rpc_endpoint: None,
            ..live_config()
        };
        assert!(matches!(
            validate_environment(&config),
            Err(BotError::Environment { .. })
        ));
    }

    #[test]
    fn rejects_malformed_private_key() {
        let config = Config {
            private_key: Some("not-a-key".to_string()),
            ..live_config()
        };
        assert!(matches!(
            validate_environment(&config),
            Err(BotError::Environment { .. })
        ));
    }

    #[test]
    fn accepts_private_key_with_0x_prefix() {
        let config = Config {
            private_key: Some(format!("0x{}", "b".repeat(64))),
            ..live_config()
        };
        assert!(validate_environment(&config).is_ok());
    }

    #[test]
    fn rejects_malformed_wallet_address() {
        let config = Config {
            wallet_address: Some("0x1234".to_string()),
            ..live_config()
        };
        assert!(matches!(
            validate_environment(&config),
            Err(BotError::Environment { .. })
        ));
    }
}

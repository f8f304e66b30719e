//! Deployment configuration for the game client.

use std::env;
use std::str::FromStr;

use alloy_primitives::{Address, address};
use anyhow::{Context, Result};
use serde::Deserialize;

/// Published game contract deployment.
pub const CONTRACT_ADDRESS: Address = address!("F848754c1D86B87AD7Af0d92aD5a2C3a475bbF86");

/// Chain the published deployment lives on.
pub const EXPECTED_CHAIN_ID: u64 = 4;

/// Deployment constants the client is wired against.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// Address of the deployed game contract.
    pub contract_address: Address,
    /// Chain identifier the contract is deployed on; any other chain
    /// blocks the client.
    pub expected_chain_id: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            contract_address: CONTRACT_ADDRESS,
            expected_chain_id: EXPECTED_CHAIN_ID,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables (a `.env` file is honored):
    /// - `GAME_CONTRACT_ADDRESS` - contract to target (default: the published deployment)
    /// - `GAME_CHAIN_ID` - expected chain id (default: 4)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(raw) = env::var("GAME_CONTRACT_ADDRESS") {
            config.contract_address = Address::from_str(&raw)
                .with_context(|| format!("invalid GAME_CONTRACT_ADDRESS: {raw}"))?;
        }

        if let Some(chain_id) = read_env::<u64>("GAME_CHAIN_ID") {
            config.expected_chain_id = chain_id;
        }

        Ok(config)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_deployment() {
        let config = ClientConfig::default();
        assert_eq!(
            config.contract_address.to_string().to_lowercase(),
            "0xf848754c1d86b87ad7af0d92ad5a2c3a475bbf86"
        );
        assert_eq!(config.expected_chain_id, 4);
    }
}

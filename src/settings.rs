// src/settings.rs
//! Runtime settings.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. an optional TOML file (`ethr-did.toml`, or the path in `ETHR_DID_CONFIG`)
//! 3. `ETHR_DID_*` environment variables, `__` separating nested keys
//!    (e.g. `ETHR_DID_NETWORKS__DEVNET__CHAIN_ID=1337`)
//!
//! Call `dotenv().ok()` first to pick variables up from a `.env` file.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::network::{ChainRegistry, NetworkConfig};

pub const DEFAULT_CONFIG_FILE: &str = "ethr-did.toml";
pub const CONFIG_PATH_VAR: &str = "ETHR_DID_CONFIG";
pub const ENV_PREFIX: &str = "ETHR_DID";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Network new identities are issued on
    pub network: String,

    /// Check the network's RPC endpoint reports the configured chain id
    pub probe_rpc: bool,

    /// Extra or overriding entries on top of the well-known networks
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            network: "optimism".to_string(),
            probe_rpc: false,
            networks: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from the config file and the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let builder = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        Self::from_builder(builder)
    }

    pub(crate) fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// The well-known networks, extended with the configured ones.
    pub fn chain_registry(&self) -> ChainRegistry {
        let mut registry = ChainRegistry::well_known();
        registry.extend(self.networks.clone());
        registry
    }
}

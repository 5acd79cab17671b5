// src/models/network.rs
//! Network name to EIP-155 chain id mapping.
//!
//! The registry is an explicit value handed to the document builder. There is
//! no process-wide default network; callers start from
//! [`ChainRegistry::well_known`] or an empty registry and extend it from
//! configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DidError, Result};

/// Per-network settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// EIP-155 chain id used in `blockchainAccountId`
    pub chain_id: u64,

    /// JSON-RPC endpoint, only consulted by the optional chain probe
    #[serde(default)]
    pub rpc_url: Option<String>,
}

impl NetworkConfig {
    pub fn new(chain_id: u64) -> Self {
        NetworkConfig {
            chain_id,
            rpc_url: None,
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = Some(rpc_url.into());
        self
    }
}

/// Mapping from `did:ethr` network names to chain ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRegistry {
    networks: BTreeMap<String, NetworkConfig>,
}

impl ChainRegistry {
    /// An empty registry. Every `build` against it fails with `UnknownNetwork`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Public networks recognised by `did:ethr` resolvers.
    pub fn well_known() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "mainnet",
            NetworkConfig::new(1).with_rpc_url("https://eth.llamarpc.com"),
        );
        registry.insert(
            "optimism",
            NetworkConfig::new(10).with_rpc_url("https://mainnet.optimism.io"),
        );
        registry.insert(
            "polygon",
            NetworkConfig::new(137).with_rpc_url("https://polygon-rpc.com"),
        );
        registry.insert(
            "base",
            NetworkConfig::new(8453).with_rpc_url("https://mainnet.base.org"),
        );
        registry.insert(
            "arbitrum",
            NetworkConfig::new(42161).with_rpc_url("https://arb1.arbitrum.io/rpc"),
        );
        registry.insert(
            "sepolia",
            NetworkConfig::new(11155111).with_rpc_url("https://rpc.sepolia.org"),
        );
        registry.insert(
            "optimism-sepolia",
            NetworkConfig::new(11155420).with_rpc_url("https://sepolia.optimism.io"),
        );
        registry.insert(
            "base-sepolia",
            NetworkConfig::new(84532).with_rpc_url("https://sepolia.base.org"),
        );
        registry
    }

    /// Adds or replaces a network.
    pub fn insert(&mut self, name: impl Into<String>, config: NetworkConfig) -> &mut Self {
        self.networks.insert(name.into(), config);
        self
    }

    /// Adds or replaces every network in `networks`.
    pub fn extend<I>(&mut self, networks: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, NetworkConfig)>,
    {
        self.networks.extend(networks);
        self
    }

    pub fn get(&self, network: &str) -> Option<&NetworkConfig> {
        self.networks.get(network)
    }

    /// Chain id of `network`, or `UnknownNetwork`. Never falls back to a default.
    pub fn chain_id(&self, network: &str) -> Result<u64> {
        self.get(network)
            .map(|config| config.chain_id)
            .ok_or_else(|| DidError::UnknownNetwork(network.to_string()))
    }

    pub fn networks(&self) -> impl Iterator<Item = (&str, &NetworkConfig)> {
        self.networks.iter().map(|(name, config)| (name.as_str(), config))
    }
}

// src/blockchain/chain_client.rs
//! JSON-RPC chain probe.
//!
//! Confirms that an RPC endpoint serves the chain a network is configured
//! with. This is the only networked code in the crate; issuing and verifying
//! identities never depend on it.

use ethers::providers::{Http, Middleware, Provider};
use ethers::types::U256;
use log::{debug, warn};
use std::sync::Arc;

use crate::error::{DidError, Result};

/// Thin wrapper around an HTTP provider.
#[derive(Clone, Debug)]
pub struct ChainClient {
    /// JSON-RPC provider
    provider: Arc<Provider<Http>>,
    rpc_url: String,
}

impl ChainClient {
    /// Creates a client for `rpc_url`. No request is made until a query runs.
    ///
    /// # Errors
    /// `Chain` if the URL cannot be parsed.
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DidError::Chain(format!("invalid RPC url `{}`: {}", rpc_url, e)))?;
        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Asks the node for its EIP-155 chain id.
    pub async fn chain_id(&self) -> Result<u64> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| DidError::Chain(e.to_string()))?;
        debug!("{} reports chain id {}", self.rpc_url, chain_id);
        chain_id_to_u64(chain_id)
    }

    /// Fails with `ChainMismatch` unless the node serves `expected`.
    pub async fn ensure_chain_id(&self, expected: u64) -> Result<()> {
        let actual = self.chain_id().await?;
        check_chain_id(expected, actual).map_err(|err| {
            warn!("{}: {}", self.rpc_url, err);
            err
        })
    }
}

/// Nodes answer with a 256-bit value; anything above `u64::MAX` is a `Chain`
/// error.
fn chain_id_to_u64(chain_id: U256) -> Result<u64> {
    u64::try_from(chain_id)
        .map_err(|_| DidError::Chain(format!("chain id {} does not fit in u64", chain_id)))
}

fn check_chain_id(expected: u64, actual: u64) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DidError::ChainMismatch { expected, actual })
    }
}

// src/main.rs

//! # Ethereum DID System - Main Entry Point
//!
//! Issues a fresh `did:ethr` identity on the configured network, prints it,
//! and verifies the signed document.
//!
//! ## Environment Variables
//! - `ETHR_DID_NETWORK`: (Optional) network to issue on (default: optimism)
//! - `ETHR_DID_PROBE_RPC`: (Optional) confirm the network's RPC chain id first
//! - `ETHR_DID_CONFIG`: (Optional) settings file (default: ethr-did.toml)
//! - `RUST_LOG`: (Optional) log filter (default: info)

use anyhow::Context;
use dotenv::dotenv;
use ethers_core::utils::to_checksum;
use ethr_did_system::blockchain::chain_client::ChainClient;
use ethr_did_system::{verifier, ChainRegistry, IdentityIssuer, Settings};
use log::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().context("failed to load settings")?;
    let registry = settings.chain_registry();

    if settings.probe_rpc {
        probe_network(&registry, &settings.network).await;
    }

    let issuer = IdentityIssuer::new(registry);
    let issued = issuer
        .issue(&settings.network)
        .with_context(|| format!("failed to create DID on `{}`", settings.network))?;
    let bundle = &issued.bundle;

    println!("Created DID: {}", bundle.did());
    println!("Ethereum Address: {}", to_checksum(&bundle.address(), None));
    println!("\nDID Document:");
    println!("{}", serde_json::to_string_pretty(bundle.document())?);

    let report = verifier::verify(bundle);
    println!(
        "\nDID Verification: {}",
        if report.verified { "Success" } else { "Failed" }
    );

    Ok(())
}

/// Compares the node's chain id with the configured one. Failures are only
/// logged: issuing and verifying never depend on the network.
async fn probe_network(registry: &ChainRegistry, network: &str) {
    let Some(config) = registry.get(network) else {
        return;
    };
    let Some(rpc_url) = config.rpc_url.as_deref() else {
        warn!("no rpc_url configured for `{}`, skipping probe", network);
        return;
    };

    let outcome = match ChainClient::connect(rpc_url) {
        Ok(client) => client.ensure_chain_id(config.chain_id).await,
        Err(err) => Err(err),
    };
    match outcome {
        Ok(()) => info!("{} serves chain {}", rpc_url, config.chain_id),
        Err(err) => warn!("probe of `{}` failed: {}", network, err),
    }
}

// src/services/mod.rs
//! Issuance and verification services.

pub mod document_builder;
pub mod identity_issuer;
pub mod signature_engine;
pub mod verifier;

// src/models/mod.rs
//! Data structures of the DID lifecycle.

pub mod did;
pub mod identity;
pub mod network;
pub mod signature;

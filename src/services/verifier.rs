// src/services/verifier.rs
//! Identity verification.
//!
//! Verification recomputes the canonical form of the presented document,
//! recovers the signer from the signature and compares it with the claimed
//! address. It is a stateless, repeatable check that never touches the
//! bundle. A recovery failure and an address mismatch both simply mean "not
//! verified".
//!
//! A bundle also has to be bound to its signer: its DID and the document it
//! carries must name the same address that signed.

use ethers_core::types::Address;
use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::models::did::{Did, DidDocument};
use crate::models::identity::IdentityBundle;
use crate::models::signature::Signature;
use crate::services::signature_engine::recover_address;
use crate::utils::crypto::{format_address, parse_address};
use crate::utils::serialization::canonical_serialize;

/// Outcome of a verification, with the recovered signer for audit logs.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub verified: bool,
    pub expected_address: Address,
    /// `None` when the document had no canonical form or recovery failed
    pub recovered_address: Option<Address>,
}

/// Checks that `signature` was produced by `expected_address` over the
/// canonical serialization of `document`.
pub fn verify_document(
    document: &DidDocument,
    signature: &Signature,
    expected_address: Address,
) -> VerificationReport {
    let recovered = canonical_serialize(document)
        .and_then(|message| recover_address(&message, signature));

    let recovered_address = match recovered {
        Ok(address) => Some(address),
        Err(err) => {
            warn!("verification of {} failed: {}", document.id, err);
            None
        }
    };

    // Addresses compare as bytes, so the hex case they were written in is
    // irrelevant.
    let verified = recovered_address == Some(expected_address);
    if verified {
        info!("verified {} for {}", document.id, format_address(&expected_address));
    } else if let Some(recovered) = recovered_address {
        warn!(
            "signature on {} was made by {}, expected {}",
            document.id,
            format_address(&recovered),
            format_address(&expected_address)
        );
    }

    VerificationReport {
        verified,
        expected_address,
        recovered_address,
    }
}

/// Verifies an identity bundle.
///
/// On top of [`verify_document`], the bundle's `did`, the document `id` and
/// the address in the document's verification method must all name the
/// bundle's `address`.
pub fn verify(bundle: &IdentityBundle) -> VerificationReport {
    let mut report = verify_document(bundle.document(), bundle.signature(), bundle.address());
    if let Err(reason) = check_binding(bundle) {
        warn!("{} is not bound to its signer: {}", bundle.did(), reason);
        report.verified = false;
    }
    report
}

fn check_binding(bundle: &IdentityBundle) -> std::result::Result<(), String> {
    let document = bundle.document();
    if bundle.did() != document.id {
        return Err(format!("bundle names {}, document names {}", bundle.did(), document.id));
    }
    let did = document.id.parse::<Did>().map_err(|e| e.to_string())?;
    if did.address() != bundle.address() {
        return Err(format!(
            "DID address {} differs from {}",
            format_address(&did.address()),
            format_address(&bundle.address())
        ));
    }
    for method in &document.verification_method {
        let account = method
            .blockchain_account_id
            .rsplit_once(':')
            .map_or("", |(_, account)| account);
        if parse_address(account).ok() != Some(bundle.address()) {
            return Err(format!("account {} differs", method.blockchain_account_id));
        }
    }
    Ok(())
}

/// Verifies a bundle given in its JSON form.
///
/// # Errors
/// `Serialization` if the JSON is not a well-formed bundle, including
/// malformed `address` or `signature` text. A well-formed bundle that fails
/// the check is `Ok` with `verified == false`.
pub fn verify_json(json: &str) -> Result<VerificationReport> {
    let bundle = IdentityBundle::from_json(json)?;
    Ok(verify(&bundle))
}

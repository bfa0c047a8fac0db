//! Deterministic identifier derivation.
//!
//! Ids must be reproducible: parsing the same input twice has to yield the
//! same ids, so there is no randomness and no process-wide counter here.
//! Hashing uses SHA-256 truncated to 16 hex chars: short enough to read in
//! logs, with negligible collision risk at catalog scale.

use sha2::{Digest, Sha256};

/// Hex digest of `input`, truncated to 16 chars.
#[must_use]
pub fn hash_key(input: &str) -> String {
    let mut hex = format!("{:x}", Sha256::digest(input.as_bytes()));
    hex.truncate(16);
    hex
}

/// Derives a shop id from its identifying fields.
///
/// Basis is the non-empty fields of `name|address|city` joined with `|`;
/// when all three are absent the caller supplies the full serialized record
/// as `fallback_json` so even anonymous shops hash deterministically.
#[must_use]
pub fn shop_hash_id(
    name: Option<&str>,
    address: Option<&str>,
    city: Option<&str>,
    fallback_json: &str,
) -> String {
    let basis: Vec<&str> = [name, address, city]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if basis.is_empty() {
        format!("shop_{}", hash_key(fallback_json))
    } else {
        format!("shop_{}", hash_key(&basis.join("|")))
    }
}

/// Derives a package id from its owning shop and identifying fields.
#[must_use]
pub fn package_hash_id(shop_id: &str, name: &str, price_basis: &str) -> String {
    format!("pkg_{}", hash_key(&format!("{shop_id}|{name}|{price_basis}")))
}

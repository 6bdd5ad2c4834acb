//! Program-owned address derivation.
//!
//! A program-owned address is `SHA-256(seed_0 || ... || seed_n || bump ||
//! program_id || "ProgramDerivedAddress")` for the highest bump in `255..=0`
//! whose hash is NOT a valid Ed25519 point. Nobody holds a private key for
//! such an address, so only the owning program can sign for it.

use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::SolError;

/// The string appended to every derivation hash.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, the bump included.
pub const MAX_SEEDS: usize = 16;

/// Find the canonical program-owned address for `seeds` under `program_id`.
///
/// Returns the address together with the bump byte that produced it. Fails
/// with [`SolError::InvalidSeeds`] on oversized seed lists and with
/// [`SolError::DerivationExhausted`] if no bump yields an off-curve hash.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), SolError> {
    check_seeds(seeds, 1)?;

    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::DerivationExhausted(format!(
        "no off-curve bump for {} seed(s) under {program_id}",
        seeds.len()
    )))
}

fn check_seeds(seeds: &[&[u8]], reserved: usize) -> Result<(), SolError> {
    if seeds.len() + reserved > MAX_SEEDS {
        return Err(SolError::InvalidSeeds(format!(
            "at most {} seeds allowed, got {}",
            MAX_SEEDS - reserved,
            seeds.len()
        )));
    }
    if let Some((i, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidSeeds(format!(
            "seed {i} is {} bytes, max {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

/// Returns `Some(address)` if the hash is OFF the Ed25519 curve, `None` if it
/// falls on the curve (try the next bump).
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &Address,
) -> Option<Address> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(Address::new(hash))
}

/// Check if 32 bytes decompress to a valid Ed25519 point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

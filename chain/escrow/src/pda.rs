//! Program-derived addresses
//!
//! Entities are located by a pure function of (seeds, namespace) instead of
//! by identity. A derived address is the SHA-256 of
//! `seeds ‖ program_id ‖ "ProgramDerivedAddress"`, with a trailing one-byte
//! bump searched from 255 down until the digest is not a valid Ed25519
//! point. Off-curve addresses have no private key, so only the owning
//! program can authorize on their behalf.

use escrow_types::account::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};
use escrow_types::ids::Pubkey;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Seed prefix of every escrow record address
pub const ESCROW_SEED: &[u8] = b"escrow";

/// Domain separator appended to every derivation
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds, bump included
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed
pub const MAX_SEED_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdaError {
    #[error("Too many seeds or seed longer than {MAX_SEED_LEN} bytes")]
    MaxSeedLengthExceeded,

    #[error("Derived address lies on the Ed25519 curve")]
    InvalidSeeds,

    #[error("No bump produces an off-curve address")]
    NoViableBump,
}

/// Derive the address for fully specified seeds (bump included).
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, PdaError> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(PdaError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    let hash: [u8; 32] = hasher.finalize().into();

    let address = Pubkey::new_from_array(hash);
    if address.is_on_curve() {
        return Err(PdaError::InvalidSeeds);
    }
    Ok(address)
}

/// Find the canonical (highest) bump and its address.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), PdaError> {
    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);
        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(PdaError::InvalidSeeds) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(PdaError::NoViableBump)
}

/// Escrow record address for (maker, seed) under `program_id`.
///
/// Pure: depends only on its inputs, never on ledger state, so any
/// party can compute it before the record exists.
pub fn find_escrow_address(
    maker: &Pubkey,
    seed: u64,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), PdaError> {
    find_program_address(&[ESCROW_SEED, maker.as_ref(), &seed.to_le_bytes()], program_id)
}

/// Canonical token balance slot of `owner` for `mint`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Result<Pubkey, PdaError> {
    find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _)| address)
}

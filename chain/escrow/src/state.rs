//! Escrow record: the persistent terms of one swap offer
//!
//! Stored as a program-owned account: an 8-byte type discriminator followed
//! by the bincode encoding of `EscrowRecord`.

use escrow_types::ids::Pubkey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::EscrowError;
use crate::pda::{create_program_address, PdaError, ESCROW_SEED};

/// Terms of one open swap offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Maker-chosen nonce; with `maker` it determines the record address
    pub seed: u64,
    /// Offering party
    pub maker: Pubkey,
    /// Asset deposited by the maker
    pub mint_a: Pubkey,
    /// Asset the maker wants in return
    pub mint_b: Pubkey,
    /// Amount of `mint_b` required to fulfill the offer
    pub receive: u64,
    /// Cached bump of the record address
    pub bump: u8,
}

impl EscrowRecord {
    /// Account size: discriminator + seed + 3 keys + receive + bump
    pub const LEN: usize = 8 + 8 + 32 * 3 + 8 + 1;

    /// First 8 bytes of SHA-256("account:EscrowRecord")
    pub fn discriminator() -> [u8; 8] {
        let hash = Sha256::digest(b"account:EscrowRecord");
        let mut disc = [0u8; 8];
        disc.copy_from_slice(&hash[..8]);
        disc
    }

    /// Encode as account data
    pub fn pack(&self) -> Result<Vec<u8>, EscrowError> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&Self::discriminator());
        let body = bincode::serialize(self).map_err(|_| EscrowError::InvalidRecordData)?;
        data.extend_from_slice(&body);
        Ok(data)
    }

    /// Decode account data, checking the discriminator
    pub fn unpack(data: &[u8]) -> Result<Self, EscrowError> {
        if data.len() < Self::LEN || data[..8] != Self::discriminator() {
            return Err(EscrowError::InvalidRecordData);
        }
        bincode::deserialize(&data[8..]).map_err(|_| EscrowError::InvalidRecordData)
    }

    /// Recompute this record's address from its stored seeds and bump.
    pub fn address(&self, program_id: &Pubkey) -> Result<Pubkey, PdaError> {
        create_program_address(
            &[
                ESCROW_SEED,
                self.maker.as_ref(),
                &self.seed.to_le_bytes(),
                &[self.bump],
            ],
            program_id,
        )
    }
}

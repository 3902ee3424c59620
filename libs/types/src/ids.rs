//! Identity types for ledger entities
//!
//! Every account, mint, program and party is addressed by a 32-byte
//! `Pubkey`. Human parties additionally hold a `Keypair` whose public half
//! is their `Pubkey`; program-derived addresses deliberately have no
//! private key (see `Pubkey::is_on_curve`).

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a public key in bytes
pub const PUBKEY_BYTES: usize = 32;

/// Length of an Ed25519 signature in bytes
pub const SIGNATURE_BYTES: usize = 64;

/// 32-byte address of a ledger entity
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    /// Create from raw bytes
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Random address with no known private key behind it.
    ///
    /// Useful for mints and other accounts that never sign.
    pub fn new_unique() -> Self {
        let mut bytes = [0u8; PUBKEY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn to_bytes(&self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    /// Borrow the raw bytes
    pub fn as_array(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Whether the bytes decode to a valid Ed25519 point.
    ///
    /// Addresses on the curve may have a private key; program-derived
    /// addresses are always off the curve.
    pub fn is_on_curve(&self) -> bool {
        VerifyingKey::from_bytes(&self.0).is_ok()
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", hex::encode(self.0))
    }
}

/// Errors parsing a hex-encoded `Pubkey`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePubkeyError {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {PUBKEY_BYTES} bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Pubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParsePubkeyError::InvalidHex(e.to_string()))?;
        let array: [u8; PUBKEY_BYTES] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParsePubkeyError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

/// Ed25519 signature over a transaction message
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Signature {
    pub const fn new_from_array(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_BYTES] {
        self.0
    }

    /// Verify this signature against `pubkey` and `message`.
    ///
    /// Returns `false` for off-curve keys (no private key can exist).
    pub fn verify(&self, pubkey: &Pubkey, message: &[u8]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(pubkey.as_array()) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(&self.0);
        key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

/// Ed25519 keypair of a human party (maker, taker, mint authority)
pub struct Keypair(SigningKey);

impl Keypair {
    /// Generate a fresh keypair from the OS RNG
    pub fn new() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Deterministic keypair from a 32-byte secret seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    /// Public half of the keypair
    pub fn pubkey(&self) -> Pubkey {
        Pubkey(self.0.verifying_key().to_bytes())
    }

    /// Sign an arbitrary message
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keypair").field(&self.pubkey()).finish()
    }
}

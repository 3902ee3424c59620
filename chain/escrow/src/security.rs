//! Authorization primitives shared by the ledger, processor and bank
//!
//! - `SignerSet`: keys that authorized the current transaction, plus
//!   program addresses the executing program signs for via seeds
//! - `ReplayGuard`: one-shot (payer, nonce) pairs so a signed transaction
//!   commits at most once

use escrow_types::ids::Pubkey;
use std::collections::{BTreeSet, HashSet};

use crate::pda::{create_program_address, PdaError};

/// Set of authorities for one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerSet {
    keys: BTreeSet<Pubkey>,
}

impl SignerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key whose signature has been verified
    pub fn insert(&mut self, key: Pubkey) {
        self.keys.insert(key);
    }

    pub fn contains(&self, key: &Pubkey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Extend with the program address derived from `seeds`.
    ///
    /// Only the program named by `program_id` can produce this derivation,
    /// which is what lets it authorize debits from accounts it owns.
    pub fn with_program_signer(
        &self,
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<Self, PdaError> {
        let address = create_program_address(seeds, program_id)?;
        let mut signers = self.clone();
        signers.insert(address);
        Ok(signers)
    }
}

impl FromIterator<Pubkey> for SignerSet {
    fn from_iter<I: IntoIterator<Item = Pubkey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Replay protection keyed by (fee payer, nonce).
///
/// A pair can only be consumed once. Consumed pairs are never evicted, so
/// the set grows with every committed transaction.
#[derive(Debug, Clone, Default)]
pub struct ReplayGuard {
    used: HashSet<(Pubkey, u64)>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a nonce has been used by `payer`.
    pub fn is_used(&self, payer: &Pubkey, nonce: u64) -> bool {
        self.used.contains(&(*payer, nonce))
    }

    /// Mark a nonce as used. Returns `false` if already used (replay attempt).
    pub fn consume(&mut self, payer: Pubkey, nonce: u64) -> bool {
        self.used.insert((payer, nonce))
    }

    /// Number of tracked nonces.
    pub fn count(&self) -> usize {
        self.used.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::find_program_address;

    // --- SignerSet tests ---

    #[test]
    fn test_signer_set_contains() {
        let key = Pubkey::new_unique();
        let signers: SignerSet = [key].into_iter().collect();
        assert!(signers.contains(&key));
        assert!(!signers.contains(&Pubkey::new_unique()));
    }

    #[test]
    fn test_with_program_signer_adds_derived_address() {
        let program_id = Pubkey::new_from_array([5u8; 32]);
        let (address, bump) = find_program_address(&[&b"vault"[..]], &program_id).unwrap();

        let base = SignerSet::new();
        let signers = base.with_program_signer(&[&b"vault"[..], &[bump]], &program_id).unwrap();

        assert!(signers.contains(&address));
        assert!(!base.contains(&address), "base set is left untouched");
    }

    #[test]
    fn test_with_program_signer_other_program_differs() {
        let program_id = Pubkey::new_from_array([5u8; 32]);
        let (address, bump) = find_program_address(&[&b"vault"[..]], &program_id).unwrap();

        let other = Pubkey::new_from_array([6u8; 32]);
        match SignerSet::new().with_program_signer(&[&b"vault"[..], &[bump]], &other) {
            Ok(signers) => assert!(!signers.contains(&address)),
            Err(e) => assert_eq!(e, PdaError::InvalidSeeds),
        }
    }

    // --- ReplayGuard tests ---

    #[test]
    fn test_replay_guard_use_once() {
        let mut guard = ReplayGuard::new();
        let payer = Pubkey::new_unique();
        assert!(guard.consume(payer, 1));
        assert!(guard.is_used(&payer, 1));
    }

    #[test]
    fn test_replay_guard_replay_rejected() {
        let mut guard = ReplayGuard::new();
        let payer = Pubkey::new_unique();
        assert!(guard.consume(payer, 1));
        assert!(!guard.consume(payer, 1), "Second use must return false");
    }

    #[test]
    fn test_replay_guard_different_payers() {
        let mut guard = ReplayGuard::new();
        assert!(guard.consume(Pubkey::new_unique(), 1));
        assert!(guard.consume(Pubkey::new_unique(), 1), "Same nonce on different payer is OK");
        assert_eq!(guard.count(), 2);
    }
}

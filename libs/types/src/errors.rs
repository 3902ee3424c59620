//! Ledger error taxonomy
//!
//! Errors raised by the asset ledger and record store. Higher layers
//! map these onto their own taxonomy with `#[from]`.

use thiserror::Error;

use crate::ids::Pubkey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account not found: {address}")]
    AccountNotFound { address: Pubkey },

    #[error("Account already exists: {address}")]
    AccountAlreadyExists { address: Pubkey },

    #[error("Insufficient funds in {address}: required {required}, available {available}")]
    InsufficientFunds {
        address: Pubkey,
        required: u64,
        available: u64,
    },

    #[error("Insufficient lamports in {address}: required {required}, available {available}")]
    InsufficientLamports {
        address: Pubkey,
        required: u64,
        available: u64,
    },

    #[error("Mint mismatch: expected {expected}, found {found}")]
    MintMismatch { expected: Pubkey, found: Pubkey },

    #[error("Decimals mismatch: mint has {expected}, caller supplied {found}")]
    DecimalsMismatch { expected: u8, found: u8 },

    #[error("Owner mismatch on {address}: expected {expected}, found {found}")]
    OwnerMismatch {
        address: Pubkey,
        expected: Pubkey,
        found: Pubkey,
    },

    #[error("Missing signature for authority {authority}")]
    MissingSignature { authority: Pubkey },

    #[error("Cannot close {address}: non-zero token balance {amount}")]
    NonZeroBalance { address: Pubkey, amount: u64 },

    #[error("Invalid account data in {address}")]
    InvalidAccountData { address: Pubkey },

    #[error("Address derivation failed for owner {owner}")]
    DerivationFailed { owner: Pubkey },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_display() {
        let err = LedgerError::InsufficientFunds {
            address: Pubkey::new_from_array([0u8; 32]),
            required: 10,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("required 10"));
        assert!(msg.contains("available 3"));
    }

    #[test]
    fn test_overflow_display() {
        assert_eq!(
            LedgerError::Overflow.to_string(),
            "Arithmetic overflow in balance calculation"
        );
    }
}

//! Escrow error types
//!
//! Every failure is detected before the transaction commits, so an error
//! always means "nothing happened". Callers of `take`/`refund` that see
//! `RecordNotFound` should read it as "already resolved by someone".

use escrow_types::errors::LedgerError;
use escrow_types::ids::Pubkey;
use thiserror::Error;

use crate::pda::PdaError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EscrowError {
    #[error("Invalid amount: deposit and requested amounts must be greater than zero")]
    InvalidAmount,

    #[error("Insufficient balance in {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Pubkey,
        required: u64,
        available: u64,
    },

    #[error("Address collision: an account already exists at {address}")]
    AddressCollision { address: Pubkey },

    #[error("Escrow record not found: {address}")]
    RecordNotFound { address: Pubkey },

    #[error("Unauthorized: {caller} may not perform this operation")]
    Unauthorized { caller: Pubkey },

    #[error("Mint mismatch: escrow expects {expected}, got {found}")]
    MintMismatch { expected: Pubkey, found: Pubkey },

    #[error("Ledger rejected the operation: {reason}")]
    LedgerRejected { reason: String },

    #[error("Account mismatch for {name}: expected {expected}, got {found}")]
    AccountMismatch {
        name: &'static str,
        expected: Pubkey,
        found: Pubkey,
    },

    #[error("Invalid instruction: {reason}")]
    InvalidInstruction { reason: String },

    #[error("Escrow record data is malformed")]
    InvalidRecordData,

    #[error("Address derivation failed: {0}")]
    Derivation(#[from] PdaError),
}

impl From<LedgerError> for EscrowError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                address,
                required,
                available,
            } => EscrowError::InsufficientBalance {
                account: address,
                required,
                available,
            },
            LedgerError::AccountAlreadyExists { address } => {
                EscrowError::AddressCollision { address }
            }
            LedgerError::MintMismatch { expected, found } => {
                EscrowError::MintMismatch { expected, found }
            }
            LedgerError::MissingSignature { authority } => {
                EscrowError::Unauthorized { caller: authority }
            }
            other => EscrowError::LedgerRejected {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found_display() {
        let address = Pubkey::new_from_array([1u8; 32]);
        let err = EscrowError::RecordNotFound { address };
        assert!(err.to_string().contains(&address.to_string()));
    }

    #[test]
    fn test_ledger_insufficient_funds_maps_to_balance() {
        let account = Pubkey::new_unique();
        let err: EscrowError = LedgerError::InsufficientFunds {
            address: account,
            required: 5,
            available: 1,
        }
        .into();
        assert_eq!(
            err,
            EscrowError::InsufficientBalance {
                account,
                required: 5,
                available: 1
            }
        );
    }

    #[test]
    fn test_ledger_missing_signature_maps_to_unauthorized() {
        let authority = Pubkey::new_unique();
        let err: EscrowError = LedgerError::MissingSignature { authority }.into();
        assert_eq!(err, EscrowError::Unauthorized { caller: authority });
    }

    #[test]
    fn test_other_ledger_errors_are_rejections() {
        let err: EscrowError = LedgerError::Overflow.into();
        assert!(matches!(err, EscrowError::LedgerRejected { .. }));
    }

    #[test]
    fn test_from_pda_error() {
        let err: EscrowError = PdaError::NoViableBump.into();
        assert!(matches!(err, EscrowError::Derivation(_)));
    }
}

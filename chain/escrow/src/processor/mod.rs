//! Escrow state machine
//!
//! `NonExistent → Open → Resolved(Fulfilled | Cancelled)`. A resolved
//! record is deleted, so it is indistinguishable from one that never
//! existed.
//!
//! Every handler validates all preconditions before its first mutation.
//! Atomicity across the several ledger effects of one instruction is
//! provided by the caller (the bank executes against a private copy of
//! the ledger and discards it on any error).

mod make;
mod refund;
mod take;

use escrow_types::errors::LedgerError;
use escrow_types::ids::Pubkey;
use tracing::debug;

use crate::errors::EscrowError;
use crate::events::EscrowEvent;
use crate::instruction::{AccountMeta, EscrowInstruction};
use crate::ledger::Ledger;
use crate::pda::ESCROW_SEED;
use crate::security::SignerSet;
use crate::state::EscrowRecord;

/// Entry point: decode `data` and run the matching handler against `ledger`.
pub fn process_instruction<L: Ledger>(
    program_id: &Pubkey,
    ledger: &mut L,
    signers: &SignerSet,
    accounts: &[AccountMeta],
    data: &[u8],
) -> Result<EscrowEvent, EscrowError> {
    let keys: Vec<Pubkey> = accounts.iter().map(|meta| meta.pubkey).collect();
    let instruction = EscrowInstruction::unpack(data)?;
    debug!(?instruction, accounts = keys.len(), "Processing escrow instruction");

    match instruction {
        EscrowInstruction::Make {
            seed,
            amount_a,
            amount_b,
        } => make::process(program_id, ledger, signers, &keys, seed, amount_a, amount_b),
        EscrowInstruction::Take => take::process(program_id, ledger, signers, &keys),
        EscrowInstruction::Refund => refund::process(program_id, ledger, signers, &keys),
    }
}

/// Split off exactly the first `N` accounts.
fn expect_accounts<const N: usize>(keys: &[Pubkey]) -> Result<[Pubkey; N], EscrowError> {
    keys.get(..N)
        .and_then(|slice| <[Pubkey; N]>::try_from(slice).ok())
        .ok_or_else(|| EscrowError::InvalidInstruction {
            reason: format!("expected {N} accounts, got {}", keys.len()),
        })
}

fn expect_account(name: &'static str, expected: Pubkey, found: Pubkey) -> Result<(), EscrowError> {
    if expected != found {
        return Err(EscrowError::AccountMismatch {
            name,
            expected,
            found,
        });
    }
    Ok(())
}

/// Load the record at `escrow`. Anything that is not a live record owned by
/// this program reads as `RecordNotFound`.
fn load_record<L: Ledger>(
    ledger: &L,
    escrow: &Pubkey,
    program_id: &Pubkey,
) -> Result<EscrowRecord, EscrowError> {
    match ledger.program_account_data(escrow, program_id) {
        Ok(data) => EscrowRecord::unpack(data),
        Err(LedgerError::AccountNotFound { .. }) | Err(LedgerError::OwnerMismatch { .. }) => {
            Err(EscrowError::RecordNotFound { address: *escrow })
        }
        Err(e) => Err(e.into()),
    }
}

/// Extend `signers` with the record's own address, authorizing vault
/// debits and record creation.
fn sign_as_escrow(
    record: &EscrowRecord,
    program_id: &Pubkey,
    signers: &SignerSet,
) -> Result<SignerSet, EscrowError> {
    Ok(signers.with_program_signer(
        &[
            ESCROW_SEED,
            record.maker.as_ref(),
            &record.seed.to_le_bytes(),
            &[record.bump],
        ],
        program_id,
    )?)
}

/// Available token balance, 0 when the slot does not exist.
fn available_balance<L: Ledger>(ledger: &L, token_account: &Pubkey) -> u64 {
    ledger
        .token_account(token_account)
        .map_or(0, |token| token.amount)
}

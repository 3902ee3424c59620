//! `refund`: the maker withdraws an open offer.

use escrow_types::ids::Pubkey;
use tracing::info;

use super::{expect_account, expect_accounts, load_record, sign_as_escrow};
use crate::errors::EscrowError;
use crate::events::{EscrowCancelled, EscrowEvent};
use crate::ledger::Ledger;
use crate::pda::associated_token_address;
use crate::security::SignerSet;

/// Accounts: maker, escrow, mint_a, vault, maker_ata_a
pub(super) fn process<L: Ledger>(
    program_id: &Pubkey,
    ledger: &mut L,
    signers: &SignerSet,
    accounts: &[Pubkey],
) -> Result<EscrowEvent, EscrowError> {
    let [maker, escrow, mint_a, vault, maker_ata_a] = expect_accounts::<5>(accounts)?;

    let record = load_record(ledger, &escrow, program_id)?;
    if record.maker != maker || !signers.contains(&maker) {
        return Err(EscrowError::Unauthorized { caller: maker });
    }
    if mint_a != record.mint_a {
        return Err(EscrowError::MintMismatch {
            expected: record.mint_a,
            found: mint_a,
        });
    }
    expect_account("escrow", record.address(program_id)?, escrow)?;
    expect_account("vault", associated_token_address(&escrow, &mint_a)?, vault)?;
    expect_account("maker_ata_a", associated_token_address(&maker, &mint_a)?, maker_ata_a)?;

    let mint_a_info = ledger.mint(&mint_a)?;
    let refunded = ledger.token_account(&vault)?.amount;
    let escrow_signers = sign_as_escrow(&record, program_id, signers)?;

    ledger.create_associated_token_account_idempotent(&maker, &maker, &mint_a, signers)?;
    ledger.transfer_checked(
        &vault,
        &mint_a,
        &maker_ata_a,
        &escrow,
        refunded,
        mint_a_info.decimals,
        &escrow_signers,
    )?;
    ledger.close_token_account(&vault, &maker, &escrow, &escrow_signers)?;
    ledger.close_program_account(&escrow, program_id, &maker)?;

    info!(%escrow, %maker, refunded, "Escrow refunded");

    Ok(EscrowEvent::Cancelled(EscrowCancelled {
        escrow,
        maker,
        refunded,
    }))
}

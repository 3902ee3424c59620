//! `make`: open an offer and fund its vault.

use escrow_types::account::SYSTEM_PROGRAM_ID;
use escrow_types::ids::Pubkey;
use escrow_types::numeric::to_ui_amount;
use tracing::info;

use super::{available_balance, expect_account, expect_accounts, sign_as_escrow};
use crate::errors::EscrowError;
use crate::events::{EscrowEvent, EscrowOpened};
use crate::ledger::Ledger;
use crate::pda::{associated_token_address, find_escrow_address};
use crate::security::SignerSet;
use crate::state::EscrowRecord;

/// Accounts: maker, escrow, mint_a, mint_b, maker_ata_a, vault
pub(super) fn process<L: Ledger>(
    program_id: &Pubkey,
    ledger: &mut L,
    signers: &SignerSet,
    accounts: &[Pubkey],
    seed: u64,
    amount_a: u64,
    amount_b: u64,
) -> Result<EscrowEvent, EscrowError> {
    let [maker, escrow, mint_a, mint_b, maker_ata_a, vault] = expect_accounts::<6>(accounts)?;

    if amount_a == 0 || amount_b == 0 {
        return Err(EscrowError::InvalidAmount);
    }
    if !signers.contains(&maker) {
        return Err(EscrowError::Unauthorized { caller: maker });
    }

    let (expected_escrow, bump) = find_escrow_address(&maker, seed, program_id)?;
    expect_account("escrow", expected_escrow, escrow)?;
    expect_account("maker_ata_a", associated_token_address(&maker, &mint_a)?, maker_ata_a)?;
    expect_account("vault", associated_token_address(&escrow, &mint_a)?, vault)?;

    // A bare pre-funded wallet at the record address is absorbed on
    // creation; anything else means the (maker, seed) pair is taken.
    if let Some(existing) = ledger.account(&escrow) {
        if !existing.data.is_empty() || existing.owner != SYSTEM_PROGRAM_ID {
            return Err(EscrowError::AddressCollision { address: escrow });
        }
    }
    // The vault may pre-exist only as an empty slot of the right mint.
    if let Ok(slot) = ledger.token_account(&vault) {
        if slot.amount != 0 || slot.mint != mint_a || slot.owner != escrow {
            return Err(EscrowError::AddressCollision { address: vault });
        }
    }

    let mint_a_info = ledger.mint(&mint_a)?;
    ledger.mint(&mint_b)?;

    let available = available_balance(ledger, &maker_ata_a);
    if available < amount_a {
        return Err(EscrowError::InsufficientBalance {
            account: maker_ata_a,
            required: amount_a,
            available,
        });
    }

    let record = EscrowRecord {
        seed,
        maker,
        mint_a,
        mint_b,
        receive: amount_b,
        bump,
    };
    let escrow_signers = sign_as_escrow(&record, program_id, signers)?;

    ledger.create_program_account(&maker, &escrow, program_id, record.pack()?, &escrow_signers)?;
    ledger.create_associated_token_account_idempotent(&maker, &escrow, &mint_a, signers)?;
    ledger.transfer_checked(
        &maker_ata_a,
        &mint_a,
        &vault,
        &maker,
        amount_a,
        mint_a_info.decimals,
        signers,
    )?;

    info!(
        %escrow,
        %maker,
        seed,
        deposited = amount_a,
        deposited_ui = ?to_ui_amount(amount_a, mint_a_info.decimals),
        receive = amount_b,
        "Escrow opened"
    );

    Ok(EscrowEvent::Opened(EscrowOpened {
        escrow,
        maker,
        seed,
        mint_a,
        mint_b,
        deposited: amount_a,
        receive: amount_b,
    }))
}

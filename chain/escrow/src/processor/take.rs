//! `take`: settle an open offer.
//!
//! The taker pays `receive` of mint B to the maker and receives the whole
//! vault. The vault's storage deposit returns to the maker; the record's
//! storage deposit goes to the taker.

use escrow_types::ids::Pubkey;
use tracing::info;

use super::{available_balance, expect_account, expect_accounts, load_record, sign_as_escrow};
use crate::errors::EscrowError;
use crate::events::{EscrowEvent, EscrowFulfilled};
use crate::ledger::Ledger;
use crate::pda::associated_token_address;
use crate::security::SignerSet;

/// Accounts: taker, maker, escrow, mint_a, mint_b, vault,
/// taker_ata_a, taker_ata_b, maker_ata_b
pub(super) fn process<L: Ledger>(
    program_id: &Pubkey,
    ledger: &mut L,
    signers: &SignerSet,
    accounts: &[Pubkey],
) -> Result<EscrowEvent, EscrowError> {
    let [taker, maker, escrow, mint_a, mint_b, vault, taker_ata_a, taker_ata_b, maker_ata_b] =
        expect_accounts::<9>(accounts)?;

    if !signers.contains(&taker) {
        return Err(EscrowError::Unauthorized { caller: taker });
    }

    let record = load_record(ledger, &escrow, program_id)?;
    expect_account("maker", record.maker, maker)?;
    if mint_a != record.mint_a {
        return Err(EscrowError::MintMismatch {
            expected: record.mint_a,
            found: mint_a,
        });
    }
    if mint_b != record.mint_b {
        return Err(EscrowError::MintMismatch {
            expected: record.mint_b,
            found: mint_b,
        });
    }
    expect_account("escrow", record.address(program_id)?, escrow)?;
    expect_account("vault", associated_token_address(&escrow, &mint_a)?, vault)?;
    expect_account("taker_ata_a", associated_token_address(&taker, &mint_a)?, taker_ata_a)?;
    expect_account("taker_ata_b", associated_token_address(&taker, &mint_b)?, taker_ata_b)?;
    expect_account("maker_ata_b", associated_token_address(&maker, &mint_b)?, maker_ata_b)?;

    let mint_a_info = ledger.mint(&mint_a)?;
    let mint_b_info = ledger.mint(&mint_b)?;

    let available = available_balance(ledger, &taker_ata_b);
    if available < record.receive {
        return Err(EscrowError::InsufficientBalance {
            account: taker_ata_b,
            required: record.receive,
            available,
        });
    }
    let released = ledger.token_account(&vault)?.amount;
    let escrow_signers = sign_as_escrow(&record, program_id, signers)?;

    ledger.create_associated_token_account_idempotent(&taker, &taker, &mint_a, signers)?;
    ledger.create_associated_token_account_idempotent(&taker, &maker, &mint_b, signers)?;

    ledger.transfer_checked(
        &taker_ata_b,
        &mint_b,
        &maker_ata_b,
        &taker,
        record.receive,
        mint_b_info.decimals,
        signers,
    )?;
    ledger.transfer_checked(
        &vault,
        &mint_a,
        &taker_ata_a,
        &escrow,
        released,
        mint_a_info.decimals,
        &escrow_signers,
    )?;

    let vault_rent = ledger.close_token_account(&vault, &maker, &escrow, &escrow_signers)?;
    let record_rent = ledger.close_program_account(&escrow, program_id, &taker)?;

    info!(
        %escrow,
        %maker,
        %taker,
        paid = record.receive,
        released,
        vault_rent,
        record_rent,
        "Escrow fulfilled"
    );

    Ok(EscrowEvent::Fulfilled(EscrowFulfilled {
        escrow,
        maker,
        taker,
        paid: record.receive,
        released,
    }))
}

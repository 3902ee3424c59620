//! Typed client for the escrow program
//!
//! Computes every account address itself, signs with the caller's keypair
//! and submits through a shared [`Bank`]. Submission failures that come
//! from the program surface as the program's own [`EscrowError`].

use std::sync::Arc;

use escrow_types::ids::{Keypair, Pubkey};
use rand::Rng;
use tracing::debug;

use crate::bank::{Bank, Message, SubmitError, Transaction, TransactionReceipt};
use crate::errors::EscrowError;
use crate::instruction::{self, Instruction};
use crate::pda::find_escrow_address;
use crate::state::EscrowRecord;

#[derive(Debug, Clone)]
pub struct EscrowClient {
    bank: Arc<Bank>,
}

impl EscrowClient {
    pub fn new(bank: Arc<Bank>) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &Arc<Bank> {
        &self.bank
    }

    pub fn program_id(&self) -> Pubkey {
        self.bank.program_id()
    }

    /// Record address for `(maker, seed)`
    pub fn escrow_address(&self, maker: &Pubkey, seed: u64) -> Result<Pubkey, EscrowError> {
        let (address, _) = find_escrow_address(maker, seed, &self.program_id())?;
        Ok(address)
    }

    pub fn fetch_escrow(&self, address: &Pubkey) -> Result<Option<EscrowRecord>, EscrowError> {
        self.bank.escrow_record(address)
    }

    /// Open an offer: deposit `amount_a` of `mint_a`, ask `amount_b` of
    /// `mint_b`. Returns the record address.
    pub fn make(
        &self,
        maker: &Keypair,
        seed: u64,
        amount_a: u64,
        amount_b: u64,
        mint_a: &Pubkey,
        mint_b: &Pubkey,
    ) -> Result<Pubkey, EscrowError> {
        let ix = instruction::make(
            &self.program_id(),
            &maker.pubkey(),
            mint_a,
            mint_b,
            seed,
            amount_a,
            amount_b,
        )?;
        let escrow = self.escrow_address(&maker.pubkey(), seed)?;
        self.send(maker, ix)?;
        Ok(escrow)
    }

    /// Fulfill the offer at `escrow`.
    pub fn take(&self, taker: &Keypair, escrow: &Pubkey) -> Result<TransactionReceipt, EscrowError> {
        let record = self
            .fetch_escrow(escrow)?
            .ok_or(EscrowError::RecordNotFound { address: *escrow })?;
        let ix = instruction::take(
            &self.program_id(),
            &taker.pubkey(),
            &record.maker,
            escrow,
            &record.mint_a,
            &record.mint_b,
        )?;
        self.send(taker, ix)
    }

    /// Cancel the offer at `escrow`. Only its maker can do this.
    pub fn refund(&self, caller: &Keypair, escrow: &Pubkey) -> Result<TransactionReceipt, EscrowError> {
        let record = self
            .fetch_escrow(escrow)?
            .ok_or(EscrowError::RecordNotFound { address: *escrow })?;
        let ix = instruction::refund(&self.program_id(), &caller.pubkey(), escrow, &record.mint_a)?;
        self.send(caller, ix)
    }

    fn send(&self, signer: &Keypair, ix: Instruction) -> Result<TransactionReceipt, EscrowError> {
        let nonce: u64 = rand::thread_rng().gen();
        let message = Message::new(signer.pubkey(), nonce, vec![ix]);
        let tx = Transaction::new_signed(message, &[signer]).map_err(into_escrow_error)?;
        debug!(signer = %signer.pubkey(), nonce, "Submitting transaction");
        self.bank.submit(&tx).map_err(into_escrow_error)
    }
}

fn into_escrow_error(err: SubmitError) -> EscrowError {
    match err {
        SubmitError::Program { source, .. } => source,
        other => EscrowError::LedgerRejected {
            reason: other.to_string(),
        },
    }
}

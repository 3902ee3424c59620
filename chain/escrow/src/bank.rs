//! Transaction submission and finality
//!
//! The bank owns the committed ledger. A transaction is verified outside
//! the lock, then executed against a private copy of the committed state.
//! The copy replaces the committed state only if every instruction
//! succeeds, so a rejected transaction leaves no trace.
//!
//! Commits are serialized through one mutex: two transactions touching the
//! same record are totally ordered, and the second one observes the first.
//!
//! Known limit: the committed event log and the set of consumed
//! (payer, nonce) pairs are kept for the bank's whole lifetime and never
//! pruned, so memory grows with the number of committed transactions.

use std::sync::{Mutex, MutexGuard, PoisonError};

use escrow_types::account::{Account, TokenAccount};
use escrow_types::errors::LedgerError;
use escrow_types::ids::{Keypair, Pubkey, Signature};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EscrowConfig};
use crate::errors::EscrowError;
use crate::events::EscrowEvent;
use crate::instruction::Instruction;
use crate::ledger::{AssetLedger, LedgerState, RecordStore};
use crate::processor::process_instruction;
use crate::security::{ReplayGuard, SignerSet};
use crate::state::EscrowRecord;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Transaction has no instructions")]
    EmptyTransaction,

    #[error("Failed to encode transaction message: {0}")]
    Encoding(String),

    #[error("Invalid signature for {signer}")]
    InvalidSignature { signer: Pubkey },

    #[error("Missing signature for {signer}")]
    MissingSignature { signer: Pubkey },

    #[error("Duplicate transaction: nonce {nonce} already used by {payer}")]
    DuplicateTransaction { payer: Pubkey, nonce: u64 },

    #[error("Unknown program {program_id}")]
    UnknownProgram { program_id: Pubkey },

    #[error("Instruction {index} failed: {source}")]
    Program {
        index: usize,
        #[source]
        source: EscrowError,
    },
}

/// The signed part of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Fee payer; must sign
    pub payer: Pubkey,
    /// Replay nonce, unique per payer
    pub nonce: u64,
    pub instructions: Vec<Instruction>,
}

impl Message {
    pub fn new(payer: Pubkey, nonce: u64, instructions: Vec<Instruction>) -> Self {
        Self {
            payer,
            nonce,
            instructions,
        }
    }

    /// Bytes covered by every signature
    pub fn serialize(&self) -> Result<Vec<u8>, SubmitError> {
        bincode::serialize(self).map_err(|e| SubmitError::Encoding(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub message: Message,
    pub signatures: Vec<(Pubkey, Signature)>,
}

impl Transaction {
    /// Sign `message` with every keypair in `signers`.
    pub fn new_signed(message: Message, signers: &[&Keypair]) -> Result<Self, SubmitError> {
        let bytes = message.serialize()?;
        let signatures = signers
            .iter()
            .map(|keypair| (keypair.pubkey(), keypair.sign_message(&bytes)))
            .collect();
        Ok(Self {
            message,
            signatures,
        })
    }

    /// The first signature identifies the transaction
    pub fn signature(&self) -> Option<Signature> {
        self.signatures.first().map(|(_, signature)| *signature)
    }
}

/// Proof of commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub signature: Signature,
    /// Commit sequence number, starting at 1
    pub slot: u64,
    pub events: Vec<EscrowEvent>,
}

#[derive(Debug)]
struct BankState {
    ledger: LedgerState,
    slot: u64,
    replay_guard: ReplayGuard,
    events: Vec<EscrowEvent>,
}

/// Hosts the escrow program over an in-memory ledger.
#[derive(Debug)]
pub struct Bank {
    config: EscrowConfig,
    state: Mutex<BankState>,
}

impl Default for Bank {
    fn default() -> Self {
        Self::from_valid_config(EscrowConfig::default())
    }
}

impl Bank {
    /// Start a bank for `config`, rejecting reserved program ids and
    /// degenerate rent parameters.
    pub fn new(config: EscrowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EscrowConfig) -> Self {
        let ledger = LedgerState::new(config.rent.clone());
        info!(program_id = %config.program_id, "Bank started");
        Self {
            config,
            state: Mutex::new(BankState {
                ledger,
                slot: 0,
                replay_guard: ReplayGuard::new(),
                events: Vec::new(),
            }),
        }
    }

    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }

    pub fn program_id(&self) -> Pubkey {
        self.config.program_id
    }

    // A panic while holding the lock can only happen before the working
    // copy is swapped in, so the committed state is still consistent.
    fn lock(&self) -> MutexGuard<'_, BankState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ───────────────────────── Submission ─────────────────────────

    /// Verify, execute and commit `tx` atomically.
    pub fn submit(&self, tx: &Transaction) -> Result<TransactionReceipt, SubmitError> {
        let message = &tx.message;
        if message.instructions.is_empty() {
            return Err(SubmitError::EmptyTransaction);
        }

        let signers = verify_signatures(tx)?;
        if !signers.contains(&message.payer) {
            return Err(SubmitError::MissingSignature {
                signer: message.payer,
            });
        }
        for meta in message.instructions.iter().flat_map(|ix| &ix.accounts) {
            if meta.is_signer && !signers.contains(&meta.pubkey) {
                return Err(SubmitError::MissingSignature {
                    signer: meta.pubkey,
                });
            }
        }
        let signature = tx.signature().ok_or(SubmitError::MissingSignature {
            signer: message.payer,
        })?;

        let mut state = self.lock();
        if state.replay_guard.is_used(&message.payer, message.nonce) {
            warn!(payer = %message.payer, nonce = message.nonce, "Replayed transaction rejected");
            return Err(SubmitError::DuplicateTransaction {
                payer: message.payer,
                nonce: message.nonce,
            });
        }

        let mut working = state.ledger.clone();
        let mut events = Vec::with_capacity(message.instructions.len());
        for (index, ix) in message.instructions.iter().enumerate() {
            if ix.program_id != self.config.program_id {
                return Err(SubmitError::UnknownProgram {
                    program_id: ix.program_id,
                });
            }
            let event =
                process_instruction(&ix.program_id, &mut working, &signers, &ix.accounts, &ix.data)
                    .map_err(|source| {
                        warn!(%signature, index, error = %source, "Transaction rolled back");
                        SubmitError::Program { index, source }
                    })?;
            events.push(event);
        }

        state.ledger = working;
        state.slot += 1;
        state.replay_guard.consume(message.payer, message.nonce);
        state.events.extend(events.iter().cloned());
        let slot = state.slot;
        drop(state);

        for event in &events {
            info!(slot, event = event.label(), escrow = %event.escrow(), "Event committed");
        }
        debug!(%signature, slot, instructions = events.len(), "Transaction committed");

        Ok(TransactionReceipt {
            signature,
            slot,
            events,
        })
    }

    // ───────────────────────── Issuance ─────────────────────────

    pub fn airdrop(&self, to: &Pubkey, lamports: u64) -> Result<(), LedgerError> {
        self.lock().ledger.airdrop(to, lamports)
    }

    /// Register a fresh mint issued by `authority`.
    pub fn create_mint(&self, authority: &Pubkey, decimals: u8) -> Result<Pubkey, LedgerError> {
        let mint = Pubkey::new_unique();
        self.lock().ledger.create_mint(mint, *authority, decimals)?;
        Ok(mint)
    }

    /// Issue tokens into `owner`'s associated token account.
    pub fn mint_to(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        amount: u64,
        authority: &Keypair,
    ) -> Result<Pubkey, LedgerError> {
        let signers: SignerSet = [authority.pubkey()].into_iter().collect();
        self.lock()
            .ledger
            .mint_to(mint, owner, amount, &authority.pubkey(), &signers)
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.lock().ledger.balance_of(mint, owner)
    }

    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.lock().ledger.lamports(address)
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.lock().ledger.account(address).cloned()
    }

    pub fn token_account(&self, address: &Pubkey) -> Result<TokenAccount, LedgerError> {
        self.lock().ledger.token_account(address)
    }

    /// Read the escrow record at `address`, `None` if there is none.
    pub fn escrow_record(&self, address: &Pubkey) -> Result<Option<EscrowRecord>, EscrowError> {
        let state = self.lock();
        match state
            .ledger
            .program_account_data(address, &self.config.program_id)
        {
            Ok(data) => EscrowRecord::unpack(data).map(Some),
            Err(LedgerError::AccountNotFound { .. }) | Err(LedgerError::OwnerMismatch { .. }) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Number of committed transactions
    pub fn slot(&self) -> u64 {
        self.lock().slot
    }

    /// Every event committed so far, in commit order
    pub fn events(&self) -> Vec<EscrowEvent> {
        self.lock().events.clone()
    }

    /// Copy of the committed ledger
    pub fn snapshot(&self) -> LedgerState {
        self.lock().ledger.clone()
    }
}

fn verify_signatures(tx: &Transaction) -> Result<SignerSet, SubmitError> {
    let bytes = tx.message.serialize()?;
    let mut signers = SignerSet::new();
    for (signer, signature) in &tx.signatures {
        if !signature.verify(signer, &bytes) {
            return Err(SubmitError::InvalidSignature { signer: *signer });
        }
        signers.insert(*signer);
    }
    Ok(signers)
}

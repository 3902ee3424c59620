//! Two-party token swap escrow
//!
//! A maker deposits an amount of one token into a program-controlled vault
//! and names the amount of a second token it wants back. Any taker may then
//! settle the swap atomically, or the maker may cancel and recover the
//! deposit. Each offer lives in a record at an address derived from the
//! maker's identity and a maker-chosen seed.
//!
//! # Modules
//! - `errors`: Escrow error taxonomy
//! - `events`: Events emitted on commit
//! - `security`: Signer sets and replay protection
//! - `pda`: Program-derived and associated token address derivation
//! - `state`: The persistent escrow record and its encoding
//! - `config`: Program identity and rent parameters
//! - `ledger`: Token and record ledger traits plus the in-memory ledger
//! - `instruction`: Instruction wire format and builders
//! - `processor`: The make / take / refund state machine
//! - `bank`: Atomic transaction submission
//! - `client`: Typed calls over the bank

pub mod bank;
pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod instruction;
pub mod ledger;
pub mod pda;
pub mod processor;
pub mod security;
pub mod state;

pub use bank::{Bank, SubmitError, TransactionReceipt};
pub use client::EscrowClient;
pub use config::{EscrowConfig, ESCROW_PROGRAM_ID};
pub use errors::EscrowError;
pub use events::EscrowEvent;
pub use state::EscrowRecord;

/// Instruction ABI version, frozen after release
pub const ESCROW_ABI_VERSION: &str = "1.0.0";

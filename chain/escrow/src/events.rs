//! Escrow events
//!
//! One event per committed instruction. Events are only recorded by the
//! bank after the whole transaction commits, so a listener never observes
//! an event for a state change that was rolled back.

use escrow_types::ids::Pubkey;
use serde::{Deserialize, Serialize};

/// Offer opened and vault funded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowOpened {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub seed: u64,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub deposited: u64,
    pub receive: u64,
}

/// Swap settled; record and vault destroyed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowFulfilled {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub taker: Pubkey,
    /// Amount of mint B paid by the taker
    pub paid: u64,
    /// Amount of mint A released from the vault
    pub released: u64,
}

/// Offer withdrawn by the maker; record and vault destroyed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowCancelled {
    pub escrow: Pubkey,
    pub maker: Pubkey,
    pub refunded: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowEvent {
    Opened(EscrowOpened),
    Fulfilled(EscrowFulfilled),
    Cancelled(EscrowCancelled),
}

impl EscrowEvent {
    /// Record address the event refers to
    pub fn escrow(&self) -> Pubkey {
        match self {
            EscrowEvent::Opened(e) => e.escrow,
            EscrowEvent::Fulfilled(e) => e.escrow,
            EscrowEvent::Cancelled(e) => e.escrow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EscrowEvent::Opened(_) => "EscrowOpened",
            EscrowEvent::Fulfilled(_) => "EscrowFulfilled",
            EscrowEvent::Cancelled(_) => "EscrowCancelled",
        }
    }
}

//! Ledger account types
//!
//! A ledger account holds a native (`lamports`) balance, the id of the
//! program that owns it, and typed data. Token balances live in
//! `TokenAccount` data; asset types are described by `Mint` data.

use serde::{Deserialize, Serialize};

use crate::ids::Pubkey;

/// Owner of plain wallet accounts
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Owner of every mint and token account
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Namespace under which associated token addresses are derived
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// Serialized size of mint data
pub const MINT_LEN: usize = 82;

/// Serialized size of token account data
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// Asset type description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    /// Key allowed to issue new supply (None = fixed supply)
    pub mint_authority: Option<Pubkey>,
    /// Total issued supply in raw units
    pub supply: u64,
    /// Number of base-10 digits to the right of the decimal point
    pub decimals: u8,
}

/// Balance slot of one owner for one mint
///
/// Invariant: `amount` only changes through checked transfers,
/// issuance, or is swept to zero before close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub mint: Pubkey,
    /// Authority allowed to debit this account (a party or a program address)
    pub owner: Pubkey,
    /// Raw token units
    pub amount: u64,
}

/// Typed payload of a ledger account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountData {
    /// Plain wallet, holds only lamports
    Empty,
    Mint(Mint),
    Token(TokenAccount),
    /// Opaque state owned by a program (e.g. an escrow record)
    Program(Vec<u8>),
}

impl AccountData {
    /// Storage footprint used for rent computation
    pub fn len(&self) -> usize {
        match self {
            AccountData::Empty => 0,
            AccountData::Mint(_) => MINT_LEN,
            AccountData::Token(_) => TOKEN_ACCOUNT_LEN,
            AccountData::Program(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single ledger account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Native balance, funds storage and account creation
    pub lamports: u64,
    /// Program that may mutate `data`
    pub owner: Pubkey,
    pub data: AccountData,
}

impl Account {
    /// A plain wallet holding only lamports
    pub fn wallet(lamports: u64) -> Self {
        Self {
            lamports,
            owner: SYSTEM_PROGRAM_ID,
            data: AccountData::Empty,
        }
    }

    /// Mint data, if this is a mint
    pub fn as_mint(&self) -> Option<&Mint> {
        match &self.data {
            AccountData::Mint(mint) if self.owner == TOKEN_PROGRAM_ID => Some(mint),
            _ => None,
        }
    }

    /// Token account data, if this is a token account
    pub fn as_token(&self) -> Option<&TokenAccount> {
        match &self.data {
            AccountData::Token(token) if self.owner == TOKEN_PROGRAM_ID => Some(token),
            _ => None,
        }
    }

    pub fn as_token_mut(&mut self) -> Option<&mut TokenAccount> {
        match &mut self.data {
            AccountData::Token(token) if self.owner == TOKEN_PROGRAM_ID => Some(token),
            _ => None,
        }
    }
}

//! Instruction encoding and builders
//!
//! Wire format: `[discriminator: u8] ‖ bincode(args)`.
//!
//! | tag | instruction | args                              |
//! |-----|-------------|-----------------------------------|
//! | 0   | make        | seed, amount_a (deposit), amount_b |
//! | 1   | take        | none                              |
//! | 2   | refund      | none                              |

use bincode::Options;
use escrow_types::ids::Pubkey;
use serde::{Deserialize, Serialize};

use crate::errors::EscrowError;
use crate::pda::{associated_token_address, find_escrow_address};

pub const IX_MAKE: u8 = 0;
pub const IX_TAKE: u8 = 1;
pub const IX_REFUND: u8 = 2;

/// Fixed-width little-endian args; any byte past the args is an error.
fn args_codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// An account referenced by an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    /// The transaction must carry a valid signature from this key
    pub is_signer: bool,
}

impl AccountMeta {
    pub fn signer(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: true,
        }
    }

    pub fn readonly(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            is_signer: false,
        }
    }
}

/// A call into a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct MakeArgs {
    seed: u64,
    amount_a: u64,
    amount_b: u64,
}

/// Decoded escrow instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowInstruction {
    /// Open an offer: deposit `amount_a` of mint A, ask `amount_b` of mint B
    Make {
        seed: u64,
        amount_a: u64,
        amount_b: u64,
    },
    /// Fulfill an open offer
    Take,
    /// Cancel an open offer (maker only)
    Refund,
}

impl EscrowInstruction {
    pub fn pack(&self) -> Result<Vec<u8>, EscrowError> {
        let encode_err = |e: bincode::Error| EscrowError::InvalidInstruction {
            reason: e.to_string(),
        };
        match *self {
            EscrowInstruction::Make {
                seed,
                amount_a,
                amount_b,
            } => {
                let args = MakeArgs {
                    seed,
                    amount_a,
                    amount_b,
                };
                let mut data = vec![IX_MAKE];
                data.extend(args_codec().serialize(&args).map_err(encode_err)?);
                Ok(data)
            }
            EscrowInstruction::Take => Ok(vec![IX_TAKE]),
            EscrowInstruction::Refund => Ok(vec![IX_REFUND]),
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, EscrowError> {
        let (&tag, rest) = data.split_first().ok_or(EscrowError::InvalidInstruction {
            reason: "empty instruction data".to_string(),
        })?;
        match tag {
            IX_MAKE => {
                let args: MakeArgs = args_codec().deserialize(rest).map_err(|e| {
                    EscrowError::InvalidInstruction {
                        reason: format!("make args: {e}"),
                    }
                })?;
                Ok(EscrowInstruction::Make {
                    seed: args.seed,
                    amount_a: args.amount_a,
                    amount_b: args.amount_b,
                })
            }
            IX_TAKE | IX_REFUND if !rest.is_empty() => Err(EscrowError::InvalidInstruction {
                reason: format!("discriminator {tag} takes no args, got {} bytes", rest.len()),
            }),
            IX_TAKE => Ok(EscrowInstruction::Take),
            IX_REFUND => Ok(EscrowInstruction::Refund),
            other => Err(EscrowError::InvalidInstruction {
                reason: format!("unknown discriminator {other}"),
            }),
        }
    }
}

/// Build a `make` instruction. Accounts:
/// maker (signer), escrow, mint_a, mint_b, maker_ata_a, vault
pub fn make(
    program_id: &Pubkey,
    maker: &Pubkey,
    mint_a: &Pubkey,
    mint_b: &Pubkey,
    seed: u64,
    amount_a: u64,
    amount_b: u64,
) -> Result<Instruction, EscrowError> {
    let (escrow, _) = find_escrow_address(maker, seed, program_id)?;
    let maker_ata_a = associated_token_address(maker, mint_a)?;
    let vault = associated_token_address(&escrow, mint_a)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::signer(*maker),
            AccountMeta::readonly(escrow),
            AccountMeta::readonly(*mint_a),
            AccountMeta::readonly(*mint_b),
            AccountMeta::readonly(maker_ata_a),
            AccountMeta::readonly(vault),
        ],
        data: EscrowInstruction::Make {
            seed,
            amount_a,
            amount_b,
        }
        .pack()?,
    })
}

/// Build a `take` instruction. Accounts:
/// taker (signer), maker, escrow, mint_a, mint_b, vault,
/// taker_ata_a, taker_ata_b, maker_ata_b
pub fn take(
    program_id: &Pubkey,
    taker: &Pubkey,
    maker: &Pubkey,
    escrow: &Pubkey,
    mint_a: &Pubkey,
    mint_b: &Pubkey,
) -> Result<Instruction, EscrowError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::signer(*taker),
            AccountMeta::readonly(*maker),
            AccountMeta::readonly(*escrow),
            AccountMeta::readonly(*mint_a),
            AccountMeta::readonly(*mint_b),
            AccountMeta::readonly(associated_token_address(escrow, mint_a)?),
            AccountMeta::readonly(associated_token_address(taker, mint_a)?),
            AccountMeta::readonly(associated_token_address(taker, mint_b)?),
            AccountMeta::readonly(associated_token_address(maker, mint_b)?),
        ],
        data: EscrowInstruction::Take.pack()?,
    })
}

/// Build a `refund` instruction. Accounts:
/// maker (signer), escrow, mint_a, vault, maker_ata_a
pub fn refund(
    program_id: &Pubkey,
    maker: &Pubkey,
    escrow: &Pubkey,
    mint_a: &Pubkey,
) -> Result<Instruction, EscrowError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::signer(*maker),
            AccountMeta::readonly(*escrow),
            AccountMeta::readonly(*mint_a),
            AccountMeta::readonly(associated_token_address(escrow, mint_a)?),
            AccountMeta::readonly(associated_token_address(maker, mint_a)?),
        ],
        data: EscrowInstruction::Refund.pack()?,
    })
}

//! Types library for the token-swap escrow
//!
//! Shared definitions used by the escrow program, its ledger and clients.
//!
//! # Modules
//! - `ids`: Addresses, keypairs and signatures (Pubkey, Keypair, Signature)
//! - `account`: Ledger accounts, mints and token balance slots
//! - `numeric`: Raw/UI amount conversion
//! - `errors`: Ledger error taxonomy

pub mod ids;
pub mod account;
pub mod numeric;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::account::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}

//! Program and ledger configuration
//!
//! Plain structs with sensible defaults. A JSON document may override any
//! subset of fields; identities are written as hex strings.

use escrow_types::account::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};
use escrow_types::ids::Pubkey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default escrow program identity
pub const ESCROW_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0xa5, 0x3e, 0x1c, 0x72, 0x0b, 0x9d, 0x44, 0xe1, 0x6f, 0x28, 0xc3, 0x57, 0x90, 0x1a, 0xbe,
    0x04, 0x7d, 0x63, 0xf2, 0x19, 0x8e, 0x35, 0xd0, 0x4b, 0x2c, 0xa7, 0x61, 0xe8, 0x13, 0x5f,
    0x96, 0x0c,
]);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Storage rent parameters.
///
/// Every account must hold at least `minimum_balance(data_len)` lamports,
/// charged to the payer at creation and swept to a destination at close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentConfig {
    pub lamports_per_byte_year: u64,
    pub exemption_threshold_years: u64,
    /// Fixed per-account bytes charged on top of the data length
    pub account_storage_overhead: u64,
}

impl Default for RentConfig {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: 3480,
            exemption_threshold_years: 2,
            account_storage_overhead: 128,
        }
    }
}

impl RentConfig {
    /// Rent-exempt minimum for an account with `data_len` bytes
    pub fn minimum_balance(&self, data_len: usize) -> u64 {
        (self.account_storage_overhead.saturating_add(data_len as u64))
            .saturating_mul(self.lamports_per_byte_year)
            .saturating_mul(self.exemption_threshold_years)
    }
}

/// Escrow program configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    #[serde(with = "hex_pubkey")]
    pub program_id: Pubkey,
    pub rent: RentConfig,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            program_id: ESCROW_PROGRAM_ID,
            rent: RentConfig::default(),
        }
    }
}

impl EscrowConfig {
    /// Parse from JSON; missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject program ids that collide with built-in namespaces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reserved = [SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID, ASSOCIATED_TOKEN_PROGRAM_ID];
        if reserved.contains(&self.program_id) {
            return Err(ConfigError::Invalid {
                field: "program_id",
                reason: format!("{} is a reserved program id", self.program_id),
            });
        }
        if self.rent.exemption_threshold_years == 0 {
            return Err(ConfigError::Invalid {
                field: "rent.exemption_threshold_years",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

mod hex_pubkey {
    use escrow_types::ids::Pubkey;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

//! Configuration types for a coursebid engine instance.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CoursebidError, Result, SystemId, constants};

/// Configuration for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Instance identity bound into every signed payload (hex).
    pub system_id: SystemId,
    /// Longest allowed bidding round.
    pub max_round_duration_secs: u64,
    /// Credits are non-transferable unless this is set.
    pub transfers_enabled: bool,
    /// Transfer nonces remembered per sender.
    pub nonce_capacity_per_claimant: usize,
    /// Fee schedule for credit purchases and transfers.
    pub fees: FeeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_id: SystemId::default(),
            max_round_duration_secs: constants::DEFAULT_MAX_ROUND_DURATION_SECS,
            transfers_enabled: false,
            nonce_capacity_per_claimant: constants::DEFAULT_NONCE_CAPACITY_PER_CLAIMANT,
            fees: FeeConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_round_duration_secs == 0 {
            return Err(CoursebidError::Configuration(
                "max_round_duration_secs must be > 0".to_string(),
            ));
        }
        if self.nonce_capacity_per_claimant == 0 {
            return Err(CoursebidError::Configuration(
                "nonce_capacity_per_claimant must be > 0".to_string(),
            ));
        }
        self.fees.validate()
    }
}

/// Fee schedule for converting external payments into credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Payment required per credit minted.
    pub price_per_credit: Decimal,
    /// Flat payment required per peer transfer, kept by the system.
    pub transfer_fee: Decimal,
    /// Most credits one claimant may ever purchase.
    pub max_credits_per_claimant: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            price_per_credit: Decimal::new(1, 2), // 0.01 per credit
            transfer_fee: Decimal::new(50, 2),    // 0.50 per transfer
            max_credits_per_claimant: constants::DEFAULT_MAX_CREDITS_PER_CLAIMANT,
        }
    }
}

impl FeeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.price_per_credit <= Decimal::ZERO {
            return Err(CoursebidError::Configuration(
                "fees.price_per_credit must be > 0".to_string(),
            ));
        }
        if self.transfer_fee.is_sign_negative() {
            return Err(CoursebidError::Configuration(
                "fees.transfer_fee must be >= 0".to_string(),
            ));
        }
        if self.max_credits_per_claimant == 0 {
            return Err(CoursebidError::Configuration(
                "fees.max_credits_per_claimant must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

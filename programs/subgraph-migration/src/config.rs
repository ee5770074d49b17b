//! Protocol configuration with validation

use std::path::Path;

use ethereum_types::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use crate::{
    error::{MigrationError, MigrationResult},
    math::MAX_PPM,
    state::DEFAULT_RESERVE_RATIO,
    types::GRT,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub migration: MigrationConfig,

    #[serde(default)]
    pub curation: CurationConfig,

    pub gateway: GatewayConfig,
}

/// Addresses the state machine authenticates against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// The registry's own address; custody of migrated deposits
    pub registry: Address,
    /// L2 token gateway, the only allowed caller of the callhook
    pub gateway: Address,
    /// L1 registry that sends subgraphs and curator balances
    pub l1_counterpart: Address,
    /// Where deposited tokens are sent when minting signal
    pub curation: Address,
    #[serde(default = "default_reserve_ratio")]
    pub fixed_reserve_ratio: u32,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationConfig {
    #[serde(
        default = "default_minimum_curation_deposit",
        deserialize_with = "deserialize_amount",
        serialize_with = "serialize_amount"
    )]
    pub minimum_curation_deposit: u128,
    #[serde(default)]
    pub curation_tax_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub address: Address,
    /// L1 side of the gateway; its aliased address relays inbound transfers
    pub l1_counterpart: Address,
    /// GRT on L1
    pub l1_token: Address,
}

fn default_reserve_ratio() -> u32 {
    DEFAULT_RESERVE_RATIO
}

fn default_chain_id() -> u64 {
    42161
}

fn default_minimum_curation_deposit() -> u128 {
    GRT
}

// TOML integers are i64, so wei amounts may also be written as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Int(u64),
    Text(String),
}

fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    match AmountRepr::deserialize(deserializer)? {
        AmountRepr::Int(value) => Ok(value as u128),
        AmountRepr::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn serialize_amount<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&amount.to_string())
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            minimum_curation_deposit: default_minimum_curation_deposit(),
            curation_tax_percentage: 0,
        }
    }
}

impl ProtocolConfig {
    pub fn from_toml_str(s: &str) -> MigrationResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| {
            tracing::error!("Failed to parse protocol config: {}", e);
            MigrationError::InvalidConfig
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> MigrationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            MigrationError::InvalidConfig
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded protocol config");
        Ok(config)
    }

    pub fn validate(&self) -> MigrationResult<()> {
        let m = &self.migration;
        let addresses = [
            m.registry,
            m.gateway,
            m.l1_counterpart,
            m.curation,
            self.gateway.address,
            self.gateway.l1_counterpart,
            self.gateway.l1_token,
        ];
        if addresses.iter().any(|a| a.is_zero()) {
            return Err(MigrationError::InvalidConfig);
        }
        if m.gateway != self.gateway.address {
            return Err(MigrationError::InvalidConfig);
        }
        if m.fixed_reserve_ratio == 0 || m.fixed_reserve_ratio > MAX_PPM {
            return Err(MigrationError::InvalidConfig);
        }
        if self.curation.curation_tax_percentage > MAX_PPM
            || self.curation.minimum_curation_deposit == 0
        {
            return Err(MigrationError::InvalidConfig);
        }
        Ok(())
    }
}

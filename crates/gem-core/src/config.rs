//! Client configuration.
//!
//! Values come from the `[gems]` table of a TOML document. When loaded from
//! a file, environment variables are applied on top and win over the file:
//!
//! | variable                         | field                       |
//! |----------------------------------|-----------------------------|
//! | `GEM_PROGRAM_ID`                 | `program_id`                |
//! | `GEM_PROTOCOL_SHARE`             | `protocol_share`            |
//! | `GEM_CONFIRMATION_TIMEOUT_SECS`  | `confirmation_timeout_secs` |

use std::path::Path;
use std::time::Duration;

use gem_sol::Address;
use serde::Deserialize;

use crate::error::GemError;

const DEFAULT_PROTOCOL_SHARE: u64 = 60;
const DEFAULT_MINT_COMPUTE_UNITS: u32 = 240_000;
const DEFAULT_CLAIM_COMPUTE_UNITS: u32 = 400_000;
const DEFAULT_IMPRINT_DELAY_SECS: u64 = 20;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 60;

/// Oracle price-history buffers read by the rarity reveal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceFeeds {
    pub btc: Address,
    pub sol: Address,
    pub eth: Address,
    pub bnb: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GemConfig {
    /// The on-ledger protocol program.
    pub program_id: Address,

    /// Percent of each epoch reward owed to gem holders.
    #[serde(default = "default_protocol_share")]
    pub protocol_share: u64,

    #[serde(default = "default_mint_compute_units")]
    pub mint_compute_units: u32,

    #[serde(default = "default_claim_compute_units")]
    pub claim_compute_units: u32,

    /// Wait between the imprint request and the reveal.
    #[serde(default = "default_imprint_delay_secs")]
    pub imprint_delay_secs: u64,

    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    pub price_feeds: PriceFeeds,
}

fn default_protocol_share() -> u64 {
    DEFAULT_PROTOCOL_SHARE
}

fn default_mint_compute_units() -> u32 {
    DEFAULT_MINT_COMPUTE_UNITS
}

fn default_claim_compute_units() -> u32 {
    DEFAULT_CLAIM_COMPUTE_UNITS
}

fn default_imprint_delay_secs() -> u64 {
    DEFAULT_IMPRINT_DELAY_SECS
}

fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

#[derive(Deserialize)]
struct ConfigFile {
    gems: GemConfig,
}

impl GemConfig {
    /// Parse the `[gems]` table of a TOML document. Environment variables
    /// are not consulted.
    pub fn from_toml_str(content: &str) -> Result<Self, GemError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| GemError::Config(e.to_string()))?;
        file.gems.validate()?;
        Ok(file.gems)
    }

    /// Read a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, GemError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GemError::Config(format!("{}: {e}", path.display())))?;
        let file: ConfigFile =
            toml::from_str(&content).map_err(|e| GemError::Config(e.to_string()))?;

        let mut config = file.gems;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GEM_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<(), GemError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unset or empty values leave
    /// the field unchanged; unparseable values are an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), GemError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("GEM_PROGRAM_ID") {
            self.program_id = v
                .parse()
                .map_err(|e| GemError::Config(format!("GEM_PROGRAM_ID: {e}")))?;
        }
        if let Some(v) = get("GEM_PROTOCOL_SHARE") {
            self.protocol_share = v
                .parse()
                .map_err(|e| GemError::Config(format!("GEM_PROTOCOL_SHARE: {e}")))?;
        }
        if let Some(v) = get("GEM_CONFIRMATION_TIMEOUT_SECS") {
            self.confirmation_timeout_secs = v
                .parse()
                .map_err(|e| GemError::Config(format!("GEM_CONFIRMATION_TIMEOUT_SECS: {e}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GemError> {
        if self.protocol_share > 100 {
            return Err(GemError::Config(format!(
                "protocol_share must be at most 100, got {}",
                self.protocol_share
            )));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(GemError::Config(
                "confirmation_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn imprint_delay(&self) -> Duration {
        Duration::from_secs(self.imprint_delay_secs)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

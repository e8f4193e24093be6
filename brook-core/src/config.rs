//! Simulation and liquid settings, read from a JSON5 document.

use std::{fs, path::Path};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_CONFIG: &str = include_str!("../../package-content/brook_config.json5");

/// Root of the config document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrookConfig {
    /// Driver settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// One entry per liquid behaviour.
    #[serde(default)]
    pub liquids: Vec<LiquidConfig>,
}

/// Settings for the tick driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Upper bound on scheduled updates run per game tick.
    #[serde(default = "default_max_ticks_per_tick")]
    pub max_ticks_per_tick: usize,
    /// Seed for the random source. `None` draws one from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_ticks_per_tick: default_max_ticks_per_tick(),
            seed: None,
        }
    }
}

/// Settings for one finite spreading liquid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidConfig {
    /// Liquid code, e.g. `water`.
    pub code: String,
    /// Delay in ticks between a trigger and the update it schedules.
    #[serde(default = "default_spread_delay")]
    pub spread_delay: u32,
    /// Liquid code this liquid reacts with on contact.
    #[serde(default)]
    pub collides_with: Option<String>,
    /// Block placed where a colliding source cell was.
    #[serde(default)]
    pub source_replacement_code: Option<String>,
    /// Block placed where a colliding flowing cell was.
    #[serde(default)]
    pub flowing_replacement_code: Option<String>,
    /// Lets a source over a supported drop fill the drop with a new source.
    #[serde(default = "enabled")]
    pub source_refill: bool,
    /// Restricts sideways spread towards nearby drops when the cell cannot fall.
    #[serde(default)]
    pub seek_drops: bool,
    /// Lowers cells that no neighbour feeds before spreading.
    #[serde(default)]
    pub drain_isolated: bool,
    /// Randomises which candidates receive the spread remainder.
    #[serde(default = "enabled")]
    pub shuffle_remainder: bool,
}

impl LiquidConfig {
    /// Settings for `code` with every other value at its default.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            spread_delay: default_spread_delay(),
            collides_with: None,
            source_replacement_code: None,
            flowing_replacement_code: None,
            source_refill: true,
            seek_drops: false,
            drain_isolated: false,
            shuffle_remainder: true,
        }
    }

    /// Sets the collision partner and its replacement blocks.
    #[must_use]
    pub fn colliding_with(
        mut self,
        liquid: impl Into<String>,
        source_replacement: Option<&str>,
        flowing_replacement: Option<&str>,
    ) -> Self {
        self.collides_with = Some(liquid.into());
        self.source_replacement_code = source_replacement.map(str::to_owned);
        self.flowing_replacement_code = flowing_replacement.map(str::to_owned);
        self
    }
}

const fn default_max_ticks_per_tick() -> usize {
    65536
}

const fn default_spread_delay() -> u32 {
    50
}

const fn enabled() -> bool {
    true
}

impl BrookConfig {
    /// Parses the embedded default document.
    pub fn default_document() -> Result<Self, ConfigError> {
        Self::from_json5_str(DEFAULT_CONFIG)
    }

    /// Parses and validates a JSON5 document.
    pub fn from_json5_str(source: &str) -> Result<Self, ConfigError> {
        let config: BrookConfig = serde_json5::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config at `path`, writing the default document there first
    /// if the file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let source = fs::read_to_string(path)?;
            let config = Self::from_json5_str(&source)?;
            log::debug!(
                "Loaded {} liquid(s) from {}",
                config.liquids.len(),
                path.display()
            );
            Ok(config)
        } else {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
            log::info!("Wrote default liquid config to {}", path.display());
            Self::default_document()
        }
    }

    /// Checks value ranges and cross references between liquids.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.max_ticks_per_tick == 0 {
            return Err(ConfigError::Invalid(
                "maxTicksPerTick must be greater than 0".to_owned(),
            ));
        }

        let mut seen = FxHashSet::default();
        for liquid in &self.liquids {
            if liquid.code.is_empty() {
                return Err(ConfigError::Invalid("liquid code must not be empty".to_owned()));
            }
            if !seen.insert(liquid.code.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "liquid `{}` is configured twice",
                    liquid.code
                )));
            }
            if liquid.collides_with.as_deref() == Some(liquid.code.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "liquid `{}` cannot collide with itself",
                    liquid.code
                )));
            }
        }
        Ok(())
    }

    /// Settings for the liquid with the given code.
    #[must_use]
    pub fn liquid(&self, code: &str) -> Option<&LiquidConfig> {
        self.liquids.iter().find(|liquid| liquid.code == code)
    }
}

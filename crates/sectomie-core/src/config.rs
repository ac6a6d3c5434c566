//! Configuration loading and typed config structures for the Sectomie
//! simulation.
//!
//! The canonical configuration lives in `sectomie-config.yaml` at the project
//! root. Every section and field is optional; missing values fall back to
//! the defaults below.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sectomie_cultivators::ProgressionConfig;
use sectomie_types::{CultivationMethod, ResourceCost, SectResource};
use serde::Deserialize;

use crate::calendar::GameDate;

/// Environment variable overriding `persistence.save_path`.
pub const SAVE_PATH_ENV: &str = "SECTOMIE_SAVE_PATH";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `sectomie-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Starting date.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Breakthrough tunables.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Action prices.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Save file settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Engine run length and seeding.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SECTOMIE_SAVE_PATH` overrides `persistence.save_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.persistence.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.persistence.apply_env_overrides();
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Name of the sect the player controls in a freshly seeded world.
    #[serde(default = "default_player_sect")]
    pub player_sect: String,
}

fn default_world_name() -> String {
    "Sectomie".to_owned()
}

fn default_player_sect() -> String {
    "Azure Peak Sect".to_owned()
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            player_sect: default_player_sect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Starting date of a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalendarConfig {
    /// First year (default: 1).
    #[serde(default = "default_start_year")]
    pub start_year: u32,

    /// First month (default: 1).
    #[serde(default = "default_start_month")]
    pub start_month: u32,
}

const fn default_start_year() -> u32 {
    1
}

const fn default_start_month() -> u32 {
    1
}

impl CalendarConfig {
    /// The configured start as a date. Validated when the calendar is built.
    pub const fn start(&self) -> GameDate {
        GameDate {
            year: self.start_year,
            month: self.start_month,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            start_month: default_start_month(),
        }
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// Prices charged by the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Cost of one direct cultivation session, by method.
    #[serde(default = "default_method_costs")]
    pub method_costs: BTreeMap<CultivationMethod, ResourceCost>,

    /// Spirit stones charged for a method missing from `method_costs`.
    #[serde(default = "default_method_cost")]
    pub default_method_cost: u64,

    /// Spirit stones charged to recruit a member.
    #[serde(default = "default_recruitment_cost")]
    pub recruitment_cost: u64,
}

fn default_method_costs() -> BTreeMap<CultivationMethod, ResourceCost> {
    BTreeMap::from([
        (CultivationMethod::QiCirculation, ResourceCost::stones(50)),
        (CultivationMethod::EssenceRefinement, ResourceCost::stones(200)),
        (
            CultivationMethod::DaoHeartTempering,
            ResourceCost::stones(400).with(SectResource::SpiritHerbs, 1),
        ),
        (
            CultivationMethod::HeavenlyTribulation,
            ResourceCost::stones(800).with(SectResource::DaoCrystals, 1),
        ),
    ])
}

const fn default_method_cost() -> u64 {
    50
}

const fn default_recruitment_cost() -> u64 {
    500
}

impl EconomyConfig {
    /// Price of a direct session with `method`.
    pub fn method_cost(&self, method: CultivationMethod) -> ResourceCost {
        self.method_costs
            .get(&method)
            .cloned()
            .unwrap_or_else(|| ResourceCost::stones(self.default_method_cost))
    }

    /// Price of one recruitment.
    pub fn recruitment_cost(&self) -> ResourceCost {
        ResourceCost::stones(self.recruitment_cost)
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            method_costs: default_method_costs(),
            default_method_cost: default_method_cost(),
            recruitment_cost: default_recruitment_cost(),
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Save file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Where the game is saved and loaded.
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,

    /// Save after every engine run.
    #[serde(default = "default_autosave")]
    pub autosave: bool,
}

fn default_save_path() -> PathBuf {
    PathBuf::from("sectomie-save.json")
}

const fn default_autosave() -> bool {
    true
}

impl PersistenceConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SAVE_PATH_ENV) {
            self.save_path = PathBuf::from(val);
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            autosave: default_autosave(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// How the engine binary drives the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Turns to play per invocation (default: 12, one in-world year).
    #[serde(default = "default_turns")]
    pub turns: u32,

    /// Fixed RNG seed. Unset means a fresh entropy-seeded generator.
    #[serde(default)]
    pub seed: Option<u64>,
}

const fn default_turns() -> u32 {
    12
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            turns: default_turns(),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

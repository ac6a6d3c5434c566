//! Tunable parameters for member progression.
//!
//! These map onto the `progression` section of `sectomie-config.yaml`.
//! Callers (turn engine, request layer, tests) construct a
//! [`ProgressionConfig`] and pass it into the progression functions.

use serde::{Deserialize, Serialize};

/// Configuration for breakthrough and auto-breakthrough behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Whether a Peak-stage breakthrough can hit a major bottleneck
    /// (default: false).
    ///
    /// When disabled the major-bottleneck probability is forced to zero.
    /// When enabled it is `0.5 + realm * 0.1`.
    #[serde(default)]
    pub major_bottleneck_enabled: bool,

    /// Per-turn probability that a member at full qi attempts a
    /// breakthrough on their own (default: 0.10).
    #[serde(default = "default_auto_breakthrough_chance")]
    pub auto_breakthrough_chance: f64,
}

const fn default_auto_breakthrough_chance() -> f64 {
    0.10
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            major_bottleneck_enabled: false,
            auto_breakthrough_chance: default_auto_breakthrough_chance(),
        }
    }
}

//! Structured results of single-member operations.
//!
//! Every progression operation that runs to completion returns one of these,
//! including the modelled setbacks (deviation, failed breakthrough, useless
//! treasure). Each carries the numeric deltas plus the member's new state so
//! callers never have to re-read the member.

use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;
use crate::enums::{CultivationMethod, RealmStage, TreasureKind};

/// One attribute increase granted by a cultivation session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeGain {
    /// Which attribute grew.
    pub attribute: Attribute,
    /// Requested increase.
    pub amount: f64,
    /// Stored value after clamping.
    pub new_value: f64,
}

/// A cultivation deviation (qi backlash).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// Fraction of qi lost, e.g. 0.2.
    pub severity: f64,
    /// Absolute qi lost.
    pub qi_lost: f64,
}

/// Result of a cultivation session, direct or monthly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultivationOutcome {
    /// Method practised.
    pub method: CultivationMethod,
    /// Method description from the table used.
    pub description: String,
    /// Qi actually added after clamping to capacity, before any deviation
    /// loss. A member already at capacity reports 0 here even though the
    /// formula produced a positive gain; see `qi` for the final value.
    pub qi_gained: f64,
    /// Breakthrough chance actually added after clamping.
    pub breakthrough_increase: f64,
    /// Attribute increases, empty when the roll missed.
    pub attribute_gains: Vec<AttributeGain>,
    /// Deviation suffered, if any.
    pub deviation: Option<Deviation>,
    /// Qi after the session.
    pub qi: f64,
    /// Qi capacity.
    pub max_qi: f64,
    /// Breakthrough chance after the session.
    pub breakthrough_chance: f64,
    /// Human-readable summary.
    pub message: String,
}

/// How a breakthrough attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakthroughResult {
    /// Stage or realm advanced.
    Advanced,
    /// Chance fell short; qi dropped to half.
    Failed,
    /// Entered a minor bottleneck.
    MinorBottleneck {
        /// Insights needed to clear it.
        insights_required: u32,
    },
    /// Entered a major bottleneck.
    MajorBottleneck {
        /// Nominal difficulty; a major bottleneck is cleared by treasure.
        insights_required: u32,
    },
}

/// Result of a breakthrough attempt that passed its preconditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakthroughOutcome {
    /// What happened.
    pub result: BreakthroughResult,
    /// Chance compared against the gate (breakthrough chance + comprehension / 5).
    pub effective_chance: f64,
    /// Realm after the attempt.
    pub realm: u32,
    /// Realm name after the attempt.
    pub realm_name: String,
    /// Stage after the attempt.
    pub realm_stage: RealmStage,
    /// Qi after the attempt.
    pub qi: f64,
    /// Qi capacity after the attempt.
    pub max_qi: f64,
    /// Breakthrough chance after the attempt.
    pub breakthrough_chance: f64,
    /// Human-readable summary.
    pub message: String,
}

impl BreakthroughOutcome {
    /// Whether the member advanced.
    pub const fn advanced(&self) -> bool {
        matches!(self.result, BreakthroughResult::Advanced)
    }
}

/// Result of one insight meditation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationOutcome {
    /// Insights gained this session (0, 1, or 2).
    pub insights_gained: u32,
    /// Insights accumulated; 0 once the bottleneck clears.
    pub insights: u32,
    /// Insights required; 0 once the bottleneck clears.
    pub insights_required: u32,
    /// Whether the minor bottleneck cleared.
    pub cleared: bool,
    /// Breakthrough chance after the session.
    pub breakthrough_chance: f64,
    /// Human-readable summary.
    pub message: String,
}

/// How a treasure interacted with a major bottleneck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreasureEffect {
    /// Bottleneck cleared.
    Effective,
    /// Realm below the treasure's range.
    TooPowerful,
    /// Realm above the treasure's range.
    TooWeak,
}

/// Result of applying a treasure to a major bottleneck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasureOutcome {
    /// Treasure applied.
    pub treasure: TreasureKind,
    /// Effect.
    pub effect: TreasureEffect,
    /// Breakthrough chance afterwards.
    pub breakthrough_chance: f64,
    /// Human-readable summary.
    pub message: String,
}

impl TreasureOutcome {
    /// Whether the treasure cleared the bottleneck and should be consumed.
    pub const fn succeeded(&self) -> bool {
        matches!(self.effect, TreasureEffect::Effective)
    }
}

/// A selectable monthly method with its effectiveness for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodListing {
    /// Method key.
    pub method: CultivationMethod,
    /// Display name.
    pub name: String,
    /// Description from the monthly table.
    pub description: String,
    /// Effectiveness rating in `1..=5`.
    pub effectiveness: u8,
}

/// Rewards earned by completing a sect mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReward {
    /// Mission difficulty actually used, in `1..=5`.
    pub difficulty: u32,
    /// Spirit stones earned for the sect.
    pub spirit_stones: u64,
    /// Whether a special reward was found.
    pub special_reward: bool,
    /// Insights gained toward a minor bottleneck.
    pub insights_gained: u32,
    /// Whether those insights cleared the minor bottleneck.
    pub bottleneck_cleared: bool,
    /// Treasure found, if any.
    pub treasure_found: Option<TreasureKind>,
}

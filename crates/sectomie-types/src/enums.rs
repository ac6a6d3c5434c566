//! Enumeration types for the Sectomie simulation.
//!
//! Keys that cross the request boundary as strings (cultivation methods,
//! treasures, resources) implement [`core::str::FromStr`] and serialize in
//! `snake_case`, matching the keys the game has always used.

use serde::{Deserialize, Serialize};

/// A string key did not name any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} key: {key}")]
pub struct UnknownKey {
    /// Which key space was searched (e.g. "cultivation method").
    pub kind: &'static str,
    /// The key that failed to parse.
    pub key: String,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A fungible resource pool held by a sect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectResource {
    /// Basic currency, produced by spirit veins.
    SpiritStones,
    /// Cultivation herbs, produced by elixir fields.
    SpiritHerbs,
    /// Rare crystals of condensed dao energy.
    DaoCrystals,
}

impl SectResource {
    /// Stable `snake_case` key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::SpiritStones => "spirit_stones",
            Self::SpiritHerbs => "spirit_herbs",
            Self::DaoCrystals => "dao_crystals",
        }
    }
}

impl core::fmt::Display for SectResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Cultivation methods
// ---------------------------------------------------------------------------

/// A named cultivation method.
///
/// The numeric effects of each method live in the method tables of
/// `sectomie-cultivators`; this enum is only the key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CultivationMethod {
    /// Balanced, steady qi accumulation.
    #[default]
    QiCirculation,
    /// Refines spiritual essence for faster qi gain.
    EssenceRefinement,
    /// Tempers the dao heart; favours breakthroughs and comprehension.
    DaoHeartTempering,
    /// Slow, safe foundation work. Monthly cultivation only.
    FoundationBuilding,
    /// Dangerous and powerful; high deviation risk.
    HeavenlyTribulation,
}

impl CultivationMethod {
    /// Every method, in listing order.
    pub const ALL: [Self; 5] = [
        Self::QiCirculation,
        Self::EssenceRefinement,
        Self::DaoHeartTempering,
        Self::FoundationBuilding,
        Self::HeavenlyTribulation,
    ];

    /// Stable `snake_case` key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::QiCirculation => "qi_circulation",
            Self::EssenceRefinement => "essence_refinement",
            Self::DaoHeartTempering => "dao_heart_tempering",
            Self::FoundationBuilding => "foundation_building",
            Self::HeavenlyTribulation => "heavenly_tribulation",
        }
    }

    /// Human-readable title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::QiCirculation => "Qi Circulation",
            Self::EssenceRefinement => "Essence Refinement",
            Self::DaoHeartTempering => "Dao Heart Tempering",
            Self::FoundationBuilding => "Foundation Building",
            Self::HeavenlyTribulation => "Heavenly Tribulation",
        }
    }
}

impl core::fmt::Display for CultivationMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl core::str::FromStr for CultivationMethod {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.key() == s)
            .ok_or_else(|| UnknownKey {
                kind: "cultivation method",
                key: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Treasures
// ---------------------------------------------------------------------------

/// A consumable treasure able to break a major bottleneck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreasureKind {
    /// Effective for the lowest realms.
    SpiritPill,
    /// Effective around Foundation Establishment to Nascent Soul.
    DaoComprehensionStone,
    /// Effective around Core Formation to Spirit Severing.
    HeavenAndEarthSpiritFruit,
    /// Effective around Nascent Soul to Dao Seeking.
    NineTransformationPill,
    /// Effective only at the summit realms.
    ImmortalAscensionStone,
}

impl TreasureKind {
    /// Every treasure kind.
    pub const ALL: [Self; 5] = [
        Self::SpiritPill,
        Self::DaoComprehensionStone,
        Self::HeavenAndEarthSpiritFruit,
        Self::NineTransformationPill,
        Self::ImmortalAscensionStone,
    ];

    /// Stable `snake_case` key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::SpiritPill => "spirit_pill",
            Self::DaoComprehensionStone => "dao_comprehension_stone",
            Self::HeavenAndEarthSpiritFruit => "heaven_and_earth_spirit_fruit",
            Self::NineTransformationPill => "nine_transformation_pill",
            Self::ImmortalAscensionStone => "immortal_ascension_stone",
        }
    }

    /// Display name: the key with spaces instead of underscores.
    pub fn display_name(self) -> String {
        self.key().replace('_', " ")
    }
}

impl core::fmt::Display for TreasureKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl core::str::FromStr for TreasureKind {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| UnknownKey {
                kind: "treasure",
                key: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Member state
// ---------------------------------------------------------------------------

/// Whether a member takes part in turn processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Cultivates every turn.
    #[default]
    Active,
    /// Skipped by the turn engine (in seclusion, away on a mission, ...).
    Inactive,
}

/// Blocking state that stops further breakthrough attempts.
///
/// Insight counters only exist while the bottleneck is minor, so a member
/// outside a minor bottleneck can never carry stale progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bottleneck {
    /// Free to attempt breakthroughs.
    #[default]
    None,
    /// Cleared by meditating for insights.
    Minor {
        /// Insights accumulated so far.
        insights: u32,
        /// Insights needed to clear the bottleneck.
        required: u32,
    },
    /// Cleared only by a treasure matched to the member's realm.
    Major,
}

impl Bottleneck {
    /// Short label used in messages: "none", "minor", or "major".
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minor { .. } => "minor",
            Self::Major => "major",
        }
    }

    /// Whether any bottleneck is active.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Sub-step within a realm.
///
/// Serialized as its ordinal (1 = Early ... 4 = Peak).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RealmStage {
    /// First stage of a realm.
    #[default]
    Early,
    /// Second stage.
    Middle,
    /// Third stage.
    Late,
    /// Final stage; the next breakthrough enters a new realm.
    Peak,
}

impl RealmStage {
    /// Ordinal in `1..=4`.
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Early => 1,
            Self::Middle => 2,
            Self::Late => 3,
            Self::Peak => 4,
        }
    }

    /// The following stage, or `None` at Peak.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Early => Some(Self::Middle),
            Self::Middle => Some(Self::Late),
            Self::Late => Some(Self::Peak),
            Self::Peak => None,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Early => "Early",
            Self::Middle => "Middle",
            Self::Late => "Late",
            Self::Peak => "Peak",
        }
    }
}

impl From<RealmStage> for u8 {
    fn from(stage: RealmStage) -> Self {
        stage.ordinal()
    }
}

impl TryFrom<u8> for RealmStage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Early),
            2 => Ok(Self::Middle),
            3 => Ok(Self::Late),
            4 => Ok(Self::Peak),
            other => Err(format!("realm stage must be 1-4, got {other}")),
        }
    }
}

impl core::fmt::Display for RealmStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Realm names, indexed by realm ordinal.
pub const REALM_NAMES: [&str; 8] = [
    "Mortal",
    "Qi Condensation",
    "Foundation Establishment",
    "Core Formation",
    "Nascent Soul",
    "Spirit Severing",
    "Dao Seeking",
    "Immortal Ascension",
];

/// Name of a realm; anything past the table is "Transcendent".
pub fn realm_name(realm: u32) -> &'static str {
    usize::try_from(realm)
        .ok()
        .and_then(|idx| REALM_NAMES.get(idx))
        .copied()
        .unwrap_or("Transcendent")
}

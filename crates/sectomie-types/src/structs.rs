//! Core entity structs for the Sectomie simulation.
//!
//! Covers [`Member`], [`Sect`], and the small value types a sect owns
//! ([`SpiritVein`], [`TechniqueManual`], [`ResourceCost`]).
//!
//! Membership is tracked on both sides: a [`Sect`] lists the ids of the
//! members it owns and a [`Member`] carries a non-owning handle to its sect.
//! Neither side is serialized; persistence records memberships by name and
//! the roster rebuilds both sides on load.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::enums::{
    Bottleneck, CultivationMethod, MemberStatus, RealmStage, SectResource, TreasureKind, realm_name,
};
use crate::ids::{MemberId, SectId};

/// Highest value breakthrough chance can hold.
pub const BREAKTHROUGH_CHANCE_MAX: f64 = 99.0;

/// Qi capacity of a freshly created member.
pub const STARTING_MAX_QI: f64 = 100.0;

/// Breakthrough chance of a freshly created member.
pub const STARTING_BREAKTHROUGH_CHANCE: f64 = 50.0;

/// Default bonus granted by a technique manual.
pub const DEFAULT_MANUAL_BONUS: f64 = 0.1;

/// Lowest and highest sect tier.
pub const TIER_RANGE: (u32, u32) = (1, 9);

fn clamp_unit(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// A cultivator belonging to at most one sect.
///
/// Qi, qi capacity, and breakthrough chance are private: every write goes
/// through a clamping setter so `0 <= qi <= max_qi` and
/// `0 <= breakthrough_chance <= 99` always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier.
    pub id: MemberId,
    /// Display name, unique within a roster.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Cultivation path (e.g. "Sword", "Alchemy").
    pub path: String,
    /// Physical, spiritual, and comprehension traits.
    pub attributes: Attributes,
    /// Major realm ordinal; 0 is Mortal.
    pub realm: u32,
    /// Stage within the current realm.
    pub realm_stage: RealmStage,
    /// Current qi.
    qi: f64,
    /// Qi capacity; doubles on every realm advance.
    max_qi: f64,
    /// Breakthrough chance in `[0, 99]`.
    breakthrough_chance: f64,
    /// Active bottleneck, if any.
    #[serde(default)]
    pub bottleneck: Bottleneck,
    /// Method used by the monthly step. `None` means qi circulation.
    #[serde(default)]
    pub assigned_method: Option<CultivationMethod>,
    /// Spirit stones committed to this member at assignment time.
    #[serde(default)]
    pub allocated_resources: u32,
    /// Known techniques.
    #[serde(default)]
    pub techniques: BTreeSet<String>,
    /// Whether the member takes part in turn processing.
    #[serde(default)]
    pub status: MemberStatus,
    /// Missions completed for the sect.
    #[serde(default)]
    pub missions_completed: u32,
    /// Owning sect. Maintained by the roster, never serialized.
    #[serde(skip)]
    sect: Option<SectId>,
}

impl Member {
    /// Create a Mortal (realm 0, Early stage) with starting qi and chance.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        path: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            age,
            path: path.into(),
            attributes,
            realm: 0,
            realm_stage: RealmStage::Early,
            qi: STARTING_MAX_QI,
            max_qi: STARTING_MAX_QI,
            breakthrough_chance: STARTING_BREAKTHROUGH_CHANCE,
            bottleneck: Bottleneck::None,
            assigned_method: None,
            allocated_resources: 0,
            techniques: BTreeSet::new(),
            status: MemberStatus::Active,
            missions_completed: 0,
            sect: None,
        }
    }

    /// Current qi.
    pub const fn qi(&self) -> f64 {
        self.qi
    }

    /// Qi capacity.
    pub const fn max_qi(&self) -> f64 {
        self.max_qi
    }

    /// Breakthrough chance.
    pub const fn breakthrough_chance(&self) -> f64 {
        self.breakthrough_chance
    }

    /// Fraction of capacity currently filled, in `[0, 1]`.
    pub fn qi_ratio(&self) -> f64 {
        if self.max_qi <= 0.0 {
            return 0.0;
        }
        self.qi / self.max_qi
    }

    /// Set qi, saturating into `[0, max_qi]`. Returns the stored value.
    pub fn set_qi(&mut self, value: f64) -> f64 {
        self.qi = clamp_unit(value, self.max_qi);
        self.qi
    }

    /// Add (or with a negative delta, remove) qi. Returns the stored value.
    pub fn add_qi(&mut self, delta: f64) -> f64 {
        self.set_qi(self.qi + delta)
    }

    /// Set qi capacity; current qi is re-clamped to the new capacity.
    pub fn set_max_qi(&mut self, value: f64) {
        self.max_qi = if value.is_nan() { 0.0 } else { value.max(0.0) };
        self.qi = clamp_unit(self.qi, self.max_qi);
    }

    /// Set breakthrough chance, saturating into `[0, 99]`.
    pub fn set_breakthrough_chance(&mut self, value: f64) -> f64 {
        self.breakthrough_chance = clamp_unit(value, BREAKTHROUGH_CHANCE_MAX);
        self.breakthrough_chance
    }

    /// Add to breakthrough chance, saturating into `[0, 99]`.
    pub fn add_breakthrough_chance(&mut self, delta: f64) -> f64 {
        self.set_breakthrough_chance(self.breakthrough_chance + delta)
    }

    /// Re-establish every numeric bound. Used after loading external data.
    pub fn normalize(&mut self) {
        self.set_max_qi(self.max_qi);
        self.set_breakthrough_chance(self.breakthrough_chance);
        self.attributes = Attributes::new(
            self.attributes.physical(),
            self.attributes.spiritual(),
            self.attributes.comprehension(),
        );
    }

    /// Method the monthly step should use.
    pub fn effective_method(&self) -> CultivationMethod {
        self.assigned_method.unwrap_or_default()
    }

    /// Whether the turn engine processes this member.
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Owning sect, if any.
    pub const fn sect(&self) -> Option<SectId> {
        self.sect
    }

    /// Point the back-reference at a sect. Only the roster should call this.
    pub const fn set_sect(&mut self, sect: Option<SectId>) {
        self.sect = sect;
    }

    /// Name of the current realm.
    pub fn realm_name(&self) -> &'static str {
        realm_name(self.realm)
    }

    /// "Late Core Formation" style label.
    pub fn rank_label(&self) -> String {
        format!("{} {}", self.realm_stage.name(), self.realm_name())
    }
}

// ---------------------------------------------------------------------------
// Sect
// ---------------------------------------------------------------------------

/// A spirit vein producing spirit stones every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiritVein {
    /// Territory the vein lies under.
    pub location: String,
    /// Vein quality.
    pub quality: u32,
    /// Spirit stones produced per turn; `quality * 100`.
    pub output: u64,
}

impl SpiritVein {
    /// Build a vein whose output follows from its quality.
    pub fn new(location: impl Into<String>, quality: u32) -> Self {
        Self {
            location: location.into(),
            quality,
            output: u64::from(quality).saturating_mul(100),
        }
    }
}

/// A technique manual boosting one cultivation method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueManual {
    /// Method the manual improves.
    pub method: CultivationMethod,
    /// Additive bonus to the monthly manual multiplier.
    #[serde(default = "default_manual_bonus")]
    pub bonus: f64,
}

const fn default_manual_bonus() -> f64 {
    DEFAULT_MANUAL_BONUS
}

impl TechniqueManual {
    /// A manual with the default bonus.
    pub const fn new(method: CultivationMethod) -> Self {
        Self {
            method,
            bonus: DEFAULT_MANUAL_BONUS,
        }
    }
}

/// A cultivation sect and its resource pools.
///
/// All pools are initialised at founding; nothing is added lazily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sect {
    /// Unique identifier.
    pub id: SectId,
    /// Display name, unique within a roster.
    pub name: String,
    /// The dao the sect is built around (e.g. "Sword Dao").
    pub dao_heritage: String,
    /// Tier in `[1, 9]`.
    pub tier: u32,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Spirit stone pool.
    pub spirit_stones: u64,
    /// Spirit herb pool.
    pub spirit_herbs: u64,
    /// Dao crystal pool.
    pub dao_crystals: u64,
    /// Veins in vein order.
    #[serde(default)]
    pub spirit_veins: Vec<SpiritVein>,
    /// Elixir fields; each yields 0-2 herbs per turn.
    pub elixir_fields: u32,
    /// Treasure inventory.
    #[serde(default)]
    pub treasures: BTreeMap<TreasureKind, u32>,
    /// Cultivation chambers; +5% monthly cultivation each.
    #[serde(default)]
    pub cultivation_chambers: u32,
    /// Manuals held by the sect.
    #[serde(default)]
    pub technique_manuals: Vec<TechniqueManual>,
    /// Influence in the cultivation world.
    pub influence: u64,
    /// Reputation.
    pub reputation: u64,
    /// Protective formation strength.
    pub formation_strength: u64,
    /// Controlled territories, in acquisition order.
    #[serde(default)]
    pub territories: Vec<String>,
    /// Techniques taught by the sect.
    #[serde(default)]
    pub techniques: Vec<String>,
    /// Owned members. Maintained by the roster, never serialized.
    #[serde(skip)]
    members: Vec<MemberId>,
    /// Allied sects. Maintained by the roster, saved by name.
    #[serde(skip)]
    alliances: Vec<SectId>,
    /// Rival sects. Maintained by the roster, saved by name.
    #[serde(skip)]
    rivals: Vec<SectId>,
}

impl Sect {
    /// Found a sect with tier-scaled starting pools.
    ///
    /// `tier` is clamped into `[1, 9]`.
    pub fn found(
        name: impl Into<String>,
        dao_heritage: impl Into<String>,
        tier: u32,
        description: impl Into<String>,
    ) -> Self {
        let tier = tier.clamp(TIER_RANGE.0, TIER_RANGE.1);
        let scale = u64::from(tier);
        Self {
            id: SectId::new(),
            name: name.into(),
            dao_heritage: dao_heritage.into(),
            tier,
            description: description.into(),
            spirit_stones: scale.saturating_mul(10_000),
            spirit_herbs: scale.saturating_mul(2),
            dao_crystals: 0,
            spirit_veins: Vec::new(),
            elixir_fields: tier,
            treasures: BTreeMap::new(),
            cultivation_chambers: 0,
            technique_manuals: Vec::new(),
            influence: scale.saturating_mul(10),
            reputation: 50,
            formation_strength: scale.saturating_mul(10),
            territories: Vec::new(),
            techniques: Vec::new(),
            members: Vec::new(),
            alliances: Vec::new(),
            rivals: Vec::new(),
        }
    }

    /// Take control of a territory.
    ///
    /// A new territory raises influence by 5 and, with a positive quality,
    /// brings a spirit vein. Returns `false` if it was already held.
    pub fn add_territory(&mut self, territory: impl Into<String>, vein_quality: u32) -> bool {
        let territory = territory.into();
        if self.territories.contains(&territory) {
            return false;
        }
        self.influence = self.influence.saturating_add(5);
        if vein_quality > 0 {
            self.spirit_veins.push(SpiritVein::new(territory.clone(), vein_quality));
        }
        self.territories.push(territory);
        true
    }

    /// Name of the sect's tier.
    pub const fn tier_name(&self) -> &'static str {
        match self.tier {
            1 => "Mortal",
            2 => "Spirit Gathering",
            3 => "Foundation",
            4 => "Core",
            5 => "Nascent",
            6 => "Spirit",
            7 => "Dao",
            8 => "Immortal",
            9 => "Celestial",
            _ => "Transcendent",
        }
    }

    /// Current amount of a fungible resource.
    pub const fn resource(&self, resource: SectResource) -> u64 {
        match resource {
            SectResource::SpiritStones => self.spirit_stones,
            SectResource::SpiritHerbs => self.spirit_herbs,
            SectResource::DaoCrystals => self.dao_crystals,
        }
    }

    /// Mutable access to a fungible resource pool.
    pub const fn resource_mut(&mut self, resource: SectResource) -> &mut u64 {
        match resource {
            SectResource::SpiritStones => &mut self.spirit_stones,
            SectResource::SpiritHerbs => &mut self.spirit_herbs,
            SectResource::DaoCrystals => &mut self.dao_crystals,
        }
    }

    /// Count of one treasure kind.
    pub fn treasure_count(&self, kind: TreasureKind) -> u32 {
        self.treasures.get(&kind).copied().unwrap_or(0)
    }

    /// Bonus of the first manual matching a method, or 0 without one.
    pub fn manual_bonus(&self, method: CultivationMethod) -> f64 {
        self.technique_manuals
            .iter()
            .find(|manual| manual.method == method)
            .map_or(0.0, |manual| manual.bonus)
    }

    /// Ids of owned members, in join order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Whether the sect owns a member.
    pub fn has_member(&self, member: MemberId) -> bool {
        self.members.contains(&member)
    }

    /// Record ownership of a member. Only the roster should call this.
    pub fn link_member(&mut self, member: MemberId) {
        if !self.has_member(member) {
            self.members.push(member);
        }
    }

    /// Drop ownership of a member. Only the roster should call this.
    pub fn unlink_member(&mut self, member: MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|id| *id != member);
        self.members.len() != before
    }

    /// Allied sects, in the order the alliances formed.
    pub fn alliances(&self) -> &[SectId] {
        &self.alliances
    }

    /// Rival sects, in the order the rivalries were declared.
    pub fn rivals(&self) -> &[SectId] {
        &self.rivals
    }

    /// Whether the sect is allied with `other`.
    pub fn is_allied_with(&self, other: SectId) -> bool {
        self.alliances.contains(&other)
    }

    /// Whether the sect counts `other` as a rival.
    pub fn is_rival_of(&self, other: SectId) -> bool {
        self.rivals.contains(&other)
    }

    /// Record one side of an alliance. Only the roster should call this.
    pub fn link_ally(&mut self, other: SectId) -> bool {
        if other == self.id || self.is_allied_with(other) {
            return false;
        }
        self.alliances.push(other);
        true
    }

    /// Record one side of a rivalry. Only the roster should call this.
    pub fn link_rival(&mut self, other: SectId) -> bool {
        if other == self.id || self.is_rival_of(other) {
            return false;
        }
        self.rivals.push(other);
        true
    }

    /// Drop every member and diplomatic link. Only the roster should call
    /// this.
    pub fn clear_links(&mut self) {
        self.members.clear();
        self.alliances.clear();
        self.rivals.clear();
    }
}

// ---------------------------------------------------------------------------
// Resource costs
// ---------------------------------------------------------------------------

/// A multi-resource price, e.g. 400 spirit stones plus 1 herb.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCost(BTreeMap<SectResource, u64>);

impl ResourceCost {
    /// A cost of nothing.
    pub const fn free() -> Self {
        Self(BTreeMap::new())
    }

    /// A cost payable in spirit stones only.
    pub fn stones(amount: u64) -> Self {
        Self::free().with(SectResource::SpiritStones, amount)
    }

    /// Add a resource requirement (builder style).
    #[must_use]
    pub fn with(mut self, resource: SectResource, amount: u64) -> Self {
        if amount > 0 {
            self.0.insert(resource, amount);
        }
        self
    }

    /// Amount required of one resource.
    pub fn get(&self, resource: SectResource) -> u64 {
        self.0.get(&resource).copied().unwrap_or(0)
    }

    /// Iterate over the required resources.
    pub fn iter(&self) -> impl Iterator<Item = (SectResource, u64)> + '_ {
        self.0.iter().map(|(resource, amount)| (*resource, *amount))
    }

    /// Whether nothing is required.
    pub fn is_free(&self) -> bool {
        self.0.is_empty()
    }
}

//! Static cultivation method tables.
//!
//! Two tables exist and are tuned independently:
//!
//! | table | used by | base duration |
//! |-------|---------|---------------|
//! | [`MethodTable::Direct`] | an explicit single session | 24 hours |
//! | [`MethodTable::Monthly`] | the turn engine | 30 days |
//!
//! `foundation_building` only exists in the monthly table, and
//! `heavenly_tribulation` only becomes selectable for monthly assignment at
//! realm 3 (Core Formation).

use sectomie_types::{Attribute, CultivationMethod, Member, MethodListing};

use crate::error::ProgressionError;

/// Which attribute a method's bonus roll improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeTarget {
    /// The method never grants attributes.
    None,
    /// Always the same attribute.
    Single(Attribute),
    /// All three attributes at once.
    All,
    /// One attribute chosen uniformly at random.
    Random,
}

/// Effects of practising one method once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodEffect {
    /// The method.
    pub method: CultivationMethod,
    /// Scales the base qi gain.
    pub qi_multiplier: f64,
    /// Flat addition to breakthrough chance.
    pub breakthrough_increase: f64,
    /// Probability of the attribute bonus.
    pub attribute_chance: f64,
    /// Which attribute the bonus improves.
    pub attribute_target: AttributeTarget,
    /// Size of the attribute bonus.
    pub attribute_increase: f64,
    /// Probability of a deviation roll.
    pub deviation_chance: f64,
    /// Lowest realm at which the method can be assigned.
    pub min_realm: u32,
    /// Summary returned to callers.
    pub description: &'static str,
}

const DIRECT_EFFECTS: [MethodEffect; 4] = [
    MethodEffect {
        method: CultivationMethod::QiCirculation,
        qi_multiplier: 1.0,
        breakthrough_increase: 1.0,
        attribute_chance: 0.0,
        attribute_target: AttributeTarget::None,
        attribute_increase: 0.0,
        deviation_chance: 0.0,
        min_realm: 0,
        description: "Steady circulation of qi through the meridians",
    },
    MethodEffect {
        method: CultivationMethod::EssenceRefinement,
        qi_multiplier: 2.0,
        breakthrough_increase: 2.0,
        attribute_chance: 0.0,
        attribute_target: AttributeTarget::None,
        attribute_increase: 0.0,
        deviation_chance: 0.0,
        min_realm: 0,
        description: "Refines spiritual essence for doubled qi gain",
    },
    MethodEffect {
        method: CultivationMethod::DaoHeartTempering,
        qi_multiplier: 3.0,
        breakthrough_increase: 4.0,
        attribute_chance: 0.15,
        attribute_target: AttributeTarget::Single(Attribute::Comprehension),
        attribute_increase: 1.0,
        deviation_chance: 0.02,
        min_realm: 0,
        description: "Tempers the dao heart, sharpening comprehension",
    },
    MethodEffect {
        method: CultivationMethod::HeavenlyTribulation,
        qi_multiplier: 1.5,
        breakthrough_increase: 10.0,
        attribute_chance: 0.0,
        attribute_target: AttributeTarget::None,
        attribute_increase: 0.0,
        deviation_chance: 0.1,
        min_realm: 0,
        description: "Courts heavenly lightning to force the next breakthrough",
    },
];

const MONTHLY_EFFECTS: [MethodEffect; 5] = [
    MethodEffect {
        method: CultivationMethod::QiCirculation,
        qi_multiplier: 1.0,
        breakthrough_increase: 1.0,
        attribute_chance: 0.05,
        attribute_target: AttributeTarget::Single(Attribute::Physical),
        attribute_increase: 1.0,
        deviation_chance: 0.01,
        min_realm: 0,
        description: "A balanced method focusing on steady qi accumulation",
    },
    MethodEffect {
        method: CultivationMethod::EssenceRefinement,
        qi_multiplier: 1.5,
        breakthrough_increase: 1.2,
        attribute_chance: 0.08,
        attribute_target: AttributeTarget::Single(Attribute::Spiritual),
        attribute_increase: 1.0,
        deviation_chance: 0.03,
        min_realm: 0,
        description: "Focuses on refining spiritual essence, increasing qi gain but with higher deviation risk",
    },
    MethodEffect {
        method: CultivationMethod::DaoHeartTempering,
        qi_multiplier: 0.8,
        breakthrough_increase: 2.0,
        attribute_chance: 0.15,
        attribute_target: AttributeTarget::Single(Attribute::Comprehension),
        attribute_increase: 1.0,
        deviation_chance: 0.02,
        min_realm: 0,
        description: "Focuses on understanding the Dao, improving breakthrough chance and comprehension at the cost of slower qi accumulation",
    },
    MethodEffect {
        method: CultivationMethod::FoundationBuilding,
        qi_multiplier: 0.7,
        breakthrough_increase: 1.5,
        attribute_chance: 0.1,
        attribute_target: AttributeTarget::All,
        attribute_increase: 0.5,
        deviation_chance: 0.005,
        min_realm: 0,
        description: "A slow but safe method that builds a solid foundation and reduces deviation chance",
    },
    MethodEffect {
        method: CultivationMethod::HeavenlyTribulation,
        qi_multiplier: 2.0,
        breakthrough_increase: 3.0,
        attribute_chance: 0.2,
        attribute_target: AttributeTarget::Random,
        attribute_increase: 2.0,
        deviation_chance: 0.15,
        min_realm: 3,
        description: "A dangerous but powerful method that greatly accelerates cultivation at the risk of severe deviation",
    },
];

/// Selects one of the two method tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodTable {
    /// Single explicit session (24 hours).
    Direct,
    /// Automatic turn step (30 days).
    Monthly,
}

impl MethodTable {
    /// Every entry, in listing order.
    pub const fn entries(self) -> &'static [MethodEffect] {
        match self {
            Self::Direct => &DIRECT_EFFECTS,
            Self::Monthly => &MONTHLY_EFFECTS,
        }
    }

    /// Effect of a method in this table, if the table has it.
    pub fn get(self, method: CultivationMethod) -> Option<&'static MethodEffect> {
        self.entries().iter().find(|effect| effect.method == method)
    }

    /// Resolve a string key against this table.
    pub fn resolve(self, key: &str) -> Result<&'static MethodEffect, ProgressionError> {
        key.parse::<CultivationMethod>()
            .ok()
            .and_then(|method| self.get(method))
            .ok_or_else(|| ProgressionError::UnknownMethod {
                key: key.to_owned(),
            })
    }
}

/// Check that a monthly method can be assigned to a member.
pub fn validate_assignment(
    member: &Member,
    key: &str,
) -> Result<CultivationMethod, ProgressionError> {
    let effect = MethodTable::Monthly.resolve(key)?;
    if member.realm < effect.min_realm {
        return Err(ProgressionError::MethodLocked {
            method: effect.method,
            required_realm: effect.min_realm,
            realm: member.realm,
        });
    }
    Ok(effect.method)
}

/// Map a raw score onto the 1-5 effectiveness scale (`floor(score / divisor)`).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rating(score: f64, divisor: f64) -> u8 {
    // Clamped into 1..=5 before the cast.
    (score / divisor).floor().clamp(1.0, 5.0) as u8
}

/// Effectiveness of a monthly method for one member.
pub fn effectiveness(member: &Member, method: CultivationMethod) -> u8 {
    let attrs = &member.attributes;
    match method {
        CultivationMethod::QiCirculation => {
            let (p, s, c) = (attrs.physical(), attrs.spiritual(), attrs.comprehension());
            let imbalance = ((p - s).abs() + (s - c).abs() + (c - p).abs()) / 3.0;
            rating(100.0 - imbalance, 20.0)
        }
        CultivationMethod::EssenceRefinement => rating(attrs.spiritual(), 20.0),
        CultivationMethod::DaoHeartTempering => rating(attrs.comprehension(), 20.0),
        CultivationMethod::FoundationBuilding => rating(attrs.lowest(), 20.0),
        CultivationMethod::HeavenlyTribulation => rating(
            attrs.comprehension() + f64::from(member.realm) * 10.0,
            25.0,
        ),
    }
}

/// Monthly methods the member may be assigned, with effectiveness ratings.
pub fn available_methods(member: &Member) -> Vec<MethodListing> {
    MethodTable::Monthly
        .entries()
        .iter()
        .filter(|effect| member.realm >= effect.min_realm)
        .map(|effect| MethodListing {
            method: effect.method,
            name: effect.method.title().to_owned(),
            description: effect.description.to_owned(),
            effectiveness: effectiveness(member, effect.method),
        })
        .collect()
}

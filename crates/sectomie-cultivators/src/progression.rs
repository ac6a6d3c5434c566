//! Per-member progression: cultivation, breakthroughs, and bottlenecks.
//!
//! A member moves through a small state machine:
//!
//! ```text
//!            attempt (minor roll)          meditate until insights >= required
//! Cultivating ---------------------> Minor ------------------------------------+
//!      |  ^                                                                    |
//!      |  +--------------------------------------------------------------------+
//!      |  attempt (major roll, Peak only, when enabled)
//!      +-------------------------------> Major --- matching treasure ---> Cultivating
//! ```
//!
//! Rejections ([`ProgressionError`]) never mutate the member. Modelled
//! setbacks (deviation, failed breakthrough, a treasure of the wrong power)
//! return `Ok` with the setback described in the outcome.
//!
//! All randomness is drawn from the caller's `rng`.

use rand::Rng;
use rand::seq::IndexedRandom;
use sectomie_types::{
    Attribute, AttributeGain, Bottleneck, BreakthroughOutcome, BreakthroughResult,
    CultivationOutcome, Deviation, MeditationOutcome, Member, MissionReward, RealmStage,
    TreasureEffect, TreasureKind, TreasureOutcome, UnknownKey,
};
use tracing::{debug, info, warn};

use crate::config::ProgressionConfig;
use crate::error::ProgressionError;
use crate::methods::{AttributeTarget, MethodEffect, MethodTable};
use crate::treasures::effective_realms;

/// Hours in a direct cultivation session.
pub const DIRECT_SESSION_HOURS: f64 = 24.0;

/// Days in a monthly cultivation step. The monthly formula is day-granular.
pub const MONTHLY_SESSION_DAYS: f64 = 30.0;

/// Fraction of qi lost to a direct-session deviation.
pub const DIRECT_DEVIATION_SEVERITY: f64 = 0.2;

/// Fraction of capacity needed before a breakthrough attempt.
pub const BREAKTHROUGH_QI_THRESHOLD: f64 = 0.9;

/// The effective chance must exceed this for a breakthrough to succeed.
pub const BREAKTHROUGH_GATE: f64 = 50.0;

/// Breakthrough chance granted when meditation clears a minor bottleneck.
pub const INSIGHT_CLEAR_REWARD: f64 = 20.0;

/// Breakthrough chance granted when a treasure clears a major bottleneck.
pub const TREASURE_CLEAR_REWARD: f64 = 40.0;

/// Environment multipliers applied to a monthly step.
///
/// `1.0` everywhere means no bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CultivationBonuses {
    /// From cultivation chambers: `1 + chambers * 0.05`.
    pub facility: f64,
    /// From a matching technique manual: `1 + bonus`.
    pub manual: f64,
    /// From allocated resources: `1 + allocated * 0.1`.
    pub resource: f64,
}

impl Default for CultivationBonuses {
    fn default() -> Self {
        Self {
            facility: 1.0,
            manual: 1.0,
            resource: 1.0,
        }
    }
}

/// How a deviation's severity is determined.
#[derive(Debug, Clone, Copy)]
enum Severity {
    Fixed(f64),
    Uniform { low: f64, high: f64 },
}

fn count_as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Qi gained before method and environment multipliers.
///
/// `(spiritual / 10) * (1 + realm * 0.5) * duration`, where `duration` is
/// hours for a direct session and days for the monthly step.
pub fn base_qi_gain(member: &Member, duration: f64) -> f64 {
    (member.attributes.spiritual() / 10.0) * (1.0 + f64::from(member.realm) * 0.5) * duration
}

// ---------------------------------------------------------------------------
// Cultivation
// ---------------------------------------------------------------------------

/// Run one direct (24-hour) cultivation session.
///
/// Unknown keys, including the monthly-only `foundation_building`, are
/// rejected without touching the member.
pub fn cultivate_with_method(
    member: &mut Member,
    key: &str,
    rng: &mut impl Rng,
) -> Result<CultivationOutcome, ProgressionError> {
    let effect = MethodTable::Direct.resolve(key)?;
    let qi_gain = base_qi_gain(member, DIRECT_SESSION_HOURS) * effect.qi_multiplier;
    Ok(apply_session(
        member,
        effect,
        qi_gain,
        effect.breakthrough_increase,
        effect.deviation_chance,
        Severity::Fixed(DIRECT_DEVIATION_SEVERITY),
        rng,
    ))
}

/// Run one monthly cultivation step with environment bonuses.
///
/// Qi gain scales with all three bonuses, breakthrough increase with the
/// facility and manual bonuses only. A better manual divides the deviation
/// chance, and a monthly deviation costs 10-30% of qi.
pub fn calculate_monthly_cultivation(
    member: &mut Member,
    key: &str,
    bonuses: CultivationBonuses,
    rng: &mut impl Rng,
) -> Result<CultivationOutcome, ProgressionError> {
    let effect = MethodTable::Monthly.resolve(key)?;
    let qi_gain = base_qi_gain(member, MONTHLY_SESSION_DAYS)
        * effect.qi_multiplier
        * bonuses.facility
        * bonuses.manual
        * bonuses.resource;
    let breakthrough_increase = effect.breakthrough_increase * bonuses.facility * bonuses.manual;
    let deviation_chance = if bonuses.manual > 0.0 {
        effect.deviation_chance / bonuses.manual
    } else {
        effect.deviation_chance
    };
    Ok(apply_session(
        member,
        effect,
        qi_gain,
        breakthrough_increase,
        deviation_chance,
        Severity::Uniform {
            low: 0.1,
            high: 0.3,
        },
        rng,
    ))
}

fn apply_session(
    member: &mut Member,
    effect: &MethodEffect,
    qi_gain: f64,
    breakthrough_increase: f64,
    deviation_chance: f64,
    severity: Severity,
    rng: &mut impl Rng,
) -> CultivationOutcome {
    let qi_before = member.qi();
    let qi_after_gain = member.add_qi(qi_gain);
    let chance_before = member.breakthrough_chance();
    member.add_breakthrough_chance(breakthrough_increase);

    let attribute_gains = roll_attribute_gains(member, effect, rng);

    // Two independent rolls: the method's risk, then comprehension as a ward.
    let mut deviation = None;
    if rng.random::<f64>() < deviation_chance
        && rng.random::<f64>() * 100.0 > member.attributes.comprehension()
    {
        let severity = match severity {
            Severity::Fixed(value) => value,
            Severity::Uniform { low, high } => rng.random_range(low..=high),
        };
        let qi_lost = member.qi() * severity;
        member.add_qi(-qi_lost);
        warn!(
            member = %member.name,
            method = %effect.method,
            severity,
            qi_lost,
            "cultivation deviation"
        );
        deviation = Some(Deviation { severity, qi_lost });
    }

    // Clamped delta: a member at capacity reports 0 whatever the formula gave.
    let qi_gained = qi_after_gain - qi_before;
    let message = deviation.map_or_else(
        || {
            format!(
                "Cultivated with {}: gained {qi_gained:.1} qi.",
                effect.method.title()
            )
        },
        |dev| match severity {
            Severity::Fixed(_) => {
                String::from("Cultivation deviation occurred! Lost some qi progress.")
            }
            Severity::Uniform { .. } => format!(
                "Cultivation deviation occurred! Lost {}% of accumulated qi.",
                (dev.severity * 100.0).trunc()
            ),
        },
    );

    debug!(
        member = %member.name,
        method = %effect.method,
        qi_gained,
        qi = member.qi(),
        breakthrough_chance = member.breakthrough_chance(),
        "cultivation session"
    );

    CultivationOutcome {
        method: effect.method,
        description: effect.description.to_owned(),
        qi_gained,
        breakthrough_increase: member.breakthrough_chance() - chance_before,
        attribute_gains,
        deviation,
        qi: member.qi(),
        max_qi: member.max_qi(),
        breakthrough_chance: member.breakthrough_chance(),
        message,
    }
}

fn roll_attribute_gains(
    member: &mut Member,
    effect: &MethodEffect,
    rng: &mut impl Rng,
) -> Vec<AttributeGain> {
    if effect.attribute_target == AttributeTarget::None
        || rng.random::<f64>() >= effect.attribute_chance
    {
        return Vec::new();
    }
    let targets: Vec<Attribute> = match effect.attribute_target {
        AttributeTarget::None => Vec::new(),
        AttributeTarget::Single(attribute) => vec![attribute],
        AttributeTarget::All => Attribute::ALL.to_vec(),
        AttributeTarget::Random => Attribute::ALL.choose(rng).copied().into_iter().collect(),
    };
    targets
        .into_iter()
        .map(|attribute| AttributeGain {
            attribute,
            amount: effect.attribute_increase,
            new_value: member.attributes.raise(attribute, effect.attribute_increase),
        })
        .collect()
}

/// Legacy hour-based cultivation. Returns the qi gain before clamping.
///
/// `qi += hours * (spiritual / 10) * (1 + realm * 0.5)` and breakthrough
/// chance grows by `hours * 0.1`, both clamped.
pub fn cultivate_hours(member: &mut Member, hours: f64) -> f64 {
    let qi_gain = base_qi_gain(member, hours);
    member.add_qi(qi_gain);
    member.add_breakthrough_chance(hours * 0.1);
    qi_gain
}

// ---------------------------------------------------------------------------
// Breakthrough
// ---------------------------------------------------------------------------

/// Probability of a minor bottleneck on a breakthrough attempt.
pub fn minor_bottleneck_chance(realm: u32) -> f64 {
    if realm >= 2 {
        0.3 + f64::from(realm) * 0.1
    } else {
        0.0
    }
}

/// Probability of a major bottleneck on a breakthrough attempt.
///
/// Only Peak-stage attempts qualify, and only when the config enables it;
/// otherwise this is zero.
pub fn major_bottleneck_chance(member: &Member, config: &ProgressionConfig) -> f64 {
    if config.major_bottleneck_enabled && member.realm_stage == RealmStage::Peak {
        0.5 + f64::from(member.realm) * 0.1
    } else {
        0.0
    }
}

/// Attempt to break through to the next stage or realm.
///
/// The major roll is always drawn first, then the minor roll. If neither
/// hits, success is the fixed gate `breakthrough_chance + comprehension / 5
/// > 50`, not a further random draw.
pub fn attempt_breakthrough(
    member: &mut Member,
    config: &ProgressionConfig,
    rng: &mut impl Rng,
) -> Result<BreakthroughOutcome, ProgressionError> {
    if member.bottleneck.is_active() {
        return Err(ProgressionError::BottleneckActive {
            bottleneck: member.bottleneck,
        });
    }
    let required = member.max_qi() * BREAKTHROUGH_QI_THRESHOLD;
    if member.qi() < required {
        return Err(ProgressionError::InsufficientQi {
            qi: member.qi(),
            required,
        });
    }

    let effective_chance = member.breakthrough_chance() + member.attributes.comprehension() / 5.0;
    let major_chance = major_bottleneck_chance(member, config);
    let minor_chance = minor_bottleneck_chance(member.realm);

    let (result, message) = if rng.random::<f64>() < major_chance {
        let insights_required = member.realm.saturating_mul(2).saturating_add(5);
        member.bottleneck = Bottleneck::Major;
        member.set_qi(member.max_qi() * 0.7);
        member.set_breakthrough_chance(member.breakthrough_chance() * 0.5);
        info!(member = %member.name, realm = member.realm, "major bottleneck encountered");
        (
            BreakthroughResult::MajorBottleneck { insights_required },
            String::from(
                "You've encountered a major bottleneck! Your cultivation has reached a \
                 fundamental barrier. You need special treasures to overcome this.",
            ),
        )
    } else if rng.random::<f64>() < minor_chance {
        let insights_required = member.realm.saturating_add(3);
        member.bottleneck = Bottleneck::Minor {
            insights: 0,
            required: insights_required,
        };
        member.set_qi(member.max_qi() * 0.8);
        member.set_breakthrough_chance(member.breakthrough_chance() * 0.7);
        info!(
            member = %member.name,
            realm = member.realm,
            insights_required,
            "minor bottleneck encountered"
        );
        (
            BreakthroughResult::MinorBottleneck { insights_required },
            String::from(
                "You've encountered a minor bottleneck! Your cultivation has stalled. \
                 Gain insights through meditation to continue.",
            ),
        )
    } else if effective_chance > BREAKTHROUGH_GATE {
        member.set_qi(member.max_qi() * 0.3);
        if let Some(next) = member.realm_stage.next() {
            member.realm_stage = next;
        } else {
            member.realm = member.realm.saturating_add(1);
            member.realm_stage = RealmStage::Early;
            member.set_max_qi(member.max_qi() * 2.0);
        }
        member.set_breakthrough_chance(0.0);
        info!(
            member = %member.name,
            realm = member.realm,
            stage = %member.realm_stage,
            "breakthrough succeeded"
        );
        (
            BreakthroughResult::Advanced,
            format!("Breakthrough successful! Advanced to {}.", member.rank_label()),
        )
    } else {
        member.set_qi(member.max_qi() * 0.5);
        debug!(member = %member.name, effective_chance, "breakthrough failed");
        (
            BreakthroughResult::Failed,
            String::from("Breakthrough failed. Your foundation is not solid enough yet."),
        )
    };

    Ok(BreakthroughOutcome {
        result,
        effective_chance,
        realm: member.realm,
        realm_name: member.realm_name().to_owned(),
        realm_stage: member.realm_stage,
        qi: member.qi(),
        max_qi: member.max_qi(),
        breakthrough_chance: member.breakthrough_chance(),
        message,
    })
}

// ---------------------------------------------------------------------------
// Bottleneck remedies
// ---------------------------------------------------------------------------

/// Meditate for insight against a minor bottleneck.
///
/// Success chance is `comprehension / 100 + min(techniques * 0.05, 0.25)`;
/// a success may yield a second insight with chance `comprehension / 200`.
/// Reaching the requirement clears the bottleneck and grants +20
/// breakthrough chance.
pub fn meditate_for_insight(
    member: &mut Member,
    rng: &mut impl Rng,
) -> Result<MeditationOutcome, ProgressionError> {
    let (insights, required) = match member.bottleneck {
        Bottleneck::Minor { insights, required } => (insights, required),
        Bottleneck::Major => {
            return Err(ProgressionError::WrongBottleneck {
                active: Bottleneck::Major,
                remedy: "meditation alone cannot overcome it; special treasures are needed",
            });
        }
        Bottleneck::None => return Err(ProgressionError::NoBottleneck),
    };

    let comprehension = member.attributes.comprehension();
    let technique_bonus = (count_as_f64(member.techniques.len()) * 0.05).min(0.25);
    let chance = comprehension / 100.0 + technique_bonus;

    if rng.random::<f64>() >= chance {
        return Ok(MeditationOutcome {
            insights_gained: 0,
            insights,
            insights_required: required,
            cleared: false,
            breakthrough_chance: member.breakthrough_chance(),
            message: String::from("Your meditation yielded no insights this time. Keep trying."),
        });
    }

    let insights_gained = if rng.random::<f64>() < comprehension / 200.0 {
        2
    } else {
        1
    };
    let total = insights.saturating_add(insights_gained);

    if total >= required {
        member.bottleneck = Bottleneck::None;
        member.add_breakthrough_chance(INSIGHT_CLEAR_REWARD);
        info!(member = %member.name, insights_gained, "minor bottleneck overcome");
        return Ok(MeditationOutcome {
            insights_gained,
            insights: 0,
            insights_required: 0,
            cleared: true,
            breakthrough_chance: member.breakthrough_chance(),
            message: format!(
                "Enlightenment! You've gained {insights_gained} insight(s) and overcome your \
                 bottleneck."
            ),
        });
    }

    member.bottleneck = Bottleneck::Minor {
        insights: total,
        required,
    };
    debug!(member = %member.name, insights = total, required, "insight gained");
    Ok(MeditationOutcome {
        insights_gained,
        insights: total,
        insights_required: required,
        cleared: false,
        breakthrough_chance: member.breakthrough_chance(),
        message: format!(
            "You've gained {insights_gained} insight(s). ({total}/{required} required)"
        ),
    })
}

/// Apply a treasure to a major bottleneck.
///
/// Only an effective treasure changes the member (bottleneck cleared, +40
/// breakthrough chance). The caller consumes the treasure from the sect
/// only when [`TreasureOutcome::succeeded`] is true.
pub fn use_treasure_for_bottleneck(
    member: &mut Member,
    key: &str,
) -> Result<TreasureOutcome, ProgressionError> {
    match member.bottleneck {
        Bottleneck::Major => {}
        Bottleneck::Minor { .. } => {
            return Err(ProgressionError::WrongBottleneck {
                active: member.bottleneck,
                remedy: "try meditation instead",
            });
        }
        Bottleneck::None => return Err(ProgressionError::NoBottleneck),
    }
    let treasure: TreasureKind = key
        .parse()
        .map_err(|err: UnknownKey| ProgressionError::UnknownTreasure { key: err.key })?;

    let (low, high) = effective_realms(treasure);
    let name = treasure.display_name();
    let (effect, message) = if member.realm < low {
        (
            TreasureEffect::TooPowerful,
            format!(
                "This {name} is too powerful for your current cultivation level. It might harm \
                 your foundation."
            ),
        )
    } else if member.realm > high {
        (
            TreasureEffect::TooWeak,
            format!(
                "This {name} is too weak for your current cultivation level. You need a more \
                 potent treasure."
            ),
        )
    } else {
        member.bottleneck = Bottleneck::None;
        member.add_breakthrough_chance(TREASURE_CLEAR_REWARD);
        info!(member = %member.name, %treasure, "major bottleneck overcome");
        (
            TreasureEffect::Effective,
            format!(
                "The {name} resonates with your cultivation base! The bottleneck has been \
                 overcome."
            ),
        )
    };

    Ok(TreasureOutcome {
        treasure,
        effect,
        breakthrough_chance: member.breakthrough_chance(),
        message,
    })
}

// ---------------------------------------------------------------------------
// Missions
// ---------------------------------------------------------------------------

/// Hardest mission difficulty.
pub const MAX_MISSION_DIFFICULTY: u32 = 5;

/// Spirit stones a mission of `difficulty` (clamped to 1-5) pays.
pub fn mission_stones(member: &Member, difficulty: u32) -> u64 {
    // 50 * (1 + realm / 2) == 25 * (2 + realm), kept in integers.
    u64::from(difficulty.clamp(1, MAX_MISSION_DIFFICULTY))
        .saturating_mul(25)
        .saturating_mul(u64::from(member.realm).saturating_add(2))
}

/// The treasure a mission can turn up for a member of `realm`.
pub const fn mission_treasure(realm: u32) -> TreasureKind {
    match realm {
        0..=2 => TreasureKind::SpiritPill,
        3..=4 => TreasureKind::DaoComprehensionStone,
        _ => TreasureKind::HeavenAndEarthSpiritFruit,
    }
}

/// Complete a sect mission of the given difficulty (clamped to 1-5).
///
/// Stones earned are `difficulty * 50 * (1 + realm * 0.5)`. A member in a
/// minor bottleneck may gain an insight (chance `difficulty * 0.1`), and
/// any member may find a treasure suited to their realm (chance
/// `difficulty * 0.05`). The caller credits the rewards to the sect.
pub fn complete_mission(member: &mut Member, difficulty: u32, rng: &mut impl Rng) -> MissionReward {
    let difficulty = difficulty.clamp(1, MAX_MISSION_DIFFICULTY);
    let level = f64::from(difficulty);
    let spirit_stones = mission_stones(member, difficulty);

    let special_reward_chance =
        (member.attributes.spiritual() + member.attributes.comprehension()) / 200.0;

    let mut insights_gained = 0;
    let mut bottleneck_cleared = false;
    if let Bottleneck::Minor { insights, required } = member.bottleneck {
        if rng.random::<f64>() < level * 0.1 {
            insights_gained = 1;
            let total = insights.saturating_add(1);
            if total >= required {
                member.bottleneck = Bottleneck::None;
                bottleneck_cleared = true;
            } else {
                member.bottleneck = Bottleneck::Minor {
                    insights: total,
                    required,
                };
            }
        }
    }

    let treasure_found =
        (rng.random::<f64>() < level * 0.05).then(|| mission_treasure(member.realm));

    member.missions_completed = member.missions_completed.saturating_add(1);
    let special_reward = rng.random::<f64>() < special_reward_chance;

    info!(
        member = %member.name,
        difficulty,
        spirit_stones,
        treasure = ?treasure_found,
        "mission completed"
    );

    MissionReward {
        difficulty,
        spirit_stones,
        special_reward,
        insights_gained,
        bottleneck_cleared,
        treasure_found,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sectomie_types::Attributes;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn member(p: f64, s: f64, c: f64) -> Member {
        Member::new("Li Mei", 20, "Sword", Attributes::new(p, s, c))
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    // -- cultivation ----------------------------------------------------------

    #[test]
    fn direct_session_applies_base_formula() {
        let mut m = member(50.0, 50.0, 50.0);
        m.set_max_qi(10_000.0);
        m.set_qi(0.0);
        let outcome = cultivate_with_method(&mut m, "qi_circulation", &mut rng()).unwrap();
        // (50 / 10) * (1 + 0) * 24 * 1.0
        assert!(approx(outcome.qi_gained, 120.0));
        assert!(approx(m.qi(), 120.0));
        assert!(approx(m.breakthrough_chance(), 51.0));
        assert!(outcome.attribute_gains.is_empty());
        assert!(outcome.deviation.is_none());
    }

    #[test]
    fn direct_session_clamps_to_capacity() {
        let mut m = member(50.0, 100.0, 50.0);
        m.set_qi(90.0);
        let outcome = cultivate_with_method(&mut m, "essence_refinement", &mut rng()).unwrap();
        assert_eq!(m.qi(), 100.0);
        assert!(approx(outcome.qi_gained, 10.0));
    }

    #[test]
    fn unknown_method_leaves_member_untouched() {
        let mut m = member(50.0, 50.0, 50.0);
        let before = m.clone();
        let err = cultivate_with_method(&mut m, "foundation_building", &mut rng()).unwrap_err();
        assert!(matches!(err, ProgressionError::UnknownMethod { .. }));
        assert_eq!(m, before);

        let err = calculate_monthly_cultivation(
            &mut m,
            "sword_dancing",
            CultivationBonuses::default(),
            &mut rng(),
        )
        .unwrap_err();
        assert!(matches!(err, ProgressionError::UnknownMethod { .. }));
        assert_eq!(m, before);
    }

    #[test]
    fn perfect_comprehension_never_deviates() {
        let mut rng = rng();
        for _ in 0..500 {
            let mut m = member(50.0, 50.0, 100.0);
            let outcome = cultivate_with_method(&mut m, "heavenly_tribulation", &mut rng).unwrap();
            assert!(outcome.deviation.is_none());
            let outcome = calculate_monthly_cultivation(
                &mut m,
                "heavenly_tribulation",
                CultivationBonuses::default(),
                &mut rng,
            )
            .unwrap();
            assert!(outcome.deviation.is_none());
        }
    }

    #[test]
    fn zero_comprehension_deviation_costs_a_fifth_of_qi() {
        let mut rng = rng();
        let mut seen = 0;
        for _ in 0..2_000 {
            let mut m = member(50.0, 50.0, 0.0);
            m.set_max_qi(10_000.0);
            m.set_qi(0.0);
            let outcome = cultivate_with_method(&mut m, "heavenly_tribulation", &mut rng).unwrap();
            // (50 / 10) * 24 * 1.5
            assert!(approx(outcome.qi_gained, 180.0));
            if let Some(dev) = outcome.deviation {
                seen += 1;
                assert_eq!(dev.severity, DIRECT_DEVIATION_SEVERITY);
                assert!(approx(dev.qi_lost, 36.0));
                assert!(approx(m.qi(), 144.0));
                assert!(outcome.message.contains("deviation"));
            } else {
                assert!(approx(m.qi(), 180.0));
            }
        }
        assert!(seen > 0);
    }

    #[test]
    fn dao_heart_tempering_raises_comprehension_by_one() {
        let mut rng = rng();
        let mut grew = 0;
        for _ in 0..500 {
            let mut m = member(40.0, 40.0, 40.0);
            let outcome = cultivate_with_method(&mut m, "dao_heart_tempering", &mut rng).unwrap();
            assert!(outcome.attribute_gains.len() <= 1);
            if let Some(gain) = outcome.attribute_gains.first() {
                grew += 1;
                assert_eq!(gain.attribute, Attribute::Comprehension);
                assert_eq!(gain.amount, 1.0);
                assert_eq!(gain.new_value, 41.0);
                assert_eq!(m.attributes.comprehension(), 41.0);
            } else {
                assert_eq!(m.attributes.comprehension(), 40.0);
            }
            assert_eq!(m.attributes.physical(), 40.0);
            assert_eq!(m.attributes.spiritual(), 40.0);
        }
        assert!(grew > 0);
    }

    #[test]
    fn random_target_raises_exactly_one_attribute() {
        let mut rng = rng();
        let mut raised = Vec::new();
        for _ in 0..1_000 {
            let mut m = member(40.0, 40.0, 40.0);
            m.realm = 3;
            let outcome = calculate_monthly_cultivation(
                &mut m,
                "heavenly_tribulation",
                CultivationBonuses::default(),
                &mut rng,
            )
            .unwrap();
            let Some(gain) = outcome.attribute_gains.first() else {
                assert!(Attribute::ALL.iter().all(|a| m.attributes.get(*a) == 40.0));
                continue;
            };
            assert_eq!(outcome.attribute_gains.len(), 1);
            assert_eq!(gain.amount, 2.0);
            for attribute in Attribute::ALL {
                let expected = if attribute == gain.attribute { 42.0 } else { 40.0 };
                assert_eq!(m.attributes.get(attribute), expected);
            }
            if !raised.contains(&gain.attribute) {
                raised.push(gain.attribute);
            }
        }
        assert_eq!(raised.len(), 3);
    }

    #[test]
    fn monthly_bonuses_multiply_qi_and_breakthrough() {
        let mut m = member(50.0, 40.0, 100.0);
        m.set_max_qi(100_000.0);
        m.set_qi(0.0);
        m.set_breakthrough_chance(0.0);
        let bonuses = CultivationBonuses {
            facility: 1.1,
            manual: 1.1,
            resource: 2.0,
        };
        let outcome =
            calculate_monthly_cultivation(&mut m, "qi_circulation", bonuses, &mut rng()).unwrap();
        // (40 / 10) * 1 * 30 * 1.0 * 1.1 * 1.1 * 2.0
        assert!(approx(outcome.qi_gained, 4.0 * 30.0 * 1.1 * 1.1 * 2.0));
        // 1.0 * 1.1 * 1.1; resource bonus excluded
        assert!(approx(outcome.breakthrough_increase, 1.1 * 1.1));
    }

    #[test]
    fn monthly_deviation_severity_is_bounded() {
        let mut rng = rng();
        let mut seen = 0;
        for _ in 0..2_000 {
            let mut m = member(50.0, 50.0, 0.0);
            m.realm = 3;
            let outcome = calculate_monthly_cultivation(
                &mut m,
                "heavenly_tribulation",
                CultivationBonuses::default(),
                &mut rng,
            )
            .unwrap();
            if let Some(dev) = outcome.deviation {
                seen += 1;
                assert!((0.1..=0.3).contains(&dev.severity));
                assert!(m.qi() >= 0.0);
            }
        }
        assert!(seen > 0);
    }

    #[test]
    fn foundation_building_grows_all_attributes_by_half() {
        let mut rng = rng();
        let mut m = member(10.0, 10.0, 10.0);
        let mut grew = false;
        for _ in 0..200 {
            let outcome = calculate_monthly_cultivation(
                &mut m,
                "foundation_building",
                CultivationBonuses::default(),
                &mut rng,
            )
            .unwrap();
            if !outcome.attribute_gains.is_empty() {
                assert_eq!(outcome.attribute_gains.len(), 3);
                assert!(outcome.attribute_gains.iter().all(|g| g.amount == 0.5));
                grew = true;
            }
        }
        assert!(grew);
        assert_eq!(m.attributes.physical(), m.attributes.spiritual());
    }

    #[test]
    fn attributes_stay_bounded_under_repeated_growth() {
        let mut rng = rng();
        let mut m = member(99.0, 99.0, 99.0);
        m.realm = 3;
        for _ in 0..500 {
            let _ = calculate_monthly_cultivation(
                &mut m,
                "heavenly_tribulation",
                CultivationBonuses::default(),
                &mut rng,
            );
        }
        for attribute in Attribute::ALL {
            assert!(m.attributes.get(attribute) <= 100.0);
        }
        assert!(m.breakthrough_chance() <= 99.0);
        assert!(m.qi() <= m.max_qi());
    }

    #[test]
    fn legacy_hours_formula() {
        let mut m = member(50.0, 50.0, 50.0);
        m.set_max_qi(1_000.0);
        m.set_qi(0.0);
        m.realm = 2;
        let gain = cultivate_hours(&mut m, 10.0);
        // 10 * 5 * (1 + 1.0)
        assert!(approx(gain, 100.0));
        assert!(approx(m.breakthrough_chance(), 51.0));
    }

    // -- breakthrough ---------------------------------------------------------

    #[test]
    fn breakthrough_success_advances_stage() {
        let mut m = member(50.0, 50.0, 40.0);
        m.set_breakthrough_chance(60.0);
        let outcome = attempt_breakthrough(&mut m, &ProgressionConfig::default(), &mut rng())
            .unwrap();
        assert_eq!(outcome.result, BreakthroughResult::Advanced);
        assert!(approx(outcome.effective_chance, 68.0));
        assert!(approx(m.qi(), 30.0));
        assert_eq!(m.realm_stage, RealmStage::Middle);
        assert_eq!(m.breakthrough_chance(), 0.0);
    }

    #[test]
    fn breakthrough_failure_halves_qi_only() {
        let mut m = member(50.0, 50.0, 10.0);
        m.set_breakthrough_chance(10.0);
        let outcome = attempt_breakthrough(&mut m, &ProgressionConfig::default(), &mut rng())
            .unwrap();
        assert_eq!(outcome.result, BreakthroughResult::Failed);
        assert!(approx(m.qi(), 50.0));
        assert_eq!(m.breakthrough_chance(), 10.0);
        assert_eq!(m.realm_stage, RealmStage::Early);
    }

    #[test]
    fn peak_breakthrough_enters_next_realm_and_doubles_capacity() {
        let mut m = member(50.0, 50.0, 100.0);
        m.realm = 1;
        m.realm_stage = RealmStage::Peak;
        let outcome = attempt_breakthrough(&mut m, &ProgressionConfig::default(), &mut rng())
            .unwrap();
        assert!(outcome.advanced());
        assert_eq!(m.realm, 2);
        assert_eq!(m.realm_stage, RealmStage::Early);
        assert_eq!(m.max_qi(), 200.0);
        // Qi is drained against the old capacity before it doubles.
        assert!(approx(m.qi(), 30.0));
        assert_eq!(outcome.realm_name, "Foundation Establishment");
    }

    #[test]
    fn insufficient_qi_is_rejected_without_mutation() {
        let mut m = member(50.0, 50.0, 50.0);
        m.set_qi(89.0);
        let before = m.clone();
        let err = attempt_breakthrough(&mut m, &ProgressionConfig::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, ProgressionError::InsufficientQi { .. }));
        assert_eq!(m, before);
    }

    #[test]
    fn active_bottleneck_blocks_every_attempt() {
        let mut rng = rng();
        for bottleneck in [
            Bottleneck::Major,
            Bottleneck::Minor {
                insights: 1,
                required: 4,
            },
        ] {
            let mut m = member(50.0, 50.0, 100.0);
            m.bottleneck = bottleneck;
            let before = m.clone();
            for _ in 0..20 {
                let err =
                    attempt_breakthrough(&mut m, &ProgressionConfig::default(), &mut rng)
                        .unwrap_err();
                assert_eq!(err, ProgressionError::BottleneckActive { bottleneck });
                assert_eq!(m, before);
            }
        }
    }

    #[test]
    fn peak_never_hits_major_bottleneck_while_disabled() {
        let mut rng = rng();
        for _ in 0..200 {
            let mut m = member(50.0, 50.0, 100.0);
            m.realm = 1;
            m.realm_stage = RealmStage::Peak;
            let outcome =
                attempt_breakthrough(&mut m, &ProgressionConfig::default(), &mut rng).unwrap();
            assert!(!matches!(
                outcome.result,
                BreakthroughResult::MajorBottleneck { .. }
            ));
            assert_ne!(m.bottleneck, Bottleneck::Major);
        }
    }

    #[test]
    fn enabled_major_bottleneck_is_certain_at_high_realm_peak() {
        let config = ProgressionConfig {
            major_bottleneck_enabled: true,
            ..ProgressionConfig::default()
        };
        let mut m = member(50.0, 50.0, 100.0);
        m.realm = 5;
        m.realm_stage = RealmStage::Peak;
        m.set_max_qi(1_000.0);
        m.set_qi(1_000.0);
        m.set_breakthrough_chance(40.0);
        let outcome = attempt_breakthrough(&mut m, &config, &mut rng()).unwrap();
        assert_eq!(
            outcome.result,
            BreakthroughResult::MajorBottleneck {
                insights_required: 15
            }
        );
        assert_eq!(m.bottleneck, Bottleneck::Major);
        assert!(approx(m.qi(), 700.0));
        assert!(approx(m.breakthrough_chance(), 20.0));
    }

    #[test]
    fn high_realm_always_hits_minor_bottleneck() {
        let mut m = member(50.0, 50.0, 100.0);
        m.realm = 7;
        m.set_max_qi(1_000.0);
        m.set_qi(1_000.0);
        m.set_breakthrough_chance(50.0);
        let outcome = attempt_breakthrough(&mut m, &ProgressionConfig::default(), &mut rng())
            .unwrap();
        assert_eq!(
            outcome.result,
            BreakthroughResult::MinorBottleneck {
                insights_required: 10
            }
        );
        assert_eq!(
            m.bottleneck,
            Bottleneck::Minor {
                insights: 0,
                required: 10
            }
        );
        assert!(approx(m.qi(), 800.0));
        assert!(approx(m.breakthrough_chance(), 35.0));
    }

    // -- remedies -------------------------------------------------------------

    #[test]
    fn meditation_requires_minor_bottleneck() {
        let mut m = member(50.0, 50.0, 50.0);
        assert_eq!(
            meditate_for_insight(&mut m, &mut rng()).unwrap_err(),
            ProgressionError::NoBottleneck
        );
        m.bottleneck = Bottleneck::Major;
        assert!(matches!(
            meditate_for_insight(&mut m, &mut rng()).unwrap_err(),
            ProgressionError::WrongBottleneck { .. }
        ));
    }

    #[test]
    fn perfect_comprehension_meditation_always_progresses() {
        let mut rng = rng();
        let mut m = member(50.0, 50.0, 100.0);
        m.set_breakthrough_chance(70.0);
        m.bottleneck = Bottleneck::Minor {
            insights: 0,
            required: 5,
        };
        let mut sessions = 0;
        while m.bottleneck != Bottleneck::None {
            let outcome = meditate_for_insight(&mut m, &mut rng).unwrap();
            assert!(outcome.insights_gained >= 1);
            sessions += 1;
            assert!(sessions <= 5);
        }
        assert_eq!(m.breakthrough_chance(), 90.0);
    }

    #[test]
    fn meditation_reward_is_clamped() {
        let mut m = member(50.0, 50.0, 100.0);
        m.set_breakthrough_chance(95.0);
        m.bottleneck = Bottleneck::Minor {
            insights: 0,
            required: 1,
        };
        let outcome = meditate_for_insight(&mut m, &mut rng()).unwrap();
        assert!(outcome.cleared);
        assert_eq!(outcome.insights, 0);
        assert_eq!(outcome.insights_required, 0);
        assert_eq!(m.breakthrough_chance(), 99.0);
    }

    #[test]
    fn zero_comprehension_without_techniques_never_gains_insight() {
        let mut rng = rng();
        let mut m = member(50.0, 50.0, 0.0);
        m.bottleneck = Bottleneck::Minor {
            insights: 0,
            required: 3,
        };
        for _ in 0..50 {
            let outcome = meditate_for_insight(&mut m, &mut rng).unwrap();
            assert_eq!(outcome.insights_gained, 0);
        }
    }

    #[test]
    fn matching_treasure_clears_major_bottleneck() {
        let mut m = member(50.0, 50.0, 50.0);
        m.realm = 2;
        m.bottleneck = Bottleneck::Major;
        m.set_breakthrough_chance(10.0);
        let outcome = use_treasure_for_bottleneck(&mut m, "spirit_pill").unwrap();
        assert!(outcome.succeeded());
        assert_eq!(m.bottleneck, Bottleneck::None);
        assert_eq!(m.breakthrough_chance(), 50.0);
    }

    #[test]
    fn mismatched_treasure_changes_nothing() {
        let mut m = member(50.0, 50.0, 50.0);
        m.realm = 1;
        m.bottleneck = Bottleneck::Major;
        let before = m.clone();

        let outcome = use_treasure_for_bottleneck(&mut m, "immortal_ascension_stone").unwrap();
        assert_eq!(outcome.effect, TreasureEffect::TooPowerful);
        assert_eq!(m, before);

        m.realm = 5;
        let outcome = use_treasure_for_bottleneck(&mut m, "spirit_pill").unwrap();
        assert_eq!(outcome.effect, TreasureEffect::TooWeak);
        assert_eq!(m.bottleneck, Bottleneck::Major);
    }

    #[test]
    fn treasure_rejections() {
        let mut m = member(50.0, 50.0, 50.0);
        assert_eq!(
            use_treasure_for_bottleneck(&mut m, "spirit_pill").unwrap_err(),
            ProgressionError::NoBottleneck
        );
        m.bottleneck = Bottleneck::Minor {
            insights: 0,
            required: 3,
        };
        assert!(matches!(
            use_treasure_for_bottleneck(&mut m, "spirit_pill").unwrap_err(),
            ProgressionError::WrongBottleneck { .. }
        ));
        m.bottleneck = Bottleneck::Major;
        assert!(matches!(
            use_treasure_for_bottleneck(&mut m, "jade_slip").unwrap_err(),
            ProgressionError::UnknownTreasure { .. }
        ));
    }

    // -- missions -------------------------------------------------------------

    #[test]
    fn mission_reward_scales_with_realm_and_difficulty() {
        let mut m = member(50.0, 50.0, 50.0);
        m.realm = 2;
        let reward = complete_mission(&mut m, 3, &mut rng());
        // 3 * 50 * (1 + 2 * 0.5)
        assert_eq!(reward.spirit_stones, 300);
        assert_eq!(m.missions_completed, 1);

        let reward = complete_mission(&mut m, 40, &mut rng());
        assert_eq!(reward.difficulty, 5);
    }
}

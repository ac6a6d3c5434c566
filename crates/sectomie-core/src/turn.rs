//! Turn processing: the monthly batch step for one sect.
//!
//! Each turn end runs these phases in order:
//!
//! 1. **Income** -- credit spirit-vein output, then roll herb yield if the
//!    sect has elixir fields.
//! 2. **Cultivation** -- every active member of the sect runs one monthly
//!    session with their assigned method and the sect's environment
//!    bonuses.
//! 3. **Auto-breakthrough** -- members left at full qi with no bottleneck
//!    may attempt a breakthrough on their own.
//!
//! There is no rollback between phases: a failure in one phase is logged and
//! the earlier phases' changes stand. A failure for one member never stops
//! the loop for the others.

use rand::Rng;
use sectomie_cultivators::{
    CultivationBonuses, ProgressionConfig, Roster, RosterError, attempt_breakthrough,
    calculate_monthly_cultivation,
};
use sectomie_economy::{collect_vein_income, grant_herb_income};
use sectomie_types::{
    AttributeGain, CultivationMethod, Member, MemberId, RealmStage, Sect, SectId,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::{Calendar, GameDate};

/// Facility bonus per cultivation chamber.
pub const CHAMBER_BONUS: f64 = 0.05;

/// Resource bonus per allocated spirit stone.
pub const ALLOCATION_BONUS: f64 = 0.1;

/// Errors that stop a turn before it starts.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The designated sect is not in the roster.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },
}

/// Resources credited during the income phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceIncome {
    /// Spirit stones from veins.
    pub spirit_stones: u64,
    /// Herbs from elixir fields; `None` when the sect has no fields.
    pub spirit_herbs: Option<u64>,
}

/// One member's monthly session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberProgress {
    /// Member.
    pub member: MemberId,
    /// Member name.
    pub name: String,
    /// Method practised.
    pub method: CultivationMethod,
    /// Qi actually added.
    pub qi_gained: f64,
    /// Qi after the session.
    pub qi: f64,
    /// Qi capacity.
    pub max_qi: f64,
    /// Breakthrough chance after the session.
    pub breakthrough_chance: f64,
}

/// A deviation suffered during the turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationIncident {
    /// Member.
    pub member: MemberId,
    /// Member name.
    pub name: String,
    /// Fraction of qi lost.
    pub severity: f64,
    /// Absolute qi lost.
    pub qi_lost: f64,
}

/// Attribute gains from one member's session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeIncident {
    /// Member.
    pub member: MemberId,
    /// Member name.
    pub name: String,
    /// What grew.
    pub gains: Vec<AttributeGain>,
}

/// A successful auto-breakthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakthroughEvent {
    /// Member.
    pub member: MemberId,
    /// Member name.
    pub name: String,
    /// New realm index.
    pub realm: u32,
    /// New realm name.
    pub realm_name: String,
    /// New stage.
    pub realm_stage: RealmStage,
    /// Outcome message.
    pub message: String,
}

/// Aggregate result of one turn end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    /// Turn that was processed.
    pub turn: u64,
    /// Date of the processed turn.
    pub date: GameDate,
    /// Sect that was processed.
    pub sect: SectId,
    /// Income phase.
    pub income: ResourceIncome,
    /// One entry per member that cultivated, in roster order.
    pub progress: Vec<MemberProgress>,
    /// Deviations suffered.
    pub deviations: Vec<DeviationIncident>,
    /// Attribute gains.
    pub attribute_increases: Vec<AttributeIncident>,
    /// Successful auto-breakthroughs.
    pub breakthroughs: Vec<BreakthroughEvent>,
    /// Turn after advancing the calendar; set by the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_turn: Option<u64>,
    /// Date after advancing the calendar; set by the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_date: Option<GameDate>,
}

/// Environment bonuses a sect grants one member for a monthly session.
pub fn environment_bonuses(sect: &Sect, member: &Member) -> CultivationBonuses {
    CultivationBonuses {
        facility: f64::from(sect.cultivation_chambers).mul_add(CHAMBER_BONUS, 1.0),
        manual: 1.0 + sect.manual_bonus(member.effective_method()),
        resource: f64::from(member.allocated_resources).mul_add(ALLOCATION_BONUS, 1.0),
    }
}

/// Run the end-of-turn batch for one sect.
///
/// Does not advance the calendar; `calendar` only stamps the report.
///
/// # Errors
///
/// Returns [`TurnError::Roster`] if `sect` is not registered. Nothing has
/// changed in that case.
pub fn process_turn_end(
    roster: &mut Roster,
    sect: SectId,
    calendar: &Calendar,
    config: &ProgressionConfig,
    rng: &mut impl Rng,
) -> Result<TurnReport, TurnError> {
    let turn = calendar.current_turn();
    let income = collect_income(roster, sect, turn, rng)?;

    let mut report = TurnReport {
        turn,
        date: calendar.date(),
        sect,
        income,
        progress: Vec::new(),
        deviations: Vec::new(),
        attribute_increases: Vec::new(),
        breakthroughs: Vec::new(),
        next_turn: None,
        next_date: None,
    };

    let mut cultivated = Vec::new();
    for id in roster.member_ids_of(sect) {
        let Ok((s, member)) = roster.sect_and_member_mut(sect, id) else {
            continue;
        };
        if !member.is_active() {
            debug!(turn, member = %member.name, "inactive member skipped");
            continue;
        }
        let bonuses = environment_bonuses(s, member);
        let method = member.effective_method();
        let outcome = match calculate_monthly_cultivation(member, method.key(), bonuses, rng) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(turn, member = %member.name, %err, "monthly cultivation failed");
                continue;
            }
        };
        cultivated.push(id);

        if let Some(deviation) = outcome.deviation {
            report.deviations.push(DeviationIncident {
                member: id,
                name: member.name.clone(),
                severity: deviation.severity,
                qi_lost: deviation.qi_lost,
            });
        }
        if !outcome.attribute_gains.is_empty() {
            report.attribute_increases.push(AttributeIncident {
                member: id,
                name: member.name.clone(),
                gains: outcome.attribute_gains,
            });
        }
        report.progress.push(MemberProgress {
            member: id,
            name: member.name.clone(),
            method,
            qi_gained: outcome.qi_gained,
            qi: outcome.qi,
            max_qi: outcome.max_qi,
            breakthrough_chance: outcome.breakthrough_chance,
        });
    }

    for id in cultivated {
        let Some(member) = roster.member_mut(id) else {
            continue;
        };
        if let Some(event) = auto_breakthrough(member, config, rng) {
            report.breakthroughs.push(event);
        }
    }

    info!(
        turn,
        sect = %sect,
        spirit_stones = report.income.spirit_stones,
        cultivated = report.progress.len(),
        deviations = report.deviations.len(),
        breakthroughs = report.breakthroughs.len(),
        "turn processed"
    );
    Ok(report)
}

fn collect_income(
    roster: &mut Roster,
    sect: SectId,
    turn: u64,
    rng: &mut impl Rng,
) -> Result<ResourceIncome, TurnError> {
    let s = roster
        .sect_mut(sect)
        .ok_or(RosterError::SectNotFound(sect))?;

    let spirit_stones = collect_vein_income(s).unwrap_or_else(|err| {
        warn!(turn, sect = %s.name, %err, "vein income failed");
        0
    });
    let spirit_herbs = (s.elixir_fields > 0).then(|| {
        grant_herb_income(s, rng).unwrap_or_else(|err| {
            warn!(turn, sect = %s.name, %err, "herb income failed");
            0
        })
    });
    Ok(ResourceIncome {
        spirit_stones,
        spirit_herbs,
    })
}

fn auto_breakthrough(
    member: &mut Member,
    config: &ProgressionConfig,
    rng: &mut impl Rng,
) -> Option<BreakthroughEvent> {
    if member.qi() < member.max_qi() || member.bottleneck.is_active() {
        return None;
    }
    if rng.random::<f64>() >= config.auto_breakthrough_chance {
        return None;
    }
    match attempt_breakthrough(member, config, rng) {
        Ok(outcome) if outcome.advanced() => Some(BreakthroughEvent {
            member: member.id,
            name: member.name.clone(),
            realm: outcome.realm,
            realm_name: outcome.realm_name,
            realm_stage: outcome.realm_stage,
            message: outcome.message,
        }),
        Ok(outcome) => {
            debug!(member = %member.name, message = %outcome.message, "auto-breakthrough did not advance");
            None
        }
        Err(err) => {
            warn!(member = %member.name, %err, "auto-breakthrough rejected");
            None
        }
    }
}

//! Request layer: single-step actions on a [`GameSession`].
//!
//! Each action performs one state transition to completion. Validation and
//! cost checks run before anything changes, so a rejected action leaves the
//! session untouched. Callers that want a uniform body instead of a
//! `Result` convert with [`ActionResponse::from`].
//!
//! Costs are paid by the player sect for direct cultivation, treasures, and
//! recruitment. Resource allocation and mission rewards go through the
//! member's own sect.

use rand::Rng;
use sectomie_cultivators::{
    MethodTable, ProgressionError, RosterError, available_methods, combat_power, complete_mission,
    cultivate_with_method, effectiveness, meditate_for_insight, mission_stones, mission_treasure,
    use_treasure_for_bottleneck, validate_assignment,
};
use sectomie_economy::{
    EconomyError, check_credit, check_treasure_grant, collect_vein_income,
    consume_allocated_resources, consume_treasure, credit_spirit_stones, debit_if_affordable,
    grant_treasure,
};
use sectomie_types::{
    Attributes, BreakthroughOutcome, CultivationMethod, CultivationOutcome, MeditationOutcome,
    Member, MemberId, MethodListing, MissionReward, SectId, SectResource, TreasureKind,
    TreasureOutcome, UnknownKey,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::calendar::CalendarError;
use crate::session::GameSession;
use crate::turn::{TurnError, TurnReport, process_turn_end};

/// Errors returned by request-layer actions.
///
/// Every variant is a rejection: the session was not modified.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A progression rule forbade the action.
    #[error("{source}")]
    Progression {
        /// The underlying progression error.
        #[from]
        source: ProgressionError,
    },

    /// The sect cannot pay.
    #[error("{source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: EconomyError,
    },

    /// An unknown member or sect, or a name clash.
    #[error("{source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },

    /// The turn could not be processed.
    #[error("{source}")]
    Turn {
        /// The underlying turn error.
        #[from]
        source: TurnError,
    },

    /// The calendar could not advance.
    #[error("{source}")]
    Calendar {
        /// The underlying calendar error.
        #[from]
        source: CalendarError,
    },

    /// The action needs the member's own sect and they have none.
    #[error("member {member} does not belong to a sect")]
    Unaffiliated {
        /// The member.
        member: MemberId,
    },
}

/// Success flag and message for an action result.
pub trait ActionSummary {
    /// Whether the action achieved what it set out to do. Modelled setbacks
    /// report `false` here while still being `Ok`.
    fn succeeded(&self) -> bool;

    /// Human-readable summary.
    fn message(&self) -> String;
}

/// Uniform response body for one action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse<T> {
    /// Whether the action succeeded.
    pub success: bool,
    /// Human-readable summary or rejection reason.
    pub message: String,
    /// Structured result; absent when the action was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<T>,
}

impl<T: ActionSummary> From<Result<T, ActionError>> for ActionResponse<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: outcome.succeeded(),
                message: outcome.message(),
                outcome: Some(outcome),
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
                outcome: None,
            },
        }
    }
}

impl ActionSummary for CultivationOutcome {
    fn succeeded(&self) -> bool {
        self.deviation.is_none()
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

impl ActionSummary for BreakthroughOutcome {
    fn succeeded(&self) -> bool {
        self.advanced()
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

impl ActionSummary for MeditationOutcome {
    fn succeeded(&self) -> bool {
        self.insights_gained > 0
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

impl ActionSummary for TreasureOutcome {
    fn succeeded(&self) -> bool {
        Self::succeeded(self)
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

impl ActionSummary for MissionReward {
    fn succeeded(&self) -> bool {
        true
    }

    fn message(&self) -> String {
        let mut message = format!(
            "Mission (difficulty {}) completed: earned {} spirit stones.",
            self.difficulty, self.spirit_stones
        );
        if let Some(treasure) = self.treasure_found {
            message.push_str(&format!(" Found a {}!", treasure.display_name()));
        }
        if self.bottleneck_cleared {
            message.push_str(" The bottleneck has been overcome.");
        }
        message
    }
}

impl ActionSummary for TurnReport {
    fn succeeded(&self) -> bool {
        true
    }

    fn message(&self) -> String {
        let next = self
            .next_date
            .map_or_else(String::new, |date| format!(" Now {date}."));
        format!(
            "Turn {} ended: {} spirit stones collected, {} disciples cultivated, {} breakthroughs.{next}",
            self.turn,
            self.income.spirit_stones,
            self.progress.len(),
            self.breakthroughs.len()
        )
    }
}

/// Result of assigning a monthly method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodAssignment {
    /// Member.
    pub member: MemberId,
    /// Assigned method.
    pub method: CultivationMethod,
    /// Spirit stones committed to the member.
    pub allocated_resources: u32,
    /// Effectiveness rating for this member.
    pub effectiveness: u8,
}

impl ActionSummary for MethodAssignment {
    fn succeeded(&self) -> bool {
        true
    }

    fn message(&self) -> String {
        format!(
            "Assigned {} (effectiveness {}/5) with {} spirit stones allocated.",
            self.method.title(),
            self.effectiveness,
            self.allocated_resources
        )
    }
}

/// Stats for a new recruit.
#[derive(Debug, Clone, PartialEq)]
pub struct RecruitRequest {
    /// Unique name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Cultivation path, e.g. "Sword".
    pub path: String,
    /// Starting attributes.
    pub attributes: Attributes,
}

/// Result of a recruitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recruitment {
    /// The new member.
    pub member: MemberId,
    /// Their name.
    pub name: String,
    /// Spirit stones paid.
    pub cost: u64,
}

impl ActionSummary for Recruitment {
    fn succeeded(&self) -> bool {
        true
    }

    fn message(&self) -> String {
        format!(
            "{} has joined the sect for {} spirit stones.",
            self.name, self.cost
        )
    }
}

impl GameSession {
    fn member_mut(&mut self, member: MemberId) -> Result<&mut Member, ActionError> {
        Ok(self
            .roster
            .member_mut(member)
            .ok_or(RosterError::MemberNotFound(member))?)
    }

    fn owning_sect(&self, member: MemberId) -> Result<SectId, ActionError> {
        self.roster
            .member(member)
            .ok_or(RosterError::MemberNotFound(member))?
            .sect()
            .ok_or(ActionError::Unaffiliated { member })
    }

    /// One direct (24-hour) cultivation session, paid for by the player
    /// sect.
    ///
    /// The method cost is debited in full or not at all before the session
    /// runs.
    pub fn cultivate(
        &mut self,
        member: MemberId,
        key: &str,
        rng: &mut impl Rng,
    ) -> Result<CultivationOutcome, ActionError> {
        let effect = MethodTable::Direct.resolve(key)?;
        let cost = self.config.economy.method_cost(effect.method);
        let (sect, m) = self.roster.sect_and_member_mut(self.player_sect, member)?;
        if let Err(err) = debit_if_affordable(sect, &cost) {
            warn!(member = %m.name, method = %effect.method, %err, "cultivation not affordable");
            return Err(err.into());
        }
        Ok(cultivate_with_method(m, key, rng)?)
    }

    /// Attempt a breakthrough.
    pub fn attempt_breakthrough(
        &mut self,
        member: MemberId,
        rng: &mut impl Rng,
    ) -> Result<BreakthroughOutcome, ActionError> {
        let m = self
            .roster
            .member_mut(member)
            .ok_or(RosterError::MemberNotFound(member))?;
        Ok(sectomie_cultivators::attempt_breakthrough(
            m,
            &self.config.progression,
            rng,
        )?)
    }

    /// Meditate for insight against a minor bottleneck.
    pub fn meditate(
        &mut self,
        member: MemberId,
        rng: &mut impl Rng,
    ) -> Result<MeditationOutcome, ActionError> {
        let m = self.member_mut(member)?;
        Ok(meditate_for_insight(m, rng)?)
    }

    /// Apply one of the player sect's treasures to a major bottleneck.
    ///
    /// The sect must hold the treasure. It is consumed only when it clears
    /// the bottleneck.
    pub fn use_treasure(
        &mut self,
        member: MemberId,
        key: &str,
    ) -> Result<TreasureOutcome, ActionError> {
        let treasure: TreasureKind = key
            .parse()
            .map_err(|err: UnknownKey| ProgressionError::UnknownTreasure { key: err.key })?;
        let (sect, m) = self.roster.sect_and_member_mut(self.player_sect, member)?;
        if sect.treasure_count(treasure) == 0 {
            return Err(EconomyError::InsufficientTreasure {
                treasure,
                available: 0,
            }
            .into());
        }
        let outcome = use_treasure_for_bottleneck(m, key)?;
        if outcome.succeeded() {
            consume_treasure(sect, treasure)?;
        }
        Ok(outcome)
    }

    /// Assign a monthly method and commit spirit stones to the member.
    ///
    /// `allocation` is debited from the member's sect once, here. It
    /// replaces any earlier allocation.
    pub fn assign_method(
        &mut self,
        member: MemberId,
        key: &str,
        allocation: u32,
    ) -> Result<MethodAssignment, ActionError> {
        let sect_id = self.owning_sect(member)?;
        let (sect, m) = self.roster.sect_and_member_mut(sect_id, member)?;
        let method = validate_assignment(m, key)?;
        consume_allocated_resources(sect, m, allocation)?;
        m.assigned_method = Some(method);
        info!(member = %m.name, %method, allocation, "method assigned");
        Ok(MethodAssignment {
            member,
            method,
            allocated_resources: allocation,
            effectiveness: effectiveness(m, method),
        })
    }

    /// Recruit a new member into the player sect.
    pub fn recruit(&mut self, request: RecruitRequest) -> Result<Recruitment, ActionError> {
        if self.roster.member_by_name(&request.name).is_some() {
            return Err(RosterError::DuplicateName {
                kind: "member",
                name: request.name,
            }
            .into());
        }
        let cost = self.config.economy.recruitment_cost();
        let sect = self
            .roster
            .sect_mut(self.player_sect)
            .ok_or(RosterError::SectNotFound(self.player_sect))?;
        debit_if_affordable(sect, &cost)?;

        let recruit = Member::new(
            request.name,
            request.age,
            request.path,
            request.attributes,
        );
        let name = recruit.name.clone();
        let id = self.roster.enroll(recruit, self.player_sect)?;
        info!(member = %name, sect = %self.player_sect, "member recruited");
        Ok(Recruitment {
            member: id,
            name,
            cost: self.config.economy.recruitment_cost,
        })
    }

    /// Send a member on a mission; rewards go to their sect.
    ///
    /// The sect must be able to absorb the stones and a possible treasure
    /// before the member sets out.
    pub fn complete_mission(
        &mut self,
        member: MemberId,
        difficulty: u32,
        rng: &mut impl Rng,
    ) -> Result<MissionReward, ActionError> {
        let sect_id = self.owning_sect(member)?;
        let (sect, m) = self.roster.sect_and_member_mut(sect_id, member)?;
        check_credit(sect, SectResource::SpiritStones, mission_stones(m, difficulty))?;
        check_treasure_grant(sect, mission_treasure(m.realm), 1)?;
        let reward = complete_mission(m, difficulty, rng);
        credit_spirit_stones(sect, reward.spirit_stones)?;
        if let Some(treasure) = reward.treasure_found {
            grant_treasure(sect, treasure, 1)?;
        }
        Ok(reward)
    }

    /// Collect vein income for the player sect outside of a turn.
    pub fn collect_resources(&mut self) -> Result<u64, ActionError> {
        let sect = self
            .roster
            .sect_mut(self.player_sect)
            .ok_or(RosterError::SectNotFound(self.player_sect))?;
        Ok(collect_vein_income(sect)?)
    }

    /// Monthly methods the member may be assigned.
    pub fn available_methods(&self, member: MemberId) -> Result<Vec<MethodListing>, ActionError> {
        let m = self
            .roster
            .member(member)
            .ok_or(RosterError::MemberNotFound(member))?;
        Ok(available_methods(m))
    }

    /// A member's combat power.
    pub fn member_power(&self, member: MemberId) -> Result<u64, ActionError> {
        let m = self
            .roster
            .member(member)
            .ok_or(RosterError::MemberNotFound(member))?;
        Ok(combat_power(m))
    }

    /// Process the player sect's turn end, then advance the calendar.
    ///
    /// The report carries the new turn and date.
    pub fn end_turn(&mut self, rng: &mut impl Rng) -> Result<TurnReport, ActionError> {
        let mut report = process_turn_end(
            &mut self.roster,
            self.player_sect,
            &self.calendar,
            &self.config.progression,
            rng,
        )?;
        let turn = self.calendar.advance_turn()?;
        report.next_turn = Some(turn);
        report.next_date = Some(self.calendar.date());
        info!(turn, date = %self.calendar.date(), "calendar advanced");
        Ok(report)
    }
}

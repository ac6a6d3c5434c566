//! Combat power of members and sects.
//!
//! Power grows tenfold per realm, linearly with stage, and scales with how
//! full the member's qi is.

use sectomie_types::{Member, SectId};

use crate::roster::Roster;

/// Combat power of one member, truncated to an integer.
///
/// `((p + s + c) / 3 * 10^realm * stage + techniques * 50) * qi / max_qi`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn combat_power(member: &Member) -> u64 {
    let attribute_power = member.attributes.mean();
    let realm_multiplier = 10_f64.powi(i32::try_from(member.realm).unwrap_or(i32::MAX));
    let stage_multiplier = f64::from(member.realm_stage.ordinal());
    let techniques = u32::try_from(member.techniques.len()).unwrap_or(u32::MAX);
    let technique_bonus = f64::from(techniques) * 50.0;
    let power = (attribute_power * realm_multiplier * stage_multiplier + technique_bonus)
        * member.qi_ratio();
    // Non-negative by construction; `as` saturates on overflow.
    power.max(0.0) as u64
}

/// Summed combat power of every member of a sect.
pub fn sect_total_power(roster: &Roster, sect: SectId) -> u64 {
    roster
        .members_of(sect)
        .map(combat_power)
        .fold(0_u64, u64::saturating_add)
}

/// Mean combat power across a sect's members; 0 for an empty sect.
pub fn sect_average_power(roster: &Roster, sect: SectId) -> u64 {
    let count = roster.members_of(sect).count();
    sect_total_power(roster, sect)
        .checked_div(u64::try_from(count).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

//! Sect and member registry.
//!
//! The [`Roster`] owns every [`Sect`] and [`Member`] in a game and is the
//! only place membership changes. A sect's member list is the ownership
//! path; a member's `sect()` is a non-owning back-reference. Every
//! operation that moves a member updates both sides together, after all
//! validation has passed, so the roster is never observed with a member
//! owned twice or orphaned halfway through a move.
//!
//! Alliances and rivalries are symmetric: both sects record the link.
//!
//! Names are unique per kind so persistence can resolve memberships and
//! diplomatic links by name.

use std::collections::BTreeMap;

use sectomie_types::{Member, MemberId, Sect, SectId};
use tracing::debug;

use crate::error::RosterError;

/// Influence each side gains from an alliance between two teaching sects.
pub const ALLIANCE_INFLUENCE: u64 = 2;

/// Registry of sects and members.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    sects: BTreeMap<SectId, Sect>,
    members: BTreeMap<MemberId, Member>,
}

impl Roster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            sects: BTreeMap::new(),
            members: BTreeMap::new(),
        }
    }

    // -- registration ---------------------------------------------------------

    /// Register a sect. Any member ids or diplomatic links it carries are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::DuplicateName`] if a sect with the same name
    /// is already registered.
    pub fn insert_sect(&mut self, mut sect: Sect) -> Result<SectId, RosterError> {
        if self.sect_by_name(&sect.name).is_some() {
            return Err(RosterError::DuplicateName {
                kind: "sect",
                name: sect.name,
            });
        }
        sect.clear_links();
        let id = sect.id;
        debug!(sect = %sect.name, tier = sect.tier, "sect registered");
        self.sects.insert(id, sect);
        Ok(id)
    }

    /// Register an unaffiliated member.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::DuplicateName`] if a member with the same name
    /// is already registered.
    pub fn insert_member(&mut self, mut member: Member) -> Result<MemberId, RosterError> {
        if self.member_by_name(&member.name).is_some() {
            return Err(RosterError::DuplicateName {
                kind: "member",
                name: member.name,
            });
        }
        member.set_sect(None);
        let id = member.id;
        self.members.insert(id, member);
        Ok(id)
    }

    /// Register a member and place them in a sect in one step.
    pub fn enroll(&mut self, member: Member, sect: SectId) -> Result<MemberId, RosterError> {
        if !self.sects.contains_key(&sect) {
            return Err(RosterError::SectNotFound(sect));
        }
        let id = self.insert_member(member)?;
        self.join(id, sect)?;
        Ok(id)
    }

    // -- membership -----------------------------------------------------------

    /// Place a member in a sect, leaving any previous sect.
    pub fn join(&mut self, member: MemberId, sect: SectId) -> Result<(), RosterError> {
        let current = self
            .members
            .get(&member)
            .ok_or(RosterError::MemberNotFound(member))?
            .sect();
        match current {
            Some(from) if from == sect => Ok(()),
            Some(from) => self.transfer(member, from, sect),
            None => {
                let target = self
                    .sects
                    .get_mut(&sect)
                    .ok_or(RosterError::SectNotFound(sect))?;
                target.link_member(member);
                if let Some(m) = self.members.get_mut(&member) {
                    m.set_sect(Some(sect));
                }
                debug!(%member, %sect, "member joined sect");
                Ok(())
            }
        }
    }

    /// Remove a member from their sect, leaving them unaffiliated.
    ///
    /// Returns the sect they left, if any.
    pub fn leave(&mut self, member: MemberId) -> Result<Option<SectId>, RosterError> {
        let m = self
            .members
            .get_mut(&member)
            .ok_or(RosterError::MemberNotFound(member))?;
        let previous = m.sect();
        m.set_sect(None);
        if let Some(sect) = previous.and_then(|id| self.sects.get_mut(&id)) {
            sect.unlink_member(member);
        }
        Ok(previous)
    }

    /// Move a member from one sect to another.
    ///
    /// All checks run before anything changes; then the old sect's list,
    /// the new sect's list, and the member's back-reference are updated
    /// together.
    ///
    /// # Errors
    ///
    /// - [`RosterError::MemberNotFound`] / [`RosterError::SectNotFound`] for
    ///   unknown ids.
    /// - [`RosterError::NotAMember`] if the member is not in `from`.
    pub fn transfer(
        &mut self,
        member: MemberId,
        from: SectId,
        to: SectId,
    ) -> Result<(), RosterError> {
        let current = self
            .members
            .get(&member)
            .ok_or(RosterError::MemberNotFound(member))?
            .sect();
        if !self.sects.contains_key(&to) {
            return Err(RosterError::SectNotFound(to));
        }
        let source = self.sects.get(&from).ok_or(RosterError::SectNotFound(from))?;
        if current != Some(from) || !source.has_member(member) {
            return Err(RosterError::NotAMember { member, sect: from });
        }
        if from == to {
            return Ok(());
        }

        if let Some(source) = self.sects.get_mut(&from) {
            source.unlink_member(member);
        }
        if let Some(target) = self.sects.get_mut(&to) {
            target.link_member(member);
        }
        if let Some(m) = self.members.get_mut(&member) {
            m.set_sect(Some(to));
        }
        debug!(%member, %from, %to, "member transferred");
        Ok(())
    }

    // -- diplomacy ------------------------------------------------------------

    /// Record an alliance on both sides, with no other effect.
    ///
    /// Returns `false` if the sects were already allied.
    ///
    /// # Errors
    ///
    /// - [`RosterError::SelfRelation`] if `a == b`.
    /// - [`RosterError::SectNotFound`] for unknown ids.
    pub fn link_alliance(&mut self, a: SectId, b: SectId) -> Result<bool, RosterError> {
        self.check_pair(a, b)?;
        let mut linked = false;
        for (sect, other) in [(a, b), (b, a)] {
            if let Some(s) = self.sects.get_mut(&sect) {
                linked |= s.link_ally(other);
            }
        }
        Ok(linked)
    }

    /// Ally two sects.
    ///
    /// A new alliance between two sects that both teach techniques raises
    /// each side's influence by [`ALLIANCE_INFLUENCE`]. Returns `false`,
    /// changing nothing, if they were already allied.
    pub fn form_alliance(&mut self, a: SectId, b: SectId) -> Result<bool, RosterError> {
        if !self.link_alliance(a, b)? {
            return Ok(false);
        }
        let both_teach = [a, b].iter().all(|id| {
            self.sects
                .get(id)
                .is_some_and(|sect| !sect.techniques.is_empty())
        });
        if both_teach {
            for id in [a, b] {
                if let Some(sect) = self.sects.get_mut(&id) {
                    sect.influence = sect.influence.saturating_add(ALLIANCE_INFLUENCE);
                }
            }
        }
        debug!(%a, %b, both_teach, "alliance formed");
        Ok(true)
    }

    /// Declare two sects rivals, on both sides.
    ///
    /// Returns `false` if they were already rivals.
    ///
    /// # Errors
    ///
    /// - [`RosterError::SelfRelation`] if `a == b`.
    /// - [`RosterError::SectNotFound`] for unknown ids.
    pub fn declare_rivalry(&mut self, a: SectId, b: SectId) -> Result<bool, RosterError> {
        self.check_pair(a, b)?;
        let mut linked = false;
        for (sect, other) in [(a, b), (b, a)] {
            if let Some(s) = self.sects.get_mut(&sect) {
                linked |= s.link_rival(other);
            }
        }
        if linked {
            debug!(%a, %b, "rivalry declared");
        }
        Ok(linked)
    }

    fn check_pair(&self, a: SectId, b: SectId) -> Result<(), RosterError> {
        if a == b {
            return Err(RosterError::SelfRelation(a));
        }
        for id in [a, b] {
            if !self.sects.contains_key(&id) {
                return Err(RosterError::SectNotFound(id));
            }
        }
        Ok(())
    }

    // -- lookup ---------------------------------------------------------------

    /// Look up a sect.
    pub fn sect(&self, id: SectId) -> Option<&Sect> {
        self.sects.get(&id)
    }

    /// Look up a sect mutably.
    ///
    /// Membership cannot be changed through this handle without breaking
    /// the roster's bookkeeping; use [`Roster::join`] and friends instead.
    pub fn sect_mut(&mut self, id: SectId) -> Option<&mut Sect> {
        self.sects.get_mut(&id)
    }

    /// Look up a member.
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Look up a member mutably.
    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.get_mut(&id)
    }

    /// Borrow a sect and a member mutably at the same time.
    pub fn sect_and_member_mut(
        &mut self,
        sect: SectId,
        member: MemberId,
    ) -> Result<(&mut Sect, &mut Member), RosterError> {
        let s = self
            .sects
            .get_mut(&sect)
            .ok_or(RosterError::SectNotFound(sect))?;
        let m = self
            .members
            .get_mut(&member)
            .ok_or(RosterError::MemberNotFound(member))?;
        Ok((s, m))
    }

    /// Find a sect by name.
    pub fn sect_by_name(&self, name: &str) -> Option<&Sect> {
        self.sects.values().find(|sect| sect.name == name)
    }

    /// Find a member by name.
    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.members.values().find(|member| member.name == name)
    }

    /// Every sect, in creation order.
    pub fn sects(&self) -> impl Iterator<Item = &Sect> {
        self.sects.values()
    }

    /// Every member, in creation order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Members of one sect, in join order.
    pub fn members_of(&self, sect: SectId) -> impl Iterator<Item = &Member> {
        self.sects
            .get(&sect)
            .map(Sect::members)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.members.get(id))
    }

    /// Ids of one sect's members, in join order.
    pub fn member_ids_of(&self, sect: SectId) -> Vec<MemberId> {
        self.sects
            .get(&sect)
            .map(|s| s.members().to_vec())
            .unwrap_or_default()
    }

    /// Number of registered members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Number of registered sects.
    pub fn sect_count(&self) -> usize {
        self.sects.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use sectomie_types::Attributes;

    use super::*;

    fn member(name: &str) -> Member {
        Member::new(name, 20, "Sword", Attributes::new(50.0, 50.0, 50.0))
    }

    fn two_sects() -> (Roster, SectId, SectId) {
        let mut roster = Roster::new();
        let azure = roster
            .insert_sect(Sect::found("Azure Peak Sect", "Sword Dao", 3, ""))
            .unwrap();
        let cloud = roster
            .insert_sect(Sect::found("Mystic Cloud Sect", "Alchemy Dao", 5, ""))
            .unwrap();
        (roster, azure, cloud)
    }

    fn assert_consistent(roster: &Roster) {
        for m in roster.members() {
            let owners: Vec<_> = roster.sects().filter(|s| s.has_member(m.id)).collect();
            match m.sect() {
                Some(id) => {
                    assert_eq!(owners.len(), 1);
                    assert_eq!(owners.first().unwrap().id, id);
                }
                None => assert!(owners.is_empty()),
            }
        }
    }

    #[test]
    fn enroll_links_both_sides() {
        let (mut roster, azure, _) = two_sects();
        let id = roster.enroll(member("Li Mei"), azure).unwrap();
        assert_eq!(roster.member(id).unwrap().sect(), Some(azure));
        assert_eq!(roster.member_ids_of(azure), vec![id]);
        assert_consistent(&roster);
    }

    #[test]
    fn names_are_unique() {
        let (mut roster, azure, _) = two_sects();
        roster.enroll(member("Li Mei"), azure).unwrap();
        let err = roster.enroll(member("Li Mei"), azure).unwrap_err();
        assert!(matches!(err, RosterError::DuplicateName { kind: "member", .. }));
        let err = roster
            .insert_sect(Sect::found("Azure Peak Sect", "Sword Dao", 1, ""))
            .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateName { kind: "sect", .. }));
    }

    #[test]
    fn transfer_moves_member_atomically() {
        let (mut roster, azure, cloud) = two_sects();
        let id = roster.enroll(member("Li Mei"), azure).unwrap();
        roster.transfer(id, azure, cloud).unwrap();
        assert_eq!(roster.member(id).unwrap().sect(), Some(cloud));
        assert!(roster.member_ids_of(azure).is_empty());
        assert_eq!(roster.member_ids_of(cloud), vec![id]);
        assert_consistent(&roster);
    }

    #[test]
    fn transfer_from_wrong_sect_changes_nothing() {
        let (mut roster, azure, cloud) = two_sects();
        let id = roster.enroll(member("Li Mei"), azure).unwrap();
        let err = roster.transfer(id, cloud, azure).unwrap_err();
        assert_eq!(err, RosterError::NotAMember { member: id, sect: cloud });
        assert_eq!(roster.member(id).unwrap().sect(), Some(azure));
        assert_consistent(&roster);

        let ghost = SectId::new();
        assert_eq!(
            roster.transfer(id, azure, ghost).unwrap_err(),
            RosterError::SectNotFound(ghost)
        );
        assert_eq!(roster.member_ids_of(azure), vec![id]);
    }

    #[test]
    fn join_reassigns_through_transfer() {
        let (mut roster, azure, cloud) = two_sects();
        let id = roster.enroll(member("Li Mei"), azure).unwrap();
        roster.join(id, cloud).unwrap();
        roster.join(id, cloud).unwrap();
        assert_eq!(roster.member_ids_of(cloud), vec![id]);
        assert_consistent(&roster);
    }

    #[test]
    fn alliance_is_mutual_and_rewards_teaching_sects_once() {
        let (mut roster, azure, cloud) = two_sects();
        for id in [azure, cloud] {
            roster
                .sect_mut(id)
                .unwrap()
                .techniques
                .push(String::from("Azure Sword Art"));
        }
        let influence = |roster: &Roster, id| roster.sect(id).unwrap().influence;
        let (azure_before, cloud_before) = (influence(&roster, azure), influence(&roster, cloud));

        assert!(roster.form_alliance(azure, cloud).unwrap());
        assert!(!roster.form_alliance(cloud, azure).unwrap());
        assert_eq!(roster.sect(azure).unwrap().alliances(), &[cloud]);
        assert_eq!(roster.sect(cloud).unwrap().alliances(), &[azure]);
        assert_eq!(influence(&roster, azure), azure_before + ALLIANCE_INFLUENCE);
        assert_eq!(influence(&roster, cloud), cloud_before + ALLIANCE_INFLUENCE);
    }

    #[test]
    fn alliance_without_techniques_grants_no_influence() {
        let (mut roster, azure, cloud) = two_sects();
        let before = roster.sect(azure).unwrap().influence;
        assert!(roster.form_alliance(azure, cloud).unwrap());
        assert_eq!(roster.sect(azure).unwrap().influence, before);
        assert!(roster.sect(cloud).unwrap().is_allied_with(azure));
    }

    #[test]
    fn rivalry_is_mutual_and_never_self() {
        let (mut roster, azure, cloud) = two_sects();
        assert!(roster.declare_rivalry(azure, cloud).unwrap());
        assert!(!roster.declare_rivalry(azure, cloud).unwrap());
        assert!(roster.sect(cloud).unwrap().is_rival_of(azure));
        assert_eq!(roster.sect(azure).unwrap().rivals(), &[cloud]);

        assert_eq!(
            roster.declare_rivalry(azure, azure).unwrap_err(),
            RosterError::SelfRelation(azure)
        );
        let ghost = SectId::new();
        assert_eq!(
            roster.form_alliance(azure, ghost).unwrap_err(),
            RosterError::SectNotFound(ghost)
        );
        assert!(roster.sect(azure).unwrap().alliances().is_empty());
    }

    #[test]
    fn leave_clears_both_sides() {
        let (mut roster, azure, _) = two_sects();
        let id = roster.enroll(member("Li Mei"), azure).unwrap();
        assert_eq!(roster.leave(id).unwrap(), Some(azure));
        assert_eq!(roster.leave(id).unwrap(), None);
        assert!(roster.member(id).unwrap().sect().is_none());
        assert_eq!(roster.members_of(azure).count(), 0);
        assert_consistent(&roster);
    }
}

//! Save and load a [`GameSession`] as JSON.
//!
//! Memberships are stored by name on both sides: each sect lists its
//! members, and each member names its sect. The two sides must agree.
//! Alliances and rivalries are stored as sect names. Loading is two-pass.
//! Every sect and member is registered first, then memberships and
//! diplomatic links are resolved by name through the [`Roster`], so the
//! restored roster is always consistent.

use std::path::Path;

use chrono::{DateTime, Utc};
use sectomie_cultivators::{Roster, RosterError};
use sectomie_types::{Member, Sect, SectId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calendar::{Calendar, CalendarError, GameDate};
use crate::config::SimulationConfig;
use crate::session::{GameSession, SessionError};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur while saving or loading.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to read or write the save file.
    #[error("save file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to encode or decode JSON.
    #[error("save file is not valid: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The save was written by a newer format.
    #[error("unsupported snapshot version {found} (newest supported: {SNAPSHOT_VERSION})")]
    UnsupportedVersion {
        /// Version in the file.
        found: u32,
    },

    /// A membership names a sect that is not in the save.
    #[error("unknown sect in save: {name}")]
    UnknownSect {
        /// The unresolved name.
        name: String,
    },

    /// A sect lists a member that is not in the save.
    #[error("unknown member in save: {name}")]
    UnknownMember {
        /// The unresolved name.
        name: String,
    },

    /// A member names a different sect, or none, than the one listing
    /// them.
    #[error("member {member} is listed by {listed} but claims {claimed}")]
    MembershipConflict {
        /// Member name.
        member: String,
        /// Sect whose member list contains them.
        listed: String,
        /// Sect named on the member.
        claimed: String,
    },

    /// Registering the saved sects or members failed.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },

    /// The saved calendar is invalid.
    #[error("calendar error: {source}")]
    Calendar {
        /// The underlying calendar error.
        #[from]
        source: CalendarError,
    },

    /// The restored state does not form a session.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },
}

/// A saved sect with its members, allies, and rivals by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectEntry {
    /// The sect.
    #[serde(flatten)]
    pub sect: Sect,
    /// Member names in join order.
    #[serde(default)]
    pub members: Vec<String>,
    /// Allied sect names.
    #[serde(default)]
    pub alliances: Vec<String>,
    /// Rival sect names.
    #[serde(default)]
    pub rivals: Vec<String>,
}

/// A saved member with their sect by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberEntry {
    /// The member.
    #[serde(flatten)]
    pub member: Member,
    /// Owning sect, if any.
    #[serde(default)]
    pub sect: Option<String>,
}

/// Everything needed to resume a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Turn at save time.
    pub current_turn: u64,
    /// Date at save time.
    pub date: GameDate,
    /// Name of the player's sect.
    pub player_sect: String,
    /// Every sect.
    pub sects: Vec<SectEntry>,
    /// Every member.
    pub members: Vec<MemberEntry>,
}

impl GameSnapshot {
    /// Capture the state of a session.
    pub fn capture(session: &GameSession) -> Self {
        let roster = session.roster();
        let sects = roster
            .sects()
            .map(|sect| SectEntry {
                sect: sect.clone(),
                members: roster.members_of(sect.id).map(|m| m.name.clone()).collect(),
                alliances: sect_names(roster, sect.alliances()),
                rivals: sect_names(roster, sect.rivals()),
            })
            .collect();
        let members = roster
            .members()
            .map(|member| MemberEntry {
                member: member.clone(),
                sect: member
                    .sect()
                    .and_then(|id| roster.sect(id))
                    .map(|sect| sect.name.clone()),
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            current_turn: session.calendar().current_turn(),
            date: session.calendar().date(),
            player_sect: session
                .player_sect()
                .map(|sect| sect.name.clone())
                .unwrap_or_default(),
            sects,
            members,
        }
    }

    /// Rebuild a session from this snapshot.
    ///
    /// Member state is normalized on the way in, so out-of-range stats in a
    /// hand-edited save are clamped rather than rejected.
    pub fn restore(self, config: SimulationConfig) -> Result<GameSession, SnapshotError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
            });
        }
        let calendar = Calendar::from_parts(self.current_turn, self.date)?;

        // Pass 1: register everything unaffiliated.
        let mut roster = Roster::new();
        let mut listings = Vec::with_capacity(self.sects.len());
        let mut relations = Vec::with_capacity(self.sects.len());
        for entry in self.sects {
            let id = roster.insert_sect(entry.sect)?;
            listings.push((id, entry.members));
            relations.push((id, entry.alliances, entry.rivals));
        }
        let mut claims = Vec::with_capacity(self.members.len());
        for entry in self.members {
            let mut member = entry.member;
            member.normalize();
            let id = roster.insert_member(member)?;
            claims.push((id, entry.sect));
        }

        // Pass 2: resolve memberships by name. Sect lists first, to keep
        // join order.
        for (sect, names) in listings {
            for name in names {
                let member = roster
                    .member_by_name(&name)
                    .map(|m| m.id)
                    .ok_or(SnapshotError::UnknownMember { name })?;
                roster.join(member, sect)?;
            }
        }
        for (member, claimed) in claims {
            let current = roster.member(member).and_then(Member::sect);
            let target = match &claimed {
                Some(name) => Some(
                    roster
                        .sect_by_name(name)
                        .map(|s| s.id)
                        .ok_or_else(|| SnapshotError::UnknownSect { name: name.clone() })?,
                ),
                None => None,
            };
            match (current, target) {
                (None, Some(target)) => roster.join(member, target)?,
                (Some(listed), _) if Some(listed) != target => {
                    return Err(SnapshotError::MembershipConflict {
                        member: roster
                            .member(member)
                            .map(|m| m.name.clone())
                            .unwrap_or_default(),
                        listed: roster
                            .sect(listed)
                            .map(|s| s.name.clone())
                            .unwrap_or_default(),
                        claimed: claimed.unwrap_or_else(|| String::from("no sect")),
                    });
                }
                _ => {}
            }
        }

        // Diplomatic links are symmetric; the second side is a no-op.
        for (sect, alliances, rivals) in relations {
            for name in alliances {
                let other = sect_id_by_name(&roster, name)?;
                roster.link_alliance(sect, other)?;
            }
            for name in rivals {
                let other = sect_id_by_name(&roster, name)?;
                roster.declare_rivalry(sect, other)?;
            }
        }

        let player_sect = roster
            .sect_by_name(&self.player_sect)
            .map(|s| s.id)
            .ok_or(SnapshotError::UnknownSect {
                name: self.player_sect,
            })?;

        Ok(GameSession::from_parts(
            config,
            calendar,
            roster,
            player_sect,
        )?)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn sect_names(roster: &Roster, ids: &[SectId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| roster.sect(*id))
        .map(|sect| sect.name.clone())
        .collect()
}

fn sect_id_by_name(roster: &Roster, name: String) -> Result<SectId, SnapshotError> {
    roster
        .sect_by_name(&name)
        .map(|sect| sect.id)
        .ok_or(SnapshotError::UnknownSect { name })
}

impl GameSession {
    /// Write the session to `path` as JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = GameSnapshot::capture(self);
        std::fs::write(path, snapshot.to_json()?)?;
        info!(
            path = %path.display(),
            turn = snapshot.current_turn,
            sects = snapshot.sects.len(),
            members = snapshot.members.len(),
            "game saved"
        );
        Ok(())
    }

    /// Read a session saved with [`GameSession::save_to_file`].
    pub fn load_from_file(path: &Path, config: SimulationConfig) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)?;
        let session = GameSnapshot::from_json(&contents)?.restore(config)?;
        info!(
            path = %path.display(),
            turn = session.calendar().current_turn(),
            "game loaded"
        );
        Ok(session)
    }
}

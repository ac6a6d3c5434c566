//! The game session: calendar, roster, designated player sect, and config.
//!
//! A [`GameSession`] is built once at process start, either fresh from a
//! seeded roster or restored from a snapshot, and passed by reference to
//! everything that needs game state. Request-layer actions live on it (see
//! [`crate::actions`]).

use sectomie_cultivators::Roster;
use sectomie_types::{Sect, SectId};

use crate::calendar::{Calendar, CalendarError};
use crate::config::SimulationConfig;

/// Errors raised while assembling a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configured start date is invalid.
    #[error("calendar error: {source}")]
    Calendar {
        /// The underlying calendar error.
        #[from]
        source: CalendarError,
    },

    /// The designated player sect is not in the roster.
    #[error("player sect not found: {name}")]
    PlayerSectMissing {
        /// Name or id that was looked up.
        name: String,
    },
}

/// All mutable game state plus the configuration that governs it.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(crate) calendar: Calendar,
    pub(crate) roster: Roster,
    pub(crate) player_sect: SectId,
    pub(crate) config: SimulationConfig,
}

impl GameSession {
    /// Start a new game on the configured date, with `world.player_sect`
    /// as the player's sect.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PlayerSectMissing`] if no sect in `roster`
    /// has the configured name, or [`SessionError::Calendar`] if the start
    /// date is invalid.
    pub fn new(config: SimulationConfig, roster: Roster) -> Result<Self, SessionError> {
        let calendar = Calendar::new(config.calendar.start())?;
        let player_sect = roster
            .sect_by_name(&config.world.player_sect)
            .map(|sect| sect.id)
            .ok_or_else(|| SessionError::PlayerSectMissing {
                name: config.world.player_sect.clone(),
            })?;
        Ok(Self {
            calendar,
            roster,
            player_sect,
            config,
        })
    }

    /// Assemble a session from restored parts.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PlayerSectMissing`] if `player_sect` is not
    /// in `roster`.
    pub fn from_parts(
        config: SimulationConfig,
        calendar: Calendar,
        roster: Roster,
        player_sect: SectId,
    ) -> Result<Self, SessionError> {
        if roster.sect(player_sect).is_none() {
            return Err(SessionError::PlayerSectMissing {
                name: player_sect.to_string(),
            });
        }
        Ok(Self {
            calendar,
            roster,
            player_sect,
            config,
        })
    }

    /// The calendar.
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Every sect and member.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Mutable roster access, for membership changes and world setup.
    pub const fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Id of the player's sect.
    pub const fn player_sect_id(&self) -> SectId {
        self.player_sect
    }

    /// The player's sect.
    pub fn player_sect(&self) -> Option<&Sect> {
        self.roster.sect(self.player_sect)
    }

    /// Active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster
            .insert_sect(Sect::found("Azure Peak Sect", "Sword Dao", 3, ""))
            .unwrap();
        roster
    }

    #[test]
    fn new_resolves_player_sect_by_name() {
        let session = GameSession::new(SimulationConfig::default(), roster()).unwrap();
        assert_eq!(session.player_sect().unwrap().name, "Azure Peak Sect");
        assert_eq!(session.calendar().current_turn(), 1);
    }

    #[test]
    fn missing_player_sect_is_rejected() {
        let mut config = SimulationConfig::default();
        config.world.player_sect = String::from("Nowhere Sect");
        let err = GameSession::new(config, roster()).unwrap_err();
        assert!(matches!(err, SessionError::PlayerSectMissing { name } if name == "Nowhere Sect"));

        let err = GameSession::from_parts(
            SimulationConfig::default(),
            Calendar::default(),
            roster(),
            SectId::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::PlayerSectMissing { .. }));
    }

    #[test]
    fn invalid_start_date_is_rejected() {
        let mut config = SimulationConfig::default();
        config.calendar.start_month = 0;
        assert!(matches!(
            GameSession::new(config, roster()),
            Err(SessionError::Calendar { .. })
        ));
    }
}

//! Calendar, turn engine, game session, and persistence for the Sectomie
//! simulation.
//!
//! This crate ties the progression rules in `sectomie-cultivators` and the
//! resource pools in `sectomie-economy` into a playable game: a
//! [`GameSession`] holds the calendar, roster, and player sect, exposes the
//! request-layer actions, runs the monthly turn, and saves to JSON.
//!
//! # Modules
//!
//! - [`actions`] -- Request-layer actions and [`ActionResponse`] bodies
//! - [`calendar`] -- Turn counter and in-world date
//! - [`config`] -- Configuration loading from `sectomie-config.yaml`
//! - [`session`] -- [`GameSession`], the explicit game state
//! - [`snapshot`] -- JSON save/load with name-resolved memberships
//! - [`turn`] -- The monthly batch step for one sect

pub mod actions;
pub mod calendar;
pub mod config;
pub mod session;
pub mod snapshot;
pub mod turn;

pub use actions::{
    ActionError, ActionResponse, ActionSummary, MethodAssignment, RecruitRequest, Recruitment,
};
pub use calendar::{Calendar, CalendarError, GameDate};
pub use config::{ConfigError, SimulationConfig};
pub use session::{GameSession, SessionError};
pub use snapshot::{GameSnapshot, SNAPSHOT_VERSION, SnapshotError};
pub use turn::{TurnError, TurnReport, process_turn_end};

//! Cultivation logic for the Sectomie simulation.
//!
//! This crate holds everything that operates on a member's cultivation
//! state without touching I/O. It sits between `sectomie-types` (data
//! structures) and `sectomie-core` (calendar, turn engine, persistence).
//!
//! # Modules
//!
//! - [`config`] -- Progression tunables ([`ProgressionConfig`])
//! - [`error`] -- [`ProgressionError`] and [`RosterError`]
//! - [`methods`] -- Direct and monthly method tables, method listings
//! - [`progression`] -- Cultivation, breakthroughs, insight, treasures, missions
//! - [`treasures`] -- Realm ranges for bottleneck treasures
//! - [`power`] -- Member and sect combat power
//! - [`roster`] -- Sect/member registry with atomic transfers and sect
//!   diplomacy ([`Roster`])

pub mod config;
pub mod error;
pub mod methods;
pub mod power;
pub mod progression;
pub mod roster;
pub mod treasures;

// Re-export primary types at crate root for convenience.
pub use config::ProgressionConfig;
pub use error::{ProgressionError, RosterError};
pub use methods::{
    AttributeTarget, MethodEffect, MethodTable, available_methods, effectiveness,
    validate_assignment,
};
pub use power::{combat_power, sect_average_power, sect_total_power};
pub use progression::{
    CultivationBonuses, attempt_breakthrough, base_qi_gain, calculate_monthly_cultivation,
    complete_mission, cultivate_hours, cultivate_with_method, major_bottleneck_chance,
    meditate_for_insight, minor_bottleneck_chance, mission_stones, mission_treasure,
    use_treasure_for_bottleneck,
};
pub use roster::{ALLIANCE_INFLUENCE, Roster};
pub use treasures::{effective_realms, treasures_for_realm};

//! Shared type definitions for the Sectomie cultivation simulation.
//!
//! This crate is the single source of truth for the entities every other
//! Sectomie crate passes around: members, sects, their resource pools, and
//! the structured outcomes of progression operations.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for members and sects
//! - [`attributes`] -- Bounded physical/spiritual/comprehension traits
//! - [`enums`] -- Methods, treasures, resources, bottlenecks, realm stages
//! - [`structs`] -- `Member`, `Sect`, spirit veins, manuals, resource costs
//! - [`outcomes`] -- Results of cultivation, breakthrough, meditation, treasure use

pub mod attributes;
pub mod enums;
pub mod ids;
pub mod outcomes;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use attributes::{Attribute, Attributes, STAT_MAX, STAT_MIN, clamp_stat};
pub use enums::{
    Bottleneck, CultivationMethod, MemberStatus, REALM_NAMES, RealmStage, SectResource,
    TreasureKind, UnknownKey, realm_name,
};
pub use ids::{MemberId, SectId};
pub use outcomes::{
    AttributeGain, BreakthroughOutcome, BreakthroughResult, CultivationOutcome, Deviation,
    MeditationOutcome, MethodListing, MissionReward, TreasureEffect, TreasureOutcome,
};
pub use structs::{
    BREAKTHROUGH_CHANCE_MAX, DEFAULT_MANUAL_BONUS, Member, ResourceCost, STARTING_BREAKTHROUGH_CHANCE,
    STARTING_MAX_QI, Sect, SpiritVein, TIER_RANGE, TechniqueManual,
};

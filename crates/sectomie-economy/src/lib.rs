//! Resource economy for Sectomie sects.
//!
//! A sect holds three fungible pools (spirit stones, spirit herbs, dao
//! crystals) plus a treasure inventory. This crate is the only place those
//! pools change. Every operation is synchronous, uses checked arithmetic,
//! and either applies completely or not at all.
//!
//! # Modules
//!
//! - [`pools`] -- Credits, all-or-nothing debits, treasures, member allocations
//! - [`income`] -- Spirit-vein and elixir-field income
//! - [`error`] -- [`EconomyError`]

pub mod error;
pub mod income;
pub mod pools;

pub use error::EconomyError;
pub use income::{collect_vein_income, grant_herb_income, roll_herb_yield, spirit_vein_income};
pub use pools::{
    check_affordable, check_credit, check_treasure_grant, consume_allocated_resources,
    consume_treasure, credit, credit_spirit_stones, debit_if_affordable, grant_treasure,
};

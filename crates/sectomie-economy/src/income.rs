//! Per-turn resource income.
//!
//! Spirit veins produce a fixed output every turn; elixir fields each roll
//! 0-2 herbs independently.

use rand::Rng;
use sectomie_types::{Sect, SectResource};
use tracing::debug;

use crate::error::EconomyError;
use crate::pools::{credit, credit_spirit_stones};

/// Most herbs a single elixir field can yield in one turn.
pub const MAX_HERBS_PER_FIELD: u64 = 2;

/// Total spirit-stone output of a sect's veins.
pub fn spirit_vein_income(sect: &Sect) -> Result<u64, EconomyError> {
    sect.spirit_veins.iter().try_fold(0_u64, |total, vein| {
        total
            .checked_add(vein.output)
            .ok_or_else(|| EconomyError::ArithmeticOverflow {
                context: format!("summing vein output for {}", sect.name),
            })
    })
}

/// Credit one turn of vein output to a sect. Returns the amount credited.
pub fn collect_vein_income(sect: &mut Sect) -> Result<u64, EconomyError> {
    let income = spirit_vein_income(sect)?;
    credit_spirit_stones(sect, income)?;
    debug!(sect = %sect.name, income, balance = sect.spirit_stones, "vein income collected");
    Ok(income)
}

/// Roll herb output for `fields` elixir fields.
pub fn roll_herb_yield(fields: u32, rng: &mut impl Rng) -> u64 {
    (0..fields).fold(0_u64, |total, _| {
        total.saturating_add(rng.random_range(0..=MAX_HERBS_PER_FIELD))
    })
}

/// Roll and credit one turn of herb income. Returns the amount credited.
pub fn grant_herb_income(sect: &mut Sect, rng: &mut impl Rng) -> Result<u64, EconomyError> {
    let income = roll_herb_yield(sect.elixir_fields, rng);
    credit(sect, SectResource::SpiritHerbs, income)?;
    debug!(sect = %sect.name, income, fields = sect.elixir_fields, "herb income granted");
    Ok(income)
}

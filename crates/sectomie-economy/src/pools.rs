//! Credit and debit operations on a sect's resource pools.
//!
//! All arithmetic is checked. A multi-resource cost is verified in full
//! before any pool is debited, so a shortfall never leaves a partial
//! deduction behind.

use sectomie_types::{Member, ResourceCost, Sect, SectResource, TreasureKind};
use tracing::debug;

use crate::error::EconomyError;

/// Verify that a sect's pool can absorb a credit. Returns the balance the
/// credit would produce.
pub fn check_credit(sect: &Sect, resource: SectResource, amount: u64) -> Result<u64, EconomyError> {
    sect.resource(resource)
        .checked_add(amount)
        .ok_or_else(|| EconomyError::ArithmeticOverflow {
            context: format!("crediting {amount} {resource}"),
        })
}

/// Add `amount` of a resource to a sect. Returns the new pool size.
pub fn credit(sect: &mut Sect, resource: SectResource, amount: u64) -> Result<u64, EconomyError> {
    let balance = check_credit(sect, resource, amount)?;
    *sect.resource_mut(resource) = balance;
    Ok(balance)
}

/// Add spirit stones to a sect. Returns the new balance.
pub fn credit_spirit_stones(sect: &mut Sect, amount: u64) -> Result<u64, EconomyError> {
    credit(sect, SectResource::SpiritStones, amount)
}

/// Verify that a sect can pay every part of a cost, without debiting.
pub fn check_affordable(sect: &Sect, cost: &ResourceCost) -> Result<(), EconomyError> {
    for (resource, required) in cost.iter() {
        let available = sect.resource(resource);
        if available < required {
            return Err(EconomyError::InsufficientResource {
                resource,
                required,
                available,
            });
        }
    }
    Ok(())
}

/// Debit a multi-resource cost if and only if every part is affordable.
///
/// On any shortfall the first missing resource is reported and no pool
/// changes.
pub fn debit_if_affordable(sect: &mut Sect, cost: &ResourceCost) -> Result<(), EconomyError> {
    check_affordable(sect, cost)?;
    for (resource, required) in cost.iter() {
        let pool = sect.resource_mut(resource);
        *pool = pool
            .checked_sub(required)
            .ok_or_else(|| EconomyError::ArithmeticOverflow {
                context: format!("debiting {required} {resource}"),
            })?;
    }
    debug!(sect = %sect.name, ?cost, "cost debited");
    Ok(())
}

/// Remove one treasure from a sect's inventory. Returns how many remain.
///
/// The entry is dropped once the count reaches zero.
pub fn consume_treasure(sect: &mut Sect, treasure: TreasureKind) -> Result<u32, EconomyError> {
    let available = sect.treasure_count(treasure);
    let remaining = available
        .checked_sub(1)
        .ok_or(EconomyError::InsufficientTreasure {
            treasure,
            available,
        })?;
    if remaining == 0 {
        sect.treasures.remove(&treasure);
    } else {
        sect.treasures.insert(treasure, remaining);
    }
    debug!(sect = %sect.name, %treasure, remaining, "treasure consumed");
    Ok(remaining)
}

/// Verify that a sect's inventory can absorb more of a treasure. Returns
/// the count the grant would produce.
pub fn check_treasure_grant(
    sect: &Sect,
    treasure: TreasureKind,
    count: u32,
) -> Result<u32, EconomyError> {
    sect.treasure_count(treasure)
        .checked_add(count)
        .ok_or_else(|| EconomyError::ArithmeticOverflow {
            context: format!("granting {count} {treasure}"),
        })
}

/// Add treasures to a sect's inventory. Returns the new count.
pub fn grant_treasure(
    sect: &mut Sect,
    treasure: TreasureKind,
    count: u32,
) -> Result<u32, EconomyError> {
    let total = check_treasure_grant(sect, treasure, count)?;
    sect.treasures.insert(treasure, total);
    Ok(total)
}

/// Commit `amount` spirit stones from a sect to one member.
///
/// The stones are debited once, here; the member's `allocated_resources`
/// then feeds the monthly resource bonus every turn without further cost.
pub fn consume_allocated_resources(
    sect: &mut Sect,
    member: &mut Member,
    amount: u32,
) -> Result<(), EconomyError> {
    debit_if_affordable(sect, &ResourceCost::stones(u64::from(amount)))?;
    member.allocated_resources = amount;
    debug!(sect = %sect.name, member = %member.name, amount, "resources allocated");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sectomie_types::Attributes;

    use super::*;

    fn sect() -> Sect {
        let mut sect = Sect::found("Azure Peak Sect", "Sword Dao", 1, "");
        sect.spirit_stones = 1_000;
        sect.spirit_herbs = 0;
        sect
    }

    #[test]
    fn credit_adds_to_pool() {
        let mut s = sect();
        assert_eq!(credit_spirit_stones(&mut s, 250).unwrap(), 1_250);
    }

    #[test]
    fn credit_overflow_is_an_error() {
        let mut s = sect();
        s.spirit_stones = u64::MAX;
        assert!(matches!(
            credit_spirit_stones(&mut s, 1),
            Err(EconomyError::ArithmeticOverflow { .. })
        ));
        assert_eq!(s.spirit_stones, u64::MAX);
    }

    #[test]
    fn treasure_overflow_leaves_inventory_alone() {
        let mut s = sect();
        assert_eq!(check_treasure_grant(&s, TreasureKind::SpiritPill, 3).unwrap(), 3);
        assert!(!s.treasures.contains_key(&TreasureKind::SpiritPill));

        s.treasures.insert(TreasureKind::SpiritPill, u32::MAX);
        assert!(matches!(
            grant_treasure(&mut s, TreasureKind::SpiritPill, 1),
            Err(EconomyError::ArithmeticOverflow { .. })
        ));
        assert_eq!(s.treasure_count(TreasureKind::SpiritPill), u32::MAX);
    }

    #[test]
    fn debit_pays_every_part() {
        let mut s = sect();
        s.spirit_herbs = 3;
        let cost = ResourceCost::stones(400).with(SectResource::SpiritHerbs, 1);
        debit_if_affordable(&mut s, &cost).unwrap();
        assert_eq!(s.spirit_stones, 600);
        assert_eq!(s.spirit_herbs, 2);
    }

    #[test]
    fn shortfall_debits_nothing() {
        let mut s = sect();
        let cost = ResourceCost::stones(400).with(SectResource::SpiritHerbs, 1);
        let err = debit_if_affordable(&mut s, &cost).unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientResource {
                resource: SectResource::SpiritHerbs,
                required: 1,
                available: 0,
            }
        );
        assert_eq!(s.spirit_stones, 1_000);
    }

    #[test]
    fn treasure_consumption_removes_empty_entries() {
        let mut s = sect();
        grant_treasure(&mut s, TreasureKind::SpiritPill, 2).unwrap();
        assert_eq!(consume_treasure(&mut s, TreasureKind::SpiritPill).unwrap(), 1);
        assert_eq!(consume_treasure(&mut s, TreasureKind::SpiritPill).unwrap(), 0);
        assert!(!s.treasures.contains_key(&TreasureKind::SpiritPill));
        assert!(matches!(
            consume_treasure(&mut s, TreasureKind::SpiritPill),
            Err(EconomyError::InsufficientTreasure { available: 0, .. })
        ));
    }

    #[test]
    fn allocation_debits_stones_once() {
        let mut s = sect();
        let mut m = Member::new("Li Mei", 20, "Sword", Attributes::new(85.0, 65.0, 75.0));
        consume_allocated_resources(&mut s, &mut m, 300).unwrap();
        assert_eq!(s.spirit_stones, 700);
        assert_eq!(m.allocated_resources, 300);

        let err = consume_allocated_resources(&mut s, &mut m, 5_000).unwrap_err();
        assert!(matches!(err, EconomyError::InsufficientResource { .. }));
        assert_eq!(m.allocated_resources, 300);
        assert_eq!(s.spirit_stones, 700);
    }
}

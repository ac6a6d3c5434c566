//! Realm ranges in which each treasure can break a major bottleneck.

use sectomie_types::TreasureKind;

/// Inclusive `(lowest, highest)` realm range a treasure is effective for.
pub const fn effective_realms(treasure: TreasureKind) -> (u32, u32) {
    match treasure {
        TreasureKind::SpiritPill => (0, 2),
        TreasureKind::DaoComprehensionStone => (2, 4),
        TreasureKind::HeavenAndEarthSpiritFruit => (3, 5),
        TreasureKind::NineTransformationPill => (4, 6),
        TreasureKind::ImmortalAscensionStone => (6, 7),
    }
}

/// Treasures effective at a realm, in table order.
pub fn treasures_for_realm(realm: u32) -> Vec<TreasureKind> {
    TreasureKind::ALL
        .into_iter()
        .filter(|treasure| {
            let (low, high) = effective_realms(*treasure);
            (low..=high).contains(&realm)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_overlap_at_their_edges() {
        assert_eq!(
            treasures_for_realm(2),
            vec![TreasureKind::SpiritPill, TreasureKind::DaoComprehensionStone]
        );
        assert_eq!(treasures_for_realm(7), vec![TreasureKind::ImmortalAscensionStone]);
    }

    #[test]
    fn nothing_helps_past_immortal_ascension() {
        assert!(treasures_for_realm(8).is_empty());
    }
}

//! Error types for the sectomie-cultivators crate.
//!
//! A [`ProgressionError`] is always a rejection: it is returned before the
//! member is touched. Setbacks that the simulation models (deviation, a
//! failed breakthrough, a treasure that does not fit) are successful
//! outcomes, not errors.

use sectomie_types::{Bottleneck, CultivationMethod, MemberId, SectId};

/// Rejections raised by single-member progression operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressionError {
    /// No method with this key exists in the table being used.
    #[error("unknown cultivation method: {key}")]
    UnknownMethod {
        /// The key that was looked up.
        key: String,
    },

    /// No treasure with this key exists.
    #[error("this item cannot help overcome cultivation bottlenecks: {key}")]
    UnknownTreasure {
        /// The key that was looked up.
        key: String,
    },

    /// A method is not yet selectable at the member's realm.
    #[error("{method} requires realm {required_realm} (current realm: {realm})")]
    MethodLocked {
        /// The locked method.
        method: CultivationMethod,
        /// Lowest realm at which it unlocks.
        required_realm: u32,
        /// The member's realm.
        realm: u32,
    },

    /// A breakthrough was attempted while a bottleneck is active.
    #[error(
        "currently facing a {} bottleneck; it must be overcome before advancing",
        bottleneck.label()
    )]
    BottleneckActive {
        /// The active bottleneck.
        bottleneck: Bottleneck,
    },

    /// A breakthrough was attempted below 90% of qi capacity.
    #[error("insufficient qi: {qi:.1} of {required:.1} needed to attempt a breakthrough")]
    InsufficientQi {
        /// Current qi.
        qi: f64,
        /// Qi needed (90% of capacity).
        required: f64,
    },

    /// A remedy was used with no bottleneck active.
    #[error("not currently facing a bottleneck")]
    NoBottleneck,

    /// A remedy was used against the wrong kind of bottleneck.
    #[error("facing a {} bottleneck: {remedy}", active.label())]
    WrongBottleneck {
        /// The bottleneck actually active.
        active: Bottleneck,
        /// What the member should do instead.
        remedy: &'static str,
    },
}

/// Errors raised by roster bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// Member with the given ID is not in the roster.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// Sect with the given ID is not in the roster.
    #[error("sect not found: {0}")]
    SectNotFound(SectId),

    /// A member or sect with this name already exists.
    #[error("duplicate {kind} name: {name}")]
    DuplicateName {
        /// "member" or "sect".
        kind: &'static str,
        /// The contested name.
        name: String,
    },

    /// A sect was asked to ally with or rival itself.
    #[error("sect {0} cannot form a relation with itself")]
    SelfRelation(SectId),

    /// The member does not belong to the sect named in a transfer.
    #[error("member {member} does not belong to sect {sect}")]
    NotAMember {
        /// The member being moved.
        member: MemberId,
        /// The sect it was claimed to belong to.
        sect: SectId,
    },
}

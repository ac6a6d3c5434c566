//! Error types for the sectomie-economy crate.

use sectomie_types::{SectResource, TreasureKind};

/// Errors raised by sect resource operations.
///
/// Every error is returned before any pool is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// The sect holds less of a resource than a cost requires.
    #[error("not enough {resource}: required {required}, available {available}")]
    InsufficientResource {
        /// The resource that fell short.
        resource: SectResource,
        /// The amount the cost requires.
        required: u64,
        /// The amount the sect holds.
        available: u64,
    },

    /// The sect does not hold the treasure being consumed.
    #[error("no {treasure} in the treasury (available: {available})")]
    InsufficientTreasure {
        /// The treasure requested.
        treasure: TreasureKind,
        /// How many the sect holds.
        available: u32,
    },

    /// A pool would overflow.
    #[error("arithmetic overflow in economy computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

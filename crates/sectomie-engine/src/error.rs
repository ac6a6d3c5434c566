//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup, play, and
//! saving, so `main` can propagate with `?`.

use sectomie_core::{ActionError, ConfigError, SessionError, SnapshotError};
use sectomie_cultivators::RosterError;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Seeding the starting world failed.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },

    /// The session could not be assembled.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },

    /// Loading or saving the game failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: SnapshotError,
    },

    /// A turn could not be played.
    #[error("turn error: {source}")]
    Turn {
        /// The underlying action error.
        #[from]
        source: ActionError,
    },
}

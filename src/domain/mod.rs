// src/domain/mod.rs
//
// Domain Root
//
// Declares all domain modules and re-exports their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod episode;
pub mod history;
pub mod resume;
pub mod settings;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Episode Domain (read-only input from the content API)
pub use episode::{
    validate_episode, Episode, EpisodeId, Quality, QualityVariants, SegmentKind, SegmentRange,
};

// Watch History Domain
pub use history::{
    validate_progress_percent, ContentHistory, ContentId, EpisodeProgress, WatchHistory,
    COMPLETION_THRESHOLD_PERCENT,
};

// Resume
pub use resume::ResumePoint;

// Settings
pub use settings::PlayerSettings;

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Segment range [{start}, {stop}) is empty or negative")]
    InvalidSegmentRange { start: f64, stop: f64 },

    #[error("Episode duration {0}s must be positive and finite")]
    InvalidDuration(f64),

    #[error("Progress {0}% is outside 0..=100")]
    ProgressOutOfRange(u32),

    #[error("Quality {0} has no stream for this episode")]
    QualityUnavailable(Quality),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

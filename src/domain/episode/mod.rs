pub mod entity;
pub mod invariants;

pub use entity::{Episode, EpisodeId, Quality, QualityVariants, SegmentKind, SegmentRange};
pub use invariants::validate_episode;

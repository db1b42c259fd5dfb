use super::entity::{Episode, SegmentRange};
use crate::domain::{DomainError, DomainResult};

/// Validates all Episode invariants
pub fn validate_episode(episode: &Episode) -> DomainResult<()> {
    validate_duration(episode)?;
    if let Some(range) = episode.opening_range {
        validate_range(range)?;
    }
    if let Some(range) = episode.ending_range {
        validate_range(range)?;
    }
    if let Some(start) = episode.start_time_override {
        if !start.is_finite() || start < 0.0 {
            return Err(DomainError::InvariantViolation(format!(
                "start time override {} must be a non-negative number",
                start
            )));
        }
    }
    Ok(())
}

fn validate_duration(episode: &Episode) -> DomainResult<()> {
    let duration = episode.duration_seconds;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(DomainError::InvalidDuration(duration));
    }
    Ok(())
}

fn validate_range(range: SegmentRange) -> DomainResult<()> {
    if !range.start.is_finite() || !range.stop.is_finite() || range.start < 0.0 {
        return Err(DomainError::InvalidSegmentRange {
            start: range.start,
            stop: range.stop,
        });
    }
    if range.stop <= range.start {
        return Err(DomainError::InvalidSegmentRange {
            start: range.start,
            stop: range.stop,
        });
    }
    Ok(())
}

/// Critical Episode Invariants:
///
/// 1. Duration is positive and finite
/// 2. Opening and ending ranges are half-open and non-empty
/// 3. Episodes are never mutated by the playback core

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::episode::Episode;

    #[test]
    fn test_valid_episode() {
        let episode = Episode::new("a", 1, 1440.0).with_opening(90.0, 150.0);
        assert!(validate_episode(&episode).is_ok());
    }

    #[test]
    fn test_zero_duration_fails() {
        let episode = Episode::new("a", 1, 0.0);
        assert!(matches!(
            validate_episode(&episode),
            Err(DomainError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_inverted_range_fails() {
        let episode = Episode::new("a", 1, 1440.0).with_ending(1300.0, 1200.0);
        assert!(matches!(
            validate_episode(&episode),
            Err(DomainError::InvalidSegmentRange { .. })
        ));
    }

    #[test]
    fn test_negative_override_fails() {
        let episode = Episode::new("a", 1, 1440.0).with_start_time_override(-3.0);
        assert!(validate_episode(&episode).is_err());
    }
}

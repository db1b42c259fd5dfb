use crate::domain::{DomainError, DomainResult};

/// Progress is an integer percentage in 0..=100
pub fn validate_progress_percent(percent: u32) -> DomainResult<u8> {
    if percent > 100 {
        return Err(DomainError::ProgressOutOfRange(percent));
    }
    Ok(percent as u8)
}

/// Watch History Invariants:
///
/// 1. `completed` is true whenever progress >= 90 (auto-promotion)
/// 2. Later writes win; progress may move backwards when a caller says so
/// 3. Content `last_watched_at` is stamped on every episode write

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(validate_progress_percent(0).unwrap(), 0);
        assert_eq!(validate_progress_percent(100).unwrap(), 100);
        assert!(validate_progress_percent(101).is_err());
    }
}

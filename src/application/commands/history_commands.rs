// src/application/commands/history_commands.rs

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::{validate_episode, ContentId, Episode, EpisodeId};
use crate::error::{AppError, AppResult};

/// Where "continue watching" should start for a content item.
/// `None` means start from the first episode.
pub async fn get_resume_point(
    state: &AppState,
    content_id: u64,
    episodes: Vec<Episode>,
) -> Result<Option<ResumePointDto>, String> {
    let validated: AppResult<()> = episodes
        .iter()
        .try_for_each(validate_episode)
        .map_err(AppError::from);
    validated.to_error_response()?;

    let point = state
        .resume_resolver
        .resolve(ContentId(content_id), &episodes);

    Ok(point.map(ResumePointDto::from))
}

pub async fn get_episode_progress(
    state: &AppState,
    content_id: u64,
    episode_id: String,
) -> Result<Option<EpisodeProgressDto>, String> {
    let progress = state
        .progress_store
        .get(ContentId(content_id), &EpisodeId::new(episode_id.as_str()));

    Ok(progress.map(|p| EpisodeProgressDto::new(content_id, &episode_id, &p)))
}

pub async fn mark_episode_watched(
    state: &AppState,
    content_id: u64,
    episode_id: String,
) -> Result<EpisodeProgressDto, String> {
    if episode_id.trim().is_empty() {
        return Err(ErrorResponse::validation("Episode ID cannot be empty".to_string()).into_message());
    }
    let progress = state
        .progress_store
        .mark_watched(ContentId(content_id), &EpisodeId::new(episode_id.as_str()));

    Ok(EpisodeProgressDto::new(content_id, &episode_id, &progress))
}

/// Most recent first. Entries are hydrated from the content service when
/// one is configured; IDs it cannot resolve are left out.
pub async fn list_recently_watched(
    state: &AppState,
    limit: usize,
) -> Result<Vec<RecentlyWatchedDto>, String> {
    if limit == 0 {
        return Err(ErrorResponse::validation("Limit must be positive".to_string()).into_message());
    }

    match &state.content_fetcher {
        Some(fetcher) => {
            let items = state
                .progress_store
                .list_recently_watched_hydrated(limit, fetcher.as_ref())
                .await;
            Ok(items.into_iter().map(RecentlyWatchedDto::from).collect())
        }
        None => Ok(state
            .progress_store
            .list_recently_watched(limit)
            .into_iter()
            .map(|id| RecentlyWatchedDto {
                content_id: id.0,
                title: None,
                poster_url: None,
            })
            .collect()),
    }
}

pub async fn clear_watch_history(state: &AppState) -> Result<(), String> {
    state.progress_store.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    fn episodes() -> Vec<Episode> {
        vec![Episode::new("a", 1, 1200.0), Episode::new("b", 2, 1200.0)]
    }

    #[tokio::test]
    async fn test_resume_point_flow() {
        let state = AppState::in_memory(PlayerConfig::default());
        assert_eq!(get_resume_point(&state, 1, episodes()).await.unwrap(), None);

        mark_episode_watched(&state, 1, "a".to_string()).await.unwrap();
        let point = get_resume_point(&state, 1, episodes())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(point.episode_id, "b");
        assert!(point.is_next_unwatched);
    }

    #[tokio::test]
    async fn test_progress_and_clear() {
        let state = AppState::in_memory(PlayerConfig::default());
        state
            .progress_store
            .update(ContentId(9), &EpisodeId::new("x"), 30, false);

        let progress = get_episode_progress(&state, 9, "x".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.progress_percent, 30);
        assert!(progress.in_progress);

        let recent = list_recently_watched(&state, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, None);

        clear_watch_history(&state).await.unwrap();
        assert!(get_episode_progress(&state, 9, "x".to_string())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_resume_point_rejects_invalid_episode() {
        let state = AppState::in_memory(PlayerConfig::default());
        let bad = vec![Episode::new("a", 1, 0.0)];
        assert!(get_resume_point(&state, 1, bad).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let state = AppState::in_memory(PlayerConfig::default());
        assert!(mark_episode_watched(&state, 1, "  ".to_string()).await.is_err());
        assert!(list_recently_watched(&state, 0).await.is_err());
    }
}

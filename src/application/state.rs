// src/application/state.rs

use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::config::PlayerConfig;
use crate::db::{
    create_connection_pool, get_connection, initialize_database, verify_database_integrity,
};
use crate::error::{AppError, AppResult};
use crate::events::EventBus;
use crate::integrations::{ContentFetcher, HttpContentClient};
use crate::repositories::{
    InMemoryKeyValueStore, KeyValueStore, KvSettingsRepository, KvWatchHistoryRepository,
    SqliteKeyValueStore,
};
use crate::runtime::clock::{Clock, SystemClock};
use crate::services::playback_ui::PlaybackUiController;
use crate::services::progress_store::ProgressStore;
use crate::services::resume_resolver::ResumeResolver;
use crate::services::settings_service::SettingsService;
use crate::services::streaming::{
    EngineFactory, MediaElement, PlayerServices, SessionRequest, StreamingSessionController,
};

/// Storage namespace for everything the player persists
pub const STORAGE_NAMESPACE: &str = "player";

/// Shared state for the command boundary and for building players.
/// All fields are Arc-wrapped so commands can run concurrently.
pub struct AppState {
    pub config: PlayerConfig,
    pub clock: Arc<dyn Clock>,
    pub event_bus: Arc<EventBus>,
    pub progress_store: Arc<ProgressStore>,
    pub resume_resolver: Arc<ResumeResolver>,
    pub settings_service: Arc<SettingsService>,
    pub content_fetcher: Option<Arc<dyn ContentFetcher>>,
}

impl AppState {
    /// Wire every service over one key-value store
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: PlayerConfig,
        content_fetcher: Option<Arc<dyn ContentFetcher>>,
    ) -> Self {
        let history_repo = Arc::new(KvWatchHistoryRepository::new(store.clone()));
        let settings_repo = Arc::new(KvSettingsRepository::new(store));
        let progress_store = Arc::new(ProgressStore::new(history_repo, clock.clone()));

        Self {
            config,
            clock,
            event_bus: Arc::new(EventBus::new()),
            resume_resolver: Arc::new(ResumeResolver::new(progress_store.clone())),
            progress_store,
            settings_service: Arc::new(SettingsService::new(settings_repo)),
            content_fetcher,
        }
    }

    /// SQLite-backed state at `db_path`
    pub fn open(
        db_path: &Path,
        config: PlayerConfig,
        content_api_base: Option<&str>,
    ) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Other(format!("invalid player config: {:#}", e)))?;

        let pool = Arc::new(create_connection_pool(db_path)?);
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
            verify_database_integrity(&conn)?;
        }
        info!("player storage ready at {}", db_path.display());

        let fetcher: Option<Arc<dyn ContentFetcher>> = match content_api_base {
            Some(base) => Some(Arc::new(HttpContentClient::new(base)?)),
            None => None,
        };

        Ok(Self::new(
            Arc::new(SqliteKeyValueStore::new(pool, STORAGE_NAMESPACE)),
            Arc::new(SystemClock::new()),
            config,
            fetcher,
        ))
    }

    /// Ephemeral state; nothing survives the process
    pub fn in_memory(config: PlayerConfig) -> Self {
        Self::new(
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(SystemClock::new()),
            config,
            None,
        )
    }

    /// Build an unmounted player for `request` with the saved settings
    pub fn create_player<M: MediaElement>(
        &self,
        request: SessionRequest,
        media: M,
        engines: Arc<dyn EngineFactory>,
    ) -> AppResult<PlaybackUiController<M>> {
        let services = PlayerServices {
            store: self.progress_store.clone(),
            events: self.event_bus.clone(),
            clock: self.clock.clone(),
            engines,
        };
        let session = StreamingSessionController::new(
            request,
            media,
            services,
            self.config.clone(),
            self.settings_service.load(),
        )?;

        Ok(PlaybackUiController::new(
            session,
            self.settings_service.clone(),
            self.clock.clone(),
            self.config.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentId, EpisodeId};
    use crate::services::playback_ui::PlayerIntent;
    use crate::services::streaming::testing::{episode, request, FakeEngineFactory, FakeMedia};
    use crate::services::streaming::EngineEvent;

    #[test]
    fn test_sqlite_state_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.db");

        {
            let state = AppState::open(&path, PlayerConfig::default(), None).unwrap();
            state
                .progress_store
                .update(ContentId(3), &EpisodeId::new("a"), 42, false);
            state.settings_service.update(|s| s.auto_skip = true);
        }

        let state = AppState::open(&path, PlayerConfig::default(), None).unwrap();
        assert_eq!(
            state
                .progress_store
                .get_percentage(ContentId(3), &EpisodeId::new("a")),
            42
        );
        assert!(state.settings_service.load().auto_skip);
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayerConfig {
            progress_save_interval_ms: 0,
            ..PlayerConfig::default()
        };
        assert!(AppState::open(&dir.path().join("player.db"), config, None).is_err());
    }

    #[test]
    fn test_created_player_uses_saved_settings() {
        let state = AppState::in_memory(PlayerConfig::default());
        state.settings_service.update(|s| {
            s.volume = 0.3;
            s.autoplay_next = false;
        });

        let media = FakeMedia::default();
        media.with(|m| m.duration = Some(1200.0));
        let mut player = state
            .create_player(
                request(vec![episode("a", 1, 1200.0)], "a"),
                media.clone(),
                Arc::new(FakeEngineFactory::new(true)),
            )
            .unwrap();

        player.mount().unwrap();
        player.handle_engine_event(1, EngineEvent::ManifestParsed { levels: 1 });
        assert_eq!(media.with(|m| m.volume), 0.3);
        assert!(!player.session().settings().autoplay_next);

        player.dispatch(PlayerIntent::Close).unwrap();
        let last = state.event_bus.get_event_log().pop().map(|e| e.event_type);
        assert_eq!(last.as_deref(), Some("PlaybackStopped"));
    }
}

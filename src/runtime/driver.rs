// src/runtime/driver.rs
//
// Player Runtime - background task driving one player
//
// CRITICAL RULES:
// - The UI controller lives inside the task; everything reaches it as a message
// - Timers advance on a fixed tokio interval
// - Shutdown closes the player before the task exits
// - Effects for the host come back on their own channel

use log::{debug, warn};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::services::playback_ui::{Key, PlaybackUiController, PlayerIntent, UiEffect, UiSnapshot};
use crate::services::streaming::{EngineEvent, MediaElement, MediaEvent};

#[derive(Debug)]
pub enum RuntimeMessage {
    Engine { generation: u64, event: EngineEvent },
    Media(MediaEvent),
    Key(Key),
    Intent(PlayerIntent),
    Hover(Option<f64>),
    PointerActivity,
    Snapshot(oneshot::Sender<UiSnapshot>),
}

/// Cloneable sender side. Engines and the media element report through it.
#[derive(Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<RuntimeMessage>,
}

impl PlayerHandle {
    fn send(&self, message: RuntimeMessage) -> bool {
        self.tx.send(message).is_ok()
    }

    pub fn engine_event(&self, generation: u64, event: EngineEvent) -> bool {
        self.send(RuntimeMessage::Engine { generation, event })
    }

    pub fn media_event(&self, event: MediaEvent) -> bool {
        self.send(RuntimeMessage::Media(event))
    }

    pub fn key(&self, key: Key) -> bool {
        self.send(RuntimeMessage::Key(key))
    }

    pub fn intent(&self, intent: PlayerIntent) -> bool {
        self.send(RuntimeMessage::Intent(intent))
    }

    pub fn hover(&self, fraction: Option<f64>) -> bool {
        self.send(RuntimeMessage::Hover(fraction))
    }

    pub fn pointer_activity(&self) -> bool {
        self.send(RuntimeMessage::PointerActivity)
    }

    /// `None` once the runtime has stopped
    pub async fn snapshot(&self) -> Option<UiSnapshot> {
        let (reply, rx) = oneshot::channel();
        if !self.send(RuntimeMessage::Snapshot(reply)) {
            return None;
        }
        rx.await.ok()
    }
}

/// Receiving side, handed to `PlayerRuntime::spawn`
pub struct PlayerInbox {
    rx: mpsc::UnboundedReceiver<RuntimeMessage>,
}

pub struct PlayerRuntime {
    handle: PlayerHandle,
    effects: mpsc::UnboundedReceiver<UiEffect>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PlayerRuntime {
    /// Create the message channel first so engine factories can hold a handle
    pub fn channel() -> (PlayerHandle, PlayerInbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PlayerHandle { tx }, PlayerInbox { rx })
    }

    /// Mount the player and drive it on a background task
    pub fn spawn<M>(
        mut ui: PlaybackUiController<M>,
        handle: PlayerHandle,
        inbox: PlayerInbox,
        tick_interval: Duration,
    ) -> Self
    where
        M: MediaElement + 'static,
    {
        let (effects_tx, effects) = mpsc::unbounded_channel();
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let mut rx = inbox.rx;

        let task = tokio::spawn(async move {
            let forward = |list: Vec<UiEffect>| {
                for effect in list {
                    if effects_tx.send(effect).is_err() {
                        debug!("effect dropped, host is gone");
                    }
                }
            };

            match ui.mount() {
                Ok(list) => forward(list),
                Err(e) => warn!("player failed to mount: {}", e),
            }

            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    message = rx.recv() => {
                        let Some(message) = message else { break };
                        let list = match message {
                            RuntimeMessage::Engine { generation, event } => {
                                ui.handle_engine_event(generation, event)
                            }
                            RuntimeMessage::Media(event) => ui.handle_media_event(event),
                            RuntimeMessage::Key(key) => ui.handle_key(key).unwrap_or_else(|e| {
                                warn!("key {:?} failed: {}", key, e);
                                Vec::new()
                            }),
                            RuntimeMessage::Intent(intent) => ui.dispatch(intent).unwrap_or_else(|e| {
                                warn!("intent failed: {}", e);
                                Vec::new()
                            }),
                            RuntimeMessage::Hover(Some(fraction)) => {
                                ui.hover(fraction);
                                Vec::new()
                            }
                            RuntimeMessage::Hover(None) => {
                                ui.hover_end();
                                Vec::new()
                            }
                            RuntimeMessage::PointerActivity => {
                                ui.pointer_activity();
                                Vec::new()
                            }
                            RuntimeMessage::Snapshot(reply) => {
                                let _ = reply.send(ui.snapshot());
                                Vec::new()
                            }
                        };
                        let closed = list.contains(&UiEffect::Closed);
                        forward(list);
                        if closed {
                            break;
                        }
                    }
                    _ = interval.tick() => forward(ui.tick()),
                }
            }

            forward(ui.close());
            debug!("player runtime stopped");
        });

        Self {
            handle,
            effects,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    pub fn handle(&self) -> PlayerHandle {
        self.handle.clone()
    }

    /// Next effect from the player; `None` after the task has ended
    pub async fn next_effect(&mut self) -> Option<UiEffect> {
        self.effects.recv().await
    }

    /// Close the player and wait for the task to finish
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("player runtime task failed: {}", e);
            }
        }
    }
}

impl Drop for PlayerRuntime {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::PlayerConfig;
    use crate::domain::PlayerSettings;
    use crate::repositories::{InMemoryKeyValueStore, KvSettingsRepository};
    use crate::services::settings_service::SettingsService;
    use crate::services::streaming::testing::{episode, request, Harness};
    use crate::services::streaming::{SessionState, StreamingSessionController};

    fn spawn(h: &Harness) -> PlayerRuntime {
        h.media.with(|m| m.duration = Some(1200.0));
        let session = StreamingSessionController::new(
            request(vec![episode("a", 1, 1200.0)], "a"),
            h.media.clone(),
            h.services(),
            PlayerConfig::default(),
            PlayerSettings::default(),
        )
        .unwrap();
        let settings = Arc::new(SettingsService::new(Arc::new(KvSettingsRepository::new(
            Arc::new(InMemoryKeyValueStore::new()),
        ))));
        let ui = PlaybackUiController::new(session, settings, h.clock.clone(), PlayerConfig::default());

        let (handle, inbox) = PlayerRuntime::channel();
        PlayerRuntime::spawn(ui, handle, inbox, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_messages_reach_the_player() {
        let h = Harness::new();
        let runtime = spawn(&h);
        let handle = runtime.handle();

        assert!(handle.engine_event(1, EngineEvent::ManifestParsed { levels: 1 }));
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.playback.state, SessionState::Playing);

        handle.key(Key::Char('k'));
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.playback.state, SessionState::Paused);

        runtime.shutdown().await;
        assert_eq!(h.event_count("PlaybackStopped"), 1);
        assert!(handle.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_close_intent_ends_runtime() {
        let h = Harness::new();
        let mut runtime = spawn(&h);
        let handle = runtime.handle();

        handle.intent(PlayerIntent::Close);
        assert_eq!(runtime.next_effect().await, Some(UiEffect::Closed));
        assert_eq!(runtime.next_effect().await, None);
        assert_eq!(h.event_count("PlaybackStopped"), 1);
    }
}

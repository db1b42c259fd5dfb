// events/bus/event_bus.rs
//
// Player event bus.
//
// RULES:
// 1. Synchronous - handlers run on the emitting thread, in subscription order
// 2. Reentrant - a handler may emit or subscribe without deadlocking
// 3. Bounded - the emission log keeps only the most recent entries
// 4. A panicking handler never stops the others

use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use crate::events::types::DomainEvent;

type EventHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Default number of log entries kept. A session saves progress every few
/// seconds, so an unbounded log would grow for as long as the player is open.
pub const DEFAULT_LOG_CAPACITY: usize = 512;

/// Where the player publishes what happened.
///
/// The player emits facts (progress saved, episode switched, playback
/// failed) and outer collaborators such as the tracking-service sync
/// subscribe without the player knowing about them.
#[derive(Clone)]
pub struct EventBus {
    handlers: Arc<RwLock<HashMap<TypeId, Vec<EventHandler>>>>,
    event_log: Arc<RwLock<VecDeque<EventLogEntry>>>,
    log_capacity: usize,
}

/// One emission, as recorded in the log
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub event_type: String,
    pub event_id: String,
    pub occurred_at: String,
    pub handler_count: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_log_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// A capacity of 0 disables the log.
    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            event_log: Arc::new(RwLock::new(VecDeque::with_capacity(log_capacity.min(64)))),
            log_capacity,
        }
    }

    /// Subscribe to one event type.
    ///
    /// ```ignore
    /// bus.subscribe::<EpisodeSwitched, _>(|event| {
    ///     log::info!("now watching {}", event.to);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: EventHandler = Arc::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                log::error!(
                    "failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    /// Record the event and run its handlers before returning.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        // Snapshot so handlers run without the lock held
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();

        let entry = EventLogEntry {
            event_type: event.event_type().to_string(),
            event_id: event.event_id().to_string(),
            occurred_at: event.occurred_at().to_rfc3339(),
            handler_count: handlers.len(),
        };

        log::debug!(
            "[EVENT] {} (id: {}) | {} handlers",
            entry.event_type,
            entry.event_id,
            entry.handler_count
        );
        self.record(entry);

        for (idx, handler) in handlers.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(&event as &dyn Any);
            }));

            if let Err(e) = result {
                log::error!(
                    "handler {} for {} panicked: {:?}",
                    idx,
                    event.event_type(),
                    e
                );
            }
        }
    }

    fn record(&self, entry: EventLogEntry) {
        if self.log_capacity == 0 {
            return;
        }
        let mut log = self.event_log.write().unwrap_or_else(PoisonError::into_inner);
        while log.len() >= self.log_capacity {
            log.pop_front();
        }
        log.push_back(entry);
    }

    /// Oldest first
    pub fn get_event_log(&self) -> Vec<EventLogEntry> {
        self.event_log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn clear_event_log(&self) {
        self.event_log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentId, EpisodeId, SegmentKind};
    use crate::events::types::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn switched() -> EpisodeSwitched {
        EpisodeSwitched::new(ContentId(1), EpisodeId::new("a"), EpisodeId::new("b"), 2, true)
    }

    #[test]
    fn test_subscribe_and_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe::<EpisodeSwitched, _>(move |event| {
            assert!(event.sync_history);
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(switched());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let sequence = Arc::new(Mutex::new(Vec::new()));

        for n in 1..=3 {
            let seq = Arc::clone(&sequence);
            bus.subscribe::<EpisodeCompleted, _>(move |_| {
                seq.lock().unwrap().push(n);
            });
        }

        bus.emit(EpisodeCompleted::new(ContentId(1), EpisodeId::new("a")));

        assert_eq!(*sequence.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_handler_can_emit_and_subscribe() {
        let bus = EventBus::new();
        let completed = Arc::new(AtomicUsize::new(0));

        let inner = bus.clone();
        let counter = Arc::clone(&completed);
        bus.subscribe::<EpisodeSwitched, _>(move |event| {
            let counter = Arc::clone(&counter);
            inner.subscribe::<EpisodeCompleted, _>(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            inner.emit(EpisodeCompleted::new(event.content_id, event.from.clone()));
        });

        bus.emit(switched());

        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count::<EpisodeCompleted>(), 1);
    }

    #[test]
    fn test_event_log_records_emissions() {
        let bus = EventBus::new();

        bus.emit(switched());
        bus.emit(SegmentSkipped::new(
            EpisodeId::new("b"),
            SegmentKind::Opening,
            true,
            150.5,
        ));

        let log = bus.get_event_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].event_type, "EpisodeSwitched");
        assert_eq!(log[1].event_type, "SegmentSkipped");

        bus.clear_event_log();
        assert!(bus.get_event_log().is_empty());
    }

    #[test]
    fn test_event_log_drops_oldest_past_capacity() {
        let bus = EventBus::with_log_capacity(2);

        bus.emit(switched());
        bus.emit(EpisodeCompleted::new(ContentId(1), EpisodeId::new("a")));
        bus.emit(EpisodeCompleted::new(ContentId(1), EpisodeId::new("b")));

        let log = bus.get_event_log();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.event_type == "EpisodeCompleted"));

        let silent = EventBus::with_log_capacity(0);
        silent.emit(switched());
        assert!(silent.get_event_log().is_empty());
    }

    #[test]
    fn test_subscriber_count() {
        let bus = EventBus::new();

        assert_eq!(bus.subscriber_count::<EpisodeSwitched>(), 0);

        bus.subscribe::<EpisodeSwitched, _>(|_| {});
        bus.subscribe::<EpisodeSwitched, _>(|_| {});
        assert_eq!(bus.subscriber_count::<EpisodeSwitched>(), 2);

        assert_eq!(bus.subscriber_count::<EpisodeCompleted>(), 0);
    }

    #[test]
    fn test_handler_panic_doesnt_break_bus() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe::<EpisodeSwitched, _>(|_| {
            panic!("Intentional panic");
        });

        let counter_clone = Arc::clone(&counter);
        bus.subscribe::<EpisodeSwitched, _>(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(switched());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

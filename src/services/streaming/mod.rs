// src/services/streaming/mod.rs
//
// Streaming session: engine lifecycle, seeking, recovery and progress saving

pub mod controller;
pub mod engine;
pub mod recovery;
pub mod seek;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;


pub use controller::{
    PendingOperation, PlaybackSnapshot, PlayerServices, SessionRequest, SkipSnapshot,
    StreamingSessionController,
};
pub use engine::{
    EngineEvent, EngineFactory, ErrorKind, MediaElement, MediaError, MediaEvent, StreamingEngine,
};
pub use state::SessionState;

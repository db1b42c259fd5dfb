// src/runtime/mod.rs
//
// Runtime support for the player
//
// - Clock: the only source of "now" in the playback core
// - Driver: tokio task feeding engine/media/input events into a player

pub mod clock;
pub mod driver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{PlayerHandle, PlayerInbox, PlayerRuntime, RuntimeMessage};

// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Boundary between the UI host and the services
// - Wires storage, clock and event bus into services and players
// - Translates domain values into DTOs and errors into error panels

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use state::AppState;

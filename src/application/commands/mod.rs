// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between UI and Services
// - Commands accept plain values, return DTOs
// - Errors cross the boundary as strings
// - Commands NEVER contain business logic

pub mod history_commands;
pub mod settings_commands;

pub use history_commands::*;
pub use settings_commands::*;

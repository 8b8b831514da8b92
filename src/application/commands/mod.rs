// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between UI and Services
// - Commands accept plain arguments, return DTOs
// - Commands handle error conversion for the UI
// - Commands NEVER contain business logic

pub mod movie_commands;
pub mod preference_commands;
pub mod watchlist_commands;

pub use movie_commands::*;
pub use preference_commands::*;
pub use watchlist_commands::*;

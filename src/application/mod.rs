// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - It provides the boundary between UI and Services
// - It translates between DTOs and domain entities
// - It owns the composition root (AppState)

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType};
pub use state::AppState;

//! HTTP adapter for the board-game state tracker.
//!
//! # Responsibility
//! - Expose game use-cases as JSON routes.
//! - Load server configuration and resolve request actors.

pub mod api;
pub mod config;
pub mod server;
pub mod session;

pub use config::{load_config, ConfigError, ServerConfig};
pub use server::{app_state, router, serve, ServeError};

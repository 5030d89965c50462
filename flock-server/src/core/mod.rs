//! Core module — configuration, state and server
//!
//! - [`Config`] — environment-driven configuration
//! - [`ServerState`] — shared pool + JWT service
//! - [`Server`] — HTTP server

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::{Server, build_app, build_router};
pub use state::ServerState;

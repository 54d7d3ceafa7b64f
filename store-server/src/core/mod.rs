//! Core Module - server configuration, shared state and HTTP server
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - shared handles every request sees
//! - [`Server`] - HTTP server lifecycle

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;

//! Conversation hub — a pluggable conversation agent served over a service
//! call, an HTTP endpoint, and WebSocket commands.

pub mod config;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod server;
pub mod services;
pub mod websocket;

pub use error::{Error, Result};

// Public API for integration tests and embedding the game server

pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod ids;
pub mod prompts;
pub mod protocol;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;

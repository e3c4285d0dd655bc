// Public API for integration tests and potential library usage

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod engine;
pub mod protocol;
pub mod questions;
pub mod registry;
pub mod state;
pub mod timer;
pub mod types;
pub mod ws;

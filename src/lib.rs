// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod app;
pub mod client;
pub mod config;
pub mod game;
pub mod protocol;
pub mod tui;

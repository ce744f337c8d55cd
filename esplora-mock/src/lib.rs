/// Esplora Mock Server Library
///
/// This crate provides both a standalone binary and library components
/// for mocking the Esplora API from in-memory chain state.

pub mod chain;
pub mod handlers;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use chain::{AppState, Fixture, MockChain, MockError};
pub use server::{create_router, run_server, spawn_server};
pub use types::*;

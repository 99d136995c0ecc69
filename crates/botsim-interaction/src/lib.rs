//! Synthetic users for end-to-end bot tests.
//!
//! # Module Structure
//!
//! - `harness`: [`Harness`], starts the mock platform and hands out sessions
//! - `session`: per-user and per-message controllers
//! - `app_client`: signed delivery of events and interactions to the bot
//! - `payload`: wire types exchanged with the bot
//! - `telemetry`: tracing setup for test runs

pub mod app_client;
pub mod harness;
pub mod payload;
pub mod session;
pub mod telemetry;

// Re-export public API
pub use app_client::{AppResponse, AppTransport, HttpAppClient};
pub use harness::Harness;
pub use session::{MessageView, Messages, UserSession};
pub use telemetry::init_tracing;

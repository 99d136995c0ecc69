//! Mock chat platform Web API.
//!
//! # Module Structure
//!
//! - `server`: router, listener lifecycle and shared handler state
//! - `handlers`: `chat.*`, `views.*`, `users.info`, `auth.test`, response URLs
//! - `params`: form or JSON request decoding
//! - `response`: `ok` envelopes and `ApiError`

pub mod handlers;
pub mod params;
pub mod response;
pub mod server;

// Re-export public API
pub use response::ApiError;
pub use server::{MockServer, MockServerHandle, ServerState, router};

pub mod block;
pub mod config;
pub mod error;
pub mod page;
pub mod rendezvous;
pub mod signature;
pub mod store;
pub mod view;

// Re-export common error type
pub use error::{BotsimError, Result};

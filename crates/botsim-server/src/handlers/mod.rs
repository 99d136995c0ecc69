//! Route handlers, one module per Web API family.

pub mod chat;
pub mod users;
pub mod views;

//! Request handlers for the gateway endpoint.

mod gateway;

pub use gateway::*;

//! Optional shared-secret authentication.

mod middleware;

pub use middleware::*;

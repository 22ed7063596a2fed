//! Welcome message and liveness probe.

pub mod handlers;
pub mod routes;

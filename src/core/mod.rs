//! Core application plumbing: configuration, errors, HTTP layers and docs.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod telemetry;

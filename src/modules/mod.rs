//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the remote store client and the tabular file parser.

pub mod storage;
pub mod tabular;

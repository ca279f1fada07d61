//! Workspace scanning.

pub mod types;
pub mod workspace;

//! Editor features over the translation engine.

pub mod backend;
pub mod diagnostics;
pub mod folding;
pub mod goto_definition;
mod handlers;
pub mod hover;
pub mod snapshot;
pub mod state;

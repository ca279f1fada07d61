//! mc-i18n-language-server
//!
//! Language server that recognizes Minecraft translation keys in Java mod
//! sources, folds them to their localized text and links them to `.lang`
//! definitions.

pub mod config;
pub mod db;
pub mod ide;
pub mod indexer;
pub mod input;
pub mod mappings;
pub mod syntax;
pub mod translations;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use ide::backend::Backend;

//! `LanguageServer` method implementations, split by feature.
//!
//! Only used from `ide::backend`.

#![allow(unreachable_pub)]

pub mod document_sync;
pub mod execute_command;
pub mod features;
pub mod lifecycle;
pub mod workspace;

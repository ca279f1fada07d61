//! Indexer type definitions.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::MatcherError;
use crate::input::locale::LocaleFile;
use crate::input::source::SourceFile;
use crate::mappings::McpMappings;

/// Why a workspace folder could not be indexed.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// The configured patterns could not be compiled
    #[error(transparent)]
    Matcher(#[from] MatcherError),
    /// The workspace path is not a readable directory
    #[error("Invalid workspace path: {0}")]
    InvalidPath(String),
}

/// Result of scanning one workspace folder.
#[derive(Debug, Default)]
pub struct IndexedWorkspace {
    /// Java sources by absolute path.
    pub source_files: HashMap<PathBuf, SourceFile>,
    /// `.lang` files by absolute path.
    pub locale_files: HashMap<PathBuf, LocaleFile>,
    /// `None` when no mappings file is configured or it failed to load.
    pub mappings: Option<McpMappings>,
    /// Problems that did not stop indexing, e.g. unreadable files.
    pub warnings: Vec<String>,
}

//! Errors of the Java parsing layer.

use thiserror::Error;

/// Errors raised while building Java syntax trees.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Error when failing to set the language for the parser
    #[error("Failed to set language for parser: {0}")]
    LanguageSetup(#[from] tree_sitter::LanguageError),
    /// Error when the parser gives up on the source code
    #[error("Failed to parse source code")]
    ParseFailed,
}

//! Everything an identification pass reads besides the node itself.

use crate::translations::function::TranslationFunctionCatalog;
use crate::translations::host::{
    CallResolver,
    LocaleLookup,
    NameMapping,
    TypeHierarchy,
};

/// Read-only services for one resolution pass over one source file.
#[derive(Clone, Copy)]
pub struct IdentifyContext<'a> {
    /// Text of the file the nodes belong to.
    pub source: &'a str,
    /// Functions that take a key.
    pub catalog: &'a TranslationFunctionCatalog,
    /// Resolves the call around a key argument.
    pub calls: &'a dyn CallResolver,
    /// Subtype checks against catalog owners.
    pub hierarchy: &'a dyn TypeHierarchy,
    /// MCP to SRG names of game methods.
    pub mappings: &'a dyn NameMapping,
    /// Texts of the lookup locale.
    pub locale: &'a dyn LocaleLookup,
}

impl std::fmt::Debug for IdentifyContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifyContext")
            .field("source_len", &self.source.len())
            .field("catalog", &self.catalog)
            .field("calls", &"<dyn CallResolver>")
            .field("hierarchy", &"<dyn TypeHierarchy>")
            .field("mappings", &"<dyn NameMapping>")
            .field("locale", &"<dyn LocaleLookup>")
            .finish()
    }
}

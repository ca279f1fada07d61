//! MCP name mappings.
//!
//! Mod sources are written against MCP (readable) names while the catalog
//! stores the stable SRG names. The table is read from an SRG file whose
//! method lines look like
//!
//! ```text
//! MD: net/minecraft/client/resources/I18n/format (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String; net/minecraft/client/resources/I18n/func_135052_a (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;
//! ```

use std::collections::{
    HashMap,
    HashSet,
};
use std::path::Path;

use thiserror::Error;

use crate::translations::host::NameMapping;

/// Why a mappings file could not be loaded.
#[derive(Error, Debug)]
pub enum MappingsError {
    /// The file cannot be read.
    #[error("Failed to read mappings file {path}: {source}")]
    Io {
        /// Path as given.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// An `MD:` line without both names and descriptors.
    #[error("Malformed mapping at line {line}: {content}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
}

/// MCP → SRG method name table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McpMappings {
    /// `(owner, mcp name)` → SRG name.
    methods: HashMap<(String, String), String>,
    /// `(owner, SRG name)` pairs, so that code already using SRG names resolves too.
    srg_names: HashSet<(String, String)>,
}

impl McpMappings {
    /// Parses SRG text. Only `MD:` lines are read; other entries are skipped.
    ///
    /// # Errors
    /// Returns [`MappingsError::Malformed`] for an `MD:` line without four fields.
    pub fn parse(text: &str) -> Result<Self, MappingsError> {
        let mut mappings = Self::default();
        for (number, line) in text.lines().enumerate() {
            let Some(rest) = line.trim().strip_prefix("MD:") else {
                continue;
            };
            let malformed =
                || MappingsError::Malformed { line: number + 1, content: line.to_string() };
            let fields: Vec<&str> = rest.split_whitespace().collect();
            let [from, _, to, _] = fields.as_slice() else {
                return Err(malformed());
            };
            let (owner, mcp_name) = split_member(from).ok_or_else(malformed)?;
            let (srg_owner, srg_name) = split_member(to).ok_or_else(malformed)?;
            mappings.srg_names.insert((srg_owner, srg_name.clone()));
            mappings.methods.insert((owner, mcp_name), srg_name);
        }
        Ok(mappings)
    }

    /// Reads and parses an SRG file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is malformed.
    pub async fn load(path: &Path) -> Result<Self, MappingsError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| MappingsError::Io { path: path.display().to_string(), source })?;
        let mappings = Self::parse(&text)?;
        tracing::debug!(path = %path.display(), methods = mappings.len(), "Loaded mappings");
        Ok(mappings)
    }

    /// Number of mapped methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// No method is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl NameMapping for McpMappings {
    fn deobfuscate(&self, owner_type: &str, name: &str) -> Option<String> {
        let key = (owner_type.to_string(), name.to_string());
        if let Some(srg) = self.methods.get(&key) {
            return Some(srg.clone());
        }
        self.srg_names.contains(&key).then(|| name.to_string())
    }
}

/// `net/minecraft/item/Item/setUnlocalizedName` → (`net.minecraft.item.Item`, `setUnlocalizedName`)
fn split_member(path: &str) -> Option<(String, String)> {
    let (owner, name) = path.rsplit_once('/')?;
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some((owner.replace('/', "."), name.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    const SRG: &str = "\
PK: net/minecraft/item net/minecraft/item
CL: net/minecraft/item/Item net/minecraft/item/Item
FD: net/minecraft/item/Item/maxStackSize net/minecraft/item/Item/field_77777_bU
MD: net/minecraft/item/Item/setUnlocalizedName (Ljava/lang/String;)Lnet/minecraft/item/Item; net/minecraft/item/Item/func_77655_b (Ljava/lang/String;)Lnet/minecraft/item/Item;
MD: net/minecraft/client/resources/I18n/format (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String; net/minecraft/client/resources/I18n/func_135052_a (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;
";

    #[rstest]
    #[case::mcp_name("net.minecraft.item.Item", "setUnlocalizedName", Some("func_77655_b"))]
    #[case::srg_name("net.minecraft.item.Item", "func_77655_b", Some("func_77655_b"))]
    #[case::other_owner("net.minecraft.block.Block", "setUnlocalizedName", None)]
    #[case::unknown("net.minecraft.client.resources.I18n", "translate", None)]
    #[case::client_i18n("net.minecraft.client.resources.I18n", "format", Some("func_135052_a"))]
    fn deobfuscate_cases(#[case] owner: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        let mappings = McpMappings::parse(SRG).unwrap();

        assert_eq!(mappings.deobfuscate(owner, name).as_deref(), expected);
    }

    #[googletest::test]
    fn parse_skips_non_method_lines() {
        let mappings = McpMappings::parse(SRG).unwrap();

        expect_that!(mappings.len(), eq(2));
        expect_that!(McpMappings::parse("").unwrap().is_empty(), eq(true));
    }

    #[googletest::test]
    fn malformed_method_line_reports_line_number() {
        let text = "PK: a a\nMD: net/minecraft/item/Item/name (V)V\n";

        let result = McpMappings::parse(text);

        assert!(matches!(result, Err(MappingsError::Malformed { line: 2, .. })));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SRG.as_bytes()).unwrap();

        let mappings = McpMappings::load(file.path()).await.unwrap();

        assert_eq!(mappings.len(), 2);
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let result = McpMappings::load(Path::new("/nonexistent/mcp-srg.srg")).await;

        assert!(matches!(result, Err(MappingsError::Io { .. })));
    }
}

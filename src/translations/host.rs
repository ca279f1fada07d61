//! Services the recognition core consumes from its host.
//!
//! The core never builds syntax trees, reads files or loads mappings itself.
//! Everything it needs beyond the node under inspection comes through these
//! traits, which are implemented by the Java syntax layer, the MCP mappings
//! loader and the locale index.

use regex::Regex;
use tree_sitter::Node;

/// The target of a call-site as resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedCall {
    /// Fully-qualified name of the type declaring the invoked member.
    pub owner_type: String,
    /// Member name as written in source (constructor name for `new X(..)`).
    pub member_name: String,
    /// Encoded parameter types of the selected overload.
    pub parameter_signature: String,
}

impl ResolvedCall {
    /// Resolved member of `owner_type`.
    #[must_use]
    pub fn new(
        owner_type: impl Into<String>,
        member_name: impl Into<String>,
        parameter_signature: impl Into<String>,
    ) -> Self {
        Self {
            owner_type: owner_type.into(),
            member_name: member_name.into(),
            parameter_signature: parameter_signature.into(),
        }
    }
}

/// Resolves call-site nodes: method invocations, `new` expressions and
/// `super(...)`/`this(...)` constructor calls.
pub trait CallResolver {
    /// Returns the invoked member, or `None` when it cannot be determined.
    fn resolve_call(&self, call: Node<'_>) -> Option<ResolvedCall>;
}

/// Answers subtype questions over fully-qualified type names.
pub trait TypeHierarchy {
    /// `true` when `sub` is `sup` or inherits from it.
    fn is_subtype(&self, sub: &str, sup: &str) -> bool;
}

/// Maps source-level member names to the stable names stored in the catalog.
///
/// Implementations are snapshots: a resolution pass sees one consistent table.
pub trait NameMapping {
    /// Maps `name`, declared on `owner_type`, to its stable identifier.
    ///
    /// Returns `None` for names the table does not know.
    fn deobfuscate(&self, owner_type: &str, name: &str) -> Option<String>;
}

/// Looks up localized text.
pub trait LocaleLookup {
    /// Text for an exact key.
    fn text_for(&self, key: &str) -> Option<String>;

    /// Text of the first entry, in file order, whose key matches `pattern`.
    fn text_matching(&self, pattern: &Regex) -> Option<String>;
}

/// Mapping that knows no names. Obfuscated catalog entries never match with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMappings;

impl NameMapping for NoMappings {
    fn deobfuscate(&self, _owner_type: &str, _name: &str) -> Option<String> {
        None
    }
}

/// Hierarchy with no inheritance information: only identical names are related.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatHierarchy;

impl TypeHierarchy for FlatHierarchy {
    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        sub == sup
    }
}

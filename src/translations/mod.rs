//! Translation usage recognition.
//!
//! Given a Java syntax tree, decides which nodes are translation keys passed
//! to one of the functions in the [`TranslationFunctionCatalog`], works out
//! the key they denote and looks up its localized text.

pub mod context;
pub mod function;
pub mod host;
pub mod identifier;
pub mod key;

use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};
use tree_sitter::Node;

pub use context::IdentifyContext;
pub use function::{
    TranslationFunction,
    TranslationFunctionCatalog,
};
pub use identifier::TranslationIdentifier;
pub use key::VARIABLE_MARKER;

use crate::types::{
    SourcePosition,
    SourceRange,
};

/// Prefix of fold group ids; the key follows it.
pub const FOLD_GROUP_PREFIX: &str = "mc.i18n.";

/// A recognized translation usage.
///
/// Borrows its nodes from the syntax tree it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation<'tree> {
    /// Node collapsed when folding.
    pub fold_target: Option<Node<'tree>>,
    /// Node navigable as a reference to the key definition.
    pub reference_target: Option<Node<'tree>>,
    /// Key after prefix and suffix were applied.
    pub key: String,
    /// `key` with [`VARIABLE_MARKER`] in place of non-literal segments.
    pub variable_pattern_key: String,
    /// Localized text, `None` when the key is unresolved.
    pub resolved_text: Option<String>,
    /// Placeholder count of `resolved_text` differs from the supplied arguments.
    pub has_formatting_error: bool,
    /// The key was not a pure literal.
    pub contains_variable: bool,
}

impl Translation<'_> {
    /// Full-match pattern derived from `variable_pattern_key`.
    #[must_use]
    pub fn pattern(&self) -> Option<Regex> {
        key::derive_pattern(&self.variable_pattern_key, VARIABLE_MARKER).ok()
    }

    /// Text shown in place of the folded range.
    #[must_use]
    pub fn display_text(&self) -> String {
        let text = self.resolved_text.as_deref().unwrap_or_default();
        if self.has_formatting_error {
            format!("\"Insufficient parameters for formatting '{text}'\"")
        } else {
            format!("\"{text}\"")
        }
    }

    /// Group shared by all fold regions of the same key.
    #[must_use]
    pub fn group_id(&self) -> String {
        format!("{FOLD_GROUP_PREFIX}{}", self.key)
    }

    /// Owned summary, detached from the syntax tree.
    #[must_use]
    pub fn to_usage(&self, source: &str) -> Option<TranslationUsage> {
        let reference = self.reference_target?;
        Some(TranslationUsage {
            range: SourceRange::from_node(&reference, source),
            reference_range: reference_range(reference, source),
            fold_range: self.fold_target.map(|target| fold_range(target, source)),
            key: self.key.clone(),
            variable_pattern_key: self.variable_pattern_key.clone(),
            resolved_text: self.resolved_text.clone(),
            has_formatting_error: self.has_formatting_error,
            contains_variable: self.contains_variable,
        })
    }
}

/// A [`Translation`] detached from the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUsage {
    /// Range of the key argument as written.
    pub range: SourceRange,
    /// `range` without surrounding quotes.
    pub reference_range: SourceRange,
    /// Range collapsed by the fold region, if any.
    pub fold_range: Option<SourceRange>,
    /// Key with variable parts shown as `$VARIABLE`.
    pub key: String,
    /// Key pattern used to look up definitions.
    pub variable_pattern_key: String,
    /// Text in the lookup locale.
    pub resolved_text: Option<String>,
    /// Format arguments and placeholders disagree.
    pub has_formatting_error: bool,
    /// Part of the key is only known at runtime.
    pub contains_variable: bool,
}

/// A range to collapse and the text to show instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldRegion {
    /// Range to collapse.
    pub range: SourceRange,
    /// Regions with the same group fold and unfold together.
    pub group_id: String,
    /// Quoted text shown in place of the range.
    pub display_text: String,
    /// Key the text belongs to.
    pub key: String,
}

/// A hard reference from a key argument to its `.lang` definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationReference {
    /// Key text inside the quotes.
    pub range: SourceRange,
    /// Key with variable parts shown as `$VARIABLE`.
    pub key: String,
    /// Key used to find definitions when it has variable parts.
    pub pattern_key: String,
    /// Always `false`: an unresolved reference is reported.
    pub soft: bool,
}

/// Runs the identifiers over nodes and subtrees.
#[derive(Debug, Clone, Copy)]
pub struct TranslationEngine<'a> {
    /// Services shared by every identification.
    ctx: IdentifyContext<'a>,
}

impl<'a> TranslationEngine<'a> {
    /// Engine over the services of `ctx`.
    #[must_use]
    pub const fn new(ctx: IdentifyContext<'a>) -> Self {
        Self { ctx }
    }

    /// Services the engine resolves calls with.
    #[must_use]
    pub const fn context(&self) -> &IdentifyContext<'a> {
        &self.ctx
    }

    /// Identifies `node` with the first identifier whose shape accepts it.
    #[must_use]
    pub fn find<'tree>(&self, node: Node<'tree>) -> Option<Translation<'tree>> {
        TranslationIdentifier::ALL
            .into_iter()
            .find(|identifier| identifier.accepts(node))?
            .identify(node, &self.ctx)
    }

    /// All translations under `root`, identifier by identifier, in document order.
    #[must_use]
    pub fn translations_in<'tree>(&self, root: Node<'tree>) -> Vec<Translation<'tree>> {
        let nodes = descendants(root);
        TranslationIdentifier::ALL
            .into_iter()
            .flat_map(|identifier| {
                nodes
                    .iter()
                    .filter(move |node| identifier.accepts(**node))
                    .filter_map(move |node| identifier.identify(*node, &self.ctx))
            })
            .collect()
    }

    /// Fold regions for every translation under `root` that has a fold target.
    #[must_use]
    pub fn fold_regions_in(&self, root: Node<'_>) -> Vec<FoldRegion> {
        self.translations_in(root)
            .into_iter()
            .filter_map(|translation| {
                let target = translation.fold_target?;
                Some(FoldRegion {
                    range: fold_range(target, self.ctx.source),
                    group_id: translation.group_id(),
                    display_text: translation.display_text(),
                    key: translation.key,
                })
            })
            .collect()
    }

    /// Reference descriptor for a recognized key argument.
    #[must_use]
    pub fn reference_for(&self, node: Node<'_>) -> Option<TranslationReference> {
        let translation = self.find(node)?;
        let target = translation.reference_target?;
        Some(TranslationReference {
            range: reference_range(target, self.ctx.source),
            key: translation.key,
            pattern_key: translation.variable_pattern_key,
            soft: false,
        })
    }

    /// Owned usages under `root`.
    #[must_use]
    pub fn usages_in(&self, root: Node<'_>) -> Vec<TranslationUsage> {
        self.translations_in(root)
            .iter()
            .filter_map(|translation| translation.to_usage(self.ctx.source))
            .collect()
    }
}

/// Pre-order list of `root` and its descendants.
fn descendants(root: Node<'_>) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut cursor = root.walk();
    loop {
        nodes.push(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return nodes;
            }
        }
    }
}

/// Range folded for `target`; argument lists keep their parentheses visible.
fn fold_range(target: Node<'_>, source: &str) -> SourceRange {
    let range = SourceRange::from_node(&target, source);
    if target.kind() == "argument_list" { shrink(range, 1) } else { range }
}

/// Range of `target` without the surrounding quotes, if it is quoted.
fn reference_range(target: Node<'_>, source: &str) -> SourceRange {
    let range = SourceRange::from_node(&target, source);
    key::node_text(target, source).and_then(quote_width).map_or(range, |width| shrink(range, width))
}

/// Width of the delimiter around a quoted literal: 3 for a text block, 1 for a string.
fn quote_width(text: &str) -> Option<u32> {
    if text.len() >= 6 && text.starts_with("\"\"\"") && text.ends_with("\"\"\"") {
        Some(3)
    } else if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        Some(1)
    } else {
        None
    }
}

/// `range` with `width` columns dropped at each end.
const fn shrink(range: SourceRange, width: u32) -> SourceRange {
    SourceRange {
        start: SourcePosition {
            line: range.start.line,
            character: range.start.character + width,
        },
        end: SourcePosition {
            line: range.end.line,
            character: range.end.character.saturating_sub(width),
        },
    }
}

//! Recognition of translation call-sites, one variant per key-argument shape.

use tree_sitter::Node;

use crate::translations::Translation;
use crate::translations::context::IdentifyContext;
use crate::translations::key::{
    KeySkeleton,
    VARIABLE_MARKER,
    count_format_arguments,
    derive_pattern,
    extract_key,
    string_literal_value,
};

/// Node kinds that invoke a method or constructor.
const CALL_KINDS: &[&str] =
    &["method_invocation", "object_creation_expression", "explicit_constructor_invocation"];

/// The ways a key argument can be written.
///
/// Order of [`TranslationIdentifier::ALL`] is the priority order: the first
/// variant whose shape accepts a node decides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationIdentifier {
    /// `I18n.format("gui.title")`
    Literal,
    /// `I18n.format("item." + name + ".name")`, `I18n.format(KEY)`
    Reference,
}

impl TranslationIdentifier {
    /// Every identifier, highest priority first.
    pub const ALL: [Self; 2] = [Self::Literal, Self::Reference];

    /// Checks the syntactic shape only: a direct call argument of the right kind.
    #[must_use]
    pub fn accepts(self, node: Node<'_>) -> bool {
        if !node.is_named() || node.is_extra() || node.parent().is_none_or(|p| !is_call_arguments(p))
        {
            return false;
        }
        match self {
            Self::Literal => node.kind() == "string_literal",
            Self::Reference => node.kind() != "string_literal",
        }
    }

    /// Tries to turn `node` into a [`Translation`].
    ///
    /// Returns `None` when the shape does not fit, the call cannot be resolved,
    /// no catalog entry matches or the key cannot be decomposed.
    #[must_use]
    pub fn identify<'tree>(
        self,
        node: Node<'tree>,
        ctx: &IdentifyContext<'_>,
    ) -> Option<Translation<'tree>> {
        if !self.accepts(node) {
            return None;
        }
        let arguments = node.parent()?;
        let call = arguments.parent()?;

        let resolved = ctx.calls.resolve_call(call)?;
        let function = ctx.catalog.lookup(&resolved, ctx.hierarchy, ctx.mappings)?;

        let argument_nodes = named_arguments(arguments);
        let key_index = argument_nodes.iter().position(|argument| argument.id() == node.id())?;
        if key_index != function.key_argument_index {
            return None;
        }

        let skeleton = match self {
            Self::Literal => KeySkeleton::literal(string_literal_value(node, ctx.source)?),
            Self::Reference => extract_key(node, ctx.source)?,
        };
        let contains_variable = !skeleton.is_literal();
        let variable_pattern_key = function.decorate(&skeleton.render(VARIABLE_MARKER));
        let key = variable_pattern_key.clone();

        let fold_target = if function.folds_parameters { arguments } else { node };

        let resolved_text = if contains_variable {
            derive_pattern(&variable_pattern_key, VARIABLE_MARKER)
                .ok()
                .and_then(|pattern| ctx.locale.text_matching(&pattern))
        } else {
            ctx.locale.text_for(&key)
        };

        let has_formatting_error = function.formatting
            && resolved_text.as_deref().is_some_and(|text| {
                let supplied = argument_nodes.len().saturating_sub(function.key_argument_index + 1);
                count_format_arguments(text) != supplied
            });

        Some(Translation {
            fold_target: Some(fold_target),
            reference_target: Some(node),
            key,
            variable_pattern_key,
            resolved_text,
            has_formatting_error,
            contains_variable,
        })
    }
}

/// `argument_list` of a method or constructor call.
fn is_call_arguments(node: Node<'_>) -> bool {
    node.kind() == "argument_list" && node.parent().is_some_and(|call| CALL_KINDS.contains(&call.kind()))
}

/// Arguments of a call, comments excluded.
fn named_arguments(arguments: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = arguments.walk();
    arguments.named_children(&mut cursor).filter(|child| !child.is_extra()).collect()
}

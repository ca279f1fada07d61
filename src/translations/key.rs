//! Key extraction and matching patterns.
//!
//! A key argument is decomposed into a [`KeySkeleton`]: literal segments kept
//! verbatim, everything that is only known at runtime collapsed into a
//! variable segment. Skeletons with variable segments are matched against
//! locale keys through [`derive_pattern`].

use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

/// Stand-in for a non-literal segment of a key.
pub const VARIABLE_MARKER: &str = "$VARIABLE";

/// Lazy wildcard joining the literal segments of a pattern.
const WILDCARD: &str = "(.*?)";

/// Constant references are followed at most this deep.
const MAX_CONSTANT_DEPTH: usize = 8;

/// Java `Formatter` specifier, as accepted by Minecraft's `I18n`.
#[allow(clippy::unwrap_used)]
static FORMAT_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(?:(\d+)\$)?([-#+ 0,(<]*)(?:\d+)?(?:\.\d+)?[tT]?([a-zA-Z%])").unwrap()
});

/// One piece of a key expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySegment {
    /// Known text.
    Literal(String),
    /// Text only known at runtime.
    Variable,
}

/// A key expression split into literal and variable segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySkeleton {
    /// Adjacent literals are merged.
    segments: Vec<KeySegment>,
}

impl KeySkeleton {
    /// Skeleton of a fully known key.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        let mut skeleton = Self::default();
        skeleton.push_literal(text.into());
        skeleton
    }

    /// Appends text, merging with a trailing literal.
    fn push_literal(&mut self, text: String) {
        if let Some(KeySegment::Literal(last)) = self.segments.last_mut() {
            last.push_str(&text);
        } else {
            self.segments.push(KeySegment::Literal(text));
        }
    }

    /// Appends a runtime part.
    fn push_variable(&mut self) {
        self.segments.push(KeySegment::Variable);
    }

    /// Appends either kind of segment.
    fn push(&mut self, segment: KeySegment) {
        match segment {
            KeySegment::Literal(text) => self.push_literal(text),
            KeySegment::Variable => self.push_variable(),
        }
    }

    /// Segments in source order.
    #[must_use]
    pub fn segments(&self) -> &[KeySegment] {
        &self.segments
    }

    /// `true` when no segment is variable.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        !self.segments.iter().any(|segment| matches!(segment, KeySegment::Variable))
    }

    /// Renders the skeleton with `marker` in place of every variable segment.
    #[must_use]
    pub fn render(&self, marker: &str) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                KeySegment::Literal(text) => text.as_str(),
                KeySegment::Variable => marker,
            })
            .collect()
    }
}

/// Builds a full-match pattern from a key containing `marker` placeholders.
///
/// Every literal segment is escaped before the wildcards are put in, so dots
/// and parentheses in keys stay literal. A key without a marker yields an
/// exact-match pattern.
pub fn derive_pattern(variable_pattern_key: &str, marker: &str) -> Result<Regex, regex::Error> {
    let body = variable_pattern_key
        .split(marker)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(WILDCARD);
    Regex::new(&format!("^{body}$"))
}

/// Number of arguments a format string consumes.
///
/// `%%` and `%n` consume nothing, `%<s` reuses the previous argument and an
/// explicit index `%3$s` requires at least that many arguments.
#[must_use]
pub fn count_format_arguments(text: &str) -> usize {
    let mut sequential = 0;
    let mut highest_index = 0;

    for captures in FORMAT_SPECIFIER.captures_iter(text) {
        let conversion = captures.get(3).map_or("", |m| m.as_str());
        if conversion == "%" || conversion == "n" {
            continue;
        }
        if let Some(index) = captures.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
            highest_index = highest_index.max(index);
            continue;
        }
        if captures.get(2).is_some_and(|flags| flags.as_str().contains('<')) {
            continue;
        }
        sequential += 1;
    }

    sequential.max(highest_index)
}

/// Decomposes a key argument into a skeleton.
///
/// Returns `None` for expressions that cannot denote a string key: syntax
/// errors, non-`+` operators, lambdas, or a lone non-string literal.
#[must_use]
pub fn extract_key(node: Node<'_>, source: &str) -> Option<KeySkeleton> {
    if node.has_error() || is_non_string_literal(node.kind()) || is_numeric(node, source, 0) {
        return None;
    }
    let mut skeleton = KeySkeleton::default();
    collect_segments(node, source, 0, &mut skeleton).then_some(skeleton)
}

/// Integer literal node kinds.
const INTEGER_LITERALS: &[&str] = &[
    "decimal_integer_literal",
    "hex_integer_literal",
    "octal_integer_literal",
    "binary_integer_literal",
];

/// Floating point literal node kinds.
const FLOAT_LITERALS: &[&str] = &["decimal_floating_point_literal", "hex_floating_point_literal"];

/// Literals whose value is not a `String`.
fn is_non_string_literal(kind: &str) -> bool {
    INTEGER_LITERALS.contains(&kind)
        || FLOAT_LITERALS.contains(&kind)
        || matches!(kind, "character_literal" | "true" | "false" | "null_literal")
}

/// Whether `node` has a numeric or `char` type, so that `+` on two of them adds.
///
/// Names that do not resolve to a constant are assumed to be strings.
fn is_numeric(node: Node<'_>, source: &str, depth: usize) -> bool {
    match node.kind() {
        kind if INTEGER_LITERALS.contains(&kind) || FLOAT_LITERALS.contains(&kind) => true,
        "character_literal" => true,
        "parenthesized_expression" => {
            node.named_child(0).is_some_and(|inner| is_numeric(inner, source, depth))
        }
        "binary_expression" => {
            let operator = node.child_by_field_name("operator").and_then(|op| node_text(op, source));
            matches!(operator, Some("+" | "-" | "*" | "/" | "%"))
                && node.child_by_field_name("left").is_some_and(|l| is_numeric(l, source, depth))
                && node.child_by_field_name("right").is_some_and(|r| is_numeric(r, source, depth))
        }
        "identifier" | "field_access" => {
            depth < MAX_CONSTANT_DEPTH
                && resolve_constant(node, source)
                    .is_some_and(|value| is_numeric(value, source, depth + 1))
        }
        _ => false,
    }
}

/// Compile-time value of an integer or `char` expression built from
/// literals, `+` and constants. `None` on overflow or anything else.
fn integer_value(node: Node<'_>, source: &str, depth: usize) -> Option<i64> {
    match node.kind() {
        kind if INTEGER_LITERALS.contains(&kind) => parse_integer_literal(node_text(node, source)?),
        "character_literal" => {
            let text = node_text(node, source)?;
            let unescaped = unescape_java(strip_quotes(text, '\''));
            let mut chars = unescaped.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return None;
            };
            Some(i64::from(u32::from(c)))
        }
        "parenthesized_expression" => integer_value(node.named_child(0)?, source, depth),
        "binary_expression" => {
            let operator = node.child_by_field_name("operator").and_then(|op| node_text(op, source));
            if operator != Some("+") {
                return None;
            }
            let left = integer_value(node.child_by_field_name("left")?, source, depth)?;
            let right = integer_value(node.child_by_field_name("right")?, source, depth)?;
            left.checked_add(right)
        }
        "identifier" | "field_access" if depth < MAX_CONSTANT_DEPTH => {
            integer_value(resolve_constant(node, source)?, source, depth + 1)
        }
        _ => None,
    }
}

/// Value of a Java integer literal: `0x10`, `0b101`, `017`, `1_000L`.
///
/// `int` literals in hex, octal or binary wrap to 32 bits like Java does.
#[allow(clippy::cast_possible_wrap)]
fn parse_integer_literal(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let long = digits.ends_with(['l', 'L']);
    let digits = digits.trim_end_matches(['l', 'L']);

    let (body, radix) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(binary) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (binary, 2)
    } else if let Some(octal) = digits.strip_prefix('0').filter(|rest| !rest.is_empty()) {
        (octal, 8)
    } else {
        return digits.parse().ok();
    };

    if long {
        u64::from_str_radix(body, radix).ok().map(|value| value as i64)
    } else {
        u32::from_str_radix(body, radix).ok().map(|value| i64::from(value as i32))
    }
}

/// Decimal text of a folded integer, or a variable segment.
fn integer_segment(value: Option<i64>) -> KeySegment {
    value.map_or(KeySegment::Variable, |value| KeySegment::Literal(value.to_string()))
}

/// Appends the segments of `node` to `out`. `false` when `node` cannot be part of a key.
fn collect_segments(node: Node<'_>, source: &str, depth: usize, out: &mut KeySkeleton) -> bool {
    match node.kind() {
        "string_literal" => {
            let Some(text) = string_literal_value(node, source) else {
                return false;
            };
            out.push_literal(text);
            true
        }
        "character_literal" => {
            let Some(text) = node_text(node, source) else {
                return false;
            };
            out.push_literal(unescape_java(strip_quotes(text, '\'')));
            true
        }
        kind if INTEGER_LITERALS.contains(&kind) => {
            out.push(integer_segment(integer_value(node, source, depth)));
            true
        }
        // Java prints doubles in its own notation.
        kind if FLOAT_LITERALS.contains(&kind) => {
            out.push_variable();
            true
        }
        kind if is_non_string_literal(kind) => {
            let Some(text) = node_text(node, source) else {
                return false;
            };
            out.push_literal(text.to_string());
            true
        }
        "binary_expression" => {
            let operator = node.child_by_field_name("operator").and_then(|op| node_text(op, source));
            if operator != Some("+") {
                if is_numeric(node, source, depth) {
                    out.push_variable();
                    return true;
                }
                return false;
            }
            let numeric = |side: &str| {
                node.child_by_field_name(side).is_some_and(|n| is_numeric(n, source, depth))
            };
            if numeric("left") && numeric("right") {
                out.push(integer_segment(integer_value(node, source, depth)));
                return true;
            }
            let (Some(left), Some(right)) =
                (node.child_by_field_name("left"), node.child_by_field_name("right"))
            else {
                return false;
            };
            collect_segments(left, source, depth, out) && collect_segments(right, source, depth, out)
        }
        "parenthesized_expression" => node
            .named_child(0)
            .is_some_and(|inner| collect_segments(inner, source, depth, out)),
        "identifier" | "field_access" => {
            if depth < MAX_CONSTANT_DEPTH
                && let Some(value) = resolve_constant(node, source)
            {
                let mut folded = KeySkeleton::default();
                if collect_segments(value, source, depth + 1, &mut folded) {
                    for segment in folded.segments {
                        out.push(segment);
                    }
                    return true;
                }
            }
            out.push_variable();
            true
        }
        "method_invocation"
        | "array_access"
        | "ternary_expression"
        | "cast_expression"
        | "object_creation_expression" => {
            out.push_variable();
            true
        }
        _ => false,
    }
}

/// Finds the initializer of the `final` variable or field `node` refers to.
///
/// Only declarations in the same file are considered: `final` locals declared
/// before the use, and `final` fields of the enclosing classes (plain or
/// qualified by `this` or the class name).
fn resolve_constant<'tree>(node: Node<'tree>, source: &str) -> Option<Node<'tree>> {
    let (qualifier, name) = match node.kind() {
        "identifier" => (None, node_text(node, source)?),
        "field_access" => {
            let object = node.child_by_field_name("object")?;
            let field = node.child_by_field_name("field")?;
            (Some(object), node_text(field, source)?)
        }
        _ => return None,
    };

    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "block" | "constructor_body" if qualifier.is_none() => {
                if let Some(value) = find_local_constant(parent, name, node.start_byte(), source) {
                    return Some(value);
                }
            }
            "class_body" | "interface_body" | "enum_body" => {
                let class_matches = qualifier.is_none_or(|object| match object.kind() {
                    "this" => true,
                    "identifier" => parent
                        .parent()
                        .and_then(|class| class.child_by_field_name("name"))
                        .and_then(|class_name| node_text(class_name, source))
                        == node_text(object, source),
                    _ => false,
                });
                if class_matches
                    && let Some(value) = find_field_constant(parent, name, source)
                {
                    return Some(value);
                }
            }
            _ => {}
        }
        current = parent;
    }
    None
}

/// `final` local named `name` declared in a block enclosing `node`, before it.
fn find_local_constant<'tree>(
    block: Node<'tree>,
    name: &str,
    before: usize,
    source: &str,
) -> Option<Node<'tree>> {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "local_variable_declaration" && child.end_byte() <= before)
        .filter(|declaration| has_final_modifier(*declaration))
        .find_map(|declaration| declarator_value(declaration, name, source))
}

/// `final` field `name` declared in the class body `body`.
fn find_field_constant<'tree>(body: Node<'tree>, name: &str, source: &str) -> Option<Node<'tree>> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "field_declaration" | "constant_declaration"))
        .filter(|declaration| {
            declaration.kind() == "constant_declaration" || has_final_modifier(*declaration)
        })
        .find_map(|declaration| declarator_value(declaration, name, source))
}

/// Declaration carries a `final` modifier.
fn has_final_modifier(declaration: Node<'_>) -> bool {
    let mut cursor = declaration.walk();
    declaration
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "modifiers")
        .any(|modifiers| {
            let mut inner = modifiers.walk();
            modifiers.children(&mut inner).any(|modifier| modifier.kind() == "final")
        })
}

/// Initializer of the declarator called `name`.
fn declarator_value<'tree>(
    declaration: Node<'tree>,
    name: &str,
    source: &str,
) -> Option<Node<'tree>> {
    let mut cursor = declaration.walk();
    declaration
        .children_by_field_name("declarator", &mut cursor)
        .find(|declarator| {
            declarator.child_by_field_name("name").and_then(|n| node_text(n, source)) == Some(name)
        })
        .and_then(|declarator| declarator.child_by_field_name("value"))
}

/// Source text of `node`.
pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    node.utf8_text(source.as_bytes()).ok()
}

/// Value of a Java `string_literal` node with escapes resolved.
#[must_use]
pub fn string_literal_value(node: Node<'_>, source: &str) -> Option<String> {
    let text = node_text(node, source)?;
    if let Some(block) = text.strip_prefix("\"\"\"").and_then(|t| t.strip_suffix("\"\"\"")) {
        return Some(unescape_java(block.trim_start_matches(['\r', '\n'])));
    }
    Some(unescape_java(strip_quotes(text, '"')))
}

/// `text` without one leading and one trailing `quote`.
fn strip_quotes(text: &str, quote: char) -> &str {
    let text = text.strip_prefix(quote).unwrap_or(text);
    text.strip_suffix(quote).unwrap_or(text)
}

/// Resolves Java escape sequences. Unknown escapes are kept as written.
#[must_use]
pub fn unescape_java(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('s') => result.push(' '),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('\\') => result.push('\\'),
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => result.push(decoded),
                    None => {
                        result.push_str("\\u");
                        result.push_str(&hex);
                    }
                }
            }
            Some(digit @ '0'..='7') => {
                let mut value = digit.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|next| next.to_digit(8)) {
                        Some(next) if value * 8 + next <= 0o377 => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                result.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

//! Positions and ranges shared by the parser, the locale index and the LSP layer.

use serde::{
    Deserialize,
    Serialize,
};
use tower_lsp::lsp_types;

/// Zero-based line and column.
///
/// Ordering is line first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Zero-based line.
    pub line: u32,
    /// UTF-16 code units from the start of the line.
    pub character: u32,
}

/// Start and end position, both inclusive for [`SourceRange::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    /// First position.
    pub start: SourcePosition,
    /// Last position.
    pub end: SourcePosition,
}

impl SourceRange {
    /// Span of a syntax node of `source`, in UTF-16 columns.
    #[must_use]
    pub fn from_node(node: &tree_sitter::Node<'_>, source: &str) -> Self {
        Self {
            start: SourcePosition::at_byte(source, node.start_byte(), node.start_position()),
            end: SourcePosition::at_byte(source, node.end_byte(), node.end_position()),
        }
    }

    /// Single-line span, as used for `.lang` entries.
    #[must_use]
    pub const fn on_line(line: u32, start: u32, end: u32) -> Self {
        Self {
            start: SourcePosition { line, character: start },
            end: SourcePosition { line, character: end },
        }
    }

    /// A cursor touching either edge counts as inside.
    #[must_use]
    pub fn contains(&self, position: SourcePosition) -> bool {
        self.start <= position && position <= self.end
    }
}

impl From<lsp_types::Position> for SourcePosition {
    fn from(position: lsp_types::Position) -> Self {
        Self { line: position.line, character: position.character }
    }
}

impl From<SourcePosition> for lsp_types::Position {
    fn from(position: SourcePosition) -> Self {
        Self::new(position.line, position.character)
    }
}

impl From<lsp_types::Range> for SourceRange {
    fn from(range: lsp_types::Range) -> Self {
        Self { start: range.start.into(), end: range.end.into() }
    }
}

impl From<SourceRange> for lsp_types::Range {
    fn from(range: SourceRange) -> Self {
        Self::new(range.start.into(), range.end.into())
    }
}

impl SourcePosition {
    /// Position of byte offset `byte` of `source`, which tree-sitter reports as `point`.
    fn at_byte(source: &str, byte: usize, point: tree_sitter::Point) -> Self {
        let line_start = byte.saturating_sub(point.column);
        let character = source
            .get(line_start..byte)
            .map_or_else(|| u32::try_from(point.column).unwrap_or(u32::MAX), utf16_len);
        Self { line: u32::try_from(point.row).unwrap_or(u32::MAX), character }
    }

    /// tree-sitter point of this position in `source`.
    ///
    /// A column past the end of its line is clamped to the line end.
    #[must_use]
    pub fn to_point(self, source: &str) -> tree_sitter::Point {
        let row = usize::try_from(self.line).unwrap_or(usize::MAX);
        let line = source.split('\n').nth(row).unwrap_or_default();
        let target = usize::try_from(self.character).unwrap_or(usize::MAX);

        let mut units = 0;
        let column = line
            .char_indices()
            .find(|(_, c)| {
                let reached = units >= target;
                units += c.len_utf16();
                reached
            })
            .map_or(line.len(), |(offset, _)| offset);
        tree_sitter::Point { row, column }
    }
}

/// Length of `text` in UTF-16 code units, the unit of LSP columns.
pub(crate) fn utf16_len(text: &str) -> u32 {
    u32::try_from(text.encode_utf16().count()).unwrap_or(u32::MAX)
}

//! Folding ranges that collapse translation keys to their text.

use serde::{
    Deserialize,
    Serialize,
};
use tower_lsp::lsp_types::{
    FoldingRange,
    FoldingRangeKind,
};

use crate::translations::FoldRegion;

/// Payload of the `mcI18n.getFoldRegions` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldRegionsResponse {
    /// Document the regions belong to.
    pub uri: String,
    /// Regions in document order.
    pub regions: Vec<FoldRegion>,
}

/// LSP folding ranges, one per region, labelled with the display text.
#[must_use]
pub fn to_folding_ranges(regions: &[FoldRegion]) -> Vec<FoldingRange> {
    regions
        .iter()
        .map(|region| FoldingRange {
            start_line: region.range.start.line,
            start_character: Some(region.range.start.character),
            end_line: region.range.end.line,
            end_character: Some(region.range.end.character),
            kind: Some(FoldingRangeKind::Region),
            collapsed_text: Some(region.display_text.clone()),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::types::SourceRange;

    fn region(line: u32, start: u32, end: u32, key: &str, text: &str) -> FoldRegion {
        FoldRegion {
            range: SourceRange::on_line(line, start, end),
            group_id: format!("mc.i18n.{key}"),
            display_text: format!("\"{text}\""),
            key: key.to_string(),
        }
    }

    #[googletest::test]
    fn maps_regions_to_ranges() {
        let regions = [
            region(7, 27, 43, "gui.ruby.title", "Ruby Forge"),
            region(11, 27, 56, "gui.ruby.progress", "%d%% done"),
        ];

        let ranges = to_folding_ranges(&regions);

        assert_that!(ranges, len(eq(2)));
        assert_eq!(
            ranges[0],
            FoldingRange {
                start_line: 7,
                start_character: Some(27),
                end_line: 7,
                end_character: Some(43),
                kind: Some(FoldingRangeKind::Region),
                collapsed_text: Some("\"Ruby Forge\"".to_string()),
            }
        );
        assert_eq!(ranges[1].start_line, 11);
    }

    #[googletest::test]
    fn response_serializes_in_camel_case() {
        let response = FoldRegionsResponse {
            uri: "file:///RubyGui.java".to_string(),
            regions: vec![region(7, 27, 43, "gui.ruby.title", "Ruby Forge")],
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["regions"][0]["groupId"], "mc.i18n.gui.ruby.title");
        assert_eq!(json["regions"][0]["displayText"], "\"Ruby Forge\"");
        assert_eq!(json["regions"][0]["range"]["start"]["line"], 7);
    }
}

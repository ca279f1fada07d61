//! Feature requests: `hover`, `definition`, `foldingRange`.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    FoldingRange,
    FoldingRangeParams,
    GotoDefinitionParams,
    GotoDefinitionResponse,
    Hover,
    HoverContents,
    HoverParams,
    MarkupContent,
    MarkupKind,
};

use super::super::backend::Backend;
use crate::types::SourcePosition;

/// `textDocument/hover`
pub async fn handle_hover(backend: &Backend, params: HoverParams) -> Result<Option<Hover>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    tracing::debug!(uri = %uri, line = position.line, character = position.character, "Hover request");

    let Some(file) = backend.source_file(&uri).await else {
        tracing::debug!("Source file not found: {}", uri);
        return Ok(None);
    };

    let hover = backend
        .with_snapshot(|db, snapshot| {
            let usage = snapshot.usage_at(db, file, SourcePosition::from(position))?;
            let content = crate::ide::hover::generate_hover_content(&usage, snapshot.locales())?;
            Some(Hover {
                contents: HoverContents::Markup(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: content,
                }),
                range: Some(usage.reference_range.into()),
            })
        })
        .await;

    if hover.is_none() {
        tracing::debug!("No translation key found at position");
    }

    Ok(hover)
}

/// `textDocument/definition`
pub async fn handle_goto_definition(
    backend: &Backend,
    params: GotoDefinitionParams,
) -> Result<Option<GotoDefinitionResponse>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    tracing::debug!(uri = %uri, line = position.line, character = position.character, "Goto Definition request");

    let Some(file) = backend.source_file(&uri).await else {
        return Ok(None);
    };

    let locations = backend
        .with_snapshot(|db, snapshot| {
            snapshot
                .reference_at(db, file, SourcePosition::from(position))
                .map(|reference| {
                    crate::ide::goto_definition::resolve_reference(&reference, snapshot.locales())
                })
                .unwrap_or_default()
        })
        .await;

    tracing::debug!("Found {} definitions for key", locations.len());

    if locations.is_empty() { Ok(None) } else { Ok(Some(GotoDefinitionResponse::Array(locations))) }
}

/// `textDocument/foldingRange`
pub async fn handle_folding_range(
    backend: &Backend,
    params: FoldingRangeParams,
) -> Result<Option<Vec<FoldingRange>>> {
    let uri = params.text_document.uri;

    if !backend.config_manager.lock().await.get_settings().folding.enabled {
        return Ok(None);
    }

    let Some(file) = backend.source_file(&uri).await else {
        return Ok(None);
    };

    let ranges = backend
        .with_snapshot(|db, snapshot| {
            crate::ide::folding::to_folding_ranges(&snapshot.fold_regions(db, file))
        })
        .await;

    tracing::debug!(uri = %uri, count = ranges.len(), "Folding ranges");

    Ok(Some(ranges))
}

//! `workspace/executeCommand` handler.

use serde_json::Value;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    ExecuteCommandParams,
    Url,
};

use super::super::backend::Backend;
use crate::ide::folding::FoldRegionsResponse;

/// Returns the fold regions of a document, with their group ids.
///
/// `arguments[0]` is the document URI.
pub const GET_FOLD_REGIONS_COMMAND: &str = "mcI18n.getFoldRegions";

/// Dispatches `workspace/executeCommand`. Unknown commands return `None`.
#[allow(clippy::single_match_else)]
pub async fn handle_execute_command(
    backend: &Backend,
    params: ExecuteCommandParams,
) -> Result<Option<Value>> {
    tracing::debug!(command = %params.command, "Execute Command request");

    match params.command.as_str() {
        GET_FOLD_REGIONS_COMMAND => handle_get_fold_regions(backend, &params.arguments).await,
        _ => {
            tracing::warn!("Unknown command: {}", params.command);
            Ok(None)
        }
    }
}

/// `mcI18n.getFoldRegions [uri]`
async fn handle_get_fold_regions(backend: &Backend, arguments: &[Value]) -> Result<Option<Value>> {
    let Some(uri) = arguments.first().and_then(Value::as_str).and_then(|s| Url::parse(s).ok())
    else {
        tracing::warn!("Invalid arguments for {}", GET_FOLD_REGIONS_COMMAND);
        return Ok(None);
    };

    let enabled = backend.config_manager.lock().await.get_settings().folding.enabled;
    let regions = match backend.source_file(&uri).await {
        Some(file) if enabled => {
            backend.with_snapshot(|db, snapshot| snapshot.fold_regions(db, file)).await
        }
        _ => Vec::new(),
    };

    let response = FoldRegionsResponse { uri: uri.to_string(), regions };
    match serde_json::to_value(response) {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            tracing::error!(%error, "Failed to serialize fold regions");
            Ok(None)
        }
    }
}

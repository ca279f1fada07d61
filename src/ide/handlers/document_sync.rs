//! Document synchronization handlers.

use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams,
    DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
};

use super::super::backend::Backend;

/// Tracks the document as open and analyzes it.
pub async fn handle_did_open(backend: &Backend, params: DidOpenTextDocumentParams) {
    let uri = params.text_document.uri;
    tracing::debug!(uri = %uri, "Document opened");

    {
        let mut opened_files = backend.state.opened_files.lock().await;
        opened_files.insert(uri.clone());
    }

    backend.update_and_diagnose(uri, params.text_document.text).await;
}

/// Full-text sync: the last change carries the whole document.
pub async fn handle_did_change(backend: &Backend, params: DidChangeTextDocumentParams) {
    let uri = params.text_document.uri;

    let Some(change) = params.content_changes.into_iter().next_back() else {
        return;
    };

    backend.update_and_diagnose(uri, change.text).await;
}

/// Nothing to do: saved text already arrived through `didChange`.
#[allow(clippy::unused_async)]
pub async fn handle_did_save(_backend: &Backend, params: DidSaveTextDocumentParams) {
    tracing::debug!(uri = %params.text_document.uri, "Document saved");
}

/// Stops tracking the document. Its indexed state stays.
pub async fn handle_did_close(backend: &Backend, params: DidCloseTextDocumentParams) {
    let uri = params.text_document.uri;
    tracing::debug!(uri = %uri, "Document closed");

    {
        let mut opened_files = backend.state.opened_files.lock().await;
        opened_files.remove(&uri);
    }

    backend.client.publish_diagnostics(uri, Vec::new(), None).await;
}

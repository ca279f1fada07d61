//! Workspace-related handlers.

use tower_lsp::lsp_types::{
    DidChangeConfigurationParams,
    DidChangeWatchedFilesParams,
    FileChangeType,
    MessageType,
};

use super::super::backend::Backend;

/// Applies settings pushed by the client and reindexes.
pub async fn handle_did_change_configuration(
    backend: &Backend,
    params: DidChangeConfigurationParams,
) {
    tracing::info!(settings = %params.settings, "didChangeConfiguration received");

    let new_settings = serde_json::from_value::<crate::config::ServerSettings>(
        params.settings.clone(),
    )
    .map(|wrapped| wrapped.mc_i18n)
    .or_else(|_| serde_json::from_value::<crate::config::I18nSettings>(params.settings));

    match new_settings {
        Ok(new_settings) => {
            let mut config_manager = backend.config_manager.lock().await;
            match config_manager.update_settings(new_settings) {
                Ok(()) => {
                    drop(config_manager);
                    tracing::info!("configuration updated successfully");

                    backend.reindex_workspace().await;
                }
                Err(error) => {
                    drop(config_manager);
                    tracing::error!(%error, "configuration validation error");
                    backend
                        .client
                        .log_message(MessageType::ERROR, format!("Configuration error: {error}"))
                        .await;
                }
            }
        }
        Err(error) => tracing::warn!(%error, "ignoring unrecognized settings payload"),
    }
}

/// Keeps the database in sync with files changed outside the editor.
pub async fn handle_did_change_watched_files(
    backend: &Backend,
    params: DidChangeWatchedFilesParams,
) {
    let mut inputs_changed = false;

    for change in params.changes {
        let Some(file_path) = Backend::uri_to_path(&change.uri) else {
            continue;
        };

        if Backend::is_config_file(&file_path) {
            backend.handle_config_file_change(&file_path, change.typ).await;
            continue;
        }

        let Some(kind) = backend.file_kind(&file_path).await else {
            continue;
        };
        tracing::debug!("Watched file changed: {:?}, type: {:?}", file_path, change.typ);

        match change.typ {
            FileChangeType::CREATED | FileChangeType::CHANGED => {
                backend.reload_file(&file_path, kind).await;
                inputs_changed = true;
            }
            FileChangeType::DELETED => {
                backend.remove_file(&file_path, kind).await;
                inputs_changed = true;
            }
            _ => {}
        }
    }

    if inputs_changed {
        backend.send_diagnostics_to_opened_files().await;
    }
}

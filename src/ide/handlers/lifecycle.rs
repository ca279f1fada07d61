//! LSP lifecycle handlers: `initialize`, `initialized`, `shutdown`.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    ExecuteCommandOptions,
    FoldingRangeProviderCapability,
    HoverProviderCapability,
    InitializeParams,
    InitializeResult,
    InitializedParams,
    MessageType,
    NumberOrString,
    OneOf,
    ProgressParams,
    ProgressParamsValue,
    ServerCapabilities,
    ServerInfo,
    TextDocumentSyncCapability,
    TextDocumentSyncKind,
    WorkDoneProgress,
    WorkDoneProgressBegin,
    WorkDoneProgressEnd,
    WorkDoneProgressOptions,
    WorkspaceFoldersServerCapabilities,
    WorkspaceServerCapabilities,
    notification::Progress,
};

use super::super::backend::Backend;
use super::execute_command::GET_FOLD_REGIONS_COMMAND;

/// Progress token of the initial scan.
const INDEXING_TOKEN: &str = "mc-i18n-indexing";

/// Loads settings for the first workspace folder and advertises capabilities.
pub async fn handle_initialize(
    backend: &Backend,
    params: InitializeParams,
) -> Result<InitializeResult> {
    let workspace_root = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .and_then(|folder| folder.uri.to_file_path().ok());

    let mut config_manager = backend.config_manager.lock().await;
    if let Err(error) = config_manager.load_settings(workspace_root) {
        backend
            .client
            .log_message(MessageType::ERROR, format!("Configuration error: {error}"))
            .await;
        tracing::error!("Configuration error during initialize: {}", error);
    }
    drop(config_manager);

    Ok(InitializeResult {
        server_info: Some(ServerInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
        capabilities: ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: vec![GET_FOLD_REGIONS_COMMAND.to_string()],
                work_done_progress_options: WorkDoneProgressOptions::default(),
            }),
            workspace: Some(WorkspaceServerCapabilities {
                workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                    supported: Some(true),
                    change_notifications: Some(OneOf::Left(true)),
                }),
                file_operations: None,
            }),
            ..ServerCapabilities::default()
        },
    })
}

/// Sends one `$/progress` notification for the indexing token.
async fn send_progress(backend: &Backend, progress: WorkDoneProgress) {
    backend
        .client
        .send_notification::<Progress>(ProgressParams {
            token: NumberOrString::String(INDEXING_TOKEN.to_string()),
            value: ProgressParamsValue::WorkDone(progress),
        })
        .await;
}

/// Indexes the workspace in the background, reporting progress.
pub async fn handle_initialized(backend: &Backend, _: InitializedParams) {
    backend.client.log_message(MessageType::INFO, "initialized!").await;

    if let Ok(workspace_folders) = backend.get_workspace_folders().await {
        backend
            .client
            .log_message(MessageType::INFO, format!("Workspace folders: {workspace_folders:?}"))
            .await;

        for folder in workspace_folders {
            let Some(workspace_path) = Backend::uri_to_path(&folder.uri) else {
                continue;
            };

            send_progress(
                backend,
                WorkDoneProgress::Begin(WorkDoneProgressBegin {
                    title: "Indexing Workspace".to_string(),
                    cancellable: Some(false),
                    message: Some(folder.name.clone()),
                    percentage: None,
                }),
            )
            .await;

            let message = match backend.index_folder(&workspace_path).await {
                Ok(()) => "Workspace indexing complete".to_string(),
                Err(error) => {
                    backend
                        .client
                        .log_message(
                            MessageType::ERROR,
                            format!("error indexing workspace: {error}"),
                        )
                        .await;
                    format!("Indexing failed: {error}")
                }
            };

            send_progress(
                backend,
                WorkDoneProgress::End(WorkDoneProgressEnd { message: Some(message) }),
            )
            .await;
        }

        backend.send_diagnostics_to_opened_files().await;
    }

    backend.register_file_watchers().await;
}

/// Nothing to release.
#[allow(clippy::unused_async)]
pub async fn handle_shutdown() -> Result<()> {
    Ok(())
}

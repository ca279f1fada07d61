//! LSP Backend

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use salsa::Setter;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    Diagnostic,
    DidChangeConfigurationParams,
    DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams,
    DidChangeWatchedFilesRegistrationOptions,
    DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
    ExecuteCommandParams,
    FileChangeType,
    FileSystemWatcher,
    FoldingRange,
    FoldingRangeParams,
    GlobPattern,
    GotoDefinitionParams,
    GotoDefinitionResponse,
    Hover,
    HoverParams,
    InitializeParams,
    InitializeResult,
    InitializedParams,
    MessageType,
    Registration,
    Url,
    WorkspaceFolder,
};
use tower_lsp::{
    Client,
    LanguageServer,
};

use super::handlers;
use super::snapshot::WorkspaceSnapshot;
use super::state::ServerState;
use crate::config::{
    CONFIG_FILE_NAME,
    ConfigManager,
    FileMatcher,
};
use crate::db::I18nDatabaseImpl;
use crate::indexer::types::{
    IndexedWorkspace,
    IndexerError,
};
use crate::indexer::workspace::{
    FileKind,
    WorkspaceIndexer,
};
use crate::input::locale::{
    LANG_EXTENSION,
    LocaleFile,
    locale_from_path,
};
use crate::input::source::{
    SourceFile,
    is_java_uri,
};

/// LSP Backend
#[derive(Clone)]
pub struct Backend {
    /// Connection to the editor.
    pub client: Client,
    /// Settings of the current workspace.
    pub config_manager: Arc<Mutex<ConfigManager>>,
    /// Scans workspace folders.
    pub workspace_indexer: Arc<WorkspaceIndexer>,
    /// Salsa database and open files.
    pub state: ServerState,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("config_manager", &"<ConfigManager>")
            .field("workspace_indexer", &self.workspace_indexer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// Backend with default settings and an empty database.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config_manager: Arc::new(Mutex::new(ConfigManager::new())),
            workspace_indexer: Arc::new(WorkspaceIndexer::new()),
            state: ServerState::new(I18nDatabaseImpl::default()),
        }
    }

    /// Workspace folders reported by the client, empty when there are none.
    ///
    /// # Errors
    /// The request to the client failed.
    pub(crate) async fn get_workspace_folders(&self) -> Result<Vec<WorkspaceFolder>> {
        self.client.workspace_folders().await.map(Option::unwrap_or_default)
    }

    /// `None`, with a warning, for URIs that are not local files.
    pub(crate) fn uri_to_path(uri: &Url) -> Option<PathBuf> {
        uri.to_file_path().map_or_else(
            |()| {
                tracing::warn!("Failed to convert URI to file path: {}", uri);
                None
            },
            Some,
        )
    }

    /// `.mc-i18n.json` anywhere in the workspace.
    pub(crate) fn is_config_file(path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME)
    }

    /// Classifies `path` with the current settings.
    pub(crate) async fn file_kind(&self, path: &Path) -> Option<FileKind> {
        let config = self.config_manager.lock().await;
        let root = config.workspace_root()?.clone();
        let matcher = match FileMatcher::new(root, config.get_settings()) {
            Ok(matcher) => matcher,
            Err(error) => {
                tracing::warn!(%error, "Invalid file patterns");
                return None;
            }
        };
        FileKind::of(&matcher, path)
    }

    /// Scans one workspace folder and merges the result into the state.
    ///
    /// Documents already open keep their in-editor text.
    pub(crate) async fn index_folder(
        &self,
        workspace_path: &Path,
    ) -> std::result::Result<(), IndexerError> {
        let config_manager = self.config_manager.lock().await;
        let db = self.state.db.lock().await.clone();

        let indexed = self
            .workspace_indexer
            .index_workspace(db, workspace_path, &config_manager)
            .await?;
        drop(config_manager);

        let IndexedWorkspace { source_files, locale_files, mappings, warnings } = indexed;
        for warning in warnings {
            self.client.log_message(MessageType::WARNING, warning).await;
        }

        {
            let (_db, mut known_sources, mut known_locales) = self.state.lock_all().await;
            for (path, file) in source_files {
                known_sources.entry(path).or_insert(file);
            }
            for (path, file) in locale_files {
                known_locales.entry(path).or_insert(file);
            }
        }
        if let Some(mappings) = mappings {
            *self.state.mappings.lock().await = Some(Arc::new(mappings));
        }

        Ok(())
    }

    /// Drops all inputs and indexes every workspace folder again.
    pub(crate) async fn reindex_workspace(&self) {
        self.client.log_message(MessageType::INFO, "Reindexing workspace...").await;

        let buffers = self.open_buffers().await;
        self.workspace_indexer.reset();
        self.state.clear().await;

        if let Ok(workspace_folders) = self.get_workspace_folders().await {
            for folder in workspace_folders {
                let Some(workspace_path) = Self::uri_to_path(&folder.uri) else {
                    continue;
                };
                match self.index_folder(&workspace_path).await {
                    Ok(()) => {
                        self.client.log_message(MessageType::INFO, "Reindexing complete").await;
                    }
                    Err(error) => {
                        self.client
                            .log_message(MessageType::ERROR, format!("Reindexing failed: {error}"))
                            .await;
                    }
                }
            }
        }

        for (uri, text) in buffers {
            self.update_document(&uri, text).await;
        }
        self.send_diagnostics_to_opened_files().await;
    }

    /// Builds a snapshot and runs `f` with the database still locked.
    pub(crate) async fn with_snapshot<R>(
        &self,
        f: impl FnOnce(&I18nDatabaseImpl, &WorkspaceSnapshot) -> R,
    ) -> R {
        let default_locale =
            self.config_manager.lock().await.get_settings().default_locale.clone();

        let (db, source_files, locale_files) = self.state.lock_all().await;
        let mappings = self.state.mappings.lock().await.clone();
        let snapshot = WorkspaceSnapshot::build(
            &*db,
            source_files.values(),
            locale_files.values(),
            &default_locale,
            mappings,
        );
        drop(locale_files);
        drop(source_files);

        f(&db, &snapshot)
    }

    /// Indexed or opened Java file behind `uri`.
    pub(crate) async fn source_file(&self, uri: &Url) -> Option<SourceFile> {
        let path = Self::uri_to_path(uri)?;
        self.state.source_files.lock().await.get(&path).copied()
    }

    /// Stores new text for `uri` and republishes diagnostics.
    pub(crate) async fn update_and_diagnose(&self, uri: Url, text: String) {
        match self.update_document(&uri, text).await {
            Some(FileKind::Source) => self.publish_diagnostics(uri).await,
            Some(FileKind::Locale) => self.send_diagnostics_to_opened_files().await,
            None => {}
        }
    }

    /// Stores editor text for a Java or `.lang` document.
    async fn update_document(&self, uri: &Url, text: String) -> Option<FileKind> {
        let path = Self::uri_to_path(uri)?;

        if path.extension().is_some_and(|ext| ext == LANG_EXTENSION) {
            self.update_locale_file(&path, uri, text).await;
            return Some(FileKind::Locale);
        }

        if !is_java_uri(uri.as_str()) {
            return None;
        }
        self.update_source_file(&path, uri, text).await;
        Some(FileKind::Source)
    }

    /// Stores `text` as the contents of a Java file.
    async fn update_source_file(&self, path: &Path, uri: &Url, text: String) {
        let mut db = self.state.db.lock().await;
        let mut source_files = self.state.source_files.lock().await;
        if let Some(existing) = source_files.get(path) {
            existing.set_text(&mut *db).to(text);
        } else {
            let file = SourceFile::new(&*db, uri.to_string(), text);
            source_files.insert(path.to_path_buf(), file);
        }
    }

    /// Ignored unless the file name carries a locale.
    async fn update_locale_file(&self, path: &Path, uri: &Url, text: String) {
        let Some(locale) = locale_from_path(path) else {
            return;
        };
        let mut db = self.state.db.lock().await;
        let mut locale_files = self.state.locale_files.lock().await;
        if let Some(existing) = locale_files.get(path) {
            existing.set_text(&mut *db).to(text);
        } else {
            let file = LocaleFile::new(&*db, uri.to_string(), locale, text);
            locale_files.insert(path.to_path_buf(), file);
        }
    }

    /// Rereads a changed file from disk.
    pub(crate) async fn reload_file(&self, path: &Path, kind: FileKind) {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!("Failed to read file {:?}: {}", path, error);
                return;
            }
        };
        let Ok(uri) = Url::from_file_path(path) else {
            return;
        };
        if self.state.opened_files.lock().await.contains(&uri) {
            return;
        }
        match kind {
            FileKind::Source => self.update_source_file(path, &uri, text).await,
            FileKind::Locale => self.update_locale_file(path, &uri, text).await,
        }
    }

    /// Forgets a deleted file.
    pub(crate) async fn remove_file(&self, path: &Path, kind: FileKind) {
        match kind {
            FileKind::Source => {
                self.state.source_files.lock().await.remove(path);
            }
            FileKind::Locale => {
                self.state.locale_files.lock().await.remove(path);
            }
        }
    }

    /// Text of every open document, so a rescan does not lose unsaved edits.
    async fn open_buffers(&self) -> Vec<(Url, String)> {
        let (db, source_files, locale_files) = self.state.lock_all().await;
        let opened = self.state.opened_files.lock().await;
        opened
            .iter()
            .filter_map(|uri| {
                let path = Self::uri_to_path(uri)?;
                let text = match (source_files.get(&path), locale_files.get(&path)) {
                    (Some(file), _) => file.text(&*db).clone(),
                    (None, Some(file)) => file.text(&*db).clone(),
                    (None, None) => return None,
                };
                Some((uri.clone(), text))
            })
            .collect()
    }

    /// Diagnostics for the Java file `uri`, empty for unknown files.
    pub(crate) async fn generate_diagnostics(&self, uri: &Url) -> Vec<Diagnostic> {
        let Some(file) = self.source_file(uri).await else {
            return Vec::new();
        };
        let config = self.config_manager.lock().await.get_settings().diagnostics;
        let index_ready = self.workspace_indexer.is_indexing_completed();

        self.with_snapshot(|db, snapshot| {
            let usages = snapshot.usages(db, file);
            super::diagnostics::generate_diagnostics(
                &usages,
                snapshot.locales(),
                &config,
                index_ready,
            )
        })
        .await
    }

    /// Sends the diagnostics of `uri` to the client.
    pub(crate) async fn publish_diagnostics(&self, uri: Url) {
        let diagnostics = self.generate_diagnostics(&uri).await;
        tracing::debug!(uri = %uri, count = diagnostics.len(), "Publishing diagnostics");
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }

    /// Republishes diagnostics of every open Java file, e.g. after a `.lang` edit.
    pub(crate) async fn send_diagnostics_to_opened_files(&self) {
        let opened: Vec<Url> = self.state.opened_files.lock().await.iter().cloned().collect();
        for uri in opened {
            if is_java_uri(uri.as_str()) {
                self.publish_diagnostics(uri).await;
            }
        }
    }

    /// Asks the client to report changes to sources, locale files and settings.
    pub(crate) async fn register_file_watchers(&self) {
        let watchers = ["**/*.java", "**/*.lang", "**/.mc-i18n.json"]
            .into_iter()
            .map(|pattern| FileSystemWatcher {
                glob_pattern: GlobPattern::String(pattern.to_string()),
                kind: None,
            })
            .collect();

        let register_options =
            match serde_json::to_value(DidChangeWatchedFilesRegistrationOptions { watchers }) {
                Ok(value) => value,
                Err(error) => {
                    tracing::error!(%error, "Failed to serialize watcher registration");
                    return;
                }
            };

        let registration = Registration {
            id: "mc-i18n-file-watchers".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: Some(register_options),
        };

        if let Err(error) = self.client.register_capability(vec![registration]).await {
            tracing::warn!(%error, "Client refused file watcher registration");
        }
    }

    /// Reloads settings after `.mc-i18n.json` changed on disk.
    pub(crate) async fn handle_config_file_change(&self, path: &Path, change: FileChangeType) {
        tracing::info!(path = %path.display(), ?change, "Configuration file changed");

        let mut config_manager = self.config_manager.lock().await;
        let root = config_manager.workspace_root().cloned();
        if let Err(error) = config_manager.load_settings(root) {
            drop(config_manager);
            self.client
                .log_message(MessageType::ERROR, format!("Configuration error: {error}"))
                .await;
            return;
        }
        drop(config_manager);

        self.reindex_workspace().await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handlers::lifecycle::handle_initialize(self, params).await
    }

    async fn initialized(&self, params: InitializedParams) {
        handlers::lifecycle::handle_initialized(self, params).await;
    }

    async fn shutdown(&self) -> Result<()> {
        handlers::lifecycle::handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        handlers::document_sync::handle_did_open(self, params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        handlers::document_sync::handle_did_change(self, params).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        handlers::document_sync::handle_did_save(self, params).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handlers::document_sync::handle_did_close(self, params).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        handlers::workspace::handle_did_change_configuration(self, params).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        handlers::workspace::handle_did_change_watched_files(self, params).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        handlers::features::handle_hover(self, params).await
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        handlers::features::handle_goto_definition(self, params).await
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        handlers::features::handle_folding_range(self, params).await
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        handlers::execute_command::handle_execute_command(self, params).await
    }
}

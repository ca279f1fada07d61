//! Shared state of the language server.

use std::collections::{
    HashMap,
    HashSet,
};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{
    Mutex,
    MutexGuard,
};

use crate::db::I18nDatabaseImpl;
use crate::input::locale::LocaleFile;
use crate::input::source::SourceFile;
use crate::mappings::McpMappings;

/// State shared by every handler.
///
/// # Lock order
///
/// When several locks are held at once, take them in this order:
/// 1. `db`
/// 2. `source_files`
/// 3. `locale_files`
/// 4. `mappings` / `opened_files`
#[derive(Clone)]
pub struct ServerState {
    /// Salsa database of every file input.
    pub db: Arc<Mutex<I18nDatabaseImpl>>,
    /// Java sources by path.
    pub source_files: Arc<Mutex<HashMap<PathBuf, SourceFile>>>,
    /// `.lang` files by path.
    pub locale_files: Arc<Mutex<HashMap<PathBuf, LocaleFile>>>,
    /// Loaded by the last workspace scan.
    pub mappings: Arc<Mutex<Option<Arc<McpMappings>>>>,
    /// URIs of documents open in the client.
    pub opened_files: Arc<Mutex<HashSet<tower_lsp::lsp_types::Url>>>,
}

impl ServerState {
    /// State around `db`, with no files yet.
    #[must_use]
    pub fn new(db: I18nDatabaseImpl) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            source_files: Arc::new(Mutex::new(HashMap::new())),
            locale_files: Arc::new(Mutex::new(HashMap::new())),
            mappings: Arc::new(Mutex::new(None)),
            opened_files: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Locks `db`, `source_files` and `locale_files` in order.
    pub async fn lock_all(
        &self,
    ) -> (
        MutexGuard<'_, I18nDatabaseImpl>,
        MutexGuard<'_, HashMap<PathBuf, SourceFile>>,
        MutexGuard<'_, HashMap<PathBuf, LocaleFile>>,
    ) {
        let db = self.db.lock().await;
        let source_files = self.source_files.lock().await;
        let locale_files = self.locale_files.lock().await;
        (db, source_files, locale_files)
    }

    /// Drops every input; used before a rescan.
    pub async fn clear(&self) {
        let (mut db, mut source_files, mut locale_files) = self.lock_all().await;
        *db = I18nDatabaseImpl::default();
        source_files.clear();
        locale_files.clear();
        drop((db, source_files, locale_files));
        *self.mappings.lock().await = None;
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("db", &"<I18nDatabaseImpl>")
            .field("source_files", &"<HashMap<PathBuf, SourceFile>>")
            .field("locale_files", &"<HashMap<PathBuf, LocaleFile>>")
            .field("mappings", &"<Option<McpMappings>>")
            .field("opened_files", &"<HashSet<Url>>")
            .finish()
    }
}

//! Workspace scan: Java sources, `.lang` files and the mappings file.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use ignore::WalkBuilder;
use tower_lsp::lsp_types::Url;

use crate::config::{
    ConfigManager,
    FileMatcher,
};
use crate::db::I18nDatabaseImpl;
use crate::indexer::types::{
    IndexedWorkspace,
    IndexerError,
};
use crate::input::locale::{
    LocaleFile,
    locale_from_path,
};
use crate::input::source::SourceFile;
use crate::mappings::McpMappings;

/// What the server does with a workspace file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Java compilation unit.
    Source,
    /// `.lang` file.
    Locale,
}

impl FileKind {
    /// Classifies an absolute path; `None` for files the server ignores.
    #[must_use]
    pub fn of(matcher: &FileMatcher, path: &Path) -> Option<Self> {
        if matcher.is_lang_file(path) {
            Some(Self::Locale)
        } else if matcher.is_source_file(path) {
            Some(Self::Source)
        } else {
            None
        }
    }
}

/// Scans workspace folders into salsa inputs.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceIndexer {
    /// Set once the last scan finishes.
    indexing_completed: Arc<AtomicBool>,
}

impl WorkspaceIndexer {
    /// Indexer that has not scanned yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last scan finished. Unresolved-key diagnostics wait for it.
    #[must_use]
    pub fn is_indexing_completed(&self) -> bool {
        self.indexing_completed.load(Ordering::Acquire)
    }

    /// Marks the index stale before a rescan.
    pub fn reset(&self) {
        self.indexing_completed.store(false, Ordering::Release);
    }

    /// Reads every matching file of `workspace_path` and registers it in `db`.
    ///
    /// `db` is a clone of the server database; inputs created on it are
    /// visible through the original. Unreadable files and a broken mappings
    /// file are reported in [`IndexedWorkspace::warnings`] without failing.
    ///
    /// # Errors
    /// - `workspace_path` is not a directory
    /// - The configured patterns do not compile
    pub async fn index_workspace(
        &self,
        db: I18nDatabaseImpl,
        workspace_path: &Path,
        config_manager: &ConfigManager,
    ) -> Result<IndexedWorkspace, IndexerError> {
        tracing::debug!(workspace_path = %workspace_path.display(), "Indexing workspace");

        if !workspace_path.is_dir() {
            return Err(IndexerError::InvalidPath(workspace_path.display().to_string()));
        }

        let settings = config_manager.get_settings();
        let matcher = FileMatcher::new(workspace_path.to_path_buf(), settings)?;
        let files = Self::find_files(&matcher);

        let reads = files.into_iter().map(|(path, kind)| async move {
            let content = tokio::fs::read_to_string(&path).await;
            (path, kind, content)
        });
        let loaded = futures::future::join_all(reads).await;

        let mut indexed = IndexedWorkspace::default();

        if let Some(mappings_file) = &settings.mappings_file {
            match McpMappings::load(&workspace_path.join(mappings_file)).await {
                Ok(mappings) => indexed.mappings = Some(mappings),
                Err(error) => {
                    tracing::warn!(%error, "Mappings not loaded; obfuscated names will not resolve");
                    indexed.warnings.push(error.to_string());
                }
            }
        }

        for (path, kind, content) in loaded {
            let text = match content {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!("Failed to read file {:?}: {}", path, error);
                    indexed.warnings.push(format!("Failed to read {}: {error}", path.display()));
                    continue;
                }
            };

            let Ok(uri) = Url::from_file_path(&path) else {
                tracing::warn!("Failed to create URI for file {:?}", path);
                continue;
            };

            match kind {
                FileKind::Source => {
                    let file = SourceFile::new(&db, uri.to_string(), text);
                    indexed.source_files.insert(path, file);
                }
                FileKind::Locale => {
                    let Some(locale) = locale_from_path(&path) else {
                        continue;
                    };
                    let file = LocaleFile::new(&db, uri.to_string(), locale, text);
                    indexed.locale_files.insert(path, file);
                }
            }
        }

        self.indexing_completed.store(true, Ordering::Release);
        tracing::info!(
            sources = indexed.source_files.len(),
            locales = indexed.locale_files.len(),
            mappings = indexed.mappings.as_ref().map_or(0, McpMappings::len),
            "Workspace indexed"
        );

        Ok(indexed)
    }

    /// Walks the workspace honoring `.gitignore`.
    fn find_files(matcher: &FileMatcher) -> Vec<(PathBuf, FileKind)> {
        let mut found_files = Vec::new();

        for result in WalkBuilder::new(matcher.workspace_root())
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if let Some(kind) = FileKind::of(matcher, entry.path()) {
                found_files.push((entry.path().to_path_buf(), kind));
            }
        }

        found_files
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;
    use crate::config::I18nSettings;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn workspace() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/main/java/ruby/RubyBlock.java", "class RubyBlock {}");
        write(root, "src/main/java/ruby/RubyItem.java", "class RubyItem {}");
        write(root, "src/main/resources/assets/ruby/lang/en_us.lang", "tile.ruby.name=Ruby\n");
        write(root, "src/main/resources/assets/ruby/lang/ja_JP.lang", "tile.ruby.name=ルビー\n");
        write(root, "build/generated/Stale.java", "class Stale {}");
        write(root, "README.md", "# ruby");
        dir
    }

    fn manager_with(settings: I18nSettings) -> ConfigManager {
        let mut manager = ConfigManager::new();
        manager.update_settings(settings).unwrap();
        manager
    }

    #[googletest::test]
    #[tokio::test]
    async fn indexes_sources_and_locales() {
        let dir = workspace();
        let indexer = WorkspaceIndexer::new();
        let db = I18nDatabaseImpl::default();

        let indexed =
            indexer.index_workspace(db.clone(), dir.path(), &ConfigManager::new()).await.unwrap();

        assert_that!(indexed.source_files, len(eq(2)));
        assert_that!(indexed.locale_files, len(eq(2)));
        expect_that!(indexed.mappings, none());
        expect_that!(indexed.warnings, is_empty());
        expect_that!(indexer.is_indexing_completed(), eq(true));

        let mut locales: Vec<String> =
            indexed.locale_files.values().map(|file| file.locale(&db).clone()).collect();
        locales.sort();
        expect_that!(locales, elements_are![eq("en_us"), eq("ja_jp")]);
    }

    #[googletest::test]
    #[tokio::test]
    async fn indexed_workspace_is_debuggable() {
        let dir = workspace();

        let indexed = WorkspaceIndexer::new()
            .index_workspace(I18nDatabaseImpl::default(), dir.path(), &ConfigManager::new())
            .await
            .unwrap();

        let debug_str = format!("{indexed:?}");
        expect_that!(debug_str, contains_substring("IndexedWorkspace"));
        expect_that!(debug_str, contains_substring("RubyBlock.java"));
        expect_that!(debug_str, contains_substring("en_us.lang"));
    }

    #[googletest::test]
    #[tokio::test]
    async fn excluded_directories_are_skipped() {
        let dir = workspace();

        let indexed = WorkspaceIndexer::new()
            .index_workspace(I18nDatabaseImpl::default(), dir.path(), &ConfigManager::new())
            .await
            .unwrap();

        expect_that!(
            indexed.source_files.keys().any(|path| path.ends_with("Stale.java")),
            eq(false)
        );
    }

    #[googletest::test]
    #[tokio::test]
    async fn loads_configured_mappings() {
        let dir = workspace();
        write(
            dir.path(),
            "mcp/mcp-srg.srg",
            "MD: net/minecraft/item/Item/setUnlocalizedName (Ljava/lang/String;)Lnet/minecraft/item/Item; net/minecraft/item/Item/func_77655_b (Ljava/lang/String;)Lnet/minecraft/item/Item;\n",
        );
        let manager = manager_with(I18nSettings {
            mappings_file: Some("mcp/mcp-srg.srg".to_string()),
            ..I18nSettings::default()
        });

        let indexed = WorkspaceIndexer::new()
            .index_workspace(I18nDatabaseImpl::default(), dir.path(), &manager)
            .await
            .unwrap();

        expect_that!(indexed.mappings.as_ref().map(McpMappings::len), some(eq(1)));
    }

    #[googletest::test]
    #[tokio::test]
    async fn missing_mappings_file_is_a_warning() {
        let dir = workspace();
        let manager = manager_with(I18nSettings {
            mappings_file: Some("missing.srg".to_string()),
            ..I18nSettings::default()
        });

        let indexed = WorkspaceIndexer::new()
            .index_workspace(I18nDatabaseImpl::default(), dir.path(), &manager)
            .await
            .unwrap();

        expect_that!(indexed.mappings, none());
        expect_that!(indexed.warnings, len(eq(1)));
        expect_that!(indexed.source_files, len(eq(2)));
    }

    #[googletest::test]
    #[tokio::test]
    async fn invalid_workspace_path_is_an_error() {
        let indexer = WorkspaceIndexer::new();

        let result = indexer
            .index_workspace(
                I18nDatabaseImpl::default(),
                Path::new("/nonexistent/workspace"),
                &ConfigManager::new(),
            )
            .await;

        assert!(matches!(result, Err(IndexerError::InvalidPath(_))));
        expect_that!(indexer.is_indexing_completed(), eq(false));
    }

    #[googletest::test]
    fn reset_clears_completion() {
        let indexer = WorkspaceIndexer::new();
        indexer.indexing_completed.store(true, Ordering::Release);

        indexer.reset();

        expect_that!(indexer.is_indexing_completed(), eq(false));
    }

    #[googletest::test]
    fn file_kind_classifies_paths() {
        let matcher = FileMatcher::new(PathBuf::from("/ws"), &I18nSettings::default()).unwrap();

        expect_that!(FileKind::of(&matcher, Path::new("/ws/src/A.java")), some(eq(FileKind::Source)));
        expect_that!(
            FileKind::of(&matcher, Path::new("/ws/assets/ruby/lang/en_us.lang")),
            some(eq(FileKind::Locale))
        );
        expect_that!(FileKind::of(&matcher, Path::new("/ws/build.gradle")), none());
    }
}

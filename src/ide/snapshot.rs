//! Read-only view of the workspace used to answer one request.

use std::sync::Arc;

use tree_sitter::Node;

use crate::db::I18nDatabase;
use crate::input::locale::{
    LocaleFile,
    LocaleIndex,
};
use crate::input::source::SourceFile;
use crate::mappings::McpMappings;
use crate::syntax::{
    ClassIndex,
    JavaCallResolver,
    java_declarations,
    parse_java,
};
use crate::translations::host::{
    NameMapping,
    NoMappings,
};
use crate::translations::{
    FoldRegion,
    IdentifyContext,
    TranslationEngine,
    TranslationFunctionCatalog,
    TranslationReference,
    TranslationUsage,
};
use crate::types::SourcePosition;

/// Class index, locale index and mappings frozen for one request.
#[derive(Debug, Default)]
pub struct WorkspaceSnapshot {
    /// Functions recognized as taking a key.
    catalog: TranslationFunctionCatalog,
    /// Workspace classes plus catalog stubs.
    classes: ClassIndex,
    /// Locale files, looked up in the configured locale.
    locales: LocaleIndex,
    /// `None` when no mappings file is loaded.
    mappings: Option<Arc<McpMappings>>,
}

impl WorkspaceSnapshot {
    /// Collects everything a request needs from the database.
    #[must_use]
    pub fn build<'a>(
        db: &dyn I18nDatabase,
        sources: impl IntoIterator<Item = &'a SourceFile>,
        locale_files: impl IntoIterator<Item = &'a LocaleFile>,
        lookup_locale: &str,
        mappings: Option<Arc<McpMappings>>,
    ) -> Self {
        let catalog = TranslationFunctionCatalog::default();
        let classes =
            ClassIndex::build(&catalog, sources.into_iter().map(|file| java_declarations(db, *file)));
        let locales = LocaleIndex::from_db(db, lookup_locale, locale_files);
        Self { catalog, classes, locales, mappings }
    }

    /// Locale files of the workspace.
    #[must_use]
    pub const fn locales(&self) -> &LocaleIndex {
        &self.locales
    }

    /// Loaded mappings, or a table that maps nothing.
    fn mappings(&self) -> &dyn NameMapping {
        match &self.mappings {
            Some(mappings) => mappings.as_ref(),
            None => &NoMappings,
        }
    }

    /// Parses `file` and runs `f` with an engine bound to it.
    ///
    /// Returns `None` when the file cannot be parsed.
    pub fn with_engine<R>(
        &self,
        db: &dyn I18nDatabase,
        file: SourceFile,
        f: impl FnOnce(&TranslationEngine<'_>, Node<'_>) -> R,
    ) -> Option<R> {
        let text = file.text(db);
        let tree = match parse_java(text) {
            Ok(tree) => tree,
            Err(error) => {
                tracing::warn!(uri = %file.uri(db), %error, "Skipping unparsable source");
                return None;
            }
        };

        let mappings = self.mappings();
        let calls = JavaCallResolver::new(text, java_declarations(db, file), &self.classes, mappings);
        let engine = TranslationEngine::new(IdentifyContext {
            source: text,
            catalog: &self.catalog,
            calls: &calls,
            hierarchy: &self.classes,
            mappings,
            locale: &self.locales,
        });

        Some(f(&engine, tree.root_node()))
    }

    /// Every recognized key argument of `file`, in document order.
    #[must_use]
    pub fn usages(&self, db: &dyn I18nDatabase, file: SourceFile) -> Vec<TranslationUsage> {
        self.with_engine(db, file, |engine, root| engine.usages_in(root)).unwrap_or_default()
    }

    /// Fold regions of `file`, in document order.
    #[must_use]
    pub fn fold_regions(&self, db: &dyn I18nDatabase, file: SourceFile) -> Vec<FoldRegion> {
        self.with_engine(db, file, |engine, root| engine.fold_regions_in(root)).unwrap_or_default()
    }

    /// The usage whose key argument covers `position`.
    #[must_use]
    pub fn usage_at(
        &self,
        db: &dyn I18nDatabase,
        file: SourceFile,
        position: SourcePosition,
    ) -> Option<TranslationUsage> {
        self.usages(db, file).into_iter().find(|usage| usage.range.contains(position))
    }

    /// Reference descriptor of the key argument under `position`.
    #[must_use]
    pub fn reference_at(
        &self,
        db: &dyn I18nDatabase,
        file: SourceFile,
        position: SourcePosition,
    ) -> Option<TranslationReference> {
        self.with_engine(db, file, |engine, root| {
            let point = position.to_point(engine.context().source);
            let node = root.named_descendant_for_point_range(point, point)?;
            engine.reference_for(enclosing_argument(node)?)
        })
        .flatten()
    }
}

/// Climbs from `node` to the expression passed directly as a call argument.
fn enclosing_argument(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node;
    loop {
        let parent = current.parent()?;
        if parent.kind() == "argument_list" {
            return Some(current);
        }
        current = parent;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use salsa::Setter;

    use super::*;
    use crate::db::I18nDatabaseImpl;
    use crate::input::locale::DEFAULT_LOCALE;
    use crate::test_utils::{
        RUBY_GUI_SOURCE,
        RUBY_GUI_URI,
        client_mappings,
        create_locale_files,
        create_source_file,
    };

    fn snapshot(
        db: &I18nDatabaseImpl,
        source: SourceFile,
        mappings: Option<McpMappings>,
    ) -> WorkspaceSnapshot {
        let locales = create_locale_files(db);
        WorkspaceSnapshot::build(db, [&source], &locales, DEFAULT_LOCALE, mappings.map(Arc::new))
    }

    #[googletest::test]
    fn usages_cover_every_recognized_call() {
        let db = I18nDatabaseImpl::default();
        let source = create_source_file(&db, RUBY_GUI_URI, RUBY_GUI_SOURCE);
        let snapshot = snapshot(&db, source, Some(client_mappings()));

        let usages = snapshot.usages(&db, source);

        let keys: Vec<&str> = usages.iter().map(|usage| usage.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["gui.ruby.title", "gui.ruby.progress", "gui.ruby.missing", "gui.ruby.progress"]
        );
        expect_that!(usages[0].resolved_text, some(eq("Ruby Forge")));
        expect_that!(usages[1].has_formatting_error, eq(false));
        expect_that!(usages[2].resolved_text, none());
        expect_that!(usages[3].has_formatting_error, eq(true));
    }

    #[googletest::test]
    fn obfuscated_calls_need_mappings() {
        let db = I18nDatabaseImpl::default();
        let source = create_source_file(&db, RUBY_GUI_URI, RUBY_GUI_SOURCE);
        let snapshot = snapshot(&db, source, None);

        let usages = snapshot.usages(&db, source);

        assert_that!(usages, len(eq(1)));
        expect_that!(usages[0].key, eq("gui.ruby.missing"));
    }

    #[googletest::test]
    fn fold_regions_carry_group_and_text() {
        let db = I18nDatabaseImpl::default();
        let source = create_source_file(&db, RUBY_GUI_URI, RUBY_GUI_SOURCE);
        let snapshot = snapshot(&db, source, Some(client_mappings()));

        let regions = snapshot.fold_regions(&db, source);

        assert_that!(regions, len(eq(4)));
        expect_that!(regions[0].group_id, eq("mc.i18n.gui.ruby.title"));
        expect_that!(regions[0].display_text, eq("\"Ruby Forge\""));
        expect_that!(
            regions[3].display_text,
            eq("\"Insufficient parameters for formatting '%d%% done'\"")
        );
    }

    #[googletest::test]
    fn usage_at_finds_key_under_cursor() {
        let db = I18nDatabaseImpl::default();
        let source = create_source_file(&db, RUBY_GUI_URI, RUBY_GUI_SOURCE);
        let snapshot = snapshot(&db, source, Some(client_mappings()));

        let usage = snapshot.usage_at(&db, source, SourcePosition { line: 7, character: 30 });

        expect_that!(usage.map(|u| u.key), some(eq("gui.ruby.title")));
        expect_that!(
            snapshot.usage_at(&db, source, SourcePosition { line: 5, character: 3 }),
            none()
        );
    }

    #[googletest::test]
    fn reference_at_strips_quotes() {
        let db = I18nDatabaseImpl::default();
        let source = create_source_file(&db, RUBY_GUI_URI, RUBY_GUI_SOURCE);
        let snapshot = snapshot(&db, source, Some(client_mappings()));

        let reference =
            snapshot.reference_at(&db, source, SourcePosition { line: 7, character: 30 }).unwrap();

        expect_that!(reference.key, eq("gui.ruby.title"));
        expect_that!(reference.range.start, eq(SourcePosition { line: 7, character: 28 }));
        expect_that!(reference.soft, eq(false));
    }

    #[googletest::test]
    fn cursor_columns_count_utf16_units() {
        let db = I18nDatabaseImpl::default();
        let text = RUBY_GUI_SOURCE.replace(
            "return I18n.format(\"gui.ruby.title\");",
            "String s = \"ééééé\"; return I18n.format(\"gui.ruby.title\");",
        );
        let source = create_source_file(&db, RUBY_GUI_URI, &text);
        let snapshot = snapshot(&db, source, Some(client_mappings()));
        let cursor = SourcePosition { line: 7, character: 50 };

        let usage = snapshot.usage_at(&db, source, cursor).unwrap();
        let reference = snapshot.reference_at(&db, source, cursor).unwrap();

        expect_that!(usage.key, eq("gui.ruby.title"));
        expect_that!(usage.range.start, eq(SourcePosition { line: 7, character: 47 }));
        expect_that!(reference.key, eq("gui.ruby.title"));
        expect_that!(reference.range.start, eq(SourcePosition { line: 7, character: 48 }));
    }

    #[googletest::test]
    fn edits_are_seen_by_the_next_snapshot() {
        let mut db = I18nDatabaseImpl::default();
        let source = create_source_file(&db, RUBY_GUI_URI, RUBY_GUI_SOURCE);
        let before = snapshot(&db, source, Some(client_mappings())).usages(&db, source).len();

        source.set_text(&mut db).to(RUBY_GUI_SOURCE.replace("gui.ruby.title", "gui.ruby.other"));
        let after = snapshot(&db, source, Some(client_mappings())).usages(&db, source);

        expect_that!(after, len(eq(before)));
        expect_that!(after[0].resolved_text, none());
    }
}

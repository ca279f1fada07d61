//! `.lang` locale files.
//!
//! A locale file is a list of `key=value` lines. Blank lines and lines
//! starting with `#` are skipped, as are lines without `=`. When a key is
//! defined twice, lookups see the first definition; navigation sees both.

use std::path::Path;

use regex::Regex;

use crate::db::I18nDatabase;
use crate::translations::host::LocaleLookup;
use crate::types::{
    SourceRange,
    utf16_len,
};

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "en_us";

/// File extension of locale files.
pub const LANG_EXTENSION: &str = "lang";

/// A `.lang` file.
#[salsa::input(debug)]
pub struct LocaleFile {
    /// URI the file was read from.
    #[returns(ref)]
    pub uri: String,

    /// Lower-cased locale code, e.g. `en_us`.
    #[returns(ref)]
    pub locale: String,

    /// Contents, from disk or from the editor.
    #[returns(ref)]
    pub text: String,
}

/// One `key=value` line.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub struct LangEntry {
    /// Trailing whitespace removed.
    pub key: String,
    /// Everything after the first `=`, untouched.
    pub value: String,
    /// Range of the key on its line.
    pub key_range: SourceRange,
    /// Range of the whole `key=value` text.
    pub range: SourceRange,
}

/// Entries of a locale file in file order.
#[salsa::tracked(returns(ref))]
pub fn lang_entries(db: &dyn I18nDatabase, file: LocaleFile) -> Vec<LangEntry> {
    parse_lang(file.text(db))
}

/// Parses `.lang` text.
#[must_use]
pub fn parse_lang(text: &str) -> Vec<LangEntry> {
    text.lines()
        .enumerate()
        .filter_map(|(number, raw)| {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let content = line.trim_start();
            if content.is_empty() || content.starts_with('#') {
                return None;
            }
            let (key, value) = content.split_once('=')?;
            let key = key.trim_end();
            if key.is_empty() {
                return None;
            }
            let line_number = u32::try_from(number).ok()?;
            let start = utf16_len(line.strip_suffix(content).unwrap_or_default());
            let key_end = start + utf16_len(key);
            let line_end = start + utf16_len(content);
            Some(LangEntry {
                key: key.to_string(),
                value: value.to_string(),
                key_range: SourceRange::on_line(line_number, start, key_end),
                range: SourceRange::on_line(line_number, start, line_end),
            })
        })
        .collect()
}

/// Locale code from a file path: `assets/mod/lang/en_US.lang` → `en_us`.
#[must_use]
pub fn locale_from_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(LANG_EXTENSION) {
        return None;
    }
    path.file_stem().and_then(|stem| stem.to_str()).map(str::to_lowercase)
}

/// A parsed locale file as seen by one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedLocale {
    /// URI of the file.
    pub uri: String,
    /// Lower-cased locale code.
    pub locale: String,
    /// In file order.
    pub entries: Vec<LangEntry>,
}

/// Where a key is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleDefinition<'a> {
    /// URI of the defining file.
    pub uri: &'a str,
    /// Locale of the defining file.
    pub locale: &'a str,
    /// The defining line.
    pub entry: &'a LangEntry,
}

/// All locale files of the workspace, with lookups against one locale.
#[derive(Debug, Clone, Default)]
pub struct LocaleIndex {
    /// Sorted by locale, then URI.
    files: Vec<IndexedLocale>,
    /// Locale used by [`LocaleIndex::text_for`] and friends.
    lookup_locale: String,
}

impl LocaleIndex {
    /// Files are ordered by locale, then URI, so results do not depend on
    /// indexing order.
    #[must_use]
    pub fn new(lookup_locale: impl Into<String>, mut files: Vec<IndexedLocale>) -> Self {
        files.sort_by(|a, b| (&a.locale, &a.uri).cmp(&(&b.locale, &b.uri)));
        Self { files, lookup_locale: lookup_locale.into() }
    }

    /// Collects the parsed entries of `files` from the database.
    #[must_use]
    pub fn from_db<'a>(
        db: &dyn I18nDatabase,
        lookup_locale: &str,
        files: impl IntoIterator<Item = &'a LocaleFile>,
    ) -> Self {
        let files = files
            .into_iter()
            .map(|file| IndexedLocale {
                uri: file.uri(db).clone(),
                locale: file.locale(db).clone(),
                entries: lang_entries(db, *file).clone(),
            })
            .collect();
        Self::new(lookup_locale, files)
    }

    /// Locale used for text lookups.
    #[must_use]
    pub fn lookup_locale(&self) -> &str {
        &self.lookup_locale
    }

    /// Every indexed file, sorted.
    #[must_use]
    pub fn files(&self) -> &[IndexedLocale] {
        &self.files
    }

    /// Entries of the lookup locale, in file order.
    fn lookup_entries(&self) -> impl Iterator<Item = &LangEntry> {
        self.files
            .iter()
            .filter(|file| file.locale == self.lookup_locale)
            .flat_map(|file| file.entries.iter())
    }

    /// Every definition of `key` in every locale, or of the keys `pattern`
    /// matches when given.
    #[must_use]
    pub fn definitions(&self, key: &str, pattern: Option<&Regex>) -> Vec<LocaleDefinition<'_>> {
        self.files
            .iter()
            .flat_map(|file| {
                file.entries
                    .iter()
                    .filter(|entry| {
                        pattern.map_or_else(|| entry.key == key, |p| p.is_match(&entry.key))
                    })
                    .map(|entry| LocaleDefinition { uri: &file.uri, locale: &file.locale, entry })
            })
            .collect()
    }

    /// First value of `key` per locale: lookup locale first, the rest by name.
    #[must_use]
    pub fn values_by_locale(&self, key: &str) -> Vec<(&str, &str)> {
        let mut values: Vec<(&str, &str)> = Vec::new();
        for file in &self.files {
            if values.iter().any(|(locale, _)| *locale == file.locale) {
                continue;
            }
            if let Some(entry) = file.entries.iter().find(|entry| entry.key == key) {
                values.push((file.locale.as_str(), entry.value.as_str()));
            }
        }
        values.sort_by_key(|(locale, _)| (*locale != self.lookup_locale, *locale));
        values
    }
}

impl LocaleLookup for LocaleIndex {
    fn text_for(&self, key: &str) -> Option<String> {
        self.lookup_entries().find(|entry| entry.key == key).map(|entry| entry.value.clone())
    }

    fn text_matching(&self, pattern: &Regex) -> Option<String> {
        self.lookup_entries()
            .find(|entry| pattern.is_match(&entry.key))
            .map(|entry| entry.value.clone())
    }
}

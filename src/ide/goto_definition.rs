//! Go to Definition implementation

use tower_lsp::lsp_types::{
    Location,
    Url,
};

use crate::input::locale::{
    LocaleDefinition,
    LocaleIndex,
};
use crate::translations::key::derive_pattern;
use crate::translations::{
    TranslationReference,
    VARIABLE_MARKER,
};

/// Definitions of `key` in every locale.
///
/// A `pattern_key` containing the variable marker matches every key the
/// derived pattern accepts; otherwise `key` must match exactly.
#[must_use]
pub fn find_definitions<'a>(
    key: &str,
    pattern_key: &str,
    locales: &'a LocaleIndex,
) -> Vec<LocaleDefinition<'a>> {
    if !pattern_key.contains(VARIABLE_MARKER) {
        return locales.definitions(key, None);
    }
    match derive_pattern(pattern_key, VARIABLE_MARKER) {
        Ok(pattern) => locales.definitions(key, Some(&pattern)),
        Err(error) => {
            tracing::warn!(%error, pattern_key, "Failed to build key pattern");
            Vec::new()
        }
    }
}

/// All locations where the referenced key is defined.
#[must_use]
pub fn resolve_reference(reference: &TranslationReference, locales: &LocaleIndex) -> Vec<Location> {
    find_definitions(&reference.key, &reference.pattern_key, locales)
        .into_iter()
        .filter_map(|definition| {
            let Ok(uri) = Url::parse(definition.uri) else {
                tracing::warn!("Failed to parse locale file URI: {}", definition.uri);
                return None;
            };
            Some(Location { uri, range: definition.entry.key_range.into() })
        })
        .collect()
}

//! Hover content for translation keys.

use std::fmt::Write as _;

use crate::ide::goto_definition::find_definitions;
use crate::input::locale::{
    LocaleDefinition,
    LocaleIndex,
};
use crate::translations::TranslationUsage;

/// Maximum number of matching keys listed per locale for a variable key.
const MAX_PATTERN_MATCHES_DISPLAY: usize = 10;

/// Maximum length of a value shown next to a matching key.
const MAX_MATCH_VALUE_LENGTH: usize = 40;

/// Markdown describing `usage`'s key and its text in each locale.
///
/// The lookup locale comes first, then the others alphabetically. A key with
/// variable segments lists the keys its pattern matches instead.
#[must_use]
pub fn generate_hover_content(usage: &TranslationUsage, locales: &LocaleIndex) -> Option<String> {
    let mut content = format!("**Translation Key:** `{}`\n\n", usage.key);

    if usage.contains_variable {
        let definitions = find_definitions(&usage.key, &usage.variable_pattern_key, locales);
        if definitions.is_empty() {
            return None;
        }
        for (locale, matches) in group_by_locale(&definitions, locales.lookup_locale()) {
            let _ = writeln!(content, "**{locale}**:");
            for definition in matches.iter().take(MAX_PATTERN_MATCHES_DISPLAY) {
                let value = truncate_string(&definition.entry.value, MAX_MATCH_VALUE_LENGTH);
                let _ = writeln!(content, "  `{}`: {value}", definition.entry.key);
            }
            if matches.len() > MAX_PATTERN_MATCHES_DISPLAY {
                let remaining = matches.len() - MAX_PATTERN_MATCHES_DISPLAY;
                let _ = writeln!(content, "  ... and {remaining} more");
            }
        }
        return Some(content);
    }

    let values = locales.values_by_locale(&usage.key);
    if values.is_empty() {
        return None;
    }
    for (locale, value) in values {
        let _ = writeln!(content, "**{locale}**: {value}");
    }

    Some(content)
}

/// Definitions grouped per locale, `lookup_locale` first, the rest by name.
fn group_by_locale<'a>(
    definitions: &[LocaleDefinition<'a>],
    lookup_locale: &str,
) -> Vec<(&'a str, Vec<LocaleDefinition<'a>>)> {
    let mut groups: Vec<(&'a str, Vec<LocaleDefinition<'a>>)> = Vec::new();
    for definition in definitions {
        match groups.iter_mut().find(|(locale, _)| *locale == definition.locale) {
            Some((_, group)) => group.push(*definition),
            None => groups.push((definition.locale, vec![*definition])),
        }
    }
    groups.sort_by_key(|(locale, _)| (*locale != lookup_locale, *locale));
    groups
}

/// Truncates to `max_len` characters, marking the cut with `...`.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

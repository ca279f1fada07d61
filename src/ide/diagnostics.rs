//! Diagnostics for translation usages.

use tower_lsp::lsp_types::{
    Diagnostic,
    DiagnosticSeverity,
};

use crate::config::DiagnosticsConfig;
use crate::ide::goto_definition::find_definitions;
use crate::input::locale::LocaleIndex;
use crate::translations::TranslationUsage;

/// `source` of every diagnostic the server publishes.
pub const DIAGNOSTIC_SOURCE: &str = "mc-i18n";

/// Warns about keys no locale defines and about format arity mismatches.
///
/// `index_ready` is false while the workspace is still being scanned; keys
/// are not reported as missing then.
#[must_use]
pub fn generate_diagnostics(
    usages: &[TranslationUsage],
    locales: &LocaleIndex,
    config: &DiagnosticsConfig,
    index_ready: bool,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for usage in usages {
        if usage.key.is_empty() {
            continue;
        }

        if config.unresolved_keys
            && index_ready
            && find_definitions(&usage.key, &usage.variable_pattern_key, locales).is_empty()
        {
            diagnostics.push(warning(usage, format!("Translation key '{}' not found", usage.key)));
        }

        if config.formatting && usage.has_formatting_error {
            let text = usage.resolved_text.as_deref().unwrap_or_default();
            diagnostics
                .push(warning(usage, format!("Insufficient parameters for formatting '{text}'")));
        }
    }

    diagnostics
}

/// Warning at the key argument of `usage`.
fn warning(usage: &TranslationUsage, message: String) -> Diagnostic {
    Diagnostic {
        range: usage.range.into(),
        severity: Some(DiagnosticSeverity::WARNING),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message,
        ..Diagnostic::default()
    }
}

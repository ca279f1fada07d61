use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::input::locale::DEFAULT_LOCALE;

/// One invalid settings field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "includePatterns[0]")
    pub field_path: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Error at `field_path`.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Why settings could not be loaded or applied.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One entry per invalid field.
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// The settings file exists but cannot be read.
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// `.mc-i18n.json` is not valid JSON for [`I18nSettings`].
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered list, one error per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Payload of `workspace/didChangeConfiguration`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// `mcI18n` section.
    pub mc_i18n: I18nSettings,
}

/// Settings read from `.mc-i18n.json` or pushed by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nSettings {
    /// Java sources to analyze, relative to the workspace root.
    pub include_patterns: Vec<String>,
    /// Excluded from both sources and locale files.
    pub exclude_patterns: Vec<String>,

    /// Glob selecting `.lang` files.
    pub lang_file_pattern: String,

    /// Locale whose text is shown in folds and used for diagnostics.
    pub default_locale: String,

    /// MCP SRG file (`mcp-srg.srg` style), relative to the workspace root.
    ///
    /// Without it, calls to obfuscated game methods are not recognized.
    pub mappings_file: Option<String>,

    /// Folding settings.
    pub folding: FoldingConfig,
    /// Diagnostic settings.
    pub diagnostics: DiagnosticsConfig,
}

/// `folding` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoldingConfig {
    /// Off disables fold regions and folding ranges.
    pub enabled: bool,
}

impl Default for FoldingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `diagnostics` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    /// Report keys that no locale file defines.
    pub unresolved_keys: bool,
    /// Report format strings whose placeholder count differs from the arguments.
    pub formatting: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { unresolved_keys: true, formatting: true }
    }
}

impl I18nSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Invalid locale code
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "includePatterns",
                "At least one pattern is required. Example: [\"**/*.java\"]",
            ));
        }

        for (index, pattern) in self.include_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("includePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if self.lang_file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "langFilePattern",
                "The pattern cannot be empty. Example: \"**/assets/*/lang/*.lang\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.lang_file_pattern) {
            errors.push(ValidationError::new(
                "langFilePattern",
                format!("Invalid glob pattern '{}': {e}", self.lang_file_pattern),
            ));
        }

        if !is_locale_code(&self.default_locale) {
            errors.push(ValidationError::new(
                "defaultLocale",
                format!(
                    "Invalid locale '{}'. Use the lower-case file name of a .lang file, for example: \"en_us\"",
                    self.default_locale
                ),
            ));
        }

        if let Some(path) = &self.mappings_file
            && path.trim().is_empty()
        {
            errors.push(ValidationError::new(
                "mappingsFile",
                "The path cannot be empty. Please specify an SRG file, or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// `en_us`, `zh_cn`, `lol_us`.
fn is_locale_code(locale: &str) -> bool {
    !locale.is_empty()
        && locale.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/*.java".to_string()],
            exclude_patterns: vec![
                "build/**".to_string(),
                ".gradle/**".to_string(),
                "out/**".to_string(),
            ],
            lang_file_pattern: "**/assets/*/lang/*.lang".to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
            mappings_file: None,
            folding: FoldingConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

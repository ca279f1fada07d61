//! Workspace settings read from `.mc-i18n.json`.

/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Source and locale file pattern matcher
mod matcher;
/// Configuration types and settings
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use matcher::{
    FileMatcher,
    MatcherError,
};
pub use types::{
    ConfigError,
    DiagnosticsConfig,
    FoldingConfig,
    I18nSettings,
    ServerSettings,
    ValidationError,
};
